//! Blocking client for the users resource of a helpdesk REST API.
//!
//! # Overview
//! Fluent builders translate method chains into REST requests:
//! `client.user(123).identities().fetch()` becomes
//! `GET {base}/users/123/user_identities`. Builders only accumulate a path
//! and options; the shared [`HelpdeskClient`] turns them into `HttpRequest`
//! values, runs them through a [`Transport`] and parses the JSON response.
//!
//! # Design
//! - Host-does-IO: the core produces plain-data requests and hands them to a
//!   `Transport`. `UreqTransport` does the real round-trip; tests substitute
//!   recording transports.
//! - Builders are consumed by their terminal action, so each request
//!   configuration is used exactly once.
//! - No retries, caching or rate limiting. Transport and status errors reach
//!   the caller as [`ApiError`] unchanged.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod collection;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;
pub mod users;

pub use client::{HelpdeskClient, Options};
pub use collection::Collection;
pub use config::{ClientConfig, Credentials};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
pub use types::{IdentitiesPage, Identity, Role, User, UserEnvelope, UsersPage};
pub use users::{Selector, UsersCollection};
