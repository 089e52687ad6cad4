//! Error types for the helpdesk API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the user does not exist" from "the server returned an unexpected status."
//! All other non-2xx responses land in `HttpError` with the raw status code
//! and body. The builders never wrap or retry: whatever the transport or the
//! status check produces is what the caller sees.

use thiserror::Error;

/// Errors returned by `HelpdeskClient` and the resource builders.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to a JSON object.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The transport failed before any response was received.
    #[error("transport failed: {0}")]
    Transport(String),

    /// Client configuration is missing or malformed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<ureq::Error> for ApiError {
    fn from(e: ureq::Error) -> Self {
        ApiError::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_display_includes_status_and_body() {
        let err = ApiError::HttpError {
            status: 422,
            body: "email taken".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 422: email taken");
    }

    #[test]
    fn not_found_display() {
        assert_eq!(ApiError::NotFound.to_string(), "resource not found");
    }
}
