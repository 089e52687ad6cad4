//! The I/O boundary.
//!
//! `HelpdeskClient` never performs network I/O itself; it hands finished
//! `HttpRequest` values to a `Transport`. `UreqTransport` is the blocking
//! implementation used in production. Tests plug in transports that record
//! requests and replay canned responses.

use tracing::trace;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes one HTTP round-trip.
///
/// Implementations must return non-2xx responses as `Ok(HttpResponse)`;
/// `Err` is reserved for failures where no response exists at all.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by a `ureq` agent.
///
/// The agent is configured with `http_status_as_error(false)` so 4xx/5xx
/// responses come back as data and status interpretation stays in the
/// client.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        trace!(method = %req.method, url = %req.url, "executing request");

        let mut response = match (req.method, req.body.as_deref()) {
            (HttpMethod::Get, _) => prepare(self.agent.get(&req.url), &req).call()?,
            (HttpMethod::Delete, _) => prepare(self.agent.delete(&req.url), &req).call()?,
            (HttpMethod::Post, Some(body)) => {
                prepare(self.agent.post(&req.url), &req).send(body.as_bytes())?
            }
            (HttpMethod::Post, None) => prepare(self.agent.post(&req.url), &req).send_empty()?,
            (HttpMethod::Put, Some(body)) => {
                prepare(self.agent.put(&req.url), &req).send(body.as_bytes())?
            }
            (HttpMethod::Put, None) => prepare(self.agent.put(&req.url), &req).send_empty()?,
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = response.body_mut().read_to_string()?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn prepare<B>(mut builder: ureq::RequestBuilder<B>, req: &HttpRequest) -> ureq::RequestBuilder<B> {
    for (k, v) in &req.headers {
        builder = builder.header(k.as_str(), v.as_str());
    }
    for (k, v) in &req.query {
        builder = builder.query(k, v);
    }
    builder
}
