//! The shared HTTP client every resource builder dispatches through.
//!
//! # Design
//! `HelpdeskClient` owns a `ClientConfig` and a `Transport` and exposes one
//! dispatch method per verb (`do_get`, `do_post`, `do_put`, `do_delete`).
//! Each is split the same way: `build_*` produces an `HttpRequest` (base URL,
//! auth and content-type headers, query pairs, JSON body), the transport
//! executes it, and `parse_response` checks the status and decodes the JSON
//! body. Resource builders only ever see paths and JSON maps.

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};

/// Caller-supplied options: query parameters for reads and deletes, extra
/// top-level body fields for writes.
pub type Options = Map<String, Value>;

#[derive(Debug, Clone)]
pub struct HelpdeskClient<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
}

impl HelpdeskClient<UreqTransport> {
    /// Client for `base_url` with no credentials, over a default ureq agent.
    pub fn connect(base_url: &str) -> Self {
        Self::new(ClientConfig::new(base_url), UreqTransport::new())
    }

    pub fn from_env() -> Result<Self, ApiError> {
        Ok(Self::new(ClientConfig::from_env()?, UreqTransport::new()))
    }
}

impl<T: Transport> HelpdeskClient<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn build_get(&self, path: &str, query: &Options) -> HttpRequest {
        self.request(HttpMethod::Get, path, query_pairs(query), None)
    }

    pub fn build_post(&self, path: &str, body: &Options) -> Result<HttpRequest, ApiError> {
        let body = encode_body(body)?;
        Ok(self.request(HttpMethod::Post, path, Vec::new(), Some(body)))
    }

    pub fn build_put(&self, path: &str, body: &Options) -> Result<HttpRequest, ApiError> {
        let body = encode_body(body)?;
        Ok(self.request(HttpMethod::Put, path, Vec::new(), Some(body)))
    }

    pub fn build_delete(&self, path: &str, options: &Options) -> HttpRequest {
        self.request(HttpMethod::Delete, path, query_pairs(options), None)
    }

    #[instrument(skip(self, query))]
    pub fn do_get(&self, path: &str, query: &Options) -> Result<Value, ApiError> {
        let req = self.build_get(path, query);
        self.dispatch(req)
    }

    #[instrument(skip(self, body))]
    pub fn do_post(&self, path: &str, body: &Options) -> Result<Value, ApiError> {
        let req = self.build_post(path, body)?;
        self.dispatch(req)
    }

    #[instrument(skip(self, body))]
    pub fn do_put(&self, path: &str, body: &Options) -> Result<Value, ApiError> {
        let req = self.build_put(path, body)?;
        self.dispatch(req)
    }

    #[instrument(skip(self, options))]
    pub fn do_delete(&self, path: &str, options: &Options) -> Result<Value, ApiError> {
        let req = self.build_delete(path, options);
        self.dispatch(req)
    }

    fn dispatch(&self, req: HttpRequest) -> Result<Value, ApiError> {
        debug!(method = %req.method, url = %req.url, "sending request");
        let response = self.transport.execute(req)?;
        debug!(status = response.status, "received response");
        parse_response(response)
    }

    fn request(
        &self,
        method: HttpMethod,
        path: &str,
        query: Vec<(String, String)>,
        body: Option<String>,
    ) -> HttpRequest {
        let mut headers = vec![("accept".to_string(), "application/json".to_string())];
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        if let Some(creds) = self.config.credentials() {
            headers.push(("authorization".to_string(), creds.authorization()));
        }
        HttpRequest {
            method,
            url: self.config.url_for(path),
            query,
            headers,
            body,
        }
    }
}

/// Map the response to a JSON value, or to the matching `ApiError`.
/// Empty bodies (e.g. 204 on delete) decode to `Value::Null`.
pub fn parse_response(response: HttpResponse) -> Result<Value, ApiError> {
    check_status(&response)?;
    if response.body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

fn encode_body(body: &Options) -> Result<String, ApiError> {
    serde_json::to_string(body).map_err(|e| ApiError::SerializationError(e.to_string()))
}

/// Flatten options into query pairs using bracket notation for nesting:
/// `{"role": ["agent", "admin"]}` becomes `role[]=agent&role[]=admin`,
/// `{"filter": {"org": 4}}` becomes `filter[org]=4`. Nulls are dropped.
pub fn query_pairs(options: &Options) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in options {
        flatten(key.clone(), value, &mut pairs);
    }
    pairs
}

fn flatten(key: String, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::String(s) => out.push((key, s.clone())),
        Value::Bool(_) | Value::Number(_) => out.push((key, value.to_string())),
        Value::Array(items) => {
            for item in items {
                flatten(format!("{key}[]"), item, out);
            }
        }
        Value::Object(map) => {
            for (sub, item) in map {
                flatten(format!("{key}[{sub}]"), item, out);
            }
        }
    }
}
