//! In-progress request configuration shared by resource builders.
//!
//! A `Collection` holds the accumulated resource path and the caller's
//! options. It is created once per accessor call, refined by chained
//! builder methods, and consumed by exactly one terminal action.

use serde_json::Value;

use crate::client::Options;

/// Option key carrying free-text search.
pub const QUERY_KEY: &str = "query";

/// Reserved key. The path lives on the `Collection` itself, so a caller
/// option with this name is discarded rather than sent.
const PATH_KEY: &str = "path";

#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    path: String,
    options: Options,
}

impl Collection {
    pub fn new(path: impl Into<String>) -> Self {
        Self::with_options(path, Options::new())
    }

    pub fn with_options(path: impl Into<String>, mut options: Options) -> Self {
        options.remove(PATH_KEY);
        Self {
            path: path.into(),
            options,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn query(&self) -> Option<&str> {
        self.options.get(QUERY_KEY).and_then(Value::as_str)
    }

    /// Append `/segment` to the path.
    pub fn push_segment(&mut self, segment: &str) {
        self.path.push('/');
        self.path.push_str(segment.trim_matches('/'));
    }

    pub fn set_option(&mut self, key: &str, value: Value) {
        if key == PATH_KEY {
            return;
        }
        self.options.insert(key.to_string(), value);
    }

    pub fn set_query(&mut self, text: &str) {
        self.set_option(QUERY_KEY, Value::String(text.to_string()));
    }

    /// Split into the path and the options to send as query parameters.
    pub fn into_request(self) -> (String, Options) {
        (self.path, self.options)
    }

    /// Split into the path and a write body: the accumulated options with
    /// `data` stored under `resource_key`, replacing any option of that name.
    pub fn into_payload(self, resource_key: &str, data: Options) -> (String, Options) {
        let mut body = self.options;
        body.insert(resource_key.to_string(), Value::Object(data));
        (self.path, body)
    }
}
