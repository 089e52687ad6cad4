//! Client configuration.
//!
//! A `ClientConfig` is either built in code or read from the environment:
//!
//! | Variable | Required | Meaning |
//! |---|---|---|
//! | `HELPDESK_URL` | yes | API base URL, e.g. `https://acme.example.com/api/v2` |
//! | `HELPDESK_EMAIL` | with token | agent email used for API-token auth |
//! | `HELPDESK_TOKEN` | with email | API token |
//! | `HELPDESK_FORMAT_SUFFIX` | no | `true` appends `.json` to every path |

use base64::Engine;

use crate::error::ApiError;

pub const ENV_URL: &str = "HELPDESK_URL";
pub const ENV_EMAIL: &str = "HELPDESK_EMAIL";
pub const ENV_TOKEN: &str = "HELPDESK_TOKEN";
pub const ENV_FORMAT_SUFFIX: &str = "HELPDESK_FORMAT_SUFFIX";

/// API-token credentials. Sent as basic auth with the user part
/// `{email}/token`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub token: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            token: token.into(),
        }
    }

    /// Value for the `Authorization` header.
    pub fn authorization(&self) -> String {
        let raw = format!("{}/token:{}", self.email, self.token);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(raw)
        )
    }
}

// Keep the token out of logs and panic messages.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    credentials: Option<Credentials>,
    format_suffix: bool,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials: None,
            format_suffix: false,
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_format_suffix(mut self, enabled: bool) -> Self {
        self.format_suffix = enabled;
        self
    }

    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. `from_env` is this with
    /// `std::env::var`; tests pass a map instead of mutating the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(ENV_URL)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ApiError::Config(format!("{ENV_URL} is not set")))?;
        let mut config = Self::new(base_url.trim());

        match (lookup(ENV_EMAIL), lookup(ENV_TOKEN)) {
            (Some(email), Some(token)) => {
                config = config.with_credentials(Credentials::new(email, token));
            }
            (None, None) => {}
            _ => {
                return Err(ApiError::Config(format!(
                    "{ENV_EMAIL} and {ENV_TOKEN} must be set together"
                )))
            }
        }

        if let Some(raw) = lookup(ENV_FORMAT_SUFFIX) {
            let enabled = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                other => {
                    return Err(ApiError::Config(format!(
                        "{ENV_FORMAT_SUFFIX}: expected a boolean, got {other:?}"
                    )))
                }
            };
            config = config.with_format_suffix(enabled);
        }

        Ok(config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Absolute URL for a resource path such as `users/123`.
    pub fn url_for(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if self.format_suffix {
            format!("{}/{path}.json", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let config = ClientConfig::new("http://localhost:3000/");
        assert_eq!(config.url_for("users"), "http://localhost:3000/users");
    }

    #[test]
    fn format_suffix_appends_json() {
        let config = ClientConfig::new("http://localhost:3000").with_format_suffix(true);
        assert_eq!(
            config.url_for("users/12/user_identities"),
            "http://localhost:3000/users/12/user_identities.json"
        );
    }

    #[test]
    fn authorization_uses_token_convention() {
        let creds = Credentials::new("agent@example.com", "abc123");
        let expected = format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode("agent@example.com/token:abc123")
        );
        assert_eq!(creds.authorization(), expected);
    }

    #[test]
    fn debug_redacts_token() {
        let creds = Credentials::new("agent@example.com", "secret");
        let out = format!("{creds:?}");
        assert!(!out.contains("secret"));
        assert!(out.contains("agent@example.com"));
    }

    #[test]
    fn from_lookup_requires_url() {
        let err = ClientConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn from_lookup_reads_everything() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_URL, "https://acme.example.com/api/v2/"),
            (ENV_EMAIL, "agent@example.com"),
            (ENV_TOKEN, "abc"),
            (ENV_FORMAT_SUFFIX, "true"),
        ]))
        .unwrap();
        assert_eq!(config.base_url(), "https://acme.example.com/api/v2");
        assert_eq!(
            config.credentials(),
            Some(&Credentials::new("agent@example.com", "abc"))
        );
        assert_eq!(
            config.url_for("users"),
            "https://acme.example.com/api/v2/users.json"
        );
    }

    #[test]
    fn from_lookup_rejects_half_credentials() {
        let err = ClientConfig::from_lookup(lookup(&[
            (ENV_URL, "http://localhost"),
            (ENV_EMAIL, "agent@example.com"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn from_lookup_rejects_bad_bool() {
        let err = ClientConfig::from_lookup(lookup(&[
            (ENV_URL, "http://localhost"),
            (ENV_FORMAT_SUFFIX, "maybe"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }
}
