//! Blocking [`Transport`] backed by `ureq`.
//!
//! # Design
//! The transport owns everything the request builders leave out: the auth
//! header, `Accept`/`User-Agent`, and the request timeout. It never
//! interprets status codes; 4xx/5xx responses are returned as data so the
//! parse step decides what they mean.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use ureq::typestate::WithBody;
use ureq::{Agent, RequestBuilder};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};

pub const DEFAULT_BASE_URL: &str = "https://api.fastly.com";
pub const AUTH_HEADER: &str = "Fastly-Key";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    format!("cdn-core/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

/// Connection settings for [`UreqTransport`].
///
/// Deserializable so hosts can embed it in their own config files; the crate
/// itself reads no environment or files.
#[derive(Clone, Deserialize)]
pub struct TransportConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl TransportConfig {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// The key never reaches logs.
impl fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "<redacted>" })
            .field("user_agent", &self.user_agent)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// `ureq` agent plus the headers added to every request.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
    default_headers: Vec<(String, String)>,
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.default_headers.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("UreqTransport")
            .field("default_headers", &names)
            .finish_non_exhaustive()
    }
}

impl UreqTransport {
    pub fn new(config: &TransportConfig) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build()
            .new_agent();

        let mut default_headers = vec![
            ("accept".to_string(), "application/json".to_string()),
            ("user-agent".to_string(), config.user_agent.clone()),
        ];
        if !config.api_key.is_empty() {
            default_headers.push((AUTH_HEADER.to_string(), config.api_key.clone()));
        }

        Self {
            agent,
            default_headers,
        }
    }

    fn headers<'a>(&'a self, request: &'a [(String, String)]) -> impl Iterator<Item = &'a (String, String)> {
        self.default_headers.iter().chain(request.iter())
    }
}

fn send_body(
    builder: RequestBuilder<WithBody>,
    body: Option<String>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let HttpRequest {
            method,
            path,
            headers,
            body,
        } = request;

        let result = match method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(&path);
                for (k, v) in self.headers(&headers) {
                    builder = builder.header(k.as_str(), v.as_str());
                }
                builder.call()
            }
            HttpMethod::Delete => {
                let mut builder = self.agent.delete(&path);
                for (k, v) in self.headers(&headers) {
                    builder = builder.header(k.as_str(), v.as_str());
                }
                builder.call()
            }
            HttpMethod::Post | HttpMethod::Put => {
                let mut builder = if method == HttpMethod::Post {
                    self.agent.post(&path)
                } else {
                    self.agent.put(&path)
                };
                for (k, v) in self.headers(&headers) {
                    builder = builder.header(k.as_str(), v.as_str());
                }
                send_body(builder, body)
            }
        };

        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_fill_missing_fields() {
        let config: TransportConfig = serde_json::from_str(r#"{"api_key":"secret"}"#).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.timeout_secs, 30);
        assert!(config.user_agent.starts_with("cdn-core/"));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = TransportConfig::new("secret");
        let printed = format!("{config:?}");
        assert!(!printed.contains("secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn auth_header_only_when_key_present() {
        let anonymous = UreqTransport::new(&TransportConfig::default());
        assert!(anonymous.default_headers.iter().all(|(k, _)| k != AUTH_HEADER));

        let authed = UreqTransport::new(&TransportConfig::new("secret"));
        assert!(authed
            .default_headers
            .iter()
            .any(|(k, v)| k == AUTH_HEADER && v == "secret"));
    }
}
