//! HTTP transport seam used by every probe.
//!
//! Probes talk to the provider through [`HttpTransport`], so the network can
//! be replaced by a scripted implementation in tests. [`ReqwestTransport`]
//! is the real implementation, honoring the proxy and TLS policy from
//! [`NetworkConfig`].

use crate::error::{ProbeError, Result};
use async_trait::async_trait;
use idprobe_core::user_agent::random_user_agent;
use idprobe_core::NetworkConfig;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

/// A fully-read HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Final URL after redirects
    pub url: String,
    /// Response body as text
    pub body: String,
    headers: HashMap<String, String>,
}

impl HttpResponse {
    /// Create a response without headers.
    #[must_use]
    pub fn new(status: u16, url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            url: url.into(),
            body: body.into(),
            headers: HashMap::new(),
        }
    }

    /// Add a header. Names are case-insensitive.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Look up a header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Body of an outgoing POST.
#[derive(Debug, Clone, PartialEq)]
pub enum PostBody {
    /// `application/json` body
    Json(serde_json::Value),
    /// `application/x-www-form-urlencoded` body
    Form(Vec<(String, String)>),
}

/// An outgoing POST request.
#[derive(Debug, Clone, PartialEq)]
pub struct PostRequest {
    /// Target URL
    pub url: String,
    /// Extra request headers, in insertion order
    pub headers: Vec<(String, String)>,
    /// Request body
    pub body: PostBody,
}

impl PostRequest {
    /// Create a JSON POST.
    #[must_use]
    pub fn json(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            body: PostBody::Json(body),
        }
    }

    /// Create a form-encoded POST.
    #[must_use]
    pub fn form(url: impl Into<String>, fields: Vec<(String, String)>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            body: PostBody::Form(fields),
        }
    }

    /// Append a request header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Look up a request header by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Transport for probe requests.
///
/// An `Err` means no response was received at all. Any HTTP status,
/// including errors, is returned as `Ok`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform a GET request.
    async fn get(&self, url: &str) -> Result<HttpResponse>;

    /// Perform a POST request.
    async fn post(&self, request: PostRequest) -> Result<HttpResponse>;
}

/// `reqwest`-backed transport with proxy and TLS policy.
pub struct ReqwestTransport {
    client: Client,
    user_agent: Option<String>,
}

impl ReqwestTransport {
    /// Build a transport from network settings.
    ///
    /// # Errors
    /// Returns error if the proxy URL is invalid or the client cannot be built.
    pub fn new(config: &NetworkConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs);

        if let Some(proxy_url) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| ProbeError::Client(format!("invalid proxy '{proxy_url}': {e}")))?;
            builder = builder.proxy(proxy);
        }

        if config.accept_invalid_certs {
            tracing::warn!("TLS certificate validation is disabled");
        }

        let client = builder
            .build()
            .map_err(|e| ProbeError::Client(e.to_string()))?;

        Ok(Self {
            client,
            user_agent: config.user_agent.clone(),
        })
    }

    fn user_agent(&self) -> &str {
        self.user_agent
            .as_deref()
            .unwrap_or_else(|| random_user_agent())
    }

    async fn read_response(url: &str, response: reqwest::Response) -> Result<HttpResponse> {
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| ProbeError::network(url, e))?;

        Ok(HttpResponse {
            status,
            url: final_url,
            body,
            headers,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, self.user_agent())
            .send()
            .await
            .map_err(|e| ProbeError::network(url, e))?;

        Self::read_response(url, response).await
    }

    async fn post(&self, request: PostRequest) -> Result<HttpResponse> {
        tracing::debug!("POST {}", request.url);
        let mut builder = self
            .client
            .post(&request.url)
            .header(reqwest::header::USER_AGENT, self.user_agent());

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match &request.body {
            PostBody::Json(value) => builder.json(value),
            PostBody::Form(fields) => builder.form(fields),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| ProbeError::network(&request.url, e))?;

        Self::read_response(&request.url, response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_headers_case_insensitive() {
        let response = HttpResponse::new(200, "https://www.office.com/", "")
            .with_header("X-MS-Request-Id", "abc-123");
        assert_eq!(response.header("x-ms-request-id"), Some("abc-123"));
        assert_eq!(response.header("X-Ms-Request-Id"), Some("abc-123"));
        assert_eq!(response.header("missing"), None);
    }

    #[test]
    fn test_post_request_headers() {
        let request = PostRequest::json("https://example.com", serde_json::json!({}))
            .with_header("hpgid", "1104")
            .with_header("Canary", "xyz");
        assert_eq!(request.header("HPGID"), Some("1104"));
        assert_eq!(request.header("canary"), Some("xyz"));
    }

    #[test]
    fn test_transport_builds_with_proxy() {
        let config = NetworkConfig {
            proxy: Some("http://127.0.0.1:8080".to_string()),
            accept_invalid_certs: true,
            ..NetworkConfig::default()
        };
        assert!(ReqwestTransport::new(&config).is_ok());
    }

    #[test]
    fn test_transport_rejects_invalid_proxy() {
        let config = NetworkConfig {
            proxy: Some("not a url".to_string()),
            ..NetworkConfig::default()
        };
        let err = ReqwestTransport::new(&config).err().expect("invalid proxy");
        assert!(matches!(err, ProbeError::Client(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let transport = ReqwestTransport::new(&NetworkConfig {
            timeout_secs: 5,
            ..NetworkConfig::default()
        })
        .expect("build transport");

        let err = transport
            .get("http://127.0.0.1:1/")
            .await
            .expect_err("nothing listens on port 1");
        assert!(matches!(err, ProbeError::Network { .. }));
    }
}
