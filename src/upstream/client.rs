//! HTTP client seam used by the source fetchers and the enclosure size lookup.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::config::HttpConfig;
use crate::error::{FeedError, Result};

/// A buffered HTTP response.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Response headers, names lowercased.
    pub headers: HashMap<String, String>,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    /// Create a 200 response with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Create an empty response with the given status.
    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    /// Add a header.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// The upstream APIs only signal success with 200.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Look up a header case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Decode the body as JSON.
    pub fn json(&self) -> Result<Value> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Minimal HTTP capability needed against the upstream APIs.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issue a GET with the given query parameters.
    async fn get(&self, url: &str, query: &[(String, String)]) -> Result<HttpResponse>;

    /// Issue a HEAD with a request-specific timeout.
    async fn head(&self, url: &str, timeout: Duration) -> Result<HttpResponse>;
}

/// reqwest-backed [`HttpClient`].
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    /// Build a client from the HTTP configuration.
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| FeedError::Http(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn buffer(response: reqwest::Response) -> Result<HttpResponse> {
        let status = response.status().as_u16();
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
        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str, query: &[(String, String)]) -> Result<HttpResponse> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await?;

        Self::buffer(response).await
    }

    async fn head(&self, url: &str, timeout: Duration) -> Result<HttpResponse> {
        let response = self.client.head(url).timeout(timeout).send().await?;

        Self::buffer(response).await
    }
}
