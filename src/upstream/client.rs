//! Outbound HTTP client for the upstream service.
//!
//! # Responsibilities
//! - Hold the shared reqwest client and the upstream base URL
//! - Attach the bearer credential and JSON content type
//! - Issue exactly one POST per outbound request (no retries)

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response};

use crate::config::UpstreamConfig;
use crate::routing::OutboundRequest;

/// Upstream client wrapper.
#[derive(Clone)]
pub struct PuterClient {
    http: Client,
    base_url: String,
}

impl PuterClient {
    /// Create a client from configuration.
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Full URL for an endpoint.
    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Send the outbound request and return the raw response.
    ///
    /// The body is left unread so the caller can choose between streaming
    /// and JSON decoding.
    pub async fn send(&self, request: &OutboundRequest) -> Result<Response, reqwest::Error> {
        self.http
            .post(self.url_for(request.endpoint))
            .header(AUTHORIZATION, format!("Bearer {}", request.credential))
            .header(CONTENT_TYPE, "application/json")
            .json(&request.payload)
            .send()
            .await
    }
}

impl std::fmt::Debug for PuterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PuterClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}
