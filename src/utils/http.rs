//! HTTP client utilities.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, NetworkConfig};
use crate::lookup::{Fetcher, LookupError};
use crate::utils::retry::{with_retry, RetryConfig};

/// Default per-request timeout for citation lookups
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared HTTP client that fetches JSON citation responses
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
    api_key: Option<String>,
    retry: RetryConfig,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a new HTTP client with a custom request timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self::from_client(Arc::new(client))
    }

    /// Create a client from the `[network]` configuration section
    pub fn from_config(network: &NetworkConfig) -> Self {
        Self::with_timeout(network.timeout()).with_retry(network.retry_config())
    }

    /// Create a client for the configured endpoint.
    ///
    /// The API key is only attached when the selected service uses one.
    pub fn for_endpoint(config: &Config) -> Self {
        Self::from_config(&config.network).with_api_key(config.endpoint.request_api_key())
    }

    /// Create from an existing reqwest Client
    pub fn from_client(client: Arc<Client>) -> Self {
        Self {
            client,
            api_key: None,
            retry: RetryConfig::default(),
        }
    }

    /// Send an `x-api-key` header with every request
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Set the retry policy
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Get the underlying client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Add API key to request headers if available
    fn add_api_key_if_present(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref key) = self.api_key {
            builder.header("x-api-key", key)
        } else {
            builder
        }
    }

    async fn get_once(&self, url: &str) -> Result<Value, LookupError> {
        let response = self
            .add_api_key_if_present(self.client.get(url))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for HttpClient {
    async fn get_json(&self, url: &str) -> Result<Value, LookupError> {
        tracing::debug!(url, "Fetching citation count");
        with_retry(self.retry, || self.get_once(url)).await
    }
}
