//! HTTP client shared foundation
//!
//! This module provides a shared HTTP client with:
//! - Configurable per-request timeout and User-Agent
//! - Mapping of transport failures onto RegistryError
//!
//! Requests are never retried: a failure is final for the module it concerns.

use crate::error::RegistryError;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default User-Agent header
const DEFAULT_USER_AGENT: &str = concat!("binup/", env!("CARGO_PKG_VERSION"));

/// HTTP client wrapper
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, RegistryError> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with a custom timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self, RegistryError> {
        Self::with_config(timeout, DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(timeout: Duration, user_agent: &str) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                RegistryError::network_error(
                    String::new(),
                    "HTTP client",
                    format!("failed to create HTTP client: {}", e),
                )
            })?;

        Ok(Self { client, timeout })
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Perform a GET request with error context
    pub async fn get_with_context(
        &self,
        url: &str,
        module: &str,
        registry: &str,
    ) -> Result<reqwest::Response, RegistryError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| transport_error(e, module, registry))?;

        let status = response.status();

        // The module proxy answers 404 or 410 for unknown modules and versions
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Err(RegistryError::module_not_found(module, registry));
        }

        if !status.is_success() {
            return Err(RegistryError::network_error(
                module,
                registry,
                format!("HTTP {}", status),
            ));
        }

        Ok(response)
    }

    /// Perform a GET request and parse the JSON response
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        module: &str,
        registry: &str,
    ) -> Result<T, RegistryError> {
        let body = self.get_text(url, module, registry).await?;
        serde_json::from_str(&body).map_err(|e| {
            RegistryError::invalid_response(module, registry, format!("failed to parse JSON: {}", e))
        })
    }

    /// Perform a GET request and get the text response
    pub async fn get_text(
        &self,
        url: &str,
        module: &str,
        registry: &str,
    ) -> Result<String, RegistryError> {
        let response = self.get_with_context(url, module, registry).await?;
        response.text().await.map_err(|e| {
            if e.is_timeout() {
                RegistryError::timeout(module, registry)
            } else {
                RegistryError::invalid_response(
                    module,
                    registry,
                    format!("failed to get text response: {}", e),
                )
            }
        })
    }
}

fn transport_error(e: reqwest::Error, module: &str, registry: &str) -> RegistryError {
    if e.is_timeout() {
        RegistryError::timeout(module, registry)
    } else {
        RegistryError::network_error(module, registry, e.to_string())
    }
}
