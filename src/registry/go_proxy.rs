//! Go Module Proxy adapter
//!
//! Fetches module version information from a Go module proxy.
//! API endpoints:
//! - Latest version: https://proxy.golang.org/{module}/@latest
//! - List versions: https://proxy.golang.org/{module}/@v/list

use crate::domain::Version;
use crate::error::RegistryError;
use crate::registry::{HttpClient, VersionList, VersionResolver};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Go Module Proxy base URL
pub const GO_PROXY_URL: &str = "https://proxy.golang.org";

/// Go Module Proxy adapter
pub struct GoProxyAdapter {
    client: HttpClient,
    base_url: String,
}

/// `@latest` response
///
/// `{"Version":"v0.x.y","Time":"2024-05-06T18:54:15Z","Origin":{...}}`
#[derive(Debug, Deserialize)]
struct LatestResponse {
    /// Version string
    #[serde(rename = "Version", default)]
    version: Option<String>,
    /// Time when the version was created
    #[serde(rename = "Time", default)]
    time: Option<DateTime<Utc>>,
}

impl GoProxyAdapter {
    /// Create a new adapter for the public Go proxy
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, GO_PROXY_URL)
    }

    /// Create a new adapter for a custom proxy
    pub fn with_base_url(client: HttpClient, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Base URL of the proxy
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Proxy paths are case-normalized
    fn module_url(&self, module: &str) -> String {
        format!("{}/{}", self.base_url, module.to_lowercase())
    }

    /// Build the URL for the latest version
    fn build_latest_url(&self, module: &str) -> String {
        format!("{}/@latest", self.module_url(module))
    }

    /// Build the URL for listing versions
    fn build_list_url(&self, module: &str) -> String {
        format!("{}/@v/list", self.module_url(module))
    }
}

#[async_trait]
impl VersionResolver for GoProxyAdapter {
    fn registry_name(&self) -> &'static str {
        "Go Proxy"
    }

    async fn fetch_latest_released(&self, module: &str) -> Result<Version, RegistryError> {
        let url = self.build_latest_url(module);
        let latest: LatestResponse = self
            .client
            .get_json(&url, module, self.registry_name())
            .await?;

        let raw = match latest.version {
            Some(v) if !v.trim().is_empty() => v,
            _ => return Err(RegistryError::module_not_found(module, self.registry_name())),
        };

        let version = Version::parse(&raw).map_err(|e| {
            RegistryError::invalid_response(module, self.registry_name(), e.to_string())
        })?;

        if let Some(time) = latest.time {
            tracing::debug!("{} latest is {} ({})", module, version, time.format("%Y/%m/%d"));
        }

        Ok(version)
    }

    async fn fetch_version_list(&self, module: &str) -> Result<VersionList, RegistryError> {
        let url = self.build_list_url(module);
        let body = self
            .client
            .get_text(&url, module, self.registry_name())
            .await?;

        Ok(VersionList::parse(&body))
    }
}
