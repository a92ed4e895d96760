//! Module proxy access for fetching version information
//!
//! This module provides:
//! - HTTP client shared foundation
//! - Go Module Proxy adapter
//! - The resolver trait the decision engine queries

mod client;
mod go_proxy;

pub use client::{HttpClient, DEFAULT_TIMEOUT};
pub use go_proxy::{GoProxyAdapter, GO_PROXY_URL};

use crate::domain::Version;
use crate::error::RegistryError;
use async_trait::async_trait;
use std::cmp::Ordering;

/// Versions listed by the proxy for one module
#[derive(Debug, Clone, Default)]
pub struct VersionList {
    /// Versions that parsed, in listing order
    pub versions: Vec<Version>,
    /// Non-empty lines that did not parse as a version
    pub skipped: usize,
}

impl VersionList {
    /// Parse a newline separated version list, dropping unparseable lines
    pub fn parse(body: &str) -> Self {
        let mut list = VersionList::default();
        for line in body.lines().map(str::trim).filter(|l| !l.is_empty()) {
            match Version::parse(line) {
                Ok(version) => list.versions.push(version),
                Err(_) => list.skipped += 1,
            }
        }
        list
    }

    /// The newest listed version.
    ///
    /// Released versions win over pseudo-versions since the two kinds have no
    /// order between them; pseudo-versions are only considered when nothing
    /// was released.
    pub fn most_recent(&self) -> Option<&Version> {
        let released = self.versions.iter().filter(|v| !v.is_pseudo());
        max_version(released)
            .or_else(|| max_version(self.versions.iter().filter(|v| v.is_pseudo())))
    }

    /// Returns true if no version parsed
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

fn max_version<'a>(versions: impl Iterator<Item = &'a Version>) -> Option<&'a Version> {
    versions.fold(None, |best, v| match best {
        Some(b) if b.compare(v) != Some(Ordering::Less) => Some(b),
        _ => Some(v),
    })
}

/// Source of remote version information
#[async_trait]
pub trait VersionResolver: Send + Sync {
    /// Get the registry name
    fn registry_name(&self) -> &'static str;

    /// Fetch the version the proxy reports as latest.
    ///
    /// Fails with `ModuleNotFound` when the proxy has no such version.
    async fn fetch_latest_released(&self, module: &str) -> Result<Version, RegistryError>;

    /// Fetch the full version list
    async fn fetch_version_list(&self, module: &str) -> Result<VersionList, RegistryError>;

    /// Fetch the newest entry of the full version list.
    ///
    /// Fails with `ModuleNotFound` when the list is empty or nothing parses.
    async fn fetch_most_recent_from_list(&self, module: &str) -> Result<Version, RegistryError> {
        let list = self.fetch_version_list(module).await?;
        if list.skipped > 0 {
            tracing::debug!(
                "{}: skipped {} unparseable line(s) in version list",
                module,
                list.skipped
            );
        }

        list.most_recent()
            .cloned()
            .ok_or_else(|| RegistryError::module_not_found(module, self.registry_name()))
    }
}
