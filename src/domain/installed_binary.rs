//! Installed binary information read from embedded build metadata

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Version recorded for binaries built outside of module mode
pub const DEVEL_VERSION: &str = "(devel)";

/// A binary found on disk together with its build metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledBinary {
    /// Install path on disk
    pub path: PathBuf,
    /// Main package path (what `go install` builds)
    pub package: String,
    /// Module the main package belongs to (what the proxy is queried for)
    pub module: String,
    /// Module version as embedded at build time
    pub version: String,
    /// Toolchain that built the binary (e.g., "go1.22.5")
    pub go_version: String,
}

impl InstalledBinary {
    /// Create a new InstalledBinary
    pub fn new(
        path: impl Into<PathBuf>,
        package: impl Into<String>,
        module: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            package: package.into(),
            module: module.into(),
            version: version.into(),
            go_version: String::new(),
        }
    }

    /// Set the toolchain version
    pub fn with_go_version(mut self, go_version: impl Into<String>) -> Self {
        self.go_version = go_version.into();
        self
    }

    /// File name of the binary, falling back to the package path
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.package.clone())
    }
}
