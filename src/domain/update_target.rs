//! Update targets produced by the plan builder and consumed by the installer

use crate::domain::InstalledBinary;
use serde::{Serialize, Serializer};
use std::fmt;

/// Token the installer resolves to the newest release on its own
pub const LATEST: &str = "latest";

/// Local version recorded for bare `package[@version]` specifiers
pub const LOCAL: &str = "local";

/// Version an update installs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetVersion {
    /// Whatever the proxy reports as latest at install time
    Latest,
    /// A fully resolved version string
    Exact(String),
}

impl TargetVersion {
    /// Build a target from the version part of a `package@version` specifier
    pub fn from_spec(spec: &str) -> Self {
        let spec = spec.trim();
        if spec.is_empty() || spec == LATEST {
            TargetVersion::Latest
        } else {
            TargetVersion::Exact(spec.to_string())
        }
    }
}

impl fmt::Display for TargetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetVersion::Latest => write!(f, "{}", LATEST),
            TargetVersion::Exact(v) => write!(f, "{}", v),
        }
    }
}

impl Serialize for TargetVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A single planned re-install
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateTarget {
    /// Package path handed to `go install`
    pub package: String,
    /// Module path
    pub module: String,
    /// Version to install
    pub target: TargetVersion,
    /// Version the update supersedes
    pub local_version: String,
}

impl UpdateTarget {
    /// Create a new UpdateTarget
    pub fn new(
        package: impl Into<String>,
        module: impl Into<String>,
        target: TargetVersion,
        local_version: impl Into<String>,
    ) -> Self {
        Self {
            package: package.into(),
            module: module.into(),
            target,
            local_version: local_version.into(),
        }
    }

    /// Upgrade an installed binary to the given version
    pub fn upgrade(binary: &InstalledBinary, target: impl Into<String>) -> Self {
        Self::new(
            &binary.package,
            &binary.module,
            TargetVersion::Exact(target.into()),
            &binary.version,
        )
    }

    /// Rebuild an installed binary at its current version
    pub fn reinstall(binary: &InstalledBinary) -> Self {
        Self::upgrade(binary, binary.version.clone())
    }

    /// Parse a bare `package[@version]` specifier
    pub fn from_spec(spec: &str) -> Self {
        let (package, version) = spec.split_once('@').unwrap_or((spec, ""));
        Self::new(package, package, TargetVersion::from_spec(version), LOCAL)
    }

    /// Fully qualified `package@version` identifier for the installer
    pub fn install_spec(&self) -> String {
        format!("{}@{}", self.package, self.target)
    }
}

impl fmt::Display for UpdateTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} → {}", self.package, self.local_version, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_binary() -> InstalledBinary {
        InstalledBinary::new(
            "/go/bin/gopls",
            "golang.org/x/tools/gopls",
            "golang.org/x/tools/gopls",
            "v0.15.0",
        )
    }

    #[test]
    fn test_target_version_from_spec() {
        assert_eq!(TargetVersion::from_spec(""), TargetVersion::Latest);
        assert_eq!(TargetVersion::from_spec("latest"), TargetVersion::Latest);
        assert_eq!(
            TargetVersion::from_spec("v1.2.3"),
            TargetVersion::Exact("v1.2.3".to_string())
        );
    }

    #[test]
    fn test_from_spec_without_version() {
        let target = UpdateTarget::from_spec("golang.org/dl/go1.22.5");
        assert_eq!(target.package, "golang.org/dl/go1.22.5");
        assert_eq!(target.target, TargetVersion::Latest);
        assert_eq!(target.local_version, LOCAL);
        assert_eq!(target.install_spec(), "golang.org/dl/go1.22.5@latest");
    }

    #[test]
    fn test_from_spec_with_empty_version() {
        let target = UpdateTarget::from_spec("example.com/tool@");
        assert_eq!(target.package, "example.com/tool");
        assert_eq!(target.target, TargetVersion::Latest);
    }

    #[test]
    fn test_from_spec_with_version() {
        let target = UpdateTarget::from_spec("example.com/tool@v1.2.3");
        assert_eq!(target.install_spec(), "example.com/tool@v1.2.3");
    }

    #[test]
    fn test_upgrade_and_reinstall() {
        let bin = sample_binary();
        let upgrade = UpdateTarget::upgrade(&bin, "v0.16.0");
        assert_eq!(upgrade.install_spec(), "golang.org/x/tools/gopls@v0.16.0");
        assert_eq!(upgrade.local_version, "v0.15.0");

        let reinstall = UpdateTarget::reinstall(&bin);
        assert_eq!(reinstall.target, TargetVersion::Exact("v0.15.0".to_string()));
    }

    #[test]
    fn test_display() {
        let target = UpdateTarget::upgrade(&sample_binary(), "v0.16.0");
        assert_eq!(target.to_string(), "golang.org/x/tools/gopls: v0.15.0 → v0.16.0");
    }

    #[test]
    fn test_serialize_target_as_string() {
        let target = UpdateTarget::from_spec("example.com/tool");
        let json = serde_json::to_string(&target).unwrap();
        assert!(json.contains("\"target\":\"latest\""));
    }
}
