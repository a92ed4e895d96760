//! Application error types using thiserror
//!
//! Error hierarchy:
//! - VersionError: Malformed version strings
//! - RegistryError: Issues with module proxy communication
//! - BuildInfoError: Binaries without usable embedded build metadata
//! - ConfigError: Issues with configuration (the only run-aborting class)
//! - IoError: File system operation failures

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Version parsing errors
    #[error(transparent)]
    Version(#[from] VersionError),

    /// Module proxy related errors
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors related to version strings
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// The string has no recognizable released or pseudo shape
    #[error("invalid version '{raw}': {message}")]
    Parse { raw: String, message: String },
}

/// Errors related to module proxy communication
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The proxy has no applicable version for the module
    #[error("module '{module}' has no version on {registry}")]
    ModuleNotFound { module: String, registry: String },

    /// Network request failed
    #[error("failed to fetch module '{module}' from {registry}: {message}")]
    NetworkError {
        module: String,
        registry: String,
        message: String,
    },

    /// Invalid response from the proxy
    #[error("invalid response from {registry} for '{module}': {message}")]
    InvalidResponse {
        module: String,
        registry: String,
        message: String,
    },

    /// Timeout
    #[error("timeout while fetching '{module}' from {registry}")]
    Timeout { module: String, registry: String },
}

/// Errors related to reading embedded build metadata
#[derive(Error, Debug)]
pub enum BuildInfoError {
    /// Failed to read the file
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No build info header in the file
    #[error("{path} is not a Go binary with build info")]
    NotGoBinary { path: PathBuf },

    /// Header written by a toolchain older than Go 1.18
    #[error("{path} uses an unsupported build info format")]
    UnsupportedFormat { path: PathBuf },

    /// Header found but module info is missing or malformed
    #[error("{path} has no module information: {message}")]
    MissingModuleInfo { path: PathBuf, message: String },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No binary directory could be resolved
    #[error("no binary directory found: set GOBIN, GOPATH or pass --gobin")]
    NoBinaryDirectory,

    /// Failed to read or parse the config file
    #[error("invalid config file {path}: {message}")]
    InvalidConfigFile { path: PathBuf, message: String },

    /// Invalid proxy URL
    #[error("invalid proxy URL '{value}': expected an http or https URL")]
    InvalidProxyUrl { value: String },

    /// Failed to expand a path
    #[error("invalid path '{path}': {message}")]
    InvalidPath { path: String, message: String },

    /// Conflicting options
    #[error("conflicting options: {message}")]
    ConflictingOptions { message: String },
}

/// Errors related to IO operations
#[derive(Error, Debug)]
pub enum IoError {
    /// Directory not found
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Permission denied
    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Generic IO error
    #[error("IO error at {path}: {source}")]
    Generic {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl VersionError {
    /// Creates a new Parse error
    pub fn parse(raw: impl Into<String>, message: impl Into<String>) -> Self {
        VersionError::Parse {
            raw: raw.into(),
            message: message.into(),
        }
    }
}

impl RegistryError {
    /// Creates a new ModuleNotFound error
    pub fn module_not_found(module: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::ModuleNotFound {
            module: module.into(),
            registry: registry.into(),
        }
    }

    /// Creates a new NetworkError
    pub fn network_error(
        module: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::NetworkError {
            module: module.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidResponse error
    pub fn invalid_response(
        module: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::InvalidResponse {
            module: module.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(module: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::Timeout {
            module: module.into(),
            registry: registry.into(),
        }
    }

    /// Returns true when the proxy reported that no version exists
    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::ModuleNotFound { .. })
    }
}

impl IoError {
    /// Creates an IoError from a std::io::Error, keeping the common kinds distinct
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => IoError::DirectoryNotFound { path },
            std::io::ErrorKind::PermissionDenied => IoError::PermissionDenied { path },
            _ => IoError::Generic { path, source },
        }
    }

    /// Path the error concerns
    pub fn path(&self) -> &std::path::Path {
        match self {
            IoError::DirectoryNotFound { path }
            | IoError::PermissionDenied { path }
            | IoError::Generic { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_error_parse() {
        let err = VersionError::parse("(devel)", "missing major.minor.patch");
        let msg = err.to_string();
        assert!(msg.contains("invalid version '(devel)'"));
        assert!(msg.contains("missing major.minor.patch"));
    }

    #[test]
    fn test_registry_error_not_found() {
        let err = RegistryError::module_not_found("example.com/tool", "Go Proxy");
        assert!(err.is_not_found());
        assert!(err.to_string().contains("example.com/tool"));
    }

    #[test]
    fn test_registry_error_network_is_not_not_found() {
        let err = RegistryError::network_error("example.com/tool", "Go Proxy", "HTTP 502");
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("HTTP 502"));

        let err = RegistryError::timeout("example.com/tool", "Go Proxy");
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_build_info_error_display() {
        let err = BuildInfoError::NotGoBinary {
            path: PathBuf::from("/bin/ls"),
        };
        assert!(err.to_string().contains("not a Go binary"));
    }

    #[test]
    fn test_config_error_no_bin_dir() {
        let msg = ConfigError::NoBinaryDirectory.to_string();
        assert!(msg.contains("GOBIN"));
    }

    #[test]
    fn test_io_error_from_io_kinds() {
        let err = IoError::from_io(
            "/missing",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, IoError::DirectoryNotFound { .. }));

        let err = IoError::from_io(
            "/root",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope"),
        );
        assert!(matches!(err, IoError::PermissionDenied { .. }));

        let err = IoError::from_io("/x", std::io::Error::other("boom"));
        assert!(err.to_string().contains("IO error at /x"));
    }

    #[test]
    fn test_app_error_from_registry_error() {
        let app_err: AppError = RegistryError::module_not_found("m", "Go Proxy").into();
        assert!(app_err.to_string().contains("module 'm'"));
    }

    #[test]
    fn test_app_error_from_config_error() {
        let app_err: AppError = ConfigError::InvalidProxyUrl {
            value: "ftp://x".to_string(),
        }
        .into();
        assert!(app_err.to_string().contains("ftp://x"));
    }
}
