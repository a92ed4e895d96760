//! Installer integration for rebuilding planned binaries
//!
//! This module provides:
//! - The `InstallRunner` seam the run loop installs through
//! - `GoInstaller`, which runs `go install` for each target

use crate::domain::UpdateTarget;
use serde::Serialize;
use std::process::{Command, Stdio};

/// Default linker flags
pub const DEFAULT_LDFLAGS: &str = "-s -w";

/// Result of installing one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallResult {
    /// The `package@version` identifier that was installed
    pub spec: String,
    /// The command that was executed
    pub command: String,
    /// Whether the command succeeded
    pub success: bool,
    /// Standard error from the command, when it was captured
    pub stderr: String,
}

impl InstallResult {
    /// Create a successful install result
    pub fn success(spec: String, command: String) -> Self {
        Self {
            spec,
            command,
            success: true,
            stderr: String::new(),
        }
    }

    /// Create a failed install result
    pub fn failure(spec: String, command: String, stderr: String) -> Self {
        Self {
            spec,
            command,
            success: false,
            stderr,
        }
    }
}

/// Trait for running install commands
pub trait InstallRunner {
    /// Install a single target
    fn run_install(&self, target: &UpdateTarget) -> InstallResult;
}

/// Runs `go install` with the configured toolchain
#[derive(Debug, Clone)]
pub struct GoInstaller {
    go: String,
    ldflags: String,
    trimpath: bool,
    verbose: bool,
}

impl Default for GoInstaller {
    fn default() -> Self {
        Self {
            go: "go".to_string(),
            ldflags: DEFAULT_LDFLAGS.to_string(),
            trimpath: true,
            verbose: false,
        }
    }
}

impl GoInstaller {
    /// Create an installer using `go` from PATH with default flags
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the go executable
    pub fn with_go(mut self, go: impl Into<String>) -> Self {
        self.go = go.into();
        self
    }

    /// Set the linker flags; empty flags are not passed
    pub fn with_ldflags(mut self, ldflags: impl Into<String>) -> Self {
        self.ldflags = ldflags.into();
        self
    }

    /// Toggle `-trimpath`
    pub fn with_trimpath(mut self, trimpath: bool) -> Self {
        self.trimpath = trimpath;
        self
    }

    /// Stream the build output and pass `-v`
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Arguments passed to the go executable for a target
    pub fn install_args(&self, target: &UpdateTarget) -> Vec<String> {
        let mut args = vec!["install".to_string()];
        if !self.ldflags.is_empty() {
            args.push("-ldflags".to_string());
            args.push(self.ldflags.clone());
        }
        if self.trimpath {
            args.push("-trimpath".to_string());
        }
        if self.verbose {
            args.push("-v".to_string());
        }
        args.push(target.install_spec());
        args
    }

    fn command_line(&self, args: &[String]) -> String {
        let mut line = self.go.clone();
        for arg in args {
            line.push(' ');
            if arg.contains(' ') {
                line.push_str(&format!("\"{}\"", arg));
            } else {
                line.push_str(arg);
            }
        }
        line
    }
}

impl InstallRunner for GoInstaller {
    fn run_install(&self, target: &UpdateTarget) -> InstallResult {
        let spec = target.install_spec();
        let args = self.install_args(target);
        let command = self.command_line(&args);
        tracing::debug!("Running {}", command);

        if self.verbose {
            return match Command::new(&self.go).args(&args).status() {
                Ok(status) if status.success() => InstallResult::success(spec, command),
                Ok(status) => InstallResult::failure(spec, command, format!("exited with {}", status)),
                Err(e) => InstallResult::failure(
                    spec,
                    command,
                    format!("Failed to execute command: {}", e),
                ),
            };
        }

        let output = Command::new(&self.go)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output();

        match output {
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();
                if output.status.success() {
                    InstallResult::success(spec, command)
                } else {
                    InstallResult::failure(spec, command, stderr)
                }
            }
            Err(e) => InstallResult::failure(
                spec,
                command,
                format!("Failed to execute command: {}", e),
            ),
        }
    }
}

/// Install every target in order; a failure does not stop later targets.
///
/// `before_each` receives the index and target about to be installed.
pub fn run_installs<R, F>(runner: &R, targets: &[UpdateTarget], mut before_each: F) -> Vec<InstallResult>
where
    R: InstallRunner + ?Sized,
    F: FnMut(usize, &UpdateTarget),
{
    targets
        .iter()
        .enumerate()
        .map(|(index, target)| {
            before_each(index, target);
            let result = runner.run_install(target);
            if result.success {
                tracing::debug!("Installed {}", result.spec);
            } else {
                tracing::debug!("Failed to install {}: {}", result.spec, result.stderr);
            }
            result
        })
        .collect()
}
