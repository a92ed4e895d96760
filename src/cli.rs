//! CLI argument parsing module for binup

use crate::domain::Mode;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Parse a timeout in whole seconds, rejecting zero
fn parse_timeout(s: &str) -> Result<u64, String> {
    let secs: u64 = s
        .trim()
        .parse()
        .map_err(|_| format!("invalid number of seconds: {}", s))?;
    if secs == 0 {
        return Err("timeout must be at least 1 second".to_string());
    }
    Ok(secs)
}

/// Update binaries installed with `go install`
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "binup",
    version,
    about = "Update binaries installed with `go install`"
)]
pub struct CliArgs {
    /// Binary paths or package[@version] specifiers (default: scan binary directories)
    pub targets: Vec<String>,

    // Mode options
    /// Dry run mode - only check for updates
    #[arg(short, long)]
    pub dry_run: bool,

    /// Reinstall every binary at its current version
    #[arg(short, long, conflicts_with = "dry_run")]
    pub reinstall: bool,

    // Location options
    /// Binary directory, may be a path list (overrides GOBIN and GOPATH)
    #[arg(short = 'p', long)]
    pub gobin: Option<String>,

    /// Module proxy base URL (default: first http(s) entry of GOPROXY)
    #[arg(long)]
    pub proxy: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, value_parser = parse_timeout)]
    pub timeout: Option<u64>,

    /// Config file (default: <config dir>/binup/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    // Build options
    /// Linker flags passed to go install
    #[arg(long, allow_hyphen_values = true)]
    pub ldflags: Option<String>,

    /// Pass -trimpath to go install
    #[arg(long, action = ArgAction::Set, value_name = "BOOL")]
    pub trimpath: Option<bool>,

    /// Go executable
    #[arg(long)]
    pub go: Option<String>,

    // Output options
    /// Stream install output, pass -v to go install and log debug details
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable quiet mode - errors only
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,
}

impl CliArgs {
    /// Run mode selected by the flags
    pub fn mode(&self) -> Mode {
        Mode::from_flags(self.dry_run, self.reinstall)
    }
}
