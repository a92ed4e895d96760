//! Output formatting for run reports
//!
//! This module provides:
//! - Text output for human-readable display
//! - JSON output for machine processing

mod json;
mod text;

pub use json::JsonFormatter;
pub use text::{TextFormatter, VersionChangeType};

use crate::config::Config;
use crate::domain::Mode;
use crate::orchestrator::OrchestratorResult;
use std::io::Write;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for machine processing
    Json,
}

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Failures only
    Quiet,
    /// Normal output
    #[default]
    Normal,
    /// Also list skipped binaries
    Verbose,
}

/// Configuration for output formatting
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Output format (text, json)
    pub format: OutputFormat,
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Run mode the report belongs to
    pub mode: Mode,
    /// Whether to use colors (when supported)
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            verbosity: Verbosity::default(),
            mode: Mode::default(),
            color: true,
        }
    }
}

impl OutputConfig {
    /// Presentation settings of a resolved run configuration
    pub fn from_config(config: &Config) -> Self {
        let format = if config.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        };

        // Quiet wins; clap already rejects the two together
        let verbosity = match (config.quiet, config.verbose) {
            (true, _) => Verbosity::Quiet,
            (false, true) => Verbosity::Verbose,
            (false, false) => Verbosity::Normal,
        };

        Self {
            format,
            verbosity,
            mode: config.mode,
            color: true,
        }
    }

    /// Set whether colors are used
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format and write the run report
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()>;
}

/// Create an output formatter based on configuration
pub fn create_formatter(config: OutputConfig) -> Box<dyn OutputFormatter> {
    match config.format {
        OutputFormat::Text => Box::new(TextFormatter::with_color(
            config.verbosity,
            config.mode,
            config.color,
        )),
        OutputFormat::Json => Box::new(JsonFormatter::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CliArgs;
    use crate::config::{Env, FileConfig};
    use clap::Parser;

    fn output_config(argv: &[&str]) -> OutputConfig {
        let mut full = vec!["binup", "-p", "/tmp/bin"];
        full.extend_from_slice(argv);
        let config =
            Config::from_parts(&CliArgs::parse_from(full), FileConfig::default(), &Env::default())
                .unwrap();
        OutputConfig::from_config(&config)
    }

    #[test]
    fn test_output_config_default() {
        let config = OutputConfig::default();
        assert_eq!(config.format, OutputFormat::Text);
        assert_eq!(config.verbosity, Verbosity::Normal);
        assert_eq!(config.mode, Mode::Normal);
        assert!(config.color);
    }

    #[test]
    fn test_output_config_json_dry_run() {
        let config = output_config(&["--json", "-d"]);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.mode, Mode::DryRun);
    }

    #[test]
    fn test_output_config_verbosity() {
        assert_eq!(output_config(&["-v"]).verbosity, Verbosity::Verbose);
        assert_eq!(output_config(&["-q"]).verbosity, Verbosity::Quiet);
        assert_eq!(output_config(&["-r"]).mode, Mode::ReinstallAll);
    }

    #[test]
    fn test_with_color() {
        let config = OutputConfig::default().with_color(false);
        assert!(!config.color);
    }
}
