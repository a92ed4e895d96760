//! JSON output formatter for machine processing
//!
//! Shape: `{ mode, plan, skipped, installs, errors }`

use crate::installer::InstallResult;
use crate::orchestrator::OrchestratorResult;
use crate::output::OutputFormatter;
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
#[derive(Debug, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self
    }
}

/// JSON representation of the full report
#[derive(Serialize)]
struct JsonOutput<'a> {
    /// Run mode
    mode: String,
    /// Planned updates in order
    plan: Vec<JsonTarget<'a>>,
    /// Skipped binaries in order
    skipped: Vec<JsonSkip<'a>>,
    /// Install results in plan order
    installs: &'a [InstallResult],
    /// Run-level errors
    errors: Vec<String>,
}

/// JSON representation of a planned update
#[derive(Serialize)]
struct JsonTarget<'a> {
    /// Package path
    package: &'a str,
    /// Module path
    module: &'a str,
    /// Local version
    from: &'a str,
    /// Target version
    to: String,
}

/// JSON representation of a skip
#[derive(Serialize)]
struct JsonSkip<'a> {
    /// Package path or file path
    name: &'a str,
    /// Skip reason
    reason: String,
    /// Whether the skip was caused by an error
    error: bool,
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let plan = result
            .plan
            .targets()
            .map(|t| JsonTarget {
                package: &t.package,
                module: &t.module,
                from: &t.local_version,
                to: t.target.to_string(),
            })
            .collect();

        let skipped = result
            .plan
            .skips()
            .filter_map(|r| {
                r.skip_reason().map(|reason| JsonSkip {
                    name: r.subject(),
                    reason: reason.to_string(),
                    error: reason.is_error(),
                })
            })
            .collect();

        let output = JsonOutput {
            mode: result.plan.mode.to_string(),
            plan,
            skipped,
            installs: &result.installs,
            errors: result.errors.iter().map(|e| e.to_string()).collect(),
        };

        serde_json::to_writer_pretty(&mut *writer, &output)?;
        writeln!(writer)
    }
}
