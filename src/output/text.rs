//! Text output formatter for human-readable display
//!
//! This module provides:
//! - One line per planned binary with the kind of version change
//! - Skipped binaries with reasons (verbose mode)
//! - Install outcomes and a closing summary

use crate::domain::{Mode, Plan, UpdateResult, UpdateTarget, Version};
use crate::installer::InstallResult;
use crate::orchestrator::OrchestratorResult;
use crate::output::{OutputFormatter, Verbosity};
use colored::Colorize;
use std::io::Write;

/// Kind of version change between the local and the target version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionChangeType {
    /// Major version change (breaking)
    Major,
    /// Minor version change (features)
    Minor,
    /// Patch or pre-release change
    Patch,
    /// Newer commit of an untagged module
    Pseudo,
    /// Same version rebuilt
    Reinstall,
    /// Unknown or unparseable (e.g. `local` → `latest`)
    Unknown,
}

impl VersionChangeType {
    /// Determine the change type between two version strings
    pub fn from_versions(old: &str, new: &str) -> Self {
        let (Ok(old), Ok(new)) = (Version::parse(old), Version::parse(new)) else {
            return VersionChangeType::Unknown;
        };

        match (&old, &new) {
            (Version::Pseudo(_), Version::Pseudo(_)) if old != new => VersionChangeType::Pseudo,
            _ if old == new => VersionChangeType::Reinstall,
            (Version::Released(o), Version::Released(n)) => {
                if o.major != n.major {
                    VersionChangeType::Major
                } else if o.minor != n.minor {
                    VersionChangeType::Minor
                } else {
                    VersionChangeType::Patch
                }
            }
            _ => VersionChangeType::Unknown,
        }
    }

    /// Determine the change type of a planned target
    pub fn of_target(target: &UpdateTarget) -> Self {
        Self::from_versions(&target.local_version, &target.target.to_string())
    }

    /// Get the display label with color
    pub fn colored_label(&self) -> String {
        match self {
            VersionChangeType::Major => "major".red().bold().to_string(),
            VersionChangeType::Minor => "minor".yellow().to_string(),
            VersionChangeType::Patch => "patch".green().to_string(),
            VersionChangeType::Pseudo => "commit".cyan().to_string(),
            VersionChangeType::Reinstall => "rebuild".blue().to_string(),
            VersionChangeType::Unknown => "?".dimmed().to_string(),
        }
    }

    /// Get the plain label
    pub fn label(&self) -> &'static str {
        match self {
            VersionChangeType::Major => "major",
            VersionChangeType::Minor => "minor",
            VersionChangeType::Patch => "patch",
            VersionChangeType::Pseudo => "commit",
            VersionChangeType::Reinstall => "rebuild",
            VersionChangeType::Unknown => "?",
        }
    }
}

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Mode of the run
    mode: Mode,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity, mode: Mode) -> Self {
        Self::with_color(verbosity, mode, true)
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, mode: Mode, color: bool) -> Self {
        Self {
            verbosity,
            mode,
            color,
        }
    }

    /// Get the dry-run prefix if applicable
    fn dry_run_prefix(&self) -> String {
        if !self.mode.is_dry_run() {
            String::new()
        } else if self.color {
            format!("{} ", "(dry-run)".cyan())
        } else {
            "(dry-run) ".to_string()
        }
    }

    fn max_name_length(&self, plan: &Plan) -> usize {
        plan.results
            .iter()
            .map(|r| r.subject().len())
            .max()
            .unwrap_or(0)
    }

    fn format_target_line(
        &self,
        target: &UpdateTarget,
        width: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let change = VersionChangeType::of_target(target);
        let to = target.target.to_string();
        // Pseudo-versions carry their commit date
        let date = Version::parse(&to)
            .ok()
            .and_then(|v| v.commit_time())
            .map(|t| format!(" ({})", t.format("%Y/%m/%d %H:%M")))
            .unwrap_or_default();

        if self.color {
            let name = format!("{:width$}", target.package, width = width);
            writeln!(
                writer,
                "  {} {} {} {} [{}]{}",
                name,
                target.local_version.dimmed(),
                "→".dimmed(),
                to.bright_white().bold(),
                change.colored_label(),
                date.dimmed()
            )
        } else {
            writeln!(
                writer,
                "  {:width$} {} -> {} [{}]{}",
                target.package,
                target.local_version,
                to,
                change.label(),
                date,
                width = width
            )
        }
    }

    fn format_skip_line(
        &self,
        result: &UpdateResult,
        width: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let Some(reason) = result.skip_reason() else {
            return Ok(());
        };

        if self.color {
            let name = format!("{:width$}", result.subject(), width = width);
            let reason_display = format!("({})", reason);
            writeln!(writer, "  {} {}", name.dimmed(), reason_display.dimmed())
        } else {
            writeln!(
                writer,
                "  {:width$} ({})",
                result.subject(),
                reason,
                width = width
            )
        }
    }

    fn format_error_line(&self, line: &str, writer: &mut dyn Write) -> std::io::Result<()> {
        if self.color {
            writeln!(writer, "  {}", line.yellow())
        } else {
            writeln!(writer, "  {}", line)
        }
    }

    /// Run-level errors first, then error skips in plan order
    fn error_lines(result: &OrchestratorResult) -> Vec<String> {
        let run_errors = result.errors.iter().map(|e| e.to_string());
        let skips = result.plan.skips().filter_map(|r| {
            r.skip_reason()
                .filter(|reason| reason.is_error())
                .map(|reason| format!("{}: {}", r.subject(), reason))
        });
        run_errors.chain(skips).collect()
    }

    fn format_install_line(
        &self,
        install: &InstallResult,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if install.success {
            if self.color {
                writeln!(writer, "{} {}", "✓".green(), install.spec)
            } else {
                writeln!(writer, "ok     {}", install.spec)
            }
        } else {
            let detail = install.stderr.lines().last().unwrap_or("install failed");
            if self.color {
                writeln!(writer, "{} {}: {}", "✗".red(), install.spec.bold(), detail)
            } else {
                writeln!(writer, "failed {}: {}", install.spec, detail)
            }
        }
    }

    fn format_summary(
        &self,
        result: &OrchestratorResult,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let plan = &result.plan;
        let planned = plan.target_count();
        let errors = plan.error_count();
        let up_to_date = plan.skip_count() - errors;
        let verb = match self.mode {
            Mode::ReinstallAll => "to reinstall",
            _ => "to update",
        };

        let mut parts = Vec::new();
        if self.color {
            parts.push(format!("{} {}", planned.to_string().green().bold(), verb));
            parts.push(format!("{} up to date", up_to_date.to_string().dimmed()));
            if errors > 0 {
                parts.push(format!("{} skipped with errors", errors.to_string().yellow()));
            }
            if !result.installs.is_empty() {
                let failed = result.failed_installs();
                let installed = result.installs.len() - failed;
                parts.push(format!("{} installed", installed.to_string().green()));
                if failed > 0 {
                    parts.push(format!("{} failed", failed.to_string().red().bold()));
                }
            }
        } else {
            parts.push(format!("{} {}", planned, verb));
            parts.push(format!("{} up to date", up_to_date));
            if errors > 0 {
                parts.push(format!("{} skipped with errors", errors));
            }
            if !result.installs.is_empty() {
                let failed = result.failed_installs();
                parts.push(format!("{} installed", result.installs.len() - failed));
                if failed > 0 {
                    parts.push(format!("{} failed", failed));
                }
            }
        }

        writeln!(writer, "{}{}", self.dry_run_prefix(), parts.join(", "))?;

        if self.mode.is_dry_run() && planned > 0 {
            writeln!(writer, "Run without --dry-run to install.")?;
        }
        Ok(())
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        if self.verbosity == Verbosity::Quiet {
            for line in Self::error_lines(result) {
                self.format_error_line(&line, writer)?;
            }
            for install in result.installs.iter().filter(|i| !i.success) {
                self.format_install_line(install, writer)?;
            }
            return Ok(());
        }

        let plan = &result.plan;
        let width = self.max_name_length(plan).max(20);

        if plan.has_targets() {
            for target in plan.targets() {
                self.format_target_line(target, width, writer)?;
            }
            writeln!(writer)?;
        }

        let up_to_date: Vec<&UpdateResult> = plan
            .skips()
            .filter(|r| r.skip_reason().is_some_and(|reason| !reason.is_error()))
            .collect();
        if self.verbosity == Verbosity::Verbose && !up_to_date.is_empty() {
            if self.color {
                writeln!(writer, "  {}", "Skipped:".dimmed())?;
            } else {
                writeln!(writer, "  Skipped:")?;
            }
            for skip in up_to_date {
                self.format_skip_line(skip, width, writer)?;
            }
            writeln!(writer)?;
        }

        let errors = Self::error_lines(result);
        if !errors.is_empty() {
            if self.color {
                writeln!(writer, "{}", "Errors:".yellow().bold())?;
            } else {
                writeln!(writer, "Errors:")?;
            }
            for line in &errors {
                self.format_error_line(line, writer)?;
            }
            writeln!(writer)?;
        }

        if !result.installs.is_empty() {
            for install in &result.installs {
                self.format_install_line(install, writer)?;
            }
            writeln!(writer)?;
        }

        self.format_summary(result, writer)
    }
}
