//! Progress display for binary checks and installs
//!
//! Draws on stderr through indicatif, which hides itself when stderr is not a
//! terminal.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TICKS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

fn spinner_style() -> Option<ProgressStyle> {
    ProgressStyle::default_spinner()
        .tick_chars(TICKS)
        .template("{spinner:.cyan} {msg}")
        .ok()
}

fn bar_style() -> Option<ProgressStyle> {
    ProgressStyle::default_bar()
        .template("{spinner:.cyan} {msg} [{bar:30.cyan/blue}] {pos}/{len}")
        .ok()
        .map(|style| style.tick_chars(TICKS).progress_chars("█▓▒░"))
}

/// Progress reporter for the run loop.
///
/// At most one indicator is live at a time; starting a new phase replaces it.
pub struct Progress {
    /// Off for quiet, verbose and JSON output
    enabled: bool,
    current: Option<ProgressBar>,
}

impl Progress {
    /// Create a new progress reporter
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            current: None,
        }
    }

    fn replace(&mut self, bar: ProgressBar, style: Option<ProgressStyle>, tick_ms: u64) {
        self.clear();
        if let Some(style) = style {
            bar.set_style(style);
        }
        bar.enable_steady_tick(Duration::from_millis(tick_ms));
        self.current = Some(bar);
    }

    /// Spinner while binary directories are listed
    pub fn scanning(&mut self) {
        if !self.enabled {
            return;
        }
        let bar = ProgressBar::new_spinner().with_message("Scanning binary directories...");
        self.replace(bar, spinner_style(), 80);
    }

    /// Bar over `total` candidates; nothing is drawn for an empty run
    pub fn begin_checks(&mut self, total: usize) {
        self.begin_bar(total, "Checking binaries");
    }

    /// Name the candidate at `index` being checked
    pub fn checking(&self, index: usize, label: &str) {
        self.step(index, format!("Checking {}", label));
    }

    /// Bar over `total` installs; nothing is drawn when there is nothing to install
    pub fn begin_installs(&mut self, total: usize) {
        self.begin_bar(total, "Installing");
    }

    /// Name the target at `index` while `go install` runs for it
    pub fn installing(&self, index: usize, spec: &str) {
        self.step(index, format!("Installing {}...", spec));
    }

    fn begin_bar(&mut self, total: usize, message: &'static str) {
        if !self.enabled || total == 0 {
            return;
        }
        let bar = ProgressBar::new(total as u64).with_message(message);
        self.replace(bar, bar_style(), 100);
    }

    fn step(&self, index: usize, message: String) {
        if let Some(bar) = &self.current {
            bar.set_position(index as u64);
            bar.set_message(message);
        }
    }

    /// Remove whatever indicator is showing
    pub fn clear(&mut self) {
        if let Some(bar) = self.current.take() {
            bar.finish_and_clear();
        }
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        self.clear();
    }
}
