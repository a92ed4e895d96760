//! Run mode passed explicitly through the plan builder and the run loop

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a run treats the binaries it finds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Check for updates and install the outdated binaries
    #[default]
    Normal,
    /// Check for updates only
    DryRun,
    /// Rebuild every binary at its current version
    ReinstallAll,
}

impl Mode {
    /// Build the mode from the two mutually exclusive CLI switches
    pub fn from_flags(dry_run: bool, reinstall: bool) -> Self {
        if reinstall {
            Mode::ReinstallAll
        } else if dry_run {
            Mode::DryRun
        } else {
            Mode::Normal
        }
    }

    /// Returns true if the installer must not be invoked
    pub fn is_dry_run(&self) -> bool {
        matches!(self, Mode::DryRun)
    }

    /// Returns true if version comparison is bypassed
    pub fn is_reinstall(&self) -> bool {
        matches!(self, Mode::ReinstallAll)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Normal => write!(f, "normal"),
            Mode::DryRun => write!(f, "dry-run"),
            Mode::ReinstallAll => write!(f, "reinstall"),
        }
    }
}
