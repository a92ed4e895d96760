//! Per-binary planning results

use super::UpdateTarget;
use serde::Serialize;
use std::fmt;

/// Why a binary is considered up to date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpToDateReason {
    /// Local and remote versions are equal
    SameVersion,
    /// The proxy has no version for the module
    NoRemoteVersion,
    /// The local version is newer than anything the proxy lists
    LocalAhead,
    /// Local and remote are a pseudo-version and a release
    Incomparable,
}

impl fmt::Display for UpToDateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpToDateReason::SameVersion => write!(f, "up to date"),
            UpToDateReason::NoRemoteVersion => write!(f, "no remote version found"),
            UpToDateReason::LocalAhead => write!(f, "newer than remote"),
            UpToDateReason::Incomparable => write!(f, "pseudo-version not comparable to release"),
        }
    }
}

/// Reason why a binary was left out of the plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No upgrade needed
    UpToDate(UpToDateReason),
    /// The local version could not be parsed
    ParseError(String),
    /// The proxy could not be reached or answered garbage
    FetchFailed(String),
    /// The file has no usable build metadata
    MetadataUnreadable(String),
}

impl SkipReason {
    /// Returns true for skips caused by an error rather than a decision
    pub fn is_error(&self) -> bool {
        !matches!(self, SkipReason::UpToDate(_))
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UpToDate(reason) => write!(f, "{}", reason),
            SkipReason::ParseError(msg) => write!(f, "parse error: {}", msg),
            SkipReason::FetchFailed(msg) => write!(f, "fetch failed: {}", msg),
            SkipReason::MetadataUnreadable(msg) => write!(f, "unreadable: {}", msg),
        }
    }
}

/// Result of planning a single binary or specifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpdateResult {
    /// The binary will be (re)installed
    Planned {
        /// What to install
        target: UpdateTarget,
    },
    /// The binary was left alone
    Skipped {
        /// Package path, or the file path when no metadata could be read
        subject: String,
        /// The reason for skipping
        reason: SkipReason,
    },
}

impl UpdateResult {
    /// Creates a Planned result
    pub fn planned(target: UpdateTarget) -> Self {
        UpdateResult::Planned { target }
    }

    /// Creates a Skipped result
    pub fn skip(subject: impl Into<String>, reason: SkipReason) -> Self {
        UpdateResult::Skipped {
            subject: subject.into(),
            reason,
        }
    }

    /// Returns true if this is a planned result
    pub fn is_planned(&self) -> bool {
        matches!(self, UpdateResult::Planned { .. })
    }

    /// Returns true if this is a skip result
    pub fn is_skip(&self) -> bool {
        matches!(self, UpdateResult::Skipped { .. })
    }

    /// Returns the planned target, if any
    pub fn target(&self) -> Option<&UpdateTarget> {
        match self {
            UpdateResult::Planned { target } => Some(target),
            UpdateResult::Skipped { .. } => None,
        }
    }

    /// Returns the skip reason, if any
    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            UpdateResult::Planned { .. } => None,
            UpdateResult::Skipped { reason, .. } => Some(reason),
        }
    }

    /// Returns the package path or skipped subject
    pub fn subject(&self) -> &str {
        match self {
            UpdateResult::Planned { target } => &target.package,
            UpdateResult::Skipped { subject, .. } => subject,
        }
    }
}

impl fmt::Display for UpdateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateResult::Planned { target } => write!(f, "{}", target),
            UpdateResult::Skipped { subject, reason } => {
                write!(f, "{}: skipped ({})", subject, reason)
            }
        }
    }
}
