//! Module version model
//!
//! Handles the two shapes a module version can take:
//! - Released (tagged) version: `v1.2.3`, `v1.2.3-rc.1`, `v2.0.0+incompatible`
//! - Pseudo-version synthesized from an untagged commit:
//!   `v0.0.0-20240506185415-9bf2ced13842`, `v1.2.4-0.20240506185415-9bf2ced13842`,
//!   `v1.2.3-pre.0.20240506185415-9bf2ced13842`
//!
//! Released versions are ordered by semantic precedence. Pseudo-versions are
//! ordered by their commit timestamp. The two kinds are never ordered against
//! each other.

use crate::error::VersionError;
use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

// vX.0.0-yyyymmddhhmmss-rev, vX.Y.Z-pre.0.yyyymmddhhmmss-rev, vX.Y.Z-0.yyyymmddhhmmss-rev
static PSEUDO_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\d+\.(?:0\.0-|\d+\.\d+-(?:[^+]*\.)?0\.)(\d{14})-([A-Za-z0-9]+)(?:\+[0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*)?$",
    )
    .unwrap()
});

/// A parsed, classified module version
#[derive(Debug, Clone)]
pub enum Version {
    /// Tagged release
    Released(semver::Version),
    /// Untagged build
    Pseudo(PseudoVersion),
}

/// Version synthesized from an untagged commit
#[derive(Debug, Clone)]
pub struct PseudoVersion {
    semver: semver::Version,
    sequence: u64,
    fingerprint: String,
}

impl PseudoVersion {
    /// Commit timestamp as an integer (yyyymmddhhmmss)
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Revision identifier of the commit
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

impl Version {
    /// Parse a version string. The leading `v` is optional.
    pub fn parse(raw: &str) -> Result<Self, VersionError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(VersionError::parse(raw, "empty version"));
        }

        let rest = trimmed.strip_prefix('v').unwrap_or(trimmed);
        if !rest.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(VersionError::parse(raw, "expected 'v' followed by a number"));
        }

        let semver = semver::Version::parse(rest)
            .map_err(|e| VersionError::parse(raw, e.to_string()))?;

        if let Some(caps) = PSEUDO_VERSION_RE.captures(rest) {
            let sequence = caps[1]
                .parse::<u64>()
                .map_err(|e| VersionError::parse(raw, e.to_string()))?;
            return Ok(Version::Pseudo(PseudoVersion {
                semver,
                sequence,
                fingerprint: caps[2].to_string(),
            }));
        }

        Ok(Version::Released(semver))
    }

    /// Returns true for versions synthesized from untagged commits
    pub fn is_pseudo(&self) -> bool {
        matches!(self, Version::Pseudo(_))
    }

    /// Compare two versions.
    ///
    /// Returns `None` when one side is a pseudo-version and the other a
    /// release: those have no defined order.
    pub fn compare(&self, other: &Version) -> Option<Ordering> {
        match (self, other) {
            (Version::Released(a), Version::Released(b)) => Some(precedence(a, b)),
            (Version::Pseudo(a), Version::Pseudo(b)) => Some(a.sequence.cmp(&b.sequence)),
            _ => None,
        }
    }

    /// Commit time of a pseudo-version
    pub fn commit_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Version::Pseudo(p) => {
                NaiveDateTime::parse_from_str(&format!("{:014}", p.sequence), "%Y%m%d%H%M%S")
                    .ok()
                    .map(|t| t.and_utc())
            }
            Version::Released(_) => None,
        }
    }

    /// Canonical printable form, always prefixed with `v`
    pub fn to_display_string(&self) -> String {
        self.to_string()
    }

    fn semver(&self) -> &semver::Version {
        match self {
            Version::Released(v) => v,
            Version::Pseudo(p) => &p.semver,
        }
    }
}

// Build metadata never takes part in ordering.
fn precedence(a: &semver::Version, b: &semver::Version) -> Ordering {
    (a.major, a.minor, a.patch)
        .cmp(&(b.major, b.minor, b.patch))
        .then_with(|| a.pre.cmp(&b.pre))
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.semver())
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}
