//! Plan summary types
//!
//! Provides the ordered result list of one planning pass.

use super::{Mode, UpdateResult, UpdateTarget};
use serde::Serialize;

/// Ordered planning results for one run
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Plan {
    /// Mode the plan was built in
    pub mode: Mode,
    /// One result per candidate, in discovery or argument order
    pub results: Vec<UpdateResult>,
}

impl Plan {
    /// Creates an empty plan
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            results: Vec::new(),
        }
    }

    /// Adds a result
    pub fn add_result(&mut self, result: UpdateResult) {
        self.results.push(result);
    }

    /// Planned targets in order
    pub fn targets(&self) -> impl Iterator<Item = &UpdateTarget> {
        self.results.iter().filter_map(|r| r.target())
    }

    /// Skipped results in order
    pub fn skips(&self) -> impl Iterator<Item = &UpdateResult> {
        self.results.iter().filter(|r| r.is_skip())
    }

    /// Returns the number of planned targets
    pub fn target_count(&self) -> usize {
        self.targets().count()
    }

    /// Returns the number of skips
    pub fn skip_count(&self) -> usize {
        self.skips().count()
    }

    /// Returns the number of skips caused by errors
    pub fn error_count(&self) -> usize {
        self.results
            .iter()
            .filter_map(|r| r.skip_reason())
            .filter(|reason| reason.is_error())
            .count()
    }

    /// Returns true if anything is planned
    pub fn has_targets(&self) -> bool {
        self.target_count() > 0
    }
}
