//! Update plan builder
//!
//! Turns candidates into one `UpdateResult` each, in order:
//! - explicit arguments: binary paths or bare `package[@version]` specifiers
//! - discovery: every regular file of the binary directories
//!
//! Binaries read from disk go through the update judge unless the mode is
//! `ReinstallAll`, which rebuilds them at their own version.

use crate::buildinfo::BuildInfoReader;
use crate::domain::{InstalledBinary, Mode, Plan, SkipReason, UpdateResult, UpdateTarget};
use crate::error::AppError;
use crate::registry::VersionResolver;
use crate::update::{Outcome, UpdateJudge};
use std::path::{Path, PathBuf};

/// Something that may end up in the plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// A binary on disk
    Binary(PathBuf),
    /// A bare `package[@version]` specifier
    Spec(String),
}

impl Candidate {
    /// Classify a command-line argument: existing files are binaries
    pub fn from_arg(arg: &str) -> Self {
        let path = Path::new(arg);
        if path.is_file() {
            Candidate::Binary(path.to_path_buf())
        } else {
            Candidate::Spec(arg.to_string())
        }
    }

    /// Classify all arguments, keeping their order
    pub fn from_args(args: &[String]) -> Vec<Self> {
        args.iter().map(|arg| Self::from_arg(arg)).collect()
    }

    /// Wrap discovered files
    pub fn from_paths(paths: impl IntoIterator<Item = PathBuf>) -> Vec<Self> {
        paths.into_iter().map(Candidate::Binary).collect()
    }

    /// Short label for progress output
    pub fn label(&self) -> String {
        match self {
            Candidate::Binary(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
            Candidate::Spec(spec) => spec.clone(),
        }
    }
}

/// Builds the update plan
pub struct PlanBuilder<'a> {
    resolver: &'a dyn VersionResolver,
    reader: &'a dyn BuildInfoReader,
    mode: Mode,
}

impl<'a> PlanBuilder<'a> {
    /// Create a new plan builder
    pub fn new(
        resolver: &'a dyn VersionResolver,
        reader: &'a dyn BuildInfoReader,
        mode: Mode,
    ) -> Self {
        Self {
            resolver,
            reader,
            mode,
        }
    }

    /// Plan every candidate in order
    pub async fn build(&self, candidates: &[Candidate]) -> Plan {
        self.build_with(candidates, |_, _| {}).await
    }

    /// Plan every candidate in order, calling `before_each` with the index
    /// and candidate about to be checked
    pub async fn build_with<F>(&self, candidates: &[Candidate], mut before_each: F) -> Plan
    where
        F: FnMut(usize, &Candidate),
    {
        let mut plan = Plan::new(self.mode);
        for (index, candidate) in candidates.iter().enumerate() {
            before_each(index, candidate);
            plan.add_result(self.plan_candidate(candidate).await);
        }
        plan
    }

    /// Plan a single candidate
    pub async fn plan_candidate(&self, candidate: &Candidate) -> UpdateResult {
        match candidate {
            Candidate::Spec(spec) => {
                let target = UpdateTarget::from_spec(spec);
                tracing::debug!("{} planned from specifier", target.install_spec());
                UpdateResult::planned(target)
            }
            Candidate::Binary(path) => match self.reader.read(path) {
                Ok(binary) => self.plan_binary(&binary).await,
                Err(e) => {
                    tracing::warn!("Failed to read build info: {}", e);
                    UpdateResult::skip(
                        path.display().to_string(),
                        SkipReason::MetadataUnreadable(e.to_string()),
                    )
                }
            },
        }
    }

    /// Plan a binary whose metadata has been read
    pub async fn plan_binary(&self, binary: &InstalledBinary) -> UpdateResult {
        if self.mode.is_reinstall() {
            return UpdateResult::planned(UpdateTarget::reinstall(binary));
        }

        let judge = UpdateJudge::new(self.resolver);
        match judge.check(&binary.module, &binary.version).await {
            Ok(decision) => match decision.outcome {
                Outcome::UpgradeAvailable { target } => {
                    tracing::debug!(
                        "{} can be updated: {} → {}",
                        binary.package,
                        binary.version,
                        target
                    );
                    UpdateResult::planned(UpdateTarget::upgrade(
                        binary,
                        target.to_display_string(),
                    ))
                }
                Outcome::UpToDate(reason) => {
                    tracing::debug!("{} ({}): {}", binary.package, binary.version, reason);
                    UpdateResult::skip(&binary.package, SkipReason::UpToDate(reason))
                }
            },
            Err(AppError::Version(e)) => {
                tracing::warn!("Skipping {}: {}", binary.display_name(), e);
                UpdateResult::skip(&binary.package, SkipReason::ParseError(e.to_string()))
            }
            Err(e) => {
                tracing::warn!("Skipping {}: {}", binary.display_name(), e);
                UpdateResult::skip(&binary.package, SkipReason::FetchFailed(e.to_string()))
            }
        }
    }
}
