//! Run orchestrator for the whole update workflow
//!
//! This module provides:
//! - Workflow coordination: collect candidates → plan → install
//! - Dry-run mode support (planning only)
//! - Error handling with partial continuation

use crate::buildinfo::{BuildInfoReader, GoBuildInfoReader};
use crate::config::Config;
use crate::discovery::list_binaries;
use crate::domain::{Plan, UpdateTarget};
use crate::error::{AppError, ConfigError};
use crate::installer::{run_installs, GoInstaller, InstallResult, InstallRunner};
use crate::planner::{Candidate, PlanBuilder};
use crate::progress::Progress;
use crate::registry::{GoProxyAdapter, HttpClient, VersionResolver};
use std::process::ExitCode;

/// Exit code for a clean run
pub const EXIT_SUCCESS: u8 = 0;
/// Exit code for configuration errors and failed installs
pub const EXIT_FAILURE: u8 = 1;
/// Exit code when some binaries were skipped because of errors
pub const EXIT_PARTIAL: u8 = 2;

/// Orchestrator for coordinating the update workflow
pub struct Orchestrator {
    config: Config,
    resolver: Box<dyn VersionResolver>,
    reader: Box<dyn BuildInfoReader>,
    installer: Box<dyn InstallRunner>,
}

/// Result of running the orchestrator
#[derive(Debug)]
pub struct OrchestratorResult {
    /// Planning results in candidate order
    pub plan: Plan,
    /// Install results in plan order, empty in dry-run mode
    pub installs: Vec<InstallResult>,
    /// Errors encountered outside of planning
    pub errors: Vec<OrchestratorError>,
}

impl OrchestratorResult {
    /// Returns the number of failed installs
    pub fn failed_installs(&self) -> usize {
        self.installs.iter().filter(|r| !r.success).count()
    }

    /// Process exit code for this run
    pub fn exit_code(&self) -> u8 {
        if self.failed_installs() > 0 {
            EXIT_FAILURE
        } else if self.plan.error_count() > 0 || !self.errors.is_empty() {
            EXIT_PARTIAL
        } else {
            EXIT_SUCCESS
        }
    }

    /// Exit code as an `ExitCode`
    pub fn process_exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_code())
    }
}

/// Errors that can occur during orchestration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    /// Failed to read a binary directory
    DirectoryError { path: String, message: String },
}

impl std::fmt::Display for OrchestratorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrchestratorError::DirectoryError { path, message } => {
                write!(f, "Failed to read {}: {}", path, message)
            }
        }
    }
}

impl std::error::Error for OrchestratorError {}

impl Orchestrator {
    /// Create an orchestrator talking to the configured proxy and toolchain
    pub fn new(config: Config) -> Result<Self, AppError> {
        let client = HttpClient::with_timeout(config.timeout)?;
        let resolver = GoProxyAdapter::with_base_url(client, config.proxy.clone());
        let installer = GoInstaller::new()
            .with_go(config.go.clone())
            .with_ldflags(config.ldflags.clone())
            .with_trimpath(config.trimpath)
            .with_verbose(config.verbose);

        Ok(Self::with_components(
            config,
            Box::new(resolver),
            Box::new(GoBuildInfoReader::new()),
            Box::new(installer),
        ))
    }

    /// Create an orchestrator with custom components (for testing)
    pub fn with_components(
        config: Config,
        resolver: Box<dyn VersionResolver>,
        reader: Box<dyn BuildInfoReader>,
        installer: Box<dyn InstallRunner>,
    ) -> Self {
        Self {
            config,
            resolver,
            reader,
            installer,
        }
    }

    /// Run the update workflow
    pub async fn run(&self) -> Result<OrchestratorResult, ConfigError> {
        let show_progress = !self.config.quiet && !self.config.json && !self.config.verbose;
        self.run_with_progress(show_progress).await
    }

    /// Run the update workflow with optional progress display
    pub async fn run_with_progress(
        &self,
        show_progress: bool,
    ) -> Result<OrchestratorResult, ConfigError> {
        let mut progress = Progress::new(show_progress);
        let mut errors = Vec::new();

        // Step 1: Collect candidates
        let candidates = if self.config.targets.is_empty() {
            let dirs = self.config.require_bin_dirs()?;
            progress.scanning();
            let listing = list_binaries(dirs);
            progress.clear();

            errors.extend(listing.errors.iter().map(|e| OrchestratorError::DirectoryError {
                path: e.path().display().to_string(),
                message: e.to_string(),
            }));
            Candidate::from_paths(listing.binaries)
        } else {
            Candidate::from_args(&self.config.targets)
        };

        // Step 2: Plan
        let builder = PlanBuilder::new(&*self.resolver, &*self.reader, self.config.mode);
        progress.begin_checks(candidates.len());
        let plan = builder
            .build_with(&candidates, |index, candidate| {
                progress.checking(index, &candidate.label())
            })
            .await;
        progress.clear();

        tracing::debug!(
            "{} of {} binaries planned ({})",
            plan.target_count(),
            plan.results.len(),
            self.config.mode
        );

        // Step 3: Install (unless dry-run)
        let installs = if self.config.mode.is_dry_run() {
            Vec::new()
        } else {
            let targets: Vec<UpdateTarget> = plan.targets().cloned().collect();
            progress.begin_installs(targets.len());
            let installs = run_installs(&*self.installer, &targets, |index, target| {
                progress.installing(index, &target.install_spec())
            });
            progress.clear();
            installs
        };

        Ok(OrchestratorResult {
            plan,
            installs,
            errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CliArgs;
    use crate::config::{Env, FileConfig};
    use crate::domain::{InstalledBinary, UpdateTarget, Version};
    use crate::error::{BuildInfoError, RegistryError};
    use crate::registry::VersionList;
    use async_trait::async_trait;
    use clap::Parser;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    struct FixedResolver(&'static str);

    #[async_trait]
    impl VersionResolver for FixedResolver {
        fn registry_name(&self) -> &'static str {
            "fixed"
        }

        async fn fetch_latest_released(&self, _module: &str) -> Result<Version, RegistryError> {
            Ok(Version::parse(self.0).unwrap())
        }

        async fn fetch_version_list(&self, _module: &str) -> Result<VersionList, RegistryError> {
            Ok(VersionList::parse(self.0))
        }
    }

    /// Every file is a binary of `example.com/<file name>` at v1.0.0
    struct NameReader;

    impl BuildInfoReader for NameReader {
        fn read(&self, path: &Path) -> Result<InstalledBinary, BuildInfoError> {
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            if name.starts_with("junk") {
                return Err(BuildInfoError::NotGoBinary {
                    path: path.to_path_buf(),
                });
            }
            let module = format!("example.com/{}", name);
            Ok(InstalledBinary::new(path, &module, &module, "v1.0.0"))
        }
    }

    struct RecordingInstaller {
        seen: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl InstallRunner for RecordingInstaller {
        fn run_install(&self, target: &UpdateTarget) -> InstallResult {
            let spec = target.install_spec();
            self.seen.lock().unwrap().push(spec.clone());
            if self.fail {
                InstallResult::failure(spec, "go install".to_string(), "boom".to_string())
            } else {
                InstallResult::success(spec, "go install".to_string())
            }
        }
    }

    fn config(argv: &[&str], bin_dir: &Path) -> Config {
        let mut full = vec!["binup", "-q", "-p"];
        let dir = bin_dir.display().to_string();
        full.push(&dir);
        full.extend_from_slice(argv);
        Config::from_parts(&CliArgs::parse_from(full), FileConfig::default(), &Env::default())
            .unwrap()
    }

    fn orchestrator(config: Config, fail: bool) -> (Orchestrator, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let installer = RecordingInstaller {
            seen: Arc::clone(&seen),
            fail,
        };
        let orchestrator = Orchestrator::with_components(
            config,
            Box::new(FixedResolver("v1.1.0")),
            Box::new(NameReader),
            Box::new(installer),
        );
        (orchestrator, seen)
    }

    fn bin_dir(names: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            std::fs::write(dir.path().join(name), b"bin").unwrap();
        }
        dir
    }

    #[tokio::test]
    async fn test_run_installs_planned_targets() {
        let dir = bin_dir(&["b", "a"]);
        let (orchestrator, seen) = orchestrator(config(&[], dir.path()), false);

        let result = orchestrator.run().await.unwrap();
        assert_eq!(result.plan.target_count(), 2);
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["example.com/a@v1.1.0", "example.com/b@v1.1.0"]
        );
        assert_eq!(result.exit_code(), EXIT_SUCCESS);
    }

    #[tokio::test]
    async fn test_dry_run_never_installs() {
        let dir = bin_dir(&["a"]);
        let (orchestrator, seen) = orchestrator(config(&["-d"], dir.path()), false);

        let result = orchestrator.run().await.unwrap();
        assert_eq!(result.plan.target_count(), 1);
        assert!(result.installs.is_empty());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_install_exit_code() {
        let dir = bin_dir(&["a", "b"]);
        let (orchestrator, seen) = orchestrator(config(&[], dir.path()), true);

        let result = orchestrator.run().await.unwrap();
        assert_eq!(seen.lock().unwrap().len(), 2);
        assert_eq!(result.failed_installs(), 2);
        // Failures are carried by the install results alone
        assert!(result.errors.is_empty());
        assert_eq!(result.exit_code(), EXIT_FAILURE);
    }

    #[tokio::test]
    async fn test_unreadable_binary_is_partial_success() {
        let dir = bin_dir(&["a", "junk.sh"]);
        let (orchestrator, _) = orchestrator(config(&[], dir.path()), false);

        let result = orchestrator.run().await.unwrap();
        assert_eq!(result.plan.results.len(), 2);
        assert_eq!(result.plan.error_count(), 1);
        assert_eq!(result.exit_code(), EXIT_PARTIAL);
    }

    #[tokio::test]
    async fn test_missing_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let (orchestrator, _) = orchestrator(config(&[], &missing), false);

        let result = orchestrator.run().await.unwrap();
        assert!(result.plan.results.is_empty());
        assert!(matches!(
            result.errors[0],
            OrchestratorError::DirectoryError { .. }
        ));
        assert_eq!(result.exit_code(), EXIT_PARTIAL);
    }

    #[tokio::test]
    async fn test_explicit_targets_skip_discovery() {
        let dir = bin_dir(&["a"]);
        let (orchestrator, seen) =
            orchestrator(config(&["example.com/tool@v2.0.0"], dir.path()), false);

        let result = orchestrator.run().await.unwrap();
        assert_eq!(result.plan.results.len(), 1);
        assert_eq!(*seen.lock().unwrap(), vec!["example.com/tool@v2.0.0"]);
    }

    #[tokio::test]
    async fn test_no_bin_dir_is_config_error() {
        let config = Config::from_parts(
            &CliArgs::parse_from(["binup", "-q"]),
            FileConfig::default(),
            &Env::default(),
        )
        .unwrap();
        let (orchestrator, _) = orchestrator(config, false);

        let result = orchestrator.run().await;
        assert!(matches!(result, Err(ConfigError::NoBinaryDirectory)));
    }
}
