//! Update judgment logic for installed binaries
//!
//! The judge compares a local version against what the proxy offers. It takes
//! at most two steps:
//! 1. compare against the proxy's latest version;
//! 2. if there is no latest version, or the local version is ahead of it or
//!    cannot be ordered against it, compare once against the newest entry of
//!    the full version list.
//!
//! The second step is always conclusive, so a decision never needs a third.

use crate::domain::{UpToDateReason, Version};
use crate::error::{AppError, RegistryError};
use crate::registry::VersionResolver;
use std::cmp::Ordering;

/// Maximum number of comparison steps per decision
pub const MAX_STEPS: u8 = 2;

/// What the judge decided for one binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A newer version exists
    UpgradeAvailable {
        /// The version to install
        target: Version,
    },
    /// Nothing to do
    UpToDate(UpToDateReason),
}

/// An outcome together with the number of steps it took
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// The outcome
    pub outcome: Outcome,
    /// Comparison steps taken (1 or 2)
    pub steps: u8,
}

impl Decision {
    fn new(outcome: Outcome, steps: u8) -> Self {
        Self { outcome, steps }
    }

    /// Returns the upgrade target, if any
    pub fn target(&self) -> Option<&Version> {
        match &self.outcome {
            Outcome::UpgradeAvailable { target } => Some(target),
            Outcome::UpToDate(_) => None,
        }
    }
}

/// Update judgment engine that decides whether a binary should be upgraded
pub struct UpdateJudge<'a> {
    resolver: &'a dyn VersionResolver,
}

impl<'a> UpdateJudge<'a> {
    /// Create a new UpdateJudge querying the given resolver
    pub fn new(resolver: &'a dyn VersionResolver) -> Self {
        Self { resolver }
    }

    /// Parse the local version, fetch the proxy's latest version and decide.
    ///
    /// A proxy that has no latest version is not an error: the decision then
    /// starts directly with the version list.
    pub async fn check(&self, module: &str, local_raw: &str) -> Result<Decision, AppError> {
        let local = Version::parse(local_raw)?;

        let latest = match self.resolver.fetch_latest_released(module).await {
            Ok(version) => Some(version),
            Err(e) if e.is_not_found() => {
                tracing::debug!("{}: no latest version, probing version list", module);
                None
            }
            Err(e) => return Err(e.into()),
        };

        Ok(self.decide(module, &local, latest).await?)
    }

    /// Decide between the local version and the proxy's latest version.
    ///
    /// `remote_released` of `None` goes straight to the version list.
    pub async fn decide(
        &self,
        module: &str,
        local: &Version,
        remote_released: Option<Version>,
    ) -> Result<Decision, RegistryError> {
        match remote_released {
            Some(remote) => match judge_primary(local, remote) {
                Some(outcome) => Ok(Decision::new(outcome, 1)),
                None => {
                    tracing::debug!("{}: {} is ahead of latest, probing version list", module, local);
                    let outcome = self.probe(module, local).await?;
                    Ok(Decision::new(outcome, MAX_STEPS))
                }
            },
            None => {
                let outcome = self.probe(module, local).await?;
                Ok(Decision::new(outcome, 1))
            }
        }
    }

    async fn probe(
        &self,
        module: &str,
        local: &Version,
    ) -> Result<Outcome, RegistryError> {
        match self.resolver.fetch_most_recent_from_list(module).await {
            Ok(remote) => Ok(judge_probe(local, remote)),
            Err(e) if e.is_not_found() => Ok(Outcome::UpToDate(UpToDateReason::NoRemoteVersion)),
            Err(e) => Err(e),
        }
    }
}

/// First step. `None` means the version list has to be consulted.
fn judge_primary(local: &Version, remote: Version) -> Option<Outcome> {
    match local.compare(&remote) {
        Some(Ordering::Less) => Some(Outcome::UpgradeAvailable { target: remote }),
        Some(Ordering::Equal) => Some(Outcome::UpToDate(UpToDateReason::SameVersion)),
        Some(Ordering::Greater) | None => None,
    }
}

/// Second step, always conclusive.
fn judge_probe(local: &Version, remote: Version) -> Outcome {
    match local.compare(&remote) {
        Some(Ordering::Less) => Outcome::UpgradeAvailable { target: remote },
        Some(Ordering::Equal) => Outcome::UpToDate(UpToDateReason::SameVersion),
        Some(Ordering::Greater) => Outcome::UpToDate(UpToDateReason::LocalAhead),
        None => Outcome::UpToDate(UpToDateReason::Incomparable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::VersionList;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    /// Resolver answering from fixed data and counting list lookups
    struct StubResolver {
        latest: Option<&'static str>,
        list: &'static str,
        list_calls: AtomicUsize,
        fail_list: bool,
    }

    impl StubResolver {
        fn new(latest: Option<&'static str>, list: &'static str) -> Self {
            Self {
                latest,
                list,
                list_calls: AtomicUsize::new(0),
                fail_list: false,
            }
        }

        fn failing_list(mut self) -> Self {
            self.fail_list = true;
            self
        }

        fn list_calls(&self) -> usize {
            self.list_calls.load(AtomicOrdering::SeqCst)
        }
    }

    #[async_trait]
    impl VersionResolver for StubResolver {
        fn registry_name(&self) -> &'static str {
            "stub"
        }

        async fn fetch_latest_released(&self, module: &str) -> Result<Version, RegistryError> {
            match self.latest {
                Some(v) => Ok(Version::parse(v).unwrap()),
                None => Err(RegistryError::module_not_found(module, "stub")),
            }
        }

        async fn fetch_version_list(&self, module: &str) -> Result<VersionList, RegistryError> {
            self.list_calls.fetch_add(1, AtomicOrdering::SeqCst);
            if self.fail_list {
                return Err(RegistryError::timeout(module, "stub"));
            }
            Ok(VersionList::parse(self.list))
        }
    }

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_decide_upgrade_available() {
        let resolver = StubResolver::new(None, "");
        let judge = UpdateJudge::new(&resolver);

        let decision = judge
            .decide("example.com/tool", &v("v1.2.0"), Some(v("v1.3.0")))
            .await
            .unwrap();
        assert_eq!(decision.target().unwrap().to_string(), "v1.3.0");
        assert_eq!(decision.steps, 1);
        assert_eq!(resolver.list_calls(), 0);
    }

    #[tokio::test]
    async fn test_decide_up_to_date() {
        let resolver = StubResolver::new(None, "");
        let judge = UpdateJudge::new(&resolver);

        let decision = judge
            .decide("example.com/tool", &v("v1.3.0"), Some(v("v1.3.0")))
            .await
            .unwrap();
        assert_eq!(decision.outcome, Outcome::UpToDate(UpToDateReason::SameVersion));
        assert_eq!(resolver.list_calls(), 0);
    }

    #[tokio::test]
    async fn test_decide_probe_finds_local_itself() {
        let resolver = StubResolver::new(None, "v1.3.0\nv1.4.0-rc.1\n");
        let judge = UpdateJudge::new(&resolver);

        let decision = judge
            .decide("example.com/tool", &v("v1.4.0-rc.1"), None)
            .await
            .unwrap();
        assert_eq!(decision.outcome, Outcome::UpToDate(UpToDateReason::SameVersion));
        assert_eq!(decision.steps, 1);
        assert_eq!(resolver.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_decide_local_ahead_stops_after_two_steps() {
        // Every remote answer is older than the local build
        let resolver = StubResolver::new(Some("v1.0.0"), "v0.9.0\nv1.0.0\n");
        let judge = UpdateJudge::new(&resolver);

        let decision = judge
            .decide("example.com/tool", &v("v2.0.0"), Some(v("v1.0.0")))
            .await
            .unwrap();
        assert_eq!(decision.outcome, Outcome::UpToDate(UpToDateReason::LocalAhead));
        assert_eq!(decision.steps, MAX_STEPS);
        assert_eq!(resolver.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_decide_probe_finds_newer_prerelease() {
        let resolver = StubResolver::new(Some("v1.3.0"), "v1.3.0\nv1.4.0-rc.1\nv1.4.0-rc.2\n");
        let judge = UpdateJudge::new(&resolver);

        let decision = judge
            .decide("example.com/tool", &v("v1.4.0-rc.1"), Some(v("v1.3.0")))
            .await
            .unwrap();
        assert_eq!(decision.target().unwrap().to_string(), "v1.4.0-rc.2");
        assert_eq!(decision.steps, 2);
    }

    #[tokio::test]
    async fn test_decide_no_remote_version() {
        let resolver = StubResolver::new(None, "");
        let judge = UpdateJudge::new(&resolver);

        let decision = judge
            .decide("example.com/tool", &v("v1.0.0"), None)
            .await
            .unwrap();
        assert_eq!(decision.outcome, Outcome::UpToDate(UpToDateReason::NoRemoteVersion));
    }

    #[tokio::test]
    async fn test_decide_probe_network_error_is_error() {
        let resolver = StubResolver::new(None, "").failing_list();
        let judge = UpdateJudge::new(&resolver);

        let result = judge.decide("example.com/tool", &v("v1.0.0"), None).await;
        assert!(matches!(result, Err(RegistryError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_decide_pseudo_local_vs_released_latest() {
        // A pseudo build is never ordered against a release
        let resolver = StubResolver::new(Some("v1.2.3"), "v1.2.0\nv1.2.3\n");
        let judge = UpdateJudge::new(&resolver);

        let decision = judge
            .decide(
                "example.com/tool",
                &v("v1.2.4-0.20240506185415-9bf2ced13842"),
                Some(v("v1.2.3")),
            )
            .await
            .unwrap();
        assert_eq!(decision.outcome, Outcome::UpToDate(UpToDateReason::Incomparable));
        assert_eq!(decision.steps, 2);
    }

    #[tokio::test]
    async fn test_decide_pseudo_vs_newer_pseudo() {
        let resolver = StubResolver::new(None, "");
        let judge = UpdateJudge::new(&resolver);

        let decision = judge
            .decide(
                "example.com/tool",
                &v("v0.0.0-20240101000000-aaaaaaaaaaaa"),
                Some(v("v0.0.0-20240506185415-9bf2ced13842")),
            )
            .await
            .unwrap();
        assert_eq!(
            decision.target().unwrap().to_string(),
            "v0.0.0-20240506185415-9bf2ced13842"
        );
    }

    #[tokio::test]
    async fn test_check_without_latest_probes_list() {
        let resolver = StubResolver::new(None, "v1.0.0\nv1.1.0\n");
        let judge = UpdateJudge::new(&resolver);

        let decision = judge.check("example.com/tool", "v1.0.0").await.unwrap();
        assert_eq!(decision.target().unwrap().to_string(), "v1.1.0");
        assert_eq!(resolver.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_check_unparseable_local_version() {
        let resolver = StubResolver::new(Some("v1.0.0"), "");
        let judge = UpdateJudge::new(&resolver);

        let result = judge.check("example.com/tool", "(devel)").await;
        assert!(matches!(result, Err(AppError::Version(_))));
        assert_eq!(resolver.list_calls(), 0);
    }
}
