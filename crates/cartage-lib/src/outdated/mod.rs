//! Outdated dependency report
//!
//! For every pin, compares the pinned version with the newest version the
//! root `Cartfile` allows and with the newest stable release overall.
//! Branch and reference pins compare against the reference's current tip.

use crate::cartfile::{Cartfile, Dependency, PinnedVersion, ResolvedCartfile, VersionSpecifier};
use crate::resolver::{ProviderError, RequirementProvider};
use futures::future::try_join_all;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Error)]
pub enum OutdatedError {
    #[error("Failed to check for updates: {source}")]
    Provider {
        #[from]
        source: ProviderError,
    },
}

/// A pin with newer versions available
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutdatedDependency {
    pub dependency: Dependency,
    pub current: PinnedVersion,
    /// Newest version the root specifier allows
    pub applicable: PinnedVersion,
    /// Newest stable version regardless of specifier
    pub latest: PinnedVersion,
}

impl fmt::Display for OutdatedDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} \"{}\" -> \"{}\" (Latest: \"{}\")",
            self.dependency, self.current, self.applicable, self.latest
        )
    }
}

pub struct OutdatedAnalyzer {
    provider: Arc<dyn RequirementProvider>,
}

impl OutdatedAnalyzer {
    pub fn new(provider: Arc<dyn RequirementProvider>) -> Self {
        Self { provider }
    }

    /// Check every pin in `resolved`, returning outdated ones in name order
    pub async fn analyze(
        &self,
        cartfile: &Cartfile,
        resolved: &ResolvedCartfile,
    ) -> Result<Vec<OutdatedDependency>, OutdatedError> {
        let checks = resolved.iter().map(|(dependency, current)| {
            let specifier = cartfile
                .specifier_for(dependency)
                .cloned()
                .unwrap_or(VersionSpecifier::Any);
            self.check(dependency, current, specifier)
        });

        let report: Vec<OutdatedDependency> =
            try_join_all(checks).await?.into_iter().flatten().collect();
        debug!(
            checked = resolved.len(),
            outdated = report.len(),
            "Outdated check complete"
        );
        Ok(report)
    }

    async fn check(
        &self,
        dependency: &Dependency,
        current: &PinnedVersion,
        specifier: VersionSpecifier,
    ) -> Result<Option<OutdatedDependency>, OutdatedError> {
        if let VersionSpecifier::GitReference(reference) = &specifier {
            return self.check_reference(dependency, current, reference).await;
        }

        let Some(pinned) = current.semantic() else {
            trace!(dependency = %dependency, pin = %current, "Skipping opaque pin");
            return Ok(None);
        };

        let versions = self.provider.versions(dependency).await?;
        let applicable = newest_matching(&versions, &specifier).unwrap_or_else(|| current.clone());
        let latest =
            newest_matching(&versions, &VersionSpecifier::Any).unwrap_or_else(|| current.clone());

        let is_newer = |candidate: &PinnedVersion| {
            candidate
                .semantic()
                .is_some_and(|version| version > pinned)
        };
        if !is_newer(&applicable) && !is_newer(&latest) {
            return Ok(None);
        }

        Ok(Some(OutdatedDependency {
            dependency: dependency.clone(),
            current: current.clone(),
            applicable,
            latest,
        }))
    }

    async fn check_reference(
        &self,
        dependency: &Dependency,
        current: &PinnedVersion,
        reference: &str,
    ) -> Result<Option<OutdatedDependency>, OutdatedError> {
        let tip = self.provider.resolve_reference(dependency, reference).await?;
        if tip == *current {
            trace!(dependency = %dependency, reference, "Reference pin is at tip");
            return Ok(None);
        }

        let versions = self.provider.versions(dependency).await?;
        let latest =
            newest_matching(&versions, &VersionSpecifier::Any).unwrap_or_else(|| tip.clone());

        Ok(Some(OutdatedDependency {
            dependency: dependency.clone(),
            current: current.clone(),
            applicable: tip,
            latest,
        }))
    }
}

/// First semantic version satisfying `specifier` in a newest-first list
fn newest_matching(versions: &[PinnedVersion], specifier: &VersionSpecifier) -> Option<PinnedVersion> {
    versions
        .iter()
        .filter(|version| version.is_semantic())
        .find(|version| specifier.is_satisfied_by(version))
        .cloned()
}

#[cfg(test)]
mod tests {
    include!("mod.test.rs");
}
