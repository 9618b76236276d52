//! In-memory requirement provider

use crate::cartfile::{Dependency, PinnedVersion, VersionSpecifier, sort_descending};
use crate::resolver::{ProviderError, ProviderFuture, RequirementProvider, Requirements};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

/// A fixed database of versions, requirements and references
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    versions: HashMap<Dependency, Vec<PinnedVersion>>,
    requirements: HashMap<(Dependency, PinnedVersion), Requirements>,
    references: HashMap<(Dependency, String), PinnedVersion>,
    failing: HashSet<Dependency>,
    version_queries: AtomicUsize,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a tagged version with its requirements
    pub fn with_version(
        mut self,
        dependency: &Dependency,
        version: &str,
        requirements: Vec<(Dependency, VersionSpecifier)>,
    ) -> Self {
        let pinned = PinnedVersion::new(version);
        self.versions
            .entry(dependency.clone())
            .or_default()
            .push(pinned.clone());
        self.requirements.insert(
            (dependency.clone(), pinned),
            Requirements::new(requirements),
        );
        self
    }

    /// Publish a prebuilt version with no requirements of its own
    pub fn with_binary_version(mut self, dependency: &Dependency, version: &str) -> Self {
        let pinned = PinnedVersion::new(version);
        self.versions
            .entry(dependency.clone())
            .or_default()
            .push(pinned.clone());
        self.requirements
            .insert((dependency.clone(), pinned), Requirements::binary());
        self
    }

    /// Register an untagged commit with its requirements
    pub fn with_commit(
        mut self,
        dependency: &Dependency,
        commit: &str,
        requirements: Vec<(Dependency, VersionSpecifier)>,
    ) -> Self {
        self.requirements.insert(
            (dependency.clone(), PinnedVersion::new(commit)),
            Requirements::new(requirements),
        );
        self
    }

    /// Point a branch or tag name at a commit
    pub fn with_reference(mut self, dependency: &Dependency, reference: &str, commit: &str) -> Self {
        self.references.insert(
            (dependency.clone(), reference.to_string()),
            PinnedVersion::new(commit),
        );
        self
    }

    /// Make every query for `dependency` fail
    pub fn with_failure(mut self, dependency: &Dependency) -> Self {
        self.failing.insert(dependency.clone());
        self
    }

    /// Number of `versions` calls served so far
    pub fn version_queries(&self) -> usize {
        self.version_queries.load(Ordering::SeqCst)
    }

    fn check_failure(&self, dependency: &Dependency) -> Result<(), ProviderError> {
        if self.failing.contains(dependency) {
            return Err(ProviderError::Mirror {
                dependency: dependency.clone(),
                reason: "repository unavailable".to_string(),
            });
        }
        Ok(())
    }
}

impl RequirementProvider for InMemoryProvider {
    fn versions(&self, dependency: &Dependency) -> ProviderFuture<'_, Vec<PinnedVersion>> {
        self.version_queries.fetch_add(1, Ordering::SeqCst);
        let result = self.check_failure(dependency).map(|()| {
            let mut versions = self.versions.get(dependency).cloned().unwrap_or_default();
            sort_descending(&mut versions);
            versions
        });
        Box::pin(async move { result })
    }

    fn requirements(
        &self,
        dependency: &Dependency,
        version: &PinnedVersion,
    ) -> ProviderFuture<'_, Requirements> {
        let result = self.check_failure(dependency).and_then(|()| {
            self.requirements
                .get(&(dependency.clone(), version.clone()))
                .cloned()
                .ok_or_else(|| ProviderError::UnknownVersion {
                    dependency: dependency.clone(),
                    version: version.clone(),
                })
        });
        Box::pin(async move { result })
    }

    fn resolve_reference(
        &self,
        dependency: &Dependency,
        reference: &str,
    ) -> ProviderFuture<'_, PinnedVersion> {
        let result = self.check_failure(dependency).and_then(|()| {
            self.references
                .get(&(dependency.clone(), reference.to_string()))
                .cloned()
                .ok_or_else(|| ProviderError::UnknownReference {
                    dependency: dependency.clone(),
                    reference: reference.to_string(),
                })
        });
        Box::pin(async move { result })
    }
}
