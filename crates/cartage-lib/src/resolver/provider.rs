//! Where the resolver learns about versions and requirements

use crate::cartfile::{Dependency, PinnedVersion, VersionSpecifier};
use crate::sync::SyncError;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

pub type ProviderFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, ProviderError>> + Send + 'a>>;

/// What one version of a dependency requires
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requirements {
    pub dependencies: Vec<(Dependency, VersionSpecifier)>,
    /// Prebuilt artifact; nothing to resolve underneath it
    pub binary_only: bool,
}

impl Requirements {
    pub fn new(dependencies: Vec<(Dependency, VersionSpecifier)>) -> Self {
        Self {
            dependencies,
            binary_only: false,
        }
    }

    pub fn binary() -> Self {
        Self {
            dependencies: Vec::new(),
            binary_only: true,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error(transparent)]
    Sync {
        #[from]
        source: SyncError,
    },

    #[error("Repository query for {dependency} failed: {reason}")]
    Mirror {
        dependency: Dependency,
        reason: String,
    },

    #[error("{dependency} has no branch, tag or commit named '{reference}'")]
    UnknownReference {
        dependency: Dependency,
        reference: String,
    },

    #[error("{dependency} has no version {version}")]
    UnknownVersion {
        dependency: Dependency,
        version: PinnedVersion,
    },

    #[error("Invalid Cartfile in {dependency} at {version}: {reason}")]
    Manifest {
        dependency: Dependency,
        version: PinnedVersion,
        reason: String,
    },

    #[error("Failed to download {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("Invalid binary project for {dependency}: {reason}")]
    BinaryProject {
        dependency: Dependency,
        reason: String,
    },
}

/// Version and requirement data for dependencies, fetched lazily
pub trait RequirementProvider: Send + Sync {
    /// Available semantic versions, newest first
    fn versions(&self, dependency: &Dependency) -> ProviderFuture<'_, Vec<PinnedVersion>>;

    /// Dependencies declared by `dependency` at `version`
    fn requirements(
        &self,
        dependency: &Dependency,
        version: &PinnedVersion,
    ) -> ProviderFuture<'_, Requirements>;

    /// Commit a branch, tag or commit reference currently points at
    fn resolve_reference(
        &self,
        dependency: &Dependency,
        reference: &str,
    ) -> ProviderFuture<'_, PinnedVersion>;
}
