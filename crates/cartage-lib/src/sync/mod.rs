//! Repository synchronization
//!
//! Local bare mirrors of every git dependency, refreshed at most once per
//! freshness window and never twice at the same time.

use crate::cartfile::Dependency;
use std::fmt;
use thiserror::Error;

pub mod fetch_cache;
pub mod mirror;
pub mod synchronizer;

pub use fetch_cache::{DEFAULT_FETCH_INTERVAL_SECS, FetchCache};
pub use mirror::{GitMirror, MirrorError, MirrorFuture, RepositoryMirror};
pub use synchronizer::Synchronizer;

/// Network activity announced for a dependency
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectEvent {
    Cloning(Dependency),
    Fetching(Dependency),
    /// A binary-project definition is being downloaded from `url`
    DownloadingBinaryDefinition { dependency: Dependency, url: String },
}

impl ProjectEvent {
    pub fn dependency(&self) -> &Dependency {
        match self {
            ProjectEvent::Cloning(dependency)
            | ProjectEvent::Fetching(dependency)
            | ProjectEvent::DownloadingBinaryDefinition { dependency, .. } => dependency,
        }
    }
}

impl fmt::Display for ProjectEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectEvent::Cloning(dependency) => write!(f, "Cloning {dependency}"),
            ProjectEvent::Fetching(dependency) => write!(f, "Fetching {dependency}"),
            ProjectEvent::DownloadingBinaryDefinition { dependency, url } => {
                write!(f, "Downloading binary definition of {dependency} from {url}")
            }
        }
    }
}

/// Clone or fetch failure; shared by every caller waiting on the operation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("Failed to synchronize {dependency}: {reason}")]
    OperationFailed {
        dependency: Dependency,
        reason: String,
    },
}
