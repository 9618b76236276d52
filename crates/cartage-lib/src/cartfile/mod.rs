//! Manifest model: dependencies, versions, Cartfile parsing and merging
//!
//! Everything here is synchronous and network-free. The resolver, graph and
//! outdated analysis all build on these types.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub mod binary_project;
pub mod dependency;
pub mod manifest;
pub mod merger;
pub mod version;

pub use binary_project::{BinaryProject, BinaryProjectError};
pub use dependency::{DEFAULT_HOSTED_SERVER, Dependency, DependencyKind, normalize_git_url};
pub use manifest::{Cartfile, CartfileEntry, ResolvedCartfile};
pub use merger::{
    CARTFILE_PATH, DuplicateDependency, PRIVATE_CARTFILE_PATH, RESOLVED_CARTFILE_PATH,
    load_combined_cartfile, merge_cartfiles,
};
pub use version::{
    PinnedVersion, VersionSpecifier, intersect_all, parse_semantic, sort_descending,
};

/// Manifest reading, parsing and merging errors
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Duplicate dependencies: {}", DuplicateList(duplicates))]
    DuplicateDependencies { duplicates: Vec<DuplicateDependency> },

    #[error("Failed to read '{}': {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write '{}': {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{file}:{line}: {reason}")]
    Parse {
        file: String,
        line: usize,
        reason: String,
    },
}

struct DuplicateList<'a>(&'a [DuplicateDependency]);

impl fmt::Display for DuplicateList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, duplicate) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(
                f,
                "{} ({})",
                duplicate.dependency,
                duplicate.locations.join(", ")
            )?;
        }
        Ok(())
    }
}
