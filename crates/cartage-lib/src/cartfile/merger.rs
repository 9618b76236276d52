//! Combining Cartfile and Cartfile.private
//!
//! Duplicate detection runs on normalized identities before anything touches
//! the network.

use super::ManifestError;
use super::dependency::Dependency;
use super::manifest::Cartfile;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

pub const CARTFILE_PATH: &str = "Cartfile";
pub const PRIVATE_CARTFILE_PATH: &str = "Cartfile.private";
pub const RESOLVED_CARTFILE_PATH: &str = "Cartfile.resolved";

/// A dependency declared more than once, with every manifest it appeared in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateDependency {
    pub dependency: Dependency,
    /// Manifest locations in first-seen order, each listed once
    pub locations: Vec<String>,
}

/// Concatenate manifests in order, failing on any duplicated identity
pub fn merge_cartfiles(sources: Vec<Cartfile>) -> Result<Cartfile, ManifestError> {
    let mut merged = Cartfile::default();
    let mut seen: HashMap<Dependency, (usize, Vec<String>)> = HashMap::new();

    for cartfile in sources {
        for entry in cartfile.entries {
            let (count, locations) = seen
                .entry(entry.dependency.clone())
                .or_insert_with(|| (0, Vec::new()));
            *count += 1;
            if !locations.contains(&entry.source) {
                locations.push(entry.source.clone());
            }
            merged.entries.push(entry);
        }
    }

    let mut duplicates: Vec<DuplicateDependency> = seen
        .into_iter()
        .filter(|(_, (count, _))| *count > 1)
        .map(|(dependency, (_, locations))| DuplicateDependency {
            dependency,
            locations,
        })
        .collect();

    if !duplicates.is_empty() {
        duplicates.sort_by(|a, b| a.dependency.cmp(&b.dependency));
        warn!(count = duplicates.len(), "Duplicate dependencies found");
        return Err(ManifestError::DuplicateDependencies { duplicates });
    }

    debug!(entries = merged.len(), "Merged Cartfiles");
    Ok(merged)
}

/// Load `Cartfile` and `Cartfile.private` from a project directory.
///
/// Either file may be missing, but not both.
pub fn load_combined_cartfile(directory: &Path) -> Result<Cartfile, ManifestError> {
    let shared_path = directory.join(CARTFILE_PATH);
    let private_path = directory.join(PRIVATE_CARTFILE_PATH);

    let mut sources = Vec::new();
    match Cartfile::from_file(&shared_path) {
        Ok(cartfile) => sources.push(cartfile),
        Err(ManifestError::ReadFailed { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound && private_path.exists() =>
        {
            debug!(path = %shared_path.display(), "No Cartfile, using Cartfile.private only");
        }
        Err(e) => return Err(e),
    }

    if private_path.exists() {
        sources.push(Cartfile::from_file(&private_path)?);
    }

    merge_cartfiles(sources)
}

#[cfg(test)]
mod tests {
    include!("merger.test.rs");
}
