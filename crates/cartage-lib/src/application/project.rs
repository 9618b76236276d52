//! Per-invocation project context
//!
//! Owns the project directory and the requirement provider every command
//! works against. [`Project::live`] wires the git mirror, fetch cache and
//! HTTP client together; tests hand in an in-memory provider instead.

use super::config::AppConfig;
use crate::cartfile::{
    CARTFILE_PATH, Cartfile, Dependency, ManifestError, PRIVATE_CARTFILE_PATH, PinnedVersion,
    RESOLVED_CARTFILE_PATH, ResolvedCartfile, load_combined_cartfile,
};
use crate::graph::{BuildGraph, GraphError};
use crate::outdated::{OutdatedAnalyzer, OutdatedDependency, OutdatedError};
use crate::primitives::ConfigError;
use crate::resolver::{
    LiveProvider, RequirementProvider, ResolutionError, ResolveOptions, Resolver, UpdatePolicy,
};
use crate::sync::{FetchCache, GitMirror, ProjectEvent, Synchronizer};
use console::style;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error(transparent)]
    Manifest {
        #[from]
        source: ManifestError,
    },

    #[error(transparent)]
    Resolution {
        #[from]
        source: ResolutionError,
    },

    #[error(transparent)]
    Graph {
        #[from]
        source: GraphError,
    },

    #[error(transparent)]
    Outdated {
        #[from]
        source: OutdatedError,
    },

    #[error(transparent)]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("No Cartfile.resolved in {}; run `cartage update` first", directory.display())]
    MissingResolved { directory: PathBuf },

    #[error("Failed to create HTTP client: {source}")]
    HttpClient {
        #[from]
        source: reqwest::Error,
    },
}

pub struct Project {
    directory: PathBuf,
    provider: Arc<dyn RequirementProvider>,
}

impl Project {
    pub fn new(directory: impl Into<PathBuf>, provider: Arc<dyn RequirementProvider>) -> Self {
        Self {
            directory: directory.into(),
            provider,
        }
    }

    /// Project backed by git mirrors under the configured cache directory
    ///
    /// Must be called inside a tokio runtime; clone and fetch notices are
    /// printed to stderr by a background task.
    pub fn live(config: &AppConfig) -> Result<Self, ProjectError> {
        let directory = config.project_dir()?;
        let mirror = Arc::new(GitMirror::new(&config.cache_root()?));
        let cache = Arc::new(FetchCache::with_interval(config.fetch_interval()));

        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(report_events(receiver));

        let client = reqwest::Client::builder()
            .timeout(config.net_timeout())
            .user_agent(concat!("cartage/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let synchronizer = Synchronizer::new(mirror, cache).with_events(sender);

        debug!(directory = %directory.display(), "Opened project");
        Ok(Self::new(
            directory,
            Arc::new(LiveProvider::new(synchronizer, client)),
        ))
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn resolved_path(&self) -> PathBuf {
        self.directory.join(RESOLVED_CARTFILE_PATH)
    }

    pub fn has_cartfile(&self) -> bool {
        self.directory.join(CARTFILE_PATH).is_file()
            || self.directory.join(PRIVATE_CARTFILE_PATH).is_file()
    }

    /// `Cartfile` and `Cartfile.private`, merged
    pub fn load_cartfile(&self) -> Result<Cartfile, ManifestError> {
        load_combined_cartfile(&self.directory)
    }

    /// Existing pins, if the project was resolved before
    pub fn load_resolved(&self) -> Result<Option<ResolvedCartfile>, ManifestError> {
        let path = self.resolved_path();
        if !path.exists() {
            return Ok(None);
        }
        ResolvedCartfile::from_file(&path).map(Some)
    }

    fn require_resolved(&self) -> Result<ResolvedCartfile, ProjectError> {
        self.load_resolved()?
            .ok_or_else(|| ProjectError::MissingResolved {
                directory: self.directory.clone(),
            })
    }

    /// Resolve and write `Cartfile.resolved`
    ///
    /// With `names`, only those dependencies move off their current pins.
    pub async fn update<S: AsRef<str>>(&self, names: &[S]) -> Result<ResolvedCartfile, ProjectError> {
        let cartfile = self.load_cartfile()?;
        let update = if names.is_empty() {
            UpdatePolicy::All
        } else {
            UpdatePolicy::only(names.iter().map(|name| name.as_ref()))
        };
        let options = ResolveOptions {
            prior: self.load_resolved()?,
            update,
        };

        let resolved = Resolver::new(Arc::clone(&self.provider))
            .resolve(&cartfile, &options)
            .await?;
        resolved.write_to(&self.resolved_path())?;

        info!(
            dependencies = resolved.len(),
            path = %self.resolved_path().display(),
            "Wrote resolved Cartfile"
        );
        Ok(resolved)
    }

    pub async fn outdated(&self) -> Result<Vec<OutdatedDependency>, ProjectError> {
        let cartfile = self.load_cartfile()?;
        let resolved = self.require_resolved()?;

        Ok(OutdatedAnalyzer::new(Arc::clone(&self.provider))
            .analyze(&cartfile, &resolved)
            .await?)
    }

    /// Pins of the named dependencies and everything they need, in build order
    pub async fn build_order<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<Vec<(Dependency, PinnedVersion)>, ProjectError> {
        let resolved = self.require_resolved()?;
        let graph = BuildGraph::from_resolved(&resolved, &*self.provider).await?;

        Ok(graph
            .build_plan(names)?
            .into_iter()
            .filter_map(|dependency| {
                let version = resolved.get(&dependency)?.clone();
                Some((dependency, version))
            })
            .collect())
    }

    pub async fn transitive_dependencies<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<BTreeSet<Dependency>, ProjectError> {
        let resolved = self.require_resolved()?;
        let graph = BuildGraph::from_resolved(&resolved, &*self.provider).await?;
        Ok(graph.transitive_dependencies(names)?)
    }
}

async fn report_events(mut receiver: mpsc::UnboundedReceiver<ProjectEvent>) {
    let term = console::Term::stderr();
    while let Some(event) = receiver.recv().await {
        if term
            .write_line(&format!("{} {event}", style("***").cyan().bold()))
            .is_err()
        {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    include!("project.test.rs");
}
