//! Deduplicated clone-or-fetch
//!
//! Concurrent `sync` calls for one repository identity share a single
//! underlying clone or fetch. The operation runs on its own task, so it always
//! completes even if every caller is dropped.

use super::fetch_cache::{FetchCache, InFlight, SyncOutcome};
use super::mirror::RepositoryMirror;
use super::{ProjectEvent, SyncError};
use crate::cartfile::Dependency;
use futures::FutureExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

pub struct Synchronizer {
    mirror: Arc<dyn RepositoryMirror>,
    cache: Arc<FetchCache>,
    events: Option<mpsc::UnboundedSender<ProjectEvent>>,
}

impl Synchronizer {
    pub fn new(mirror: Arc<dyn RepositoryMirror>, cache: Arc<FetchCache>) -> Self {
        Self {
            mirror,
            cache,
            events: None,
        }
    }

    /// Also push each clone/fetch event into `sender`, once per operation
    pub fn with_events(mut self, sender: mpsc::UnboundedSender<ProjectEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    pub fn mirror(&self) -> &Arc<dyn RepositoryMirror> {
        &self.mirror
    }

    pub fn cache(&self) -> &Arc<FetchCache> {
        &self.cache
    }

    /// Bring the local mirror of `dependency` up to date.
    ///
    /// Returns the event for the clone or fetch that ran, or `None` when the
    /// network was skipped because `commitish` is an immutable commit already
    /// present or the mirror is still fresh.
    pub async fn sync(
        &self,
        dependency: &Dependency,
        commitish: Option<&str>,
    ) -> Result<Option<ProjectEvent>, SyncError> {
        if dependency.is_binary() {
            return Err(SyncError::OperationFailed {
                dependency: dependency.clone(),
                reason: "binary dependencies have no repository".to_string(),
            });
        }

        let exists = self.mirror.mirror_exists(dependency);
        if exists && let Some(commitish) = commitish {
            match self.mirror.is_immutable_commit(dependency, commitish).await {
                Ok(true) => {
                    trace!(dependency = %dependency, commitish, "Commit already mirrored");
                    return Ok(None);
                }
                Ok(false) => {}
                Err(e) => debug!(dependency = %dependency, error = %e, "Commit lookup failed"),
            }
        }

        let operation = self.cache.join_or_start(
            dependency.identity(),
            || self.mirror.mirror_exists(dependency),
            |exists| self.start_operation(dependency.clone(), exists),
        );

        match operation {
            Some(operation) => operation.await,
            None => {
                trace!(dependency = %dependency, "Mirror is fresh, skipping fetch");
                Ok(None)
            }
        }
    }

    /// Push an event that did not come from a clone or fetch
    pub fn announce(&self, event: ProjectEvent) {
        info!("{event}");
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }

    /// Reset every fetch time; the next sync of each repository fetches
    pub fn clear_fetch_times(&self) {
        self.cache.clear_fetch_times();
    }

    fn start_operation(&self, dependency: Dependency, exists: bool) -> InFlight {
        let mirror = Arc::clone(&self.mirror);
        let cache = Arc::clone(&self.cache);
        let events = self.events.clone();
        let task_dependency = dependency.clone();

        let handle = tokio::spawn(async move {
            let dependency = task_dependency;
            let event = if exists {
                ProjectEvent::Fetching(dependency.clone())
            } else {
                ProjectEvent::Cloning(dependency.clone())
            };
            info!("{event}");
            if let Some(events) = &events {
                let _ = events.send(event.clone());
            }

            let result = if exists {
                mirror.fetch_repository(&dependency).await
            } else {
                mirror.clone_repository(&dependency).await
            };
            cache.finish(dependency.identity(), result.is_ok());

            match result {
                Ok(()) => Ok(Some(event)),
                Err(e) => {
                    warn!(dependency = %dependency, error = %e, "Synchronization failed");
                    Err(SyncError::OperationFailed {
                        dependency,
                        reason: e.to_string(),
                    })
                }
            }
        });

        let cache = Arc::clone(&self.cache);
        async move {
            let outcome: SyncOutcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    cache.finish(dependency.identity(), false);
                    Err(SyncError::OperationFailed {
                        dependency,
                        reason: format!("synchronization task failed: {e}"),
                    })
                }
            };
            outcome
        }
        .boxed()
        .shared()
    }
}

#[cfg(test)]
mod tests {
    include!("synchronizer.test.rs");
}
