//! Per-repository fetch bookkeeping
//!
//! Each repository identity has a last-fetch timestamp and, while a clone or
//! fetch is running, a shared handle to that operation. Both are read and
//! written under the entry's shard lock, so two callers can never both decide
//! to start an operation for the same identity.

use super::{ProjectEvent, SyncError};
use dashmap::DashMap;
use futures::future::{BoxFuture, Shared};
use std::time::{Duration, Instant};
use tracing::trace;

/// Freshness window for fetched repositories
pub const DEFAULT_FETCH_INTERVAL_SECS: u64 = 60;

pub(crate) type SyncOutcome = Result<Option<ProjectEvent>, SyncError>;
pub(crate) type InFlight = Shared<BoxFuture<'static, SyncOutcome>>;

#[derive(Default)]
struct FetchEntry {
    last_fetch: Option<Instant>,
    in_flight: Option<InFlight>,
}

/// Process-lifetime table of fetch times and in-flight operations
pub struct FetchCache {
    entries: DashMap<String, FetchEntry>,
    interval: Duration,
}

impl Default for FetchCache {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchCache {
    pub fn new() -> Self {
        Self::with_interval(Duration::from_secs(DEFAULT_FETCH_INTERVAL_SECS))
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time of the last successful clone or fetch
    pub fn last_fetch(&self, identity: &str) -> Option<Instant> {
        self.entries.get(identity).and_then(|entry| entry.last_fetch)
    }

    /// Whether the identity was refreshed within the freshness window
    pub fn is_fresh(&self, identity: &str) -> bool {
        self.last_fetch(identity)
            .is_some_and(|fetched| fetched.elapsed() < self.interval)
    }

    /// Forget every fetch time so the next sync of each repository hits the network
    pub fn clear_fetch_times(&self) {
        for mut entry in self.entries.iter_mut() {
            entry.last_fetch = None;
        }
        trace!("Cleared fetch times");
    }

    /// Join the running operation for `identity`, or start one with `start`.
    ///
    /// Returns `None` when the mirror exists and the identity is still fresh.
    /// `mirror_exists` and `start` both run while the entry is locked, and
    /// `start` receives the existence check.
    pub(crate) fn join_or_start(
        &self,
        identity: &str,
        mirror_exists: impl FnOnce() -> bool,
        start: impl FnOnce(bool) -> InFlight,
    ) -> Option<InFlight> {
        let mut entry = self.entries.entry(identity.to_string()).or_default();

        if let Some(operation) = &entry.in_flight {
            trace!(identity, "Joining in-flight operation");
            return Some(operation.clone());
        }

        let fresh = entry
            .last_fetch
            .is_some_and(|fetched| fetched.elapsed() < self.interval);
        let exists = mirror_exists();
        if exists && fresh {
            return None;
        }

        let operation = start(exists);
        entry.in_flight = Some(operation.clone());
        Some(operation)
    }

    /// Mark the operation for `identity` finished, stamping it on success
    pub(crate) fn finish(&self, identity: &str, succeeded: bool) {
        if let Some(mut entry) = self.entries.get_mut(identity) {
            entry.in_flight = None;
            if succeeded {
                entry.last_fetch = Some(Instant::now());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    include!("fetch_cache.test.rs");
}
