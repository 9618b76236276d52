//! Scripted repository mirror

use crate::cartfile::Dependency;
use crate::sync::{MirrorError, MirrorFuture, RepositoryMirror};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Default, Clone)]
struct MockRepository {
    tags: Vec<String>,
    /// Branch and tag names to commit
    references: HashMap<String, String>,
    commits: HashSet<String>,
    /// (revision, path) to contents
    files: HashMap<(String, String), String>,
}

/// Records clone and fetch calls and answers queries from scripted data
#[derive(Debug, Default)]
pub struct MockMirror {
    repositories: Mutex<HashMap<String, MockRepository>>,
    mirrored: Mutex<HashSet<String>>,
    failing: Mutex<HashSet<String>>,
    latency: Duration,
    clones: AtomicUsize,
    fetches: AtomicUsize,
}

impl MockMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every clone and fetch by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Start with a local mirror of `dependency` already present
    pub fn with_mirror(self, dependency: &Dependency) -> Self {
        self.mirrored
            .lock()
            .unwrap()
            .insert(dependency.identity().to_string());
        self
    }

    pub fn with_commit(self, dependency: &Dependency, commit: &str) -> Self {
        self.update(dependency, |repository| {
            repository.commits.insert(commit.to_string());
        });
        self
    }

    /// Tag `commit` with `tag`
    pub fn with_tag(self, dependency: &Dependency, tag: &str, commit: &str) -> Self {
        self.update(dependency, |repository| {
            repository.tags.push(tag.to_string());
            repository.commits.insert(commit.to_string());
            repository
                .references
                .insert(tag.to_string(), commit.to_string());
        });
        self
    }

    /// Point branch `name` at `commit`
    pub fn with_branch(self, dependency: &Dependency, name: &str, commit: &str) -> Self {
        self.update(dependency, |repository| {
            repository.commits.insert(commit.to_string());
            repository
                .references
                .insert(name.to_string(), commit.to_string());
        });
        self
    }

    pub fn with_file(self, dependency: &Dependency, revision: &str, path: &str, contents: &str) -> Self {
        self.update(dependency, |repository| {
            repository
                .files
                .insert((revision.to_string(), path.to_string()), contents.to_string());
        });
        self
    }

    /// Make clones and fetches of `dependency` fail
    pub fn with_failure(self, dependency: &Dependency) -> Self {
        self.failing
            .lock()
            .unwrap()
            .insert(dependency.identity().to_string());
        self
    }

    pub fn clone_count(&self) -> usize {
        self.clones.load(Ordering::SeqCst)
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn update(&self, dependency: &Dependency, apply: impl FnOnce(&mut MockRepository)) {
        let mut repositories = self.repositories.lock().unwrap();
        apply(
            repositories
                .entry(dependency.identity().to_string())
                .or_default(),
        );
    }

    fn repository(&self, dependency: &Dependency) -> MockRepository {
        self.repositories
            .lock()
            .unwrap()
            .get(dependency.identity())
            .cloned()
            .unwrap_or_default()
    }

    fn network(&self, dependency: &Dependency, counter: &AtomicUsize) -> MirrorFuture<'_, ()> {
        counter.fetch_add(1, Ordering::SeqCst);
        let identity = dependency.identity().to_string();
        let latency = self.latency;

        Box::pin(async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            if self.failing.lock().unwrap().contains(&identity) {
                return Err(MirrorError::GitFailed {
                    command: "git fetch".to_string(),
                    stderr: format!("could not read from remote repository {identity}"),
                });
            }
            self.mirrored.lock().unwrap().insert(identity);
            Ok(())
        })
    }
}

impl RepositoryMirror for MockMirror {
    fn mirror_exists(&self, dependency: &Dependency) -> bool {
        self.mirrored.lock().unwrap().contains(dependency.identity())
    }

    fn is_immutable_commit(
        &self,
        dependency: &Dependency,
        commitish: &str,
    ) -> MirrorFuture<'_, bool> {
        let repository = self.repository(dependency);
        let immutable = self.mirror_exists(dependency)
            && repository.commits.contains(commitish)
            && !repository.references.contains_key(commitish);
        Box::pin(async move { Ok(immutable) })
    }

    fn clone_repository(&self, dependency: &Dependency) -> MirrorFuture<'_, ()> {
        self.network(dependency, &self.clones)
    }

    fn fetch_repository(&self, dependency: &Dependency) -> MirrorFuture<'_, ()> {
        self.network(dependency, &self.fetches)
    }

    fn list_tags(&self, dependency: &Dependency) -> MirrorFuture<'_, Vec<String>> {
        let tags = self.repository(dependency).tags;
        Box::pin(async move { Ok(tags) })
    }

    fn resolve_reference(
        &self,
        dependency: &Dependency,
        reference: &str,
    ) -> MirrorFuture<'_, Option<String>> {
        let repository = self.repository(dependency);
        let resolved = repository.references.get(reference).cloned().or_else(|| {
            repository
                .commits
                .contains(reference)
                .then(|| reference.to_string())
        });
        Box::pin(async move { Ok(resolved) })
    }

    fn contents_of_file(
        &self,
        dependency: &Dependency,
        revision: &str,
        path: &str,
    ) -> MirrorFuture<'_, Option<String>> {
        let repository = self.repository(dependency);
        let lookup = |revision: &str| {
            repository
                .files
                .get(&(revision.to_string(), path.to_string()))
                .cloned()
        };
        let contents = lookup(revision).or_else(|| {
            repository
                .references
                .get(revision)
                .and_then(|commit| lookup(commit))
        });
        Box::pin(async move { Ok(contents) })
    }
}
