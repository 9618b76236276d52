//! Dependency resolution
//!
//! Depth-first backtracking search over an explicit agenda. Every choice of a
//! version pushes a choice point holding a snapshot of the search state; a
//! conflict restores the most recent choice point that still has untried
//! candidates. Identical inputs always produce the same resolution.

use crate::cartfile::{
    Cartfile, Dependency, PinnedVersion, ResolvedCartfile, VersionSpecifier, intersect_all,
    sort_descending,
};
use futures::future::try_join_all;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, trace};

pub mod live;
pub mod provider;

pub use live::LiveProvider;
pub use provider::{ProviderError, ProviderFuture, RequirementProvider, Requirements};

/// Which prior pins may be replaced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UpdatePolicy {
    /// Ignore prior pins entirely
    #[default]
    All,
    /// Re-resolve only these dependency names (case-insensitive)
    Only(BTreeSet<String>),
    /// Keep every prior pin that is still valid
    None,
}

impl UpdatePolicy {
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        UpdatePolicy::Only(
            names
                .into_iter()
                .map(|name| name.as_ref().to_lowercase())
                .collect(),
        )
    }

    /// Whether `dependency` must be re-resolved even if pinned
    pub fn forces(&self, dependency: &Dependency) -> bool {
        match self {
            UpdatePolicy::All => true,
            UpdatePolicy::Only(names) => names.contains(&dependency.name().to_lowercase()),
            UpdatePolicy::None => false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Pins from the previous `Cartfile.resolved`
    pub prior: Option<ResolvedCartfile>,
    pub update: UpdatePolicy,
}

/// Who placed a requirement on a dependency
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirer {
    /// A root manifest, e.g. `Cartfile`
    Manifest(String),
    Dependency(Dependency, PinnedVersion),
}

impl fmt::Display for Requirer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirer::Manifest(source) => f.write_str(source),
            Requirer::Dependency(dependency, version) => write!(f, "{dependency} {version}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictingRequirement {
    pub requirer: Requirer,
    pub specifier: VersionSpecifier,
}

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error(
        "Could not pick a version for {dependency}, due to mutually incompatible requirements: {}",
        RequirementList(constraints)
    )]
    UnsatisfiableConstraint {
        dependency: Dependency,
        constraints: Vec<ConflictingRequirement>,
    },

    #[error("Dependency cycle detected: {}", cycle.join(" → "))]
    DependencyCycle { cycle: Vec<String> },

    #[error("Resolution aborted: {source}")]
    Provider {
        #[from]
        source: ProviderError,
    },
}

struct RequirementList<'a>(&'a [ConflictingRequirement]);

impl fmt::Display for RequirementList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, requirement) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{} requires {}", requirement.requirer, requirement.specifier)?;
        }
        Ok(())
    }
}

pub struct Resolver {
    provider: Arc<dyn RequirementProvider>,
}

impl Resolver {
    pub fn new(provider: Arc<dyn RequirementProvider>) -> Self {
        Self { provider }
    }

    /// Pick one version per dependency reachable from `cartfile`
    pub async fn resolve(
        &self,
        cartfile: &Cartfile,
        options: &ResolveOptions,
    ) -> Result<ResolvedCartfile, ResolutionError> {
        let mut search = Search {
            provider: self.provider.as_ref(),
            options,
            memo: Memo::default(),
            choices: Vec::new(),
            reference_tips: HashMap::new(),
            first_conflict: None,
        };

        let mut state = SearchState::default();
        for entry in cartfile.entries.iter().rev() {
            state.agenda.push(Task::Visit {
                dependency: entry.dependency.clone(),
                requirement: ConflictingRequirement {
                    requirer: Requirer::Manifest(entry.source.clone()),
                    specifier: entry.specifier.clone(),
                },
            });
        }

        let roots: Vec<Dependency> = cartfile
            .entries
            .iter()
            .filter(|entry| !matches!(entry.specifier, VersionSpecifier::GitReference(_)))
            .map(|entry| entry.dependency.clone())
            .collect();
        search.prefetch_versions(&roots).await?;

        let assignment = search.run(state).await?;
        info!(dependencies = assignment.len(), "Resolved dependencies");
        Ok(assignment.into_iter().collect())
    }
}

#[derive(Debug, Clone)]
enum Task {
    Visit {
        dependency: Dependency,
        requirement: ConflictingRequirement,
    },
    /// Pop the dependency whose requirements were just visited off the path
    Leave,
}

#[derive(Debug, Clone, Default)]
struct SearchState {
    assignment: BTreeMap<Dependency, PinnedVersion>,
    constraints: HashMap<Dependency, Vec<ConflictingRequirement>>,
    /// Dependencies whose requirements are being visited, outermost first
    path: Vec<Dependency>,
    agenda: Vec<Task>,
}

struct ChoicePoint {
    /// State before the choice was committed
    snapshot: SearchState,
    dependency: Dependency,
    candidates: Vec<PinnedVersion>,
    next: usize,
}

#[derive(Default)]
struct Memo {
    versions: HashMap<Dependency, Vec<PinnedVersion>>,
    requirements: HashMap<(Dependency, PinnedVersion), Requirements>,
    references: HashMap<(Dependency, String), PinnedVersion>,
}

struct Search<'a> {
    provider: &'a dyn RequirementProvider,
    options: &'a ResolveOptions,
    memo: Memo,
    choices: Vec<ChoicePoint>,
    /// Reference tips that rejected a chosen tag, per dependency. Retried as
    /// candidates wherever that dependency is chosen without a reference.
    reference_tips: HashMap<Dependency, Vec<PinnedVersion>>,
    first_conflict: Option<ResolutionError>,
}

fn has_reference(state: &SearchState, dependency: &Dependency) -> bool {
    state.constraints.get(dependency).is_some_and(|constraints| {
        constraints
            .iter()
            .any(|c| matches!(c.specifier, VersionSpecifier::GitReference(_)))
    })
}

impl Search<'_> {
    async fn run(
        &mut self,
        mut state: SearchState,
    ) -> Result<BTreeMap<Dependency, PinnedVersion>, ResolutionError> {
        while let Some(task) = state.agenda.pop() {
            let (dependency, requirement) = match task {
                Task::Leave => {
                    state.path.pop();
                    continue;
                }
                Task::Visit {
                    dependency,
                    requirement,
                } => (dependency, requirement),
            };

            if let Some(start) = state.path.iter().position(|d| *d == dependency) {
                let cycle = state.path[start..]
                    .iter()
                    .chain(std::iter::once(&dependency))
                    .map(|d| d.name().to_string())
                    .collect();
                return Err(ResolutionError::DependencyCycle { cycle });
            }

            state
                .constraints
                .entry(dependency.clone())
                .or_default()
                .push(requirement);

            let satisfied = match state.assignment.get(&dependency) {
                Some(pinned) => self.accepts(&dependency, pinned, &state).await?,
                None => {
                    let candidates = self.candidates(&dependency, &state).await?;
                    if let Some(first) = candidates.first().cloned() {
                        self.choices.push(ChoicePoint {
                            snapshot: state.clone(),
                            dependency: dependency.clone(),
                            candidates,
                            next: 1,
                        });
                        self.commit(&mut state, dependency.clone(), first).await?;
                        true
                    } else {
                        false
                    }
                }
            };

            if !satisfied {
                let conflict = self.record_conflict(&dependency, &state);
                state = match self.backtrack().await? {
                    Some(state) => state,
                    None => return Err(self.first_conflict.take().unwrap_or(conflict)),
                };
            }
        }

        Ok(state.assignment)
    }

    /// Build the error for a conflict on `dependency`, remembering the first one
    fn record_conflict(&mut self, dependency: &Dependency, state: &SearchState) -> ResolutionError {
        let constraints = state
            .constraints
            .get(dependency)
            .cloned()
            .unwrap_or_default();
        debug!(dependency = %dependency, requirements = constraints.len(), "Conflict");

        let conflict = || ResolutionError::UnsatisfiableConstraint {
            dependency: dependency.clone(),
            constraints: constraints.clone(),
        };
        if self.first_conflict.is_none() {
            self.first_conflict = Some(conflict());
        }
        conflict()
    }

    /// Resume from the latest choice point with an untried candidate, `None`
    /// once every choice is exhausted
    async fn backtrack(&mut self) -> Result<Option<SearchState>, ResolutionError> {
        while let Some(choice) = self.choices.last_mut() {
            if let Some(tips) = self.reference_tips.get(&choice.dependency)
                && !has_reference(&choice.snapshot, &choice.dependency)
            {
                let mut position = choice.next;
                for tip in tips {
                    if !choice.candidates.contains(tip) {
                        choice.candidates.insert(position, tip.clone());
                        position += 1;
                    }
                }
            }

            if choice.next < choice.candidates.len() {
                let candidate = choice.candidates[choice.next].clone();
                choice.next += 1;
                let mut state = choice.snapshot.clone();
                let dependency = choice.dependency.clone();

                trace!(dependency = %dependency, candidate = %candidate, "Backtracking");
                self.commit(&mut state, dependency, candidate).await?;
                return Ok(Some(state));
            }
            self.choices.pop();
        }
        Ok(None)
    }

    async fn commit(
        &mut self,
        state: &mut SearchState,
        dependency: Dependency,
        version: PinnedVersion,
    ) -> Result<(), ResolutionError> {
        let requirements = self.requirements(&dependency, &version).await?;
        debug!(dependency = %dependency, version = %version, "Trying version");

        state.assignment.insert(dependency.clone(), version.clone());
        state.path.push(dependency.clone());
        state.agenda.push(Task::Leave);

        let children: Vec<Dependency> = requirements
            .dependencies
            .iter()
            .filter(|(child, specifier)| {
                !state.assignment.contains_key(child)
                    && !matches!(specifier, VersionSpecifier::GitReference(_))
            })
            .map(|(child, _)| child.clone())
            .collect();
        self.prefetch_versions(&children).await?;

        for (child, specifier) in requirements.dependencies.iter().rev() {
            state.agenda.push(Task::Visit {
                dependency: child.clone(),
                requirement: ConflictingRequirement {
                    requirer: Requirer::Dependency(dependency.clone(), version.clone()),
                    specifier: specifier.clone(),
                },
            });
        }
        Ok(())
    }

    /// Whether an already-chosen version still meets every requirement on it
    async fn accepts(
        &mut self,
        dependency: &Dependency,
        pinned: &PinnedVersion,
        state: &SearchState,
    ) -> Result<bool, ResolutionError> {
        let Some(constraints) = state.constraints.get(dependency) else {
            return Ok(true);
        };
        if intersect_all(constraints.iter().map(|c| &c.specifier)).is_none() {
            return Ok(false);
        }

        for constraint in constraints {
            let accepted = match &constraint.specifier {
                VersionSpecifier::GitReference(reference) if pinned.as_str() == reference => true,
                VersionSpecifier::GitReference(reference) => {
                    let tip = self.reference(dependency, reference).await?;
                    if tip == *pinned {
                        true
                    } else {
                        self.remember_tip(dependency, tip);
                        false
                    }
                }
                specifier => specifier.is_satisfied_by(pinned),
            };
            if !accepted {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Versions to try for an unassigned dependency, most preferred first
    async fn candidates(
        &mut self,
        dependency: &Dependency,
        state: &SearchState,
    ) -> Result<Vec<PinnedVersion>, ResolutionError> {
        let specifiers: Vec<&VersionSpecifier> = state
            .constraints
            .get(dependency)
            .map(|constraints| constraints.iter().map(|c| &c.specifier).collect())
            .unwrap_or_default();
        let Some(combined) = intersect_all(specifiers.iter().copied()) else {
            return Ok(Vec::new());
        };
        let prior = self.prior_pin(dependency).cloned();

        if let VersionSpecifier::GitReference(reference) = &combined {
            let tip = self.reference(dependency, reference).await?;
            let mut candidates = Vec::with_capacity(2);
            if let Some(prior) = prior
                && prior.as_str() == reference
            {
                candidates.push(prior);
            }
            if !candidates.contains(&tip) {
                candidates.push(tip);
            }
            return Ok(candidates);
        }

        let mut candidates: Vec<PinnedVersion> = self
            .versions(dependency)
            .await?
            .into_iter()
            .filter(|version| specifiers.iter().all(|s| s.is_satisfied_by(version)))
            .collect();
        sort_descending(&mut candidates);

        if let Some(prior) = prior
            && let Some(position) = candidates.iter().position(|v| *v == prior)
        {
            let pinned = candidates.remove(position);
            candidates.insert(0, pinned);
        }
        if let Some(tips) = self.reference_tips.get(dependency) {
            for tip in tips {
                if !candidates.contains(tip) {
                    candidates.push(tip.clone());
                }
            }
        }

        trace!(dependency = %dependency, count = candidates.len(), "Candidates");
        Ok(candidates)
    }

    fn remember_tip(&mut self, dependency: &Dependency, tip: PinnedVersion) {
        let tips = self.reference_tips.entry(dependency.clone()).or_default();
        if !tips.contains(&tip) {
            trace!(dependency = %dependency, tip = %tip, "Remembering reference tip");
            tips.push(tip);
        }
    }

    fn prior_pin(&self, dependency: &Dependency) -> Option<&PinnedVersion> {
        if self.options.update.forces(dependency) {
            return None;
        }
        self.options.prior.as_ref()?.get(dependency)
    }

    async fn prefetch_versions(&mut self, dependencies: &[Dependency]) -> Result<(), ResolutionError> {
        let mut missing: Vec<&Dependency> = Vec::new();
        for dependency in dependencies {
            if !self.memo.versions.contains_key(dependency) && !missing.contains(&dependency) {
                missing.push(dependency);
            }
        }
        if missing.is_empty() {
            return Ok(());
        }

        let provider = self.provider;
        let fetched = try_join_all(missing.iter().map(|d| provider.versions(d))).await?;
        for (dependency, versions) in missing.into_iter().zip(fetched) {
            self.memo.versions.insert(dependency.clone(), versions);
        }
        Ok(())
    }

    async fn versions(&mut self, dependency: &Dependency) -> Result<Vec<PinnedVersion>, ResolutionError> {
        if let Some(versions) = self.memo.versions.get(dependency) {
            return Ok(versions.clone());
        }
        let versions = self.provider.versions(dependency).await?;
        self.memo
            .versions
            .insert(dependency.clone(), versions.clone());
        Ok(versions)
    }

    async fn requirements(
        &mut self,
        dependency: &Dependency,
        version: &PinnedVersion,
    ) -> Result<Requirements, ResolutionError> {
        let key = (dependency.clone(), version.clone());
        if let Some(requirements) = self.memo.requirements.get(&key) {
            return Ok(requirements.clone());
        }

        let mut requirements = self.provider.requirements(dependency, version).await?;
        if requirements.binary_only {
            requirements.dependencies.clear();
        }
        self.memo.requirements.insert(key, requirements.clone());
        Ok(requirements)
    }

    async fn reference(
        &mut self,
        dependency: &Dependency,
        reference: &str,
    ) -> Result<PinnedVersion, ResolutionError> {
        let key = (dependency.clone(), reference.to_string());
        if let Some(pinned) = self.memo.references.get(&key) {
            return Ok(pinned.clone());
        }
        let pinned = self.provider.resolve_reference(dependency, reference).await?;
        self.memo.references.insert(key, pinned.clone());
        Ok(pinned)
    }
}

#[cfg(test)]
mod tests {
    include!("mod.test.rs");
}
