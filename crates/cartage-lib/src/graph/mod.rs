//! Build graph over a resolved dependency set
//!
//! Nodes are the pinned dependencies of a `Cartfile.resolved`; edges run from
//! a dependency to each of its dependents, so a topological walk yields a
//! valid build order.

use crate::cartfile::{Dependency, ResolvedCartfile};
use crate::resolver::{ProviderError, RequirementProvider};
use futures::future::try_join_all;
use petgraph::Direction;
use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeSet, HashMap, VecDeque};
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Error)]
pub enum GraphError {
    /// The resolver should never produce this
    #[error("Dependency cycle in resolved graph: {}", cycle.join(" → "))]
    InternalCycle { cycle: Vec<String> },

    #[error("No resolved dependency named {name}")]
    UnknownDependency { name: String },

    #[error("Failed to load requirements: {source}")]
    Provider {
        #[from]
        source: ProviderError,
    },
}

/// "Requires" graph restricted to resolved dependencies
#[derive(Debug, Default)]
pub struct BuildGraph {
    graph: DiGraph<Dependency, ()>,
    node_map: HashMap<Dependency, NodeIndex>,
}

impl BuildGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph from resolved pins and each pin's requirements
    ///
    /// Requirements naming a dependency outside `resolved` are ignored.
    pub async fn from_resolved(
        resolved: &ResolvedCartfile,
        provider: &dyn RequirementProvider,
    ) -> Result<Self, GraphError> {
        let mut graph = Self::new();
        for dependency in resolved.dependencies() {
            graph.add_node(dependency.clone());
        }

        let requirements = try_join_all(
            resolved
                .iter()
                .map(|(dependency, version)| provider.requirements(dependency, version)),
        )
        .await?;

        for ((dependent, _), requirements) in resolved.iter().zip(requirements) {
            for (dependency, _) in &requirements.dependencies {
                if graph.node_map.contains_key(dependency) {
                    graph.add_dependency(dependent, dependency);
                } else {
                    trace!(
                        dependent = %dependent,
                        dependency = %dependency,
                        "Skipping requirement outside resolved set"
                    );
                }
            }
        }

        debug!(
            nodes = graph.graph.node_count(),
            edges = graph.graph.edge_count(),
            "Built dependency graph"
        );
        Ok(graph)
    }

    /// Add a dependency to the graph (idempotent)
    pub fn add_node(&mut self, dependency: Dependency) -> NodeIndex {
        if let Some(&index) = self.node_map.get(&dependency) {
            return index;
        }

        let index = self.graph.add_node(dependency.clone());
        self.node_map.insert(dependency, index);
        index
    }

    /// Record that `dependent` requires `dependency`
    pub fn add_dependency(&mut self, dependent: &Dependency, dependency: &Dependency) {
        let from = self.add_node(dependent.clone());
        let to = self.add_node(dependency.clone());
        // Dependency -> dependent, so dependencies sort first
        self.graph.update_edge(to, from, ());
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Look up a node by display name, ignoring case
    pub fn find(&self, name: &str) -> Result<&Dependency, GraphError> {
        self.graph
            .node_weights()
            .find(|dependency| dependency.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| GraphError::UnknownDependency {
                name: name.to_string(),
            })
    }

    /// Direct requirements of `dependency` within the graph
    pub fn dependencies_of(&self, dependency: &Dependency) -> BTreeSet<Dependency> {
        self.node_map
            .get(dependency)
            .map(|&index| {
                self.graph
                    .neighbors_directed(index, Direction::Incoming)
                    .map(|neighbor| self.graph[neighbor].clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Everything reachable from `names` through requirement edges,
    /// excluding the named roots themselves
    pub fn transitive_dependencies<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<BTreeSet<Dependency>, GraphError> {
        let mut roots = BTreeSet::new();
        let mut queue = VecDeque::new();
        for name in names {
            let dependency = self.find(name.as_ref())?;
            roots.insert(dependency.clone());
            queue.push_back(self.node_map[dependency]);
        }

        let mut seen: BTreeSet<NodeIndex> = queue.iter().copied().collect();
        let mut reachable = BTreeSet::new();
        while let Some(index) = queue.pop_front() {
            for neighbor in self.graph.neighbors_directed(index, Direction::Incoming) {
                if seen.insert(neighbor) {
                    reachable.insert(self.graph[neighbor].clone());
                    queue.push_back(neighbor);
                }
            }
        }

        Ok(reachable
            .into_iter()
            .filter(|dependency| !roots.contains(dependency))
            .collect())
    }

    /// Order `subset` so every dependency precedes everything that requires it
    ///
    /// Ties are broken by name, which makes the order stable across runs.
    pub fn build_order(&self, subset: &BTreeSet<Dependency>) -> Result<Vec<Dependency>, GraphError> {
        if let Some(cycle) = self.find_cycle() {
            return Err(GraphError::InternalCycle { cycle });
        }

        let members: BTreeSet<NodeIndex> = subset
            .iter()
            .filter_map(|dependency| self.node_map.get(dependency).copied())
            .collect();

        let mut pending: HashMap<NodeIndex, usize> = members
            .iter()
            .map(|&index| {
                let count = self
                    .graph
                    .neighbors_directed(index, Direction::Incoming)
                    .filter(|neighbor| members.contains(neighbor))
                    .count();
                (index, count)
            })
            .collect();

        let mut ready: BTreeSet<(Dependency, NodeIndex)> = pending
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(&index, _)| (self.graph[index].clone(), index))
            .collect();

        let mut order = Vec::with_capacity(members.len());
        while let Some((dependency, index)) = ready.pop_first() {
            for dependent in self.graph.neighbors_directed(index, Direction::Outgoing) {
                if let Some(count) = pending.get_mut(&dependent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.insert((self.graph[dependent].clone(), dependent));
                    }
                }
            }
            order.push(dependency);
        }

        Ok(order)
    }

    /// Named dependencies plus everything they need, in build order;
    /// every dependency when `names` is empty
    pub fn build_plan<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Dependency>, GraphError> {
        let subset: BTreeSet<Dependency> = if names.is_empty() {
            self.graph.node_weights().cloned().collect()
        } else {
            let mut subset = self.transitive_dependencies(names)?;
            for name in names {
                subset.insert(self.find(name.as_ref())?.clone());
            }
            subset
        };

        self.build_order(&subset)
    }

    /// Names in one strongly connected component, if any cycle exists
    fn find_cycle(&self) -> Option<Vec<String>> {
        if !is_cyclic_directed(&self.graph) {
            return None;
        }

        tarjan_scc(&self.graph)
            .into_iter()
            .find(|component| {
                component.len() > 1
                    || component
                        .first()
                        .is_some_and(|&index| self.graph.contains_edge(index, index))
            })
            .map(|component| {
                let mut names: Vec<String> = component
                    .into_iter()
                    .map(|index| self.graph[index].name().to_string())
                    .collect();
                names.sort();
                names
            })
    }
}

#[cfg(test)]
mod tests {
    include!("mod.test.rs");
}
