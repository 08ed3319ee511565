//! ComponentGraph - the immutable component dependency graph.
//!
//! Built in one pass from a [`NormalizedConfig`]; once created it is
//! read-only. Construction checks that every requirement resolves and
//! that the requirement relation is acyclic.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::core::component::{Component, ComponentId, ExternalRef, TEMPLATES};
use crate::core::config::NormalizedConfig;
use crate::core::error::RecipeError;
use crate::core::platform::PlatformFacts;

/// All components published for one configuration.
#[derive(Debug, Clone)]
pub struct ComponentGraph {
    components: BTreeMap<ComponentId, Component>,
    /// Dependencies before dependents
    order: Vec<ComponentId>,
}

impl ComponentGraph {
    /// Build the graph for a validated configuration.
    pub fn build(config: &NormalizedConfig, platform: &PlatformFacts) -> Result<Self, RecipeError> {
        let components: BTreeMap<ComponentId, Component> = TEMPLATES
            .iter()
            .filter(|t| t.when.holds(config))
            .map(|t| (t.id, Component::from_template(t, config, platform)))
            .collect();

        let graph = Self::from_components(components)?;
        tracing::debug!(
            "component graph: {} component(s), order: {}",
            graph.len(),
            graph
                .order
                .iter()
                .map(|id| id.as_str())
                .collect::<Vec<_>>()
                .join(" -> ")
        );
        Ok(graph)
    }

    /// Assemble a graph from finished components, checking invariants.
    pub(crate) fn from_components(
        components: BTreeMap<ComponentId, Component>,
    ) -> Result<Self, RecipeError> {
        let order = check_invariants(&components)?;
        Ok(ComponentGraph { components, order })
    }

    pub fn get(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(&id)
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.components.contains_key(&id)
    }

    /// Components in lexical order of their identifiers.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.components.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Components ordered so that every component follows what it requires.
    pub fn topological_order(&self) -> &[ComponentId] {
        &self.order
    }

    /// Every component reachable from `id`, excluding `id` itself.
    pub fn transitive_requirements(&self, id: ComponentId) -> BTreeSet<ComponentId> {
        let mut visited = BTreeSet::new();
        let mut stack = vec![id];

        while let Some(current) = stack.pop() {
            if let Some(component) = self.components.get(&current) {
                for dep in component.required_components() {
                    if visited.insert(dep) {
                        stack.push(dep);
                    }
                }
            }
        }

        visited.remove(&id);
        visited
    }

    /// External references used anywhere in the graph.
    pub fn external_refs(&self) -> BTreeSet<&ExternalRef> {
        self.components
            .values()
            .flat_map(|c| c.external_requirements())
            .collect()
    }

    /// Library names ordered for a single-pass linker: dependents first.
    pub fn link_order(&self) -> Vec<&str> {
        self.order
            .iter()
            .rev()
            .filter_map(|id| self.components.get(id))
            .flat_map(|c| c.libs().iter().map(|s| s.as_str()))
            .collect()
    }
}

/// Check that requirements resolve and form a DAG; return a
/// dependencies-first order.
fn check_invariants(
    components: &BTreeMap<ComponentId, Component>,
) -> Result<Vec<ComponentId>, RecipeError> {
    let mut graph: DiGraph<ComponentId, ()> = DiGraph::new();
    let nodes: HashMap<ComponentId, NodeIndex> = components
        .keys()
        .map(|&id| (id, graph.add_node(id)))
        .collect();

    for component in components.values() {
        for dep in component.required_components() {
            let to = nodes.get(&dep).ok_or_else(|| {
                RecipeError::InvariantViolation(format!(
                    "`{}` requires `{}`, which is not part of the graph",
                    component.id(),
                    dep
                ))
            })?;
            graph.add_edge(nodes[&component.id()], *to, ());
        }
    }

    // Edges point from dependent to dependency, so toposort yields
    // dependents first.
    let sorted = toposort(&graph, None).map_err(|cycle| {
        RecipeError::InvariantViolation(format!(
            "requirement cycle through `{}`",
            graph[cycle.node_id()]
        ))
    })?;

    Ok(sorted.into_iter().rev().map(|n| graph[n]).collect())
}
