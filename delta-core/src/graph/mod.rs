//! Dependency Graph
//!
//! This module implements the static node graph shared by both evaluators.
//!
//! # Overview
//!
//! The dependency graph is a directed acyclic graph (DAG) where:
//!
//! - Nodes are identified by any [`NodeKey`]
//! - A node with a [`Rule`] is *derived*; every other node is a *source*
//! - Edges run from each dependency listed in a rule to the rule's node
//!
//! The graph is built once through [`NodeGraphBuilder`] and is immutable
//! afterwards. Construction computes a topological order of the derived
//! nodes and refuses to build a cyclic graph.
//!
//! # Design Decisions
//!
//! 1. The rule body is a type parameter. The pull engine stores plain
//!    functions, the push graph stores stateful delta stages, and both share
//!    the same validation and ordering code.
//!
//! 2. Rules live in an `IndexMap`, so iteration and scheduling follow
//!    insertion order and are deterministic run to run.

mod node;
mod scheduler;

use indexmap::{IndexMap, IndexSet};

pub use node::{Dependencies, NodeKey, NodeKind, Rule};
use scheduler::topological_order;

use crate::error::Result;

/// A validated, acyclic mapping from node ids to rules.
pub struct NodeGraph<K, R> {
    rules: IndexMap<K, Rule<K, R>>,
    sources: IndexSet<K>,
    order: Vec<K>,
}

impl<K: NodeKey, R> NodeGraph<K, R> {
    /// Start building a graph.
    pub fn builder() -> NodeGraphBuilder<K, R> {
        NodeGraphBuilder::default()
    }

    /// Whether `node` is a source or derived node. Unknown ids are sources.
    pub fn kind(&self, node: &K) -> NodeKind {
        if self.rules.contains_key(node) {
            NodeKind::Derived
        } else {
            NodeKind::Source
        }
    }

    /// Whether `node` has no rule.
    pub fn is_source(&self, node: &K) -> bool {
        self.kind(node) == NodeKind::Source
    }

    /// The rule for building `node`, if it is derived.
    pub fn rule(&self, node: &K) -> Option<&Rule<K, R>> {
        self.rules.get(node)
    }

    /// The evaluation order alongside mutable access to the rules, so a
    /// caller can walk one while updating the other.
    pub(crate) fn order_and_rules_mut(&mut self) -> (&[K], &mut IndexMap<K, Rule<K, R>>) {
        (&self.order, &mut self.rules)
    }

    /// All derived nodes in dependency order.
    pub fn order(&self) -> &[K] {
        &self.order
    }

    /// Every source the graph knows about: explicitly declared ones first,
    /// then ones that only appear as dependencies.
    pub fn sources(&self) -> impl Iterator<Item = &K> {
        let referenced = self
            .rules
            .values()
            .flat_map(|rule| rule.dependencies())
            .filter(move |dep| !self.rules.contains_key(*dep) && !self.sources.contains(*dep));
        let mut seen = IndexSet::new();
        self.sources.iter().chain(referenced.filter(move |dep| seen.insert(*dep)))
    }

    /// Number of derived nodes.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl<K: NodeKey, R> std::fmt::Debug for NodeGraph<K, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeGraph")
            .field("rules", &self.rules)
            .field("sources", &self.sources)
            .field("order", &self.order)
            .finish()
    }
}

/// Builder for [`NodeGraph`].
///
/// ```rust,ignore
/// let graph = NodeGraph::builder()
///     .source("foo.c")
///     .rule("foo.o", compile, ["foo.c"])
///     .rule("lib.a", link, ["foo.o"])
///     .build()?;
/// ```
pub struct NodeGraphBuilder<K, R> {
    rules: IndexMap<K, Rule<K, R>>,
    sources: IndexSet<K>,
}

impl<K, R> Default for NodeGraphBuilder<K, R> {
    fn default() -> Self {
        Self {
            rules: IndexMap::new(),
            sources: IndexSet::new(),
        }
    }
}

impl<K: NodeKey, R> NodeGraphBuilder<K, R> {
    /// Declare a source node. Declaring sources is optional: any id without a
    /// rule is a source.
    pub fn source(mut self, node: K) -> Self {
        if !self.rules.contains_key(&node) {
            self.sources.insert(node);
        }
        self
    }

    /// Add a rule computing `node` from `dependencies` (in order).
    ///
    /// A second rule for the same node replaces the first.
    pub fn rule<I>(mut self, node: K, body: R, dependencies: I) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        self.sources.shift_remove(&node);
        if self.rules.contains_key(&node) {
            tracing::warn!(node = ?node, "replacing existing rule");
        }
        self.rules.insert(node, Rule::new(body, dependencies));
        self
    }

    /// Validate the graph and compute its topological order.
    pub fn build(self) -> Result<NodeGraph<K, R>> {
        let order = topological_order(&self.rules, self.rules.keys())?;
        tracing::debug!(
            rules = self.rules.len(),
            sources = self.sources.len(),
            "built node graph"
        );
        Ok(NodeGraph {
            rules: self.rules,
            sources: self.sources,
            order,
        })
    }
}
