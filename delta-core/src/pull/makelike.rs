//! Makelike Engine
//!
//! A pull-based, demand-driven evaluator in the style of Make.
//!
//! # How It Works
//!
//! 1. `write` stores a value on a source node and stamps it with a fresh
//!    version. Nothing else happens: derived nodes are not touched.
//!
//! 2. `read` brings the requested node up to date and returns its value.
//!
//! 3. Bringing a derived node up to date first brings every dependency up to
//!    date (depth-first, dependencies before dependents), then compares the
//!    dependency versions against the ones recorded at the node's last build.
//!
//! 4. The node is rebuilt iff it was never built or any dependency version
//!    differs. Otherwise the cached state is returned as is.
//!
//! # Why This Matters
//!
//! Work is only ever done along the dependency chains reachable from the
//! node being read. A write to a source that no read ever reaches costs
//! nothing beyond storing the value.

use std::collections::{HashMap, HashSet};

use smallvec::SmallVec;

use super::state::{BuildState, Clock, State, Version};
use super::Deps;
use crate::error::{Error, Result};
use crate::graph::{NodeGraph, NodeGraphBuilder, NodeKey, Rule};

/// A rule body for the pull engine: takes one value per dependency, in the
/// order the rule lists them, and returns the node's value.
pub type RuleFn<V> = Box<dyn Fn(&[&V]) -> V + Send + Sync>;

/// A node graph whose rules are plain functions.
pub type PullGraph<K, V> = NodeGraph<K, RuleFn<V>>;

impl<K: NodeKey, V> NodeGraphBuilder<K, RuleFn<V>> {
    /// Add a rule computing `node` by calling `function` on the values of
    /// `dependencies`.
    pub fn derive<F, I>(self, node: K, function: F, dependencies: I) -> Self
    where
        F: Fn(&[&V]) -> V + Send + Sync + 'static,
        I: IntoIterator<Item = K>,
    {
        self.rule(node, Box::new(function), dependencies)
    }
}

/// Demand-driven evaluator with version-based staleness tracking.
///
/// # Type Parameters
///
/// - `K`: node identifier.
/// - `V`: node value. One type for the whole graph; use an enum if nodes
///   hold different kinds of data.
///
/// # Example
///
/// ```rust,ignore
/// let graph = NodeGraph::builder()
///     .derive("foo.o", |deps| compile(deps[0]), ["foo.c"])
///     .derive("lib.a", |deps| link(deps), ["foo.o"])
///     .build()?;
///
/// let mut make = Makelike::new(graph);
/// make.write("foo.c", source)?;
/// let lib = make.read(&"lib.a")?;
/// ```
pub struct Makelike<K, V> {
    graph: PullGraph<K, V>,
    store: Store<K, V>,
}

/// Engine-owned mutable state, kept apart from the graph so traversal can
/// borrow rules while updating states.
struct Store<K, V> {
    states: HashMap<K, State<V>>,
    clock: Clock,
}

impl<K: NodeKey, V> Makelike<K, V> {
    /// Create an engine over `graph`. No node is computed until it is read.
    pub fn new(graph: PullGraph<K, V>) -> Self {
        Self {
            graph,
            store: Store {
                states: HashMap::new(),
                clock: Clock::default(),
            },
        }
    }

    /// The graph this engine evaluates.
    pub fn graph(&self) -> &PullGraph<K, V> {
        &self.graph
    }

    /// Store `value` on a source node.
    ///
    /// Fails with [`Error::InvalidWriteTarget`] if `node` has a rule.
    pub fn write(&mut self, node: K, value: V) -> Result<()> {
        if !self.graph.is_source(&node) {
            return Err(Error::invalid_write_target(&node));
        }
        let version = self.store.clock.tick();
        tracing::debug!(node = ?node, version = %version, "write");
        self.store.states.insert(node, State::source(value, version));
        Ok(())
    }

    /// Bring `node` up to date and borrow its value.
    pub fn read_ref(&mut self, node: &K) -> Result<&V> {
        tracing::trace!(node = ?node, "read");
        self.store.compute(&self.graph, node)?;
        self.store
            .states
            .get(node)
            .map(State::value)
            .ok_or_else(|| Error::unknown_source(node))
    }

    /// Bring `node` up to date and return a copy of its value.
    pub fn read(&mut self, node: &K) -> Result<V>
    where
        V: Clone,
    {
        self.read_ref(node).cloned()
    }

    /// Bring `node` up to date and return its version.
    pub fn compute(&mut self, node: &K) -> Result<Version> {
        self.store.compute(&self.graph, node)
    }

    /// The node's state as of its last write or build. Never recomputes.
    pub fn state(&self, node: &K) -> Option<&State<V>> {
        self.store.states.get(node)
    }

    /// The node's version as of its last write or build. Never recomputes.
    pub fn version(&self, node: &K) -> Option<Version> {
        self.state(node).map(State::version)
    }

    /// Whether the node has been written or built yet.
    pub fn build_state(&self, node: &K) -> BuildState {
        match self.version(node) {
            Some(version) => BuildState::Built(version),
            None => BuildState::Unbuilt,
        }
    }
}

impl<K: NodeKey, V> Store<K, V> {
    /// Bring `target` up to date, dependencies first.
    ///
    /// The walk keeps its own stack, so graph depth is not bounded by the
    /// thread's call stack.
    fn compute(&mut self, graph: &PullGraph<K, V>, target: &K) -> Result<Version> {
        // Derived nodes whose dependencies are still being brought up to date.
        let mut visiting: HashSet<K> = HashSet::new();
        let mut done: HashSet<K> = HashSet::new();
        let mut stack = vec![(target.clone(), false)];

        while let Some((node, expanded)) = stack.pop() {
            let Some(rule) = graph.rule(&node) else {
                if !self.states.contains_key(&node) {
                    return Err(Error::unknown_source(&node));
                }
                continue;
            };

            if expanded {
                visiting.remove(&node);
                self.refresh(&node, rule)?;
                done.insert(node);
                continue;
            }
            if done.contains(&node) {
                continue;
            }
            if !visiting.insert(node.clone()) {
                return Err(Error::cyclic_graph(&node));
            }

            stack.push((node, true));
            // Reversed so dependencies are visited in rule order.
            for dep in rule.dependencies().iter().rev() {
                if !done.contains(dep) {
                    stack.push((dep.clone(), false));
                }
            }
        }

        self.states
            .get(target)
            .map(State::version)
            .ok_or_else(|| Error::unknown_source(target))
    }

    /// Rebuild `node` unless its recorded dependency versions are current.
    /// Every dependency must already be up to date.
    fn refresh(&mut self, node: &K, rule: &Rule<K, RuleFn<V>>) -> Result<Version> {
        let dep_versions = rule
            .dependencies()
            .iter()
            .map(|dep| {
                self.states
                    .get(dep)
                    .map(State::version)
                    .ok_or_else(|| Error::unknown_source(dep))
            })
            .collect::<Result<SmallVec<[Version; 4]>>>()?;

        if let Some(state) = self.states.get(node) {
            if state.in_sync_with(&dep_versions) {
                tracing::trace!(node = ?node, version = %state.version(), "up to date");
                return Ok(state.version());
            }
        }

        let value = {
            let args = rule
                .dependencies()
                .iter()
                .map(|dep| {
                    self.states
                        .get(dep)
                        .map(State::value)
                        .ok_or_else(|| Error::unknown_source(dep))
                })
                .collect::<Result<SmallVec<[&V; 4]>>>()?;
            (rule.body())(&args)
        };

        let version = self.clock.tick();
        tracing::debug!(node = ?node, version = %version, "recomputed");
        self.states
            .insert(node.clone(), State::derived(value, version, dep_versions));
        Ok(version)
    }
}

impl<K: NodeKey, V: Clone> Deps<K, V> for Makelike<K, V> {
    fn read(&mut self, node: &K) -> Result<V> {
        Makelike::read(self, node)
    }

    fn write(&mut self, node: K, value: V) -> Result<()> {
        Makelike::write(self, node, value)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
