//! Push Graph
//!
//! Generalizes the combinators to an arbitrary DAG of stages wired by named
//! edges.
//!
//! # How It Works
//!
//! 1. The graph is a [`NodeGraph`] whose rule bodies are boxed stages. Its
//!    topological order is computed once, at construction, and never changes.
//!
//! 2. `compute` seeds a result table with the source values, then walks the
//!    order calling each stage's `compute` on its dependencies' results.
//!
//! 3. `update` makes the identical walk calling `update`, so each stage sees
//!    the deltas its dependencies produced in the same pass.
//!
//! Every stage in one graph shares a value type `V` and a delta type `D`.
//! Stages take their dependencies positionally, as `Vec<V>` / `Vec<D>` in
//! the order the rule lists them; [`Unary`] adapts single-input stages.

use indexmap::IndexMap;

use super::Diffs;
use crate::error::{Error, Result};
use crate::graph::{NodeGraph, NodeGraphBuilder, NodeKey};

/// A type-erased stage that fits into a [`Graph`] node.
pub type BoxedStage<V, D> = Box<dyn Diffs<Input = Vec<V>, Output = V, InputDelta = Vec<D>, OutputDelta = D>>;

impl<K: NodeKey, V, D> NodeGraphBuilder<K, BoxedStage<V, D>> {
    /// Add a node computed by `stage` from `dependencies`.
    pub fn stage<S, I>(self, node: K, stage: S, dependencies: I) -> Self
    where
        S: Diffs<Input = Vec<V>, Output = V, InputDelta = Vec<D>, OutputDelta = D> + 'static,
        I: IntoIterator<Item = K>,
    {
        self.rule(node, Box::new(stage), dependencies)
    }
}

/// A static DAG of stages evaluated in topological order.
///
/// `Graph` is itself a stage: its input is a table of source values, its
/// output a table of every node's value, and likewise for deltas.
pub struct Graph<K, V, D> {
    graph: NodeGraph<K, BoxedStage<V, D>>,
    computed: bool,
}

impl<K: NodeKey, V, D> Graph<K, V, D> {
    /// Wrap a validated node graph.
    pub fn new(graph: NodeGraph<K, BoxedStage<V, D>>) -> Self {
        Self {
            graph,
            computed: false,
        }
    }

    /// The fixed evaluation order of derived nodes.
    pub fn order(&self) -> &[K] {
        self.graph.order()
    }

    /// Whether `compute` has completed at least once.
    pub fn is_computed(&self) -> bool {
        self.computed
    }
}

impl<K, V, D> Diffs for Graph<K, V, D>
where
    K: NodeKey,
    V: Clone,
    D: Clone + Default,
{
    type Input = IndexMap<K, V>;
    type Output = IndexMap<K, V>;
    type InputDelta = IndexMap<K, D>;
    type OutputDelta = IndexMap<K, D>;

    /// Fails with [`Error::UnknownSource`] if a dependency is neither a
    /// derived node nor one of `sources`.
    fn compute(&mut self, sources: IndexMap<K, V>) -> Result<IndexMap<K, V>> {
        tracing::debug!(sources = sources.len(), nodes = self.graph.order().len(), "graph compute");
        self.computed = false;

        let mut results = sources;
        let (order, rules) = self.graph.order_and_rules_mut();
        for node in order {
            let Some(rule) = rules.get_mut(node) else {
                continue;
            };
            let inputs = rule
                .dependencies()
                .iter()
                .map(|dep| results.get(dep).cloned().ok_or_else(|| Error::unknown_source(dep)))
                .collect::<Result<Vec<V>>>()?;

            tracing::trace!(node = ?node, "compute");
            let output = rule
                .body_mut()
                .compute(inputs)
                .map_err(|err| Error::in_stage(node, err))?;
            results.insert(node.clone(), output);
        }

        self.computed = true;
        Ok(results)
    }

    /// A source missing from `deltas` is treated as `D::default()`, which for
    /// every delta type in this crate means "no change".
    fn update(&mut self, deltas: IndexMap<K, D>) -> Result<IndexMap<K, D>> {
        if !self.computed {
            return Err(Error::PreconditionViolation { stage: "Graph" });
        }
        tracing::debug!(deltas = deltas.len(), nodes = self.graph.order().len(), "graph update");

        let mut results = deltas;
        let (order, rules) = self.graph.order_and_rules_mut();
        for node in order {
            let Some(rule) = rules.get_mut(node) else {
                continue;
            };
            let inputs: Vec<D> = rule
                .dependencies()
                .iter()
                .map(|dep| results.get(dep).cloned().unwrap_or_default())
                .collect();

            tracing::trace!(node = ?node, "update");
            let output = rule
                .body_mut()
                .update(inputs)
                .map_err(|err| Error::in_stage(node, err))?;
            results.insert(node.clone(), output);
        }

        Ok(results)
    }
}

/// Adapts a single-input stage to the positional convention of [`Graph`].
///
/// Fails with [`Error::ArityMismatch`] unless given exactly one input.
#[derive(Debug, Clone, Default)]
pub struct Unary<S> {
    inner: S,
}

impl<S> Unary<S> {
    /// Wrap `inner`.
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// The wrapped stage.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

fn single<T>(mut items: Vec<T>) -> Result<T> {
    match items.len() {
        1 => Ok(items.remove(0)),
        found => Err(Error::ArityMismatch {
            stage: "Unary",
            expected: 1,
            found,
        }),
    }
}

impl<S: Diffs> Diffs for Unary<S> {
    type Input = Vec<S::Input>;
    type Output = S::Output;
    type InputDelta = Vec<S::InputDelta>;
    type OutputDelta = S::OutputDelta;

    fn compute(&mut self, inputs: Self::Input) -> Result<Self::Output> {
        self.inner.compute(single(inputs)?)
    }

    fn update(&mut self, deltas: Self::InputDelta) -> Result<Self::OutputDelta> {
        self.inner.update(single(deltas)?)
    }
}
