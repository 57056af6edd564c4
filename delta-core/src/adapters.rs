//! Bridging Adapters
//!
//! Lifting a pull engine into a delta stage, and a delta stage into a pull
//! engine. Neither direction is lossless.
//!
//! # What Gets Lost
//!
//! [`PushFromPull`] wraps a [`Deps`] behind [`Diffs`]. A pull engine can
//! say what a value *is* but not whether it *changed*, so every `update`
//! reports `New(value)`, even when the value is identical to the previous
//! one. Downstream stages that short-circuit on `Unchanged` never get to.
//!
//! [`PullFromPush`] wraps a [`Diffs`] behind [`Deps`]. A stage has no notion
//! of demand: every `read` runs the stage over all of its pending inputs, and
//! the key passed to `read` is ignored because the stage has exactly one
//! output. Incrementality survives (the stage keeps its internal state
//! between reads) but reading "just one output" does not.
//!
//! Exposing several independently demandable outputs would need stages that
//! return a map keyed by output name, with demand tracked per key. That is
//! not supported; single-output stages are the contract.

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::graph::NodeKey;
use crate::pull::Deps;
use crate::push::{Delta, Diffs};

enum Buffer<K, V> {
    /// Before the first read: raw input values for `compute`.
    Cold(IndexMap<K, V>),

    /// After the first read: one delta per known input, plus the last output.
    Warm {
        pending: IndexMap<K, Delta<V>>,
        output: V,
    },
}

/// A dep-like stage with named inputs and one output, behind `read`/`write`.
pub struct PullFromPush<K, V, S> {
    stage: S,
    buffer: Buffer<K, V>,
}

impl<K, V, S> PullFromPush<K, V, S>
where
    K: NodeKey,
    V: Clone,
    S: Diffs<Input = IndexMap<K, V>, Output = V, InputDelta = IndexMap<K, Delta<V>>, OutputDelta = Delta<V>>,
{
    /// Wrap a stage that has not been computed yet.
    pub fn new(stage: S) -> Self {
        Self {
            stage,
            buffer: Buffer::Cold(IndexMap::new()),
        }
    }

    /// Whether the first read has happened.
    pub fn is_initialized(&self) -> bool {
        matches!(self.buffer, Buffer::Warm { .. })
    }

    /// The wrapped stage.
    pub fn stage(&self) -> &S {
        &self.stage
    }

    /// Unwrap the stage.
    pub fn into_inner(self) -> S {
        self.stage
    }
}

impl<K, V, S> Deps<K, V> for PullFromPush<K, V, S>
where
    K: NodeKey,
    V: Clone,
    S: Diffs<Input = IndexMap<K, V>, Output = V, InputDelta = IndexMap<K, Delta<V>>, OutputDelta = Delta<V>>,
{
    /// The key is ignored; the stage has one output.
    fn read(&mut self, _node: &K) -> Result<V> {
        match &mut self.buffer {
            Buffer::Cold(inputs) => {
                tracing::debug!(inputs = inputs.len(), "pull-from-push compute");
                let output = self.stage.compute(inputs.clone())?;
                let pending = inputs
                    .keys()
                    .map(|key| (key.clone(), Delta::Unchanged))
                    .collect();
                self.buffer = Buffer::Warm {
                    pending,
                    output: output.clone(),
                };
                Ok(output)
            }
            Buffer::Warm { pending, output } => {
                let dirty = pending.values().filter(|delta| delta.is_new()).count();
                tracing::debug!(dirty, "pull-from-push update");
                let delta = self.stage.update(pending.clone())?;
                delta.apply_to(output);
                pending.values_mut().for_each(|delta| *delta = Delta::Unchanged);
                Ok(output.clone())
            }
        }
    }

    /// Buffers `value` until the next read. Never fails.
    fn write(&mut self, node: K, value: V) -> Result<()> {
        match &mut self.buffer {
            Buffer::Cold(inputs) => {
                inputs.insert(node, value);
            }
            Buffer::Warm { pending, .. } => {
                pending.insert(node, Delta::New(value));
            }
        }
        Ok(())
    }
}

/// One target of a pull engine, behind `compute`/`update`.
///
/// Inputs are named by the pull engine's source nodes.
pub struct PushFromPull<K, V, D> {
    deps: D,
    target: K,
    computed: bool,
    _values: std::marker::PhantomData<fn() -> V>,
}

impl<K, V, D> PushFromPull<K, V, D>
where
    K: NodeKey,
    D: Deps<K, V>,
{
    /// Treat `target` as the single output of `deps`.
    pub fn new(deps: D, target: K) -> Self {
        Self {
            deps,
            target,
            computed: false,
            _values: std::marker::PhantomData,
        }
    }

    /// The node read as output.
    pub fn target(&self) -> &K {
        &self.target
    }

    /// The wrapped engine.
    pub fn deps(&self) -> &D {
        &self.deps
    }

    /// Unwrap the engine.
    pub fn into_inner(self) -> D {
        self.deps
    }
}

impl<K, V, D> Diffs for PushFromPull<K, V, D>
where
    K: NodeKey,
    D: Deps<K, V>,
{
    type Input = IndexMap<K, V>;
    type Output = V;
    type InputDelta = IndexMap<K, Delta<V>>;
    type OutputDelta = Delta<V>;

    fn compute(&mut self, inputs: IndexMap<K, V>) -> Result<V> {
        tracing::debug!(node = ?self.target, inputs = inputs.len(), "push-from-pull compute");
        for (node, value) in inputs {
            self.deps.write(node, value)?;
        }
        let output = self.deps.read(&self.target)?;
        self.computed = true;
        Ok(output)
    }

    /// Always `New`: the pull engine cannot say whether the target changed.
    fn update(&mut self, deltas: IndexMap<K, Delta<V>>) -> Result<Delta<V>> {
        if !self.computed {
            return Err(Error::PreconditionViolation { stage: "PushFromPull" });
        }
        tracing::debug!(node = ?self.target, deltas = deltas.len(), "push-from-pull update");
        for (node, delta) in deltas {
            if let Delta::New(value) = delta {
                self.deps.write(node, value)?;
            }
        }
        self.deps.read(&self.target).map(Delta::New)
    }
}
