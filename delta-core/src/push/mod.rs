//! Push Engine
//!
//! Delta propagation: a stage is computed once from full inputs, then fed a
//! sequence of input deltas and answers each with an output delta.
//!
//! # Concepts
//!
//! ## Stages
//!
//! A [`Diffs`] implementation is a stateful transformation with a two-phase
//! contract:
//!
//! - `compute(input) -> output` establishes the stage's internal state
//! - `update(delta) -> output_delta` advances it
//!
//! `update` before the first `compute` fails with
//! [`Error::PreconditionViolation`](crate::Error::PreconditionViolation).
//! Calling `compute` again is a cold restart.
//!
//! ## The consistency law
//!
//! `compute(i0)` followed by `update(d1) .. update(dn)` must leave the stage
//! reporting the same output as a fresh `compute` on `i0` with every delta
//! applied. For dep-like stages this means a stage may report `New` when
//! nothing changed, but must never report `Unchanged` when something did.
//!
//! ## Composition
//!
//! Stages compose with [`Pipeline`], [`Fork`] and [`Parallel`], or into an
//! arbitrary DAG with [`Graph`].

pub mod combinators;
mod delta;
pub mod graph;
mod rerunner;
pub mod stages;

pub use combinators::{Fork, Parallel, Pipeline};
pub use delta::Delta;
pub use graph::{BoxedStage, Graph, Unary};
pub use rerunner::{NamedRerunner, Rerunner};
pub use stages::{FilterLog, Log, Log1, LogEntry, Sum};

use crate::error::Result;

/// A stateful transformation with a cold `compute` and a warm `update`.
pub trait Diffs {
    /// Full input accepted by `compute`.
    type Input;
    /// Full output returned by `compute`.
    type Output;
    /// Change description accepted by `update`.
    type InputDelta;
    /// Change description returned by `update`.
    type OutputDelta;

    /// Establish internal state from full inputs and return the full output.
    fn compute(&mut self, input: Self::Input) -> Result<Self::Output>;

    /// Advance internal state by `delta` and describe how the output changed.
    fn update(&mut self, delta: Self::InputDelta) -> Result<Self::OutputDelta>;
}

impl<S: Diffs + ?Sized> Diffs for Box<S> {
    type Input = S::Input;
    type Output = S::Output;
    type InputDelta = S::InputDelta;
    type OutputDelta = S::OutputDelta;

    fn compute(&mut self, input: Self::Input) -> Result<Self::Output> {
        (**self).compute(input)
    }

    fn update(&mut self, delta: Self::InputDelta) -> Result<Self::OutputDelta> {
        (**self).update(delta)
    }
}

/// Builder-style composition for any stage.
pub trait DiffsExt: Diffs + Sized {
    /// Feed this stage's output into `next`.
    fn then<B>(self, next: B) -> Pipeline<Self, B>
    where
        B: Diffs<Input = Self::Output, InputDelta = Self::OutputDelta>,
    {
        Pipeline::new(self, next)
    }

    /// Feed this stage's output into both `left` and `right`.
    fn fork<G, H>(self, left: G, right: H) -> Fork<Self, G, H>
    where
        G: Diffs<Input = Self::Output, InputDelta = Self::OutputDelta>,
        H: Diffs<Input = Self::Output, InputDelta = Self::OutputDelta>,
        Self::Output: Clone,
        Self::OutputDelta: Clone,
    {
        Fork::new(self, left, right)
    }

    /// Run this stage side by side with `other`.
    fn zip<G: Diffs>(self, other: G) -> Parallel<Self, G> {
        Parallel::new(self, other)
    }
}

impl<S: Diffs> DiffsExt for S {}
