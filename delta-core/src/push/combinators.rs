//! Stage Combinators
//!
//! Algebraic composition of stages. Each combinator is itself a [`Diffs`],
//! so they nest freely.
//!
//! ```text
//! Pipeline:  a --> b
//!
//! Fork:      f --> g
//!             \
//!              --> h
//!
//! Parallel:  f
//!            g        (no data dependency)
//! ```

use super::Diffs;
use crate::error::Result;

/// Sequential composition: the output of `first` is the input of `second`.
///
/// `update` always runs both stages, even when `first` reports no change;
/// each stage is trusted to describe its own output correctly. Longer
/// pipelines are built by chaining, see [`DiffsExt::then`](super::DiffsExt::then).
#[derive(Debug, Clone)]
pub struct Pipeline<A, B> {
    first: A,
    second: B,
}

impl<A, B> Pipeline<A, B>
where
    A: Diffs,
    B: Diffs<Input = A::Output, InputDelta = A::OutputDelta>,
{
    /// Compose `first` then `second`.
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    /// Split back into the two stages.
    pub fn into_parts(self) -> (A, B) {
        (self.first, self.second)
    }

    /// The upstream stage.
    pub fn first(&self) -> &A {
        &self.first
    }

    /// The downstream stage.
    pub fn second(&self) -> &B {
        &self.second
    }
}

impl<A, B> Diffs for Pipeline<A, B>
where
    A: Diffs,
    B: Diffs<Input = A::Output, InputDelta = A::OutputDelta>,
{
    type Input = A::Input;
    type Output = B::Output;
    type InputDelta = A::InputDelta;
    type OutputDelta = B::OutputDelta;

    fn compute(&mut self, input: Self::Input) -> Result<Self::Output> {
        let intermediate = self.first.compute(input)?;
        self.second.compute(intermediate)
    }

    fn update(&mut self, delta: Self::InputDelta) -> Result<Self::OutputDelta> {
        let intermediate = self.first.update(delta)?;
        self.second.update(intermediate)
    }
}

/// One producer feeding two independent consumers.
///
/// The result is the pair of consumer outputs (or deltas).
#[derive(Debug, Clone)]
pub struct Fork<F, G, H> {
    source: F,
    left: G,
    right: H,
}

impl<F, G, H> Fork<F, G, H>
where
    F: Diffs,
    F::Output: Clone,
    F::OutputDelta: Clone,
    G: Diffs<Input = F::Output, InputDelta = F::OutputDelta>,
    H: Diffs<Input = F::Output, InputDelta = F::OutputDelta>,
{
    /// Feed `source` into both `left` and `right`.
    pub fn new(source: F, left: G, right: H) -> Self {
        Self {
            source,
            left,
            right,
        }
    }

    /// The shared producer.
    pub fn source(&self) -> &F {
        &self.source
    }

    /// The two consumers.
    pub fn branches(&self) -> (&G, &H) {
        (&self.left, &self.right)
    }
}

impl<F, G, H> Diffs for Fork<F, G, H>
where
    F: Diffs,
    F::Output: Clone,
    F::OutputDelta: Clone,
    G: Diffs<Input = F::Output, InputDelta = F::OutputDelta>,
    H: Diffs<Input = F::Output, InputDelta = F::OutputDelta>,
{
    type Input = F::Input;
    type Output = (G::Output, H::Output);
    type InputDelta = F::InputDelta;
    type OutputDelta = (G::OutputDelta, H::OutputDelta);

    fn compute(&mut self, input: Self::Input) -> Result<Self::Output> {
        let intermediate = self.source.compute(input)?;
        let left = self.left.compute(intermediate.clone())?;
        let right = self.right.compute(intermediate)?;
        Ok((left, right))
    }

    fn update(&mut self, delta: Self::InputDelta) -> Result<Self::OutputDelta> {
        let intermediate = self.source.update(delta)?;
        let left = self.left.update(intermediate.clone())?;
        let right = self.right.update(intermediate)?;
        Ok((left, right))
    }
}

/// Two independent stages run side by side on a pair of inputs.
#[derive(Debug, Clone)]
pub struct Parallel<F, G> {
    left: F,
    right: G,
}

impl<F: Diffs, G: Diffs> Parallel<F, G> {
    /// Pair `left` with `right`.
    pub fn new(left: F, right: G) -> Self {
        Self { left, right }
    }

    /// The two stages.
    pub fn stages(&self) -> (&F, &G) {
        (&self.left, &self.right)
    }
}

impl<F: Diffs, G: Diffs> Diffs for Parallel<F, G> {
    type Input = (F::Input, G::Input);
    type Output = (F::Output, G::Output);
    type InputDelta = (F::InputDelta, G::InputDelta);
    type OutputDelta = (F::OutputDelta, G::OutputDelta);

    fn compute(&mut self, (left, right): Self::Input) -> Result<Self::Output> {
        Ok((self.left.compute(left)?, self.right.compute(right)?))
    }

    fn update(&mut self, (left, right): Self::InputDelta) -> Result<Self::OutputDelta> {
        Ok((self.left.update(left)?, self.right.update(right)?))
    }
}
