//! Generic Lifter
//!
//! Lifts an arbitrary function into a dep-like stage. The only strategy is
//! to rerun the function when any input changed, so it is always correct and
//! never cheaper than a recompute. It is the fallback for functions with no
//! better incremental strategy.
//!
//! Change detection is by delta tag only: a `New` delta counts as a change
//! even if it carries the value the stage already has.

use indexmap::IndexMap;

use super::{Delta, Diffs};
use crate::error::{Error, Result};

/// Reruns `F` over positional inputs whenever any of them changes.
pub struct Rerunner<V, F> {
    function: F,
    inputs: Option<Vec<V>>,
}

impl<V, F> Rerunner<V, F>
where
    F: Fn(&[V]) -> V,
{
    /// Lift `function`.
    pub fn new(function: F) -> Self {
        Self {
            function,
            inputs: None,
        }
    }

    /// Inputs as of the last compute or update.
    pub fn inputs(&self) -> Option<&[V]> {
        self.inputs.as_deref()
    }
}

impl<V, F> Diffs for Rerunner<V, F>
where
    F: Fn(&[V]) -> V,
{
    type Input = Vec<V>;
    type Output = V;
    type InputDelta = Vec<Delta<V>>;
    type OutputDelta = Delta<V>;

    fn compute(&mut self, inputs: Vec<V>) -> Result<V> {
        let output = (self.function)(&inputs);
        self.inputs = Some(inputs);
        Ok(output)
    }

    fn update(&mut self, deltas: Vec<Delta<V>>) -> Result<Delta<V>> {
        let inputs = self
            .inputs
            .as_mut()
            .ok_or(Error::PreconditionViolation { stage: "Rerunner" })?;
        if deltas.len() != inputs.len() {
            return Err(Error::ArityMismatch {
                stage: "Rerunner",
                expected: inputs.len(),
                found: deltas.len(),
            });
        }

        let mut changed = false;
        for (slot, delta) in inputs.iter_mut().zip(deltas) {
            changed |= delta.apply_to(slot);
        }

        if changed {
            Ok(Delta::New((self.function)(inputs.as_slice())))
        } else {
            Ok(Delta::Unchanged)
        }
    }
}

/// Reruns `F` over named inputs whenever any of them changes.
///
/// A delta for a name the stage has not seen adds that input.
pub struct NamedRerunner<V, F> {
    function: F,
    inputs: Option<IndexMap<String, V>>,
}

impl<V, F> NamedRerunner<V, F>
where
    F: Fn(&IndexMap<String, V>) -> V,
{
    /// Lift `function`.
    pub fn new(function: F) -> Self {
        Self {
            function,
            inputs: None,
        }
    }

    /// Inputs as of the last compute or update.
    pub fn inputs(&self) -> Option<&IndexMap<String, V>> {
        self.inputs.as_ref()
    }
}

impl<V, F> Diffs for NamedRerunner<V, F>
where
    F: Fn(&IndexMap<String, V>) -> V,
{
    type Input = IndexMap<String, V>;
    type Output = V;
    type InputDelta = IndexMap<String, Delta<V>>;
    type OutputDelta = Delta<V>;

    fn compute(&mut self, inputs: IndexMap<String, V>) -> Result<V> {
        let output = (self.function)(&inputs);
        self.inputs = Some(inputs);
        Ok(output)
    }

    fn update(&mut self, deltas: IndexMap<String, Delta<V>>) -> Result<Delta<V>> {
        let inputs = self
            .inputs
            .as_mut()
            .ok_or(Error::PreconditionViolation { stage: "NamedRerunner" })?;

        let mut changed = false;
        for (name, delta) in deltas {
            if let Delta::New(value) = delta {
                inputs.insert(name, value);
                changed = true;
            }
        }

        if changed {
            Ok(Delta::New((self.function)(&*inputs)))
        } else {
            Ok(Delta::Unchanged)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::indexmap;
    use std::cell::Cell;

    #[test]
    fn reruns_only_when_an_input_is_new() {
        let calls = Cell::new(0);
        let mut stage = Rerunner::new(|xs: &[i32]| {
            calls.set(calls.get() + 1);
            xs.iter().sum()
        });

        assert_eq!(stage.compute(vec![1, 2, 3]).unwrap(), 6);
        assert_eq!(
            stage.update(vec![Delta::Unchanged, Delta::Unchanged, Delta::Unchanged]).unwrap(),
            Delta::Unchanged
        );
        assert_eq!(calls.get(), 1);

        assert_eq!(
            stage.update(vec![Delta::Unchanged, Delta::New(10), Delta::Unchanged]).unwrap(),
            Delta::New(14)
        );
        assert_eq!(calls.get(), 2);
        assert_eq!(stage.inputs(), Some(&[1, 10, 3][..]));
    }

    #[test]
    fn new_with_same_value_still_reruns() {
        let mut stage = Rerunner::new(|xs: &[i32]| xs[0]);
        stage.compute(vec![4]).unwrap();

        assert_eq!(stage.update(vec![Delta::New(4)]).unwrap(), Delta::New(4));
    }

    #[test]
    fn matches_fresh_compute() {
        let f = |xs: &[i32]| xs[0] * 100 + xs[1];
        let mut warm = Rerunner::new(f);
        let mut output = warm.compute(vec![1, 2]).unwrap();
        for deltas in [
            vec![Delta::New(3), Delta::Unchanged],
            vec![Delta::Unchanged, Delta::Unchanged],
            vec![Delta::Unchanged, Delta::New(9)],
        ] {
            warm.update(deltas).unwrap().apply_to(&mut output);
        }

        assert_eq!(Rerunner::new(f).compute(vec![3, 9]).unwrap(), output);
    }

    #[test]
    fn arity_mismatch_is_reported() {
        let mut stage = Rerunner::new(|xs: &[i32]| xs.len() as i32);
        stage.compute(vec![1, 2]).unwrap();

        assert_eq!(
            stage.update(vec![Delta::New(1)]),
            Err(Error::ArityMismatch { stage: "Rerunner", expected: 2, found: 1 })
        );
    }

    #[test]
    fn update_before_compute_fails() {
        let mut stage = Rerunner::new(|xs: &[i32]| xs[0]);
        assert!(matches!(
            stage.update(vec![Delta::New(1)]),
            Err(Error::PreconditionViolation { .. })
        ));
    }

    #[test]
    fn named_inputs() {
        let mut stage = NamedRerunner::new(|inputs: &IndexMap<String, i32>| {
            inputs["width"] * inputs["height"]
        });

        let area = stage
            .compute(indexmap! { "width".to_string() => 3, "height".to_string() => 4 })
            .unwrap();
        assert_eq!(area, 12);

        let unchanged = stage
            .update(indexmap! { "width".to_string() => Delta::Unchanged })
            .unwrap();
        assert_eq!(unchanged, Delta::Unchanged);

        let resized = stage
            .update(indexmap! { "height".to_string() => Delta::New(5) })
            .unwrap();
        assert_eq!(resized, Delta::New(15));
    }
}
