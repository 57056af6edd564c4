//! Concrete Stages
//!
//! Small stages with their own delta types. Each shows a different way an
//! update can be cheaper than a recompute:
//!
//! - [`FilterLog`] only looks at appended entries
//! - [`Sum`] turns each index edit into an O(1) adjustment of the total
//! - [`Log`] and [`Log1`] pass values through and remember everything they saw

use std::collections::HashMap;
use std::marker::PhantomData;

use super::Diffs;
use crate::error::{Error, Result};

/// Keeps the entries of an append-only log that satisfy a predicate.
///
/// `update` takes the entries appended since the last step and returns the
/// ones that pass. Removing or editing earlier entries cannot be expressed.
pub struct FilterLog<T, P> {
    predicate: P,
    computed: bool,
    _entries: PhantomData<fn(&T)>,
}

impl<T, P> FilterLog<T, P>
where
    P: Fn(&T) -> bool,
{
    /// Filter with `predicate`.
    pub fn new(predicate: P) -> Self {
        Self {
            predicate,
            computed: false,
            _entries: PhantomData,
        }
    }

    fn filter(&self, entries: Vec<T>) -> Vec<T> {
        entries.into_iter().filter(|x| (self.predicate)(x)).collect()
    }
}

impl<T, P> Diffs for FilterLog<T, P>
where
    P: Fn(&T) -> bool,
{
    type Input = Vec<T>;
    type Output = Vec<T>;
    type InputDelta = Vec<T>;
    type OutputDelta = Vec<T>;

    fn compute(&mut self, log: Vec<T>) -> Result<Vec<T>> {
        self.computed = true;
        Ok(self.filter(log))
    }

    fn update(&mut self, appended: Vec<T>) -> Result<Vec<T>> {
        if !self.computed {
            return Err(Error::PreconditionViolation { stage: "FilterLog" });
        }
        Ok(self.filter(appended))
    }
}

/// Running total of a sequence of integers.
///
/// `update` takes `(index, new_value)` edits and returns the signed change to
/// the total. The stored sequence is edited in place so later edits are
/// measured against the right old values.
#[derive(Debug, Clone, Default)]
pub struct Sum {
    entries: Option<Vec<i64>>,
}

impl Sum {
    /// A sum stage with no state yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored sequence, once computed.
    pub fn entries(&self) -> Option<&[i64]> {
        self.entries.as_deref()
    }
}

impl Diffs for Sum {
    type Input = Vec<i64>;
    type Output = i64;
    type InputDelta = Vec<(usize, i64)>;
    type OutputDelta = i64;

    /// Fails with [`Error::Overflow`] if the total does not fit in an `i64`.
    fn compute(&mut self, entries: Vec<i64>) -> Result<i64> {
        self.entries = None;
        let total: i128 = entries.iter().copied().map(i128::from).sum();
        let total = i64::try_from(total).map_err(|_| Error::Overflow { stage: "Sum" })?;
        self.entries = Some(entries);
        Ok(total)
    }

    fn update(&mut self, edits: Vec<(usize, i64)>) -> Result<i64> {
        let entries = self
            .entries
            .as_mut()
            .ok_or(Error::PreconditionViolation { stage: "Sum" })?;

        // Reject the whole batch before touching anything.
        let len = entries.len();
        if let Some(&(index, _)) = edits.iter().find(|(index, _)| *index >= len) {
            return Err(Error::IndexOutOfRange { index, len });
        }

        // Later edits to the same index see the earlier ones.
        let mut latest: HashMap<usize, i64> = HashMap::new();
        let mut diff: i128 = 0;
        for (index, new_value) in edits {
            let old_value = latest.insert(index, new_value).unwrap_or(entries[index]);
            diff += i128::from(new_value) - i128::from(old_value);
        }
        let diff = i64::try_from(diff).map_err(|_| Error::Overflow { stage: "Sum" })?;

        for (index, value) in latest {
            entries[index] = value;
        }
        Ok(diff)
    }
}

/// What a logging stage saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry<I, D> {
    /// Full input passed to `compute`.
    Computed(I),
    /// Delta passed to `update`.
    Updated(D),
}

/// Pass-through for a positional list of inputs; records everything.
#[derive(Debug, Clone)]
pub struct Log<T, D> {
    entries: Vec<LogEntry<Vec<T>, Vec<D>>>,
}

impl<T, D> Log<T, D> {
    /// An empty log.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Everything seen since the last `compute`, oldest first.
    pub fn entries(&self) -> &[LogEntry<Vec<T>, Vec<D>>] {
        &self.entries
    }
}

impl<T, D> Default for Log<T, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, D: Clone> Diffs for Log<T, D> {
    type Input = Vec<T>;
    type Output = Vec<T>;
    type InputDelta = Vec<D>;
    type OutputDelta = Vec<D>;

    fn compute(&mut self, inputs: Vec<T>) -> Result<Vec<T>> {
        self.entries = vec![LogEntry::Computed(inputs.clone())];
        Ok(inputs)
    }

    fn update(&mut self, deltas: Vec<D>) -> Result<Vec<D>> {
        if self.entries.is_empty() {
            return Err(Error::PreconditionViolation { stage: "Log" });
        }
        self.entries.push(LogEntry::Updated(deltas.clone()));
        Ok(deltas)
    }
}

/// Pass-through for a single input; records everything.
#[derive(Debug, Clone)]
pub struct Log1<T, D> {
    entries: Vec<LogEntry<T, D>>,
}

impl<T, D> Log1<T, D> {
    /// An empty log.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Everything seen since the last `compute`, oldest first.
    pub fn entries(&self) -> &[LogEntry<T, D>] {
        &self.entries
    }
}

impl<T, D> Default for Log1<T, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, D: Clone> Diffs for Log1<T, D> {
    type Input = T;
    type Output = T;
    type InputDelta = D;
    type OutputDelta = D;

    fn compute(&mut self, input: T) -> Result<T> {
        self.entries = vec![LogEntry::Computed(input.clone())];
        Ok(input)
    }

    fn update(&mut self, delta: D) -> Result<D> {
        if self.entries.is_empty() {
            return Err(Error::PreconditionViolation { stage: "Log1" });
        }
        self.entries.push(LogEntry::Updated(delta.clone()));
        Ok(delta)
    }
}
