//! Dep-like deltas.
//!
//! The coarsest useful change description: either nothing changed, or here
//! is the whole new value. Stages that can say more (appended entries,
//! per-index edits, a signed difference) use their own delta types instead.

use serde::{Deserialize, Serialize};

/// Either `Unchanged` or `New(value)`.
///
/// Consumers only ever ask *whether* a value changed, never why.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Delta<V> {
    /// The value is the same as after the previous step.
    Unchanged,

    /// The value may have changed; this is its current value.
    New(V),
}

impl<V> Default for Delta<V> {
    fn default() -> Self {
        Self::Unchanged
    }
}

impl<V> Delta<V> {
    /// Whether this delta carries a new value.
    pub fn is_new(&self) -> bool {
        matches!(self, Self::New(_))
    }

    /// Whether this delta reports no change.
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }

    /// Borrow the new value, if any.
    pub fn as_ref(&self) -> Delta<&V> {
        match self {
            Self::Unchanged => Delta::Unchanged,
            Self::New(value) => Delta::New(value),
        }
    }

    /// Transform the new value, if any.
    pub fn map<U>(self, f: impl FnOnce(V) -> U) -> Delta<U> {
        match self {
            Self::Unchanged => Delta::Unchanged,
            Self::New(value) => Delta::New(f(value)),
        }
    }

    /// The new value, if any.
    pub fn into_new(self) -> Option<V> {
        match self {
            Self::Unchanged => None,
            Self::New(value) => Some(value),
        }
    }

    /// Apply this delta to `current`. Returns whether `current` was replaced.
    pub fn apply_to(self, current: &mut V) -> bool {
        match self {
            Self::Unchanged => false,
            Self::New(value) => {
                *current = value;
                true
            }
        }
    }
}

impl<V> From<Option<V>> for Delta<V> {
    fn from(value: Option<V>) -> Self {
        value.map_or(Self::Unchanged, Self::New)
    }
}
