//! Error Types
//!
//! Every failure in this crate is a violated precondition of a pure,
//! synchronous contract. None of them are retried: calling the same
//! operation again without changing what the caller does cannot succeed.
//!
//! The kinds are kept distinct so callers can tell "you misused the API"
//! (`InvalidWriteTarget`, `UnknownSource`, `PreconditionViolation`) apart
//! from "your graph is malformed" (`CyclicGraph`).
//!
//! Node identifiers are rendered with their `Debug` representation. This keeps
//! `Error` free of type parameters, so stage errors, graph errors and adapter
//! errors all compose through `?`.

use std::fmt::Debug;

use thiserror::Error;

/// Errors emitted by the pull engine, delta stages, the push graph and the
/// adapters between them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A write targeted a node that has a rule for computing it.
    #[error("cannot write to derived node {node}")]
    InvalidWriteTarget {
        /// The derived node that was written to.
        node: String,
    },

    /// A read reached a source node that was never written.
    #[error("source node {node} has no value")]
    UnknownSource {
        /// The source node that was missing.
        node: String,
    },

    /// `update` was called on a stage before its first `compute`.
    #[error("{stage}: update called before compute")]
    PreconditionViolation {
        /// Name of the stage whose contract was violated.
        stage: &'static str,
    },

    /// The dependency relation contains a cycle through `node`.
    #[error("dependency cycle detected at node {node}")]
    CyclicGraph {
        /// A node on the cycle.
        node: String,
    },

    /// A stage received a different number of positional inputs or deltas
    /// than it was computed with.
    #[error("{stage}: expected {expected} inputs, found {found}")]
    ArityMismatch {
        /// Name of the stage.
        stage: &'static str,
        /// Number of inputs recorded by `compute`.
        expected: usize,
        /// Number of inputs or deltas supplied.
        found: usize,
    },

    /// An edit addressed a position past the end of a stored sequence.
    #[error("edit index {index} out of range for sequence of length {len}")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Length of the stored sequence.
        len: usize,
    },

    /// A stage's result does not fit in its numeric type.
    #[error("{stage}: arithmetic overflow")]
    Overflow {
        /// Name of the stage.
        stage: &'static str,
    },

    /// A stage inside a push graph failed.
    #[error("node {node} failed: {source}")]
    Stage {
        /// The graph node whose stage failed.
        node: String,
        /// The stage's own error.
        #[source]
        source: Box<Error>,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub(crate) fn invalid_write_target<K: Debug>(node: &K) -> Self {
        Self::InvalidWriteTarget { node: format!("{node:?}") }
    }

    pub(crate) fn unknown_source<K: Debug>(node: &K) -> Self {
        Self::UnknownSource { node: format!("{node:?}") }
    }

    pub(crate) fn cyclic_graph<K: Debug>(node: &K) -> Self {
        Self::CyclicGraph { node: format!("{node:?}") }
    }

    pub(crate) fn in_stage<K: Debug>(node: &K, source: Error) -> Self {
        Self::Stage {
            node: format!("{node:?}"),
            source: Box::new(source),
        }
    }

    /// Strip push-graph context and return the error a stage raised itself.
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::Stage { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_include_node_debug_repr() {
        let err = Error::invalid_write_target(&"lib.a");
        assert_eq!(err.to_string(), "cannot write to derived node \"lib.a\"");

        let err = Error::unknown_source(&7u32);
        assert_eq!(err.to_string(), "source node 7 has no value");
    }

    #[test]
    fn root_cause_unwraps_nested_stage_errors() {
        let inner = Error::PreconditionViolation { stage: "Sum" };
        let err = Error::in_stage(&"outer", Error::in_stage(&"inner", inner.clone()));

        assert_eq!(err.root_cause(), &inner);
        assert!(err.to_string().starts_with("node \"outer\" failed"));
    }
}
