//! Node State
//!
//! Per-node bookkeeping for the pull engine.
//!
//! # Versions
//!
//! Staleness is decided by comparing versions, never values. Each engine owns
//! a [`Clock`]; every write and every recompute takes the next tick, so a new
//! version is strictly greater than every version the engine has issued.
//!
//! A derived node remembers the versions its dependencies had when it was
//! last built. It is in sync iff those recorded versions equal the
//! dependencies' current versions.
//!
//! The tradeoff: writing a value and then writing the old value back still
//! counts as a change. Detecting that would need a value comparison on every
//! write, which this engine does not do.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A point on an engine's logical clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version(u64);

impl Version {
    /// Get the raw clock value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Monotonic version source owned by one engine instance.
#[derive(Debug, Default)]
pub(crate) struct Clock {
    next: u64,
}

impl Clock {
    /// Issue a version strictly greater than every earlier one.
    pub(crate) fn tick(&mut self) -> Version {
        let version = Version(self.next);
        self.next += 1;
        version
    }
}

/// Build status of a node, for inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    /// Never written (source) or never computed (derived).
    Unbuilt,

    /// Holds a value stamped with this version.
    Built(Version),
}

/// The current state associated with a node.
#[derive(Debug, Clone)]
pub struct State<V> {
    /// Current value.
    value: V,

    /// When this value was written or computed.
    version: Version,

    /// Versions of each dependency used to compute `value`, in the order the
    /// rule lists them. Empty for sources.
    dep_versions: SmallVec<[Version; 4]>,
}

impl<V> State<V> {
    pub(crate) fn source(value: V, version: Version) -> Self {
        Self {
            value,
            version,
            dep_versions: SmallVec::new(),
        }
    }

    pub(crate) fn derived(value: V, version: Version, dep_versions: SmallVec<[Version; 4]>) -> Self {
        Self {
            value,
            version,
            dep_versions,
        }
    }

    /// The node's current value.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// The node's current version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Dependency versions recorded at the last build.
    pub fn dep_versions(&self) -> &[Version] {
        &self.dep_versions
    }

    /// Whether the recorded dependency versions still match `current`.
    pub fn in_sync_with(&self, current: &[Version]) -> bool {
        self.dep_versions.as_slice() == current
    }
}
