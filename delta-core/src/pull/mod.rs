//! Pull Engine
//!
//! Demand-driven evaluation: values flow from sources to sinks only when a
//! sink is read.
//!
//! # Concepts
//!
//! ## Sources and derived nodes
//!
//! Sources are written from outside. Derived nodes have a rule and are
//! computed from their dependencies, lazily, on read.
//!
//! ## Versions
//!
//! Every write and every recompute stamps the node with a fresh
//! [`Version`]. A derived node is stale iff some dependency's version differs
//! from the one recorded when the node was last built. Values are never
//! compared.
//!
//! ## What this engine cannot tell you
//!
//! A pull engine has no notion of "did anything change". After a read you
//! get a value, not a delta. See [`crate::adapters::PushFromPull`] for the
//! consequence when wrapping it as a delta stage.

mod makelike;
mod shared;
mod state;

pub use makelike::{Makelike, PullGraph, RuleFn};
pub use shared::SharedMakelike;
pub use state::{BuildState, State, Version};

use crate::error::Result;

/// The read/write interface of a pull-based dependency system.
///
/// Writes push values into sources; reads pull values out of any node.
pub trait Deps<K, V> {
    /// Return the node's current value, bringing it up to date first.
    fn read(&mut self, node: &K) -> Result<V>;

    /// Store a value on a node.
    fn write(&mut self, node: K, value: V) -> Result<()>;
}
