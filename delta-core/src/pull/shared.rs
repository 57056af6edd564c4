//! Shared Engine
//!
//! [`Makelike`] is a single-writer, single-reader engine. `SharedMakelike`
//! puts one engine behind one mutex so cloned handles can drive it from
//! several threads. Every `read` and `write` holds the lock for its whole
//! duration, including any rule functions it runs, so calls are serialized.

use std::sync::Arc;

use parking_lot::Mutex;

use super::makelike::{Makelike, PullGraph};
use super::state::Version;
use super::Deps;
use crate::error::Result;
use crate::graph::NodeKey;

/// A cloneable handle to a mutex-guarded [`Makelike`].
pub struct SharedMakelike<K, V> {
    inner: Arc<Mutex<Makelike<K, V>>>,
}

impl<K: NodeKey, V> SharedMakelike<K, V> {
    /// Wrap a fresh engine over `graph`.
    pub fn new(graph: PullGraph<K, V>) -> Self {
        Self::from_engine(Makelike::new(graph))
    }

    /// Wrap an existing engine, keeping its states.
    pub fn from_engine(engine: Makelike<K, V>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Store `value` on a source node.
    pub fn write(&self, node: K, value: V) -> Result<()> {
        self.inner.lock().write(node, value)
    }

    /// Bring `node` up to date and return a copy of its value.
    pub fn read(&self, node: &K) -> Result<V>
    where
        V: Clone,
    {
        self.inner.lock().read(node)
    }

    /// The node's version as of its last write or build.
    pub fn version(&self, node: &K) -> Option<Version> {
        self.inner.lock().version(node)
    }

    /// Run `f` with exclusive access to the engine.
    pub fn with<R>(&self, f: impl FnOnce(&mut Makelike<K, V>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl<K, V> Clone for SharedMakelike<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: NodeKey, V: Clone> Deps<K, V> for SharedMakelike<K, V> {
    fn read(&mut self, node: &K) -> Result<V> {
        SharedMakelike::read(self, node)
    }

    fn write(&mut self, node: K, value: V) -> Result<()> {
        SharedMakelike::write(self, node, value)
    }
}
