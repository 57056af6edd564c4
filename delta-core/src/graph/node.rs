//! Graph Nodes
//!
//! This module defines the node identifiers and rules that make up a
//! dependency graph.

use std::fmt::Debug;
use std::hash::Hash;

use smallvec::SmallVec;

/// Identifier for a node in a dependency graph.
///
/// Any cloneable, hashable, comparable type works: file names, interned
/// symbols, integer handles. `Debug` is required so errors can name the node.
pub trait NodeKey: Clone + Eq + Hash + Debug {}

impl<T> NodeKey for T where T: Clone + Eq + Hash + Debug {}

/// The kind of node in the dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A source node. Its value is supplied from outside the graph.
    Source,

    /// A derived node. It has a rule and is computed from its dependencies.
    Derived,
}

/// Dependency lists are short in practice; keep up to four inline.
pub type Dependencies<K> = SmallVec<[K; 4]>;

/// How to build a derived node: a body plus an ordered list of dependencies.
///
/// For the pull engine the body is a function over dependency values; for the
/// push graph it is a delta stage. The order of `dependencies` is the order in
/// which their values are handed to the body.
pub struct Rule<K, R> {
    body: R,
    dependencies: Dependencies<K>,
}

impl<K, R> Rule<K, R> {
    /// Create a rule from its body and ordered dependencies.
    pub fn new<I>(body: R, dependencies: I) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        Self {
            body,
            dependencies: dependencies.into_iter().collect(),
        }
    }

    /// The rule's body.
    pub fn body(&self) -> &R {
        &self.body
    }

    /// Mutable access to the rule's body. Push stages are stateful.
    pub fn body_mut(&mut self) -> &mut R {
        &mut self.body
    }

    /// The ordered dependencies.
    pub fn dependencies(&self) -> &[K] {
        &self.dependencies
    }
}

impl<K: Debug, R> Debug for Rule<K, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_keeps_dependency_order() {
        let rule = Rule::new((), ["foo.o", "bar.o", "baz.o"]);
        assert_eq!(rule.dependencies(), &["foo.o", "bar.o", "baz.o"]);
    }

    #[test]
    fn rule_body_is_mutable() {
        let mut rule = Rule::new(1u32, Vec::<u8>::new());
        *rule.body_mut() += 1;
        assert_eq!(*rule.body(), 2);
        assert!(rule.dependencies().is_empty());
    }
}
