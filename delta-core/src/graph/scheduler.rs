//! Topological Scheduler
//!
//! Computes the order in which derived nodes are evaluated. Dependencies
//! always come before their dependents.
//!
//! # Algorithm
//!
//! Depth-first post-order traversal starting from every node in insertion
//! order:
//!
//! 1. Mark a node "visiting" when the traversal enters it
//! 2. Visit each dependency in declaration order
//! 3. Reaching a "visiting" node again means the graph has a cycle
//! 4. When all dependencies are done, mark the node "done" and, if it has a
//!    rule, append it to the order
//!
//! The traversal keeps an explicit stack instead of recursing, so long
//! dependency chains cannot overflow the call stack.

use std::collections::HashMap;

use indexmap::IndexMap;

use super::node::{NodeKey, Rule};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Order every derived node reachable from `roots` so that each node comes
/// after all of its dependencies.
///
/// Source nodes (keys without a rule) are traversed but never appear in the
/// result. Fails with [`Error::CyclicGraph`] naming the node that closed the
/// cycle.
pub(crate) fn topological_order<'a, K, R, I>(
    rules: &'a IndexMap<K, Rule<K, R>>,
    roots: I,
) -> Result<Vec<K>>
where
    K: NodeKey + 'a,
    I: IntoIterator<Item = &'a K>,
{
    let mut marks: HashMap<&'a K, Mark> = HashMap::with_capacity(rules.len());
    let mut order = Vec::with_capacity(rules.len());
    let mut stack: Vec<(&'a K, usize)> = Vec::new();

    for root in roots {
        if marks.contains_key(root) {
            continue;
        }
        marks.insert(root, Mark::Visiting);
        stack.push((root, 0));

        while let Some(top) = stack.last_mut() {
            let node = top.0;
            let next = rules
                .get(node)
                .and_then(|rule| rule.dependencies().get(top.1));
            top.1 += 1;

            match next {
                Some(dep) => match marks.get(dep) {
                    Some(Mark::Visiting) => return Err(Error::cyclic_graph(dep)),
                    Some(Mark::Done) => {}
                    None => {
                        marks.insert(dep, Mark::Visiting);
                        stack.push((dep, 0));
                    }
                },
                None => {
                    stack.pop();
                    marks.insert(node, Mark::Done);
                    if rules.contains_key(node) {
                        order.push(node.clone());
                    }
                }
            }
        }
    }

    Ok(order)
}
