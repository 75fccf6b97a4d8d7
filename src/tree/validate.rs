//! Structural self-check.

use std::collections::HashSet;

use primitive_types::U256;

use super::{SortitionError, SortitionTree};
use crate::node::Node;
use crate::tracing_helpers::error_log;

impl SortitionTree {
    /// Check every structural invariant, `O(n)`.
    ///
    /// - the root is an internal node
    /// - each internal node's weight equals the sum of its existing children
    /// - leaves have no existing children; empty slots are never internal
    /// - the key map and the leaf slots agree one-to-one
    /// - every empty non-root slot is on the vacancy stack exactly once
    ///
    /// # Errors
    ///
    /// [`SortitionError::InvariantViolation`] naming the first bad slot.
    pub fn validate(&self) -> Result<(), SortitionError> {
        let Some(k) = self.branching() else {
            return Ok(());
        };
        let nodes = &self.store.nodes;
        let broken = |index: usize| {
            error_log!(index, "structural invariant violated");
            SortitionError::InvariantViolation { index }
        };

        if !nodes[0].is_internal() {
            return Err(broken(0));
        }

        let mut leaf_count = 0usize;
        for (index, node) in nodes.iter().enumerate() {
            let first = k.saturating_mul(index).saturating_add(1);
            let has_children = first < nodes.len();

            match *node {
                Node::Internal { weight } => {
                    if !has_children && index != 0 {
                        return Err(broken(index));
                    }
                    let last = first.saturating_add(k).min(nodes.len());
                    let mut sum = U256::zero();
                    for child in nodes.get(first..last).unwrap_or_default() {
                        sum = sum
                            .checked_add(child.weight())
                            .ok_or_else(|| broken(index))?;
                    }
                    if sum != weight {
                        return Err(broken(index));
                    }
                }
                Node::Leaf { weight, key } => {
                    if has_children || weight.is_zero() || key.is_zero() {
                        return Err(broken(index));
                    }
                    if self.store.index_of.get(&key) != Some(&index) {
                        return Err(broken(index));
                    }
                    leaf_count += 1;
                }
                Node::Empty => {
                    if index == 0 || has_children {
                        return Err(broken(index));
                    }
                }
            }
        }

        if leaf_count != self.store.index_of.len() {
            let index = self
                .store
                .index_of
                .values()
                .copied()
                .find(|&i| nodes.get(i).is_none_or(|node| !node.is_leaf()))
                .unwrap_or(0);
            return Err(broken(index));
        }

        let mut seen = HashSet::with_capacity(self.store.vacant.len());
        for &index in &self.store.vacant {
            let vacant = nodes.get(index).is_some_and(Node::is_empty);
            if !vacant || !seen.insert(index) {
                return Err(broken(index));
            }
        }

        let empties = nodes.iter().filter(|node| node.is_empty()).count();
        if empties != seen.len() {
            let index = nodes
                .iter()
                .enumerate()
                .find(|(i, node)| node.is_empty() && !seen.contains(i))
                .map_or(0, |(i, _)| i);
            return Err(broken(index));
        }

        Ok(())
    }
}
