//! Weighted descent from the root to a leaf.

use primitive_types::U256;

use super::{SortitionError, SortitionTree};
use crate::key::Key;
use crate::node::Node;
use crate::tracing_helpers::error_log;
use crate::interface::Sortition;

impl SortitionTree {
    /// Return the key whose cumulative weight range contains `selector`.
    ///
    /// Children are scanned left to right; the first child whose weight
    /// exceeds the remaining selector is entered. Keys thus own disjoint
    /// ranges of `[0, total)` sized by their weights.
    ///
    /// # Errors
    ///
    /// [`SortitionError::EmptyTree`] if the total weight is zero,
    /// [`SortitionError::OutOfRange`] if `selector >= total`.
    /// [`SortitionError::InvariantViolation`] signals corrupted structure.
    pub fn draw(&self, selector: U256) -> Result<Key, SortitionError> {
        let total = self.total_weight();
        if total.is_zero() {
            return Err(SortitionError::EmptyTree);
        }
        if selector >= total {
            return Err(SortitionError::OutOfRange { selector, total });
        }

        let k = self.require_branching()?;
        let nodes = &self.store.nodes;
        let mut index = 0;
        let mut remaining = selector;

        while nodes[index].is_internal() {
            let first = k.saturating_mul(index).saturating_add(1);
            let last = first.saturating_add(k).min(nodes.len());

            let children = nodes.get(first..last).unwrap_or_default();

            let mut chosen = None;
            for (offset, node) in children.iter().enumerate() {
                let weight = node.weight();
                if remaining < weight {
                    chosen = Some(first + offset);
                    break;
                }
                remaining -= weight;
            }

            let Some(child) = chosen else {
                error_log!(index, "children do not cover the node's weight");
                return Err(SortitionError::InvariantViolation { index });
            };
            index = child;
        }

        match nodes[index] {
            Node::Leaf { key, .. } => Ok(key),
            _ => {
                error_log!(index, "draw reached an unbound slot");
                Err(SortitionError::InvariantViolation { index })
            }
        }
    }

    /// Draw with a selector derived from `seed` by [`crate::uniform::pick`].
    ///
    /// # Errors
    ///
    /// [`SortitionError::EmptyTree`] if the total weight is zero.
    pub fn draw_seeded(&self, seed: U256) -> Result<Key, SortitionError> {
        Sortition::draw_seeded(self, seed)
    }
}
