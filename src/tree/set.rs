//! Upsert, removal and ancestor propagation.
//!
//! `set` runs inside a [`Transaction`]; any error rolls every edit back.

use primitive_types::U256;

use super::{SortitionError, SortitionTree};
use crate::journal::Transaction;
use crate::key::Key;
use crate::node::Node;
use crate::tracing_helpers::{debug_log, error_log, trace_log};

/// Signed change applied to every ancestor of a leaf.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Delta {
    Add(U256),
    Sub(U256),
}

impl Delta {
    /// Delta taking a leaf from `from` to `to`.
    fn between(from: U256, to: U256) -> Self {
        if to >= from {
            Self::Add(to - from)
        } else {
            Self::Sub(from - to)
        }
    }

    fn apply(self, weight: U256, index: usize) -> Result<U256, SortitionError> {
        match self {
            Self::Add(amount) => weight.checked_add(amount).ok_or(SortitionError::Overflow),
            // An ancestor always holds at least its descendant's weight.
            Self::Sub(amount) => weight
                .checked_sub(amount)
                .ok_or(SortitionError::InvariantViolation { index }),
        }
    }
}

impl SortitionTree {
    /// Upsert `key` with `value`.
    ///
    /// - absent key, `value > 0`: bind a leaf (reusing a freed slot if any)
    /// - present key, `value == 0`: free its slot
    /// - present key, other `value`: overwrite in place
    /// - absent key, `value == 0`: no-op
    ///
    /// # Errors
    ///
    /// [`SortitionError::NotInitialized`] before `init`,
    /// [`SortitionError::ReservedKey`] for [`Key::ZERO`],
    /// [`SortitionError::Overflow`] if the total would exceed `U256::MAX`.
    /// On error the tree is unchanged.
    pub fn set(&mut self, key: Key, value: U256) -> Result<(), SortitionError> {
        let k = self.require_branching()?;
        if key.is_zero() {
            return Err(SortitionError::ReservedKey);
        }

        trace_log!(%key, %value, "set");

        let mut txn = Transaction::begin(&mut self.store);
        match txn.index_of(&key) {
            None if value.is_zero() => return Ok(()),
            None => insert(&mut txn, k, key, value)?,
            Some(index) => {
                let current = txn.node(index).weight();
                if value.is_zero() {
                    remove(&mut txn, k, key, index, current)?;
                } else if value != current {
                    txn.write(index, Node::Leaf { weight: value, key });
                    update_parents(&mut txn, k, index, Delta::between(current, value))?;
                }
            }
        }

        txn.commit();
        Ok(())
    }

    /// Remove `key`. Same as `set(key, 0)`; returns the prior weight.
    ///
    /// # Errors
    ///
    /// See [`set`](Self::set).
    pub fn remove(&mut self, key: &Key) -> Result<U256, SortitionError> {
        let prior = self.stake_of(key);
        self.set(*key, U256::zero())?;
        Ok(prior)
    }
}

fn insert(txn: &mut Transaction<'_>, k: usize, key: Key, value: U256) -> Result<(), SortitionError> {
    let leaf = Node::Leaf { weight: value, key };

    let index = if let Some(index) = txn.pop_vacant() {
        debug_log!(index, %key, "reusing vacant slot");
        txn.write(index, leaf);
        index
    } else {
        let index = txn.append(leaf);
        if index != 1 && (index - 1) % k == 0 {
            promote(txn, (index - 1) / k)?;
        }
        index
    };

    txn.bind(key, index);
    update_parents(txn, k, index, Delta::Add(value))
}

/// Turn the leaf at `parent` into an internal node by moving its key and
/// weight into a newly appended sibling of the first child.
fn promote(txn: &mut Transaction<'_>, parent: usize) -> Result<(), SortitionError> {
    let Node::Leaf { weight, key } = txn.node(parent) else {
        error_log!(parent, "first child appended under a non-leaf");
        return Err(SortitionError::InvariantViolation { index: parent });
    };

    let sibling = txn.append(Node::Leaf { weight, key });
    txn.write(parent, Node::Internal { weight });
    txn.bind(key, sibling);

    debug_log!(parent, sibling, %key, "promoted leaf to internal node");
    Ok(())
}

fn remove(
    txn: &mut Transaction<'_>,
    k: usize,
    key: Key,
    index: usize,
    current: U256,
) -> Result<(), SortitionError> {
    txn.write(index, Node::Empty);
    txn.push_vacant(index);
    txn.unbind(&key);
    update_parents(txn, k, index, Delta::Sub(current))
}

/// Apply `delta` to every ancestor of `index`, up to and including the root.
fn update_parents(
    txn: &mut Transaction<'_>,
    k: usize,
    mut index: usize,
    delta: Delta,
) -> Result<(), SortitionError> {
    trace_log!(index, ?delta, "propagating");

    while index != 0 {
        index = (index - 1) / k;

        let Node::Internal { weight } = txn.node(index) else {
            error_log!(index, "ancestor is not an internal node");
            return Err(SortitionError::InvariantViolation { index });
        };

        let weight = delta.apply(weight, index)?;
        txn.write(index, Node::Internal { weight });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(v: u64) -> U256 {
        U256::from(v)
    }

    fn key(v: u64) -> Key {
        Key::from(v)
    }

    fn binary() -> SortitionTree {
        SortitionTree::with_branching(2).unwrap()
    }

    #[test]
    fn test_set_before_init() {
        let mut tree = SortitionTree::new();
        assert_eq!(
            tree.set(key(1), w(5)),
            Err(SortitionError::NotInitialized)
        );
    }

    #[test]
    fn test_zero_key_rejected() {
        let mut tree = binary();
        assert_eq!(tree.set(Key::ZERO, w(5)), Err(SortitionError::ReservedKey));
        assert_eq!(tree.slot_count(), 1);
    }

    #[test]
    fn test_insert_then_read() {
        let mut tree = binary();
        tree.set(key(1), w(10)).unwrap();

        assert_eq!(tree.stake_of(&key(1)), w(10));
        assert_eq!(tree.total_weight(), w(10));
        assert_eq!(tree.nodes()[1], Node::Leaf { weight: w(10), key: key(1) });
    }

    #[test]
    fn test_zero_on_absent_key_is_noop() {
        let mut tree = binary();
        tree.set(key(1), U256::zero()).unwrap();

        assert_eq!(tree.slot_count(), 1);
        assert_eq!(tree.vacant_slots(), 0);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_first_child_promotes_parent() {
        let mut tree = binary();
        tree.set(key(1), w(10)).unwrap();
        tree.set(key(2), w(20)).unwrap();
        // Index 3 is the first child of index 1.
        tree.set(key(3), w(30)).unwrap();

        let nodes = tree.nodes();
        assert_eq!(nodes.len(), 5);
        assert_eq!(nodes[0], Node::Internal { weight: w(60) });
        assert_eq!(nodes[1], Node::Internal { weight: w(40) });
        assert_eq!(nodes[2], Node::Leaf { weight: w(20), key: key(2) });
        assert_eq!(nodes[3], Node::Leaf { weight: w(30), key: key(3) });
        assert_eq!(nodes[4], Node::Leaf { weight: w(10), key: key(1) });
        assert_eq!(tree.stake_of(&key(1)), w(10));
        tree.validate().unwrap();
    }

    #[test]
    fn test_no_promotion_for_root_children() {
        let mut tree = SortitionTree::with_branching(4).unwrap();
        for i in 1..=4u64 {
            tree.set(key(i), w(i)).unwrap();
        }

        assert_eq!(tree.slot_count(), 5);
        assert!(tree.nodes()[1..].iter().all(Node::is_leaf));

        // Index 5 is the first child of index 1.
        tree.set(key(5), w(5)).unwrap();
        assert_eq!(tree.slot_count(), 7);
        assert!(tree.nodes()[1].is_internal());
        assert_eq!(tree.nodes()[1].weight(), w(6));
        tree.validate().unwrap();
    }

    #[test]
    fn test_update_in_place_both_directions() {
        let mut tree = binary();
        tree.set(key(1), w(10)).unwrap();
        tree.set(key(2), w(20)).unwrap();
        tree.set(key(3), w(30)).unwrap();
        let slots = tree.slot_count();

        tree.set(key(1), w(15)).unwrap();
        assert_eq!(tree.total_weight(), w(65));
        assert_eq!(tree.nodes()[1].weight(), w(45));

        tree.set(key(3), w(1)).unwrap();
        assert_eq!(tree.total_weight(), w(36));
        assert_eq!(tree.nodes()[1].weight(), w(16));

        tree.set(key(3), w(1)).unwrap();
        assert_eq!(tree.total_weight(), w(36));
        assert_eq!(tree.slot_count(), slots);
        tree.validate().unwrap();
    }

    #[test]
    fn test_remove_frees_slot() {
        let mut tree = binary();
        tree.set(key(1), w(10)).unwrap();
        tree.set(key(2), w(20)).unwrap();

        assert_eq!(tree.remove(&key(1)).unwrap(), w(10));
        assert_eq!(tree.stake_of(&key(1)), U256::zero());
        assert_eq!(tree.total_weight(), w(20));
        assert_eq!(tree.nodes()[1], Node::Empty);
        assert_eq!(tree.vacancies(), &[1]);
        assert!(!tree.contains(&key(1)));

        // Second removal is a no-op.
        assert_eq!(tree.remove(&key(1)).unwrap(), U256::zero());
        assert_eq!(tree.vacancies(), &[1]);
        assert_eq!(tree.total_weight(), w(20));
    }

    #[test]
    fn test_vacant_slots_reused_lifo() {
        let mut tree = binary();
        for i in 1..=6u64 {
            tree.set(key(i), w(i)).unwrap();
        }
        let slots = tree.slot_count();

        let first = tree.store.index_of[&key(2)];
        let second = tree.store.index_of[&key(5)];
        tree.set(key(2), U256::zero()).unwrap();
        tree.set(key(5), U256::zero()).unwrap();

        tree.set(key(7), w(7)).unwrap();
        assert_eq!(tree.store.index_of[&key(7)], second);
        tree.set(key(8), w(8)).unwrap();
        assert_eq!(tree.store.index_of[&key(8)], first);

        assert_eq!(tree.slot_count(), slots);
        assert_eq!(tree.vacant_slots(), 0);
        tree.validate().unwrap();
    }

    #[test]
    fn test_overflow_rolls_back() {
        let mut tree = binary();
        tree.set(key(1), U256::MAX - w(5)).unwrap();
        tree.set(key(2), w(3)).unwrap();
        let before = tree.clone();

        // Appending index 3 promotes index 1 before the overflow is detected.
        assert_eq!(tree.set(key(3), w(10)), Err(SortitionError::Overflow));
        assert_eq!(tree.nodes(), before.nodes());
        assert_eq!(tree.vacancies(), before.vacancies());
        assert_eq!(tree.store.index_of, before.store.index_of);

        // Growth of an existing leaf is rolled back too.
        assert_eq!(tree.set(key(2), w(100)), Err(SortitionError::Overflow));
        assert_eq!(tree.stake_of(&key(2)), w(3));
        assert_eq!(tree.nodes(), before.nodes());

        tree.set(key(3), w(2)).unwrap();
        assert_eq!(tree.total_weight(), U256::MAX);
        tree.validate().unwrap();
    }

    #[test]
    fn test_delta_between() {
        assert_eq!(Delta::between(w(3), w(10)), Delta::Add(w(7)));
        assert_eq!(Delta::between(w(10), w(3)), Delta::Sub(w(7)));
        assert_eq!(
            Delta::Sub(w(5)).apply(w(4), 9),
            Err(SortitionError::InvariantViolation { index: 9 })
        );
    }
}
