//! Filepath: src/shared.rs
//!
//! A cloneable handle that serializes access to one tree.
//!
//! The tree itself is single-writer. [`SharedTree`] provides that guarantee to
//! multi-threaded callers: every call takes one lock, so each operation is
//! observed whole or not at all. Use [`SharedTree::with`] when several
//! operations must form one unit (draw a winner, then zero its weight).

use std::sync::Arc;

use parking_lot::Mutex;
use primitive_types::U256;

use crate::interface::Sortition;
use crate::key::Key;
use crate::tree::{SortitionError, SortitionTree};

/// `Arc<Mutex<SortitionTree>>` with the [`Sortition`] surface.
///
/// # Example
///
/// ```rust
/// use sortition::{Key, SharedTree, Sortition, SortitionTree, U256};
///
/// let shared = SharedTree::new(SortitionTree::with_branching(2).unwrap());
/// let worker = shared.clone();
///
/// std::thread::spawn(move || {
///     let mut worker = worker;
///     worker.set(Key::from(1u64), U256::from(5u64)).unwrap();
/// })
/// .join()
/// .unwrap();
///
/// assert_eq!(shared.total_weight(), U256::from(5u64));
/// ```
#[derive(Debug, Clone)]
pub struct SharedTree {
    inner: Arc<Mutex<SortitionTree>>,
}

impl SharedTree {
    /// Take ownership of `tree`.
    #[must_use]
    pub fn new(tree: SortitionTree) -> Self {
        Self {
            inner: Arc::new(Mutex::new(tree)),
        }
    }

    /// Run `f` with exclusive access to the tree.
    pub fn with<R>(&self, f: impl FnOnce(&mut SortitionTree) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    /// Draw with a selector derived from `seed`, then remove the winner.
    ///
    /// Both steps happen under one lock.
    ///
    /// # Errors
    ///
    /// Any error from [`SortitionTree::draw_seeded`] or [`SortitionTree::set`].
    pub fn draw_and_remove(&self, seed: U256) -> Result<Key, SortitionError> {
        self.with(|tree| {
            let winner = tree.draw_seeded(seed)?;
            tree.set(winner, U256::zero())?;
            Ok(winner)
        })
    }

    /// Clone of the current tree state.
    #[must_use]
    pub fn snapshot(&self) -> SortitionTree {
        self.inner.lock().clone()
    }
}

impl Sortition for SharedTree {
    fn set(&mut self, key: Key, value: U256) -> Result<(), SortitionError> {
        self.inner.lock().set(key, value)
    }

    fn draw(&self, selector: U256) -> Result<Key, SortitionError> {
        self.inner.lock().draw(selector)
    }

    fn stake_of(&self, key: &Key) -> U256 {
        self.inner.lock().stake_of(key)
    }

    fn total_weight(&self) -> U256 {
        self.inner.lock().total_weight()
    }

    // Total and descent must see the same state.
    fn draw_seeded(&self, seed: U256) -> Result<Key, SortitionError> {
        self.inner.lock().draw_seeded(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_concurrent_writers_conserve_weight() {
        let shared = SharedTree::new(SortitionTree::with_branching(3).unwrap());

        let handles: Vec<_> = (0..8u64)
            .map(|t| {
                let mut handle = shared.clone();
                thread::spawn(move || {
                    for i in 0..200u64 {
                        let key = Key::from(t * 1_000 + i + 1);
                        handle.set(key, U256::from(i + 1)).unwrap();
                        if i % 3 == 0 {
                            handle.set(key, U256::zero()).unwrap();
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let tree = shared.snapshot();
        tree.validate().unwrap();

        let expected: u64 = (0..200u64).filter(|i| i % 3 != 0).map(|i| i + 1).sum::<u64>() * 8;
        assert_eq!(shared.total_weight(), U256::from(expected));
        assert_eq!(tree.len(), 8 * (200 - 67));
    }

    #[test]
    fn test_draw_and_remove_drains() {
        let shared = SharedTree::new(SortitionTree::with_branching(2).unwrap());
        shared.with(|tree| {
            for i in 1..=20u64 {
                tree.set(Key::from(i), U256::from(i)).unwrap();
            }
        });

        let mut winners = Vec::new();
        for seed in 0..20u64 {
            winners.push(shared.draw_and_remove(U256::from(seed)).unwrap());
        }
        winners.sort();
        winners.dedup();

        assert_eq!(winners.len(), 20);
        assert_eq!(
            shared.draw_and_remove(U256::zero()),
            Err(SortitionError::EmptyTree)
        );
    }
}
