//! Filepath: src/forest.rs
//!
//! Many independent trees addressed by a tree key.
//!
//! Each tree has its own branching factor, fixed when it is created. A
//! forest lets one owner keep, say, one tree per court or per raffle round
//! without any global state.

use std::collections::HashMap;

use primitive_types::U256;

use crate::key::Key;
use crate::tracing_helpers::debug_log;
use crate::tree::{LeafPage, SortitionError, SortitionTree};

/// A set of [`SortitionTree`]s keyed by [`Key`].
///
/// # Example
///
/// ```rust
/// use sortition::{Key, SortitionForest, U256};
///
/// let court = Key::from_slice(b"court-1").unwrap();
/// let mut forest = SortitionForest::new();
/// forest.create_tree(court, 4).unwrap();
/// forest.set(&court, Key::from(1u64), U256::from(100u64)).unwrap();
///
/// assert_eq!(forest.total_weight(&court), U256::from(100u64));
/// assert_eq!(forest.draw(&court, U256::from(99u64)).unwrap(), Key::from(1u64));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SortitionForest {
    trees: HashMap<Key, SortitionTree>,
}

impl SortitionForest {
    /// An empty forest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tree with branching factor `k` under `tree_key`.
    ///
    /// # Errors
    ///
    /// [`SortitionError::AlreadyInitialized`] if `tree_key` is taken,
    /// [`SortitionError::InvalidBranching`] if `k <= 1`.
    pub fn create_tree(&mut self, tree_key: Key, k: usize) -> Result<(), SortitionError> {
        if self.trees.contains_key(&tree_key) {
            return Err(SortitionError::AlreadyInitialized);
        }

        let tree = SortitionTree::with_branching(k)?;
        self.trees.insert(tree_key, tree);

        debug_log!(%tree_key, k, "created tree");
        Ok(())
    }

    /// The tree under `tree_key`.
    #[must_use]
    pub fn tree(&self, tree_key: &Key) -> Option<&SortitionTree> {
        self.trees.get(tree_key)
    }

    /// Mutable access to the tree under `tree_key`.
    #[must_use]
    pub fn tree_mut(&mut self, tree_key: &Key) -> Option<&mut SortitionTree> {
        self.trees.get_mut(tree_key)
    }

    fn existing(&self, tree_key: &Key) -> Result<&SortitionTree, SortitionError> {
        self.trees.get(tree_key).ok_or(SortitionError::UnknownTree)
    }

    /// [`SortitionTree::set`] on the tree under `tree_key`.
    ///
    /// # Errors
    ///
    /// [`SortitionError::UnknownTree`], or any error from `set`.
    pub fn set(&mut self, tree_key: &Key, key: Key, value: U256) -> Result<(), SortitionError> {
        self.trees
            .get_mut(tree_key)
            .ok_or(SortitionError::UnknownTree)?
            .set(key, value)
    }

    /// [`SortitionTree::draw`] on the tree under `tree_key`.
    ///
    /// # Errors
    ///
    /// [`SortitionError::UnknownTree`], or any error from `draw`.
    pub fn draw(&self, tree_key: &Key, selector: U256) -> Result<Key, SortitionError> {
        self.existing(tree_key)?.draw(selector)
    }

    /// [`SortitionTree::draw_seeded`] on the tree under `tree_key`.
    ///
    /// # Errors
    ///
    /// [`SortitionError::UnknownTree`], or any error from `draw_seeded`.
    pub fn draw_seeded(&self, tree_key: &Key, seed: U256) -> Result<Key, SortitionError> {
        self.existing(tree_key)?.draw_seeded(seed)
    }

    /// Weight of `key` in the tree under `tree_key`; zero if either is absent.
    #[must_use]
    pub fn stake_of(&self, tree_key: &Key, key: &Key) -> U256 {
        self.trees
            .get(tree_key)
            .map_or_else(U256::zero, |tree| tree.stake_of(key))
    }

    /// Total weight of the tree under `tree_key`; zero if absent.
    #[must_use]
    pub fn total_weight(&self, tree_key: &Key) -> U256 {
        self.trees
            .get(tree_key)
            .map_or_else(U256::zero, SortitionTree::total_weight)
    }

    /// [`SortitionTree::query_leafs`] on the tree under `tree_key`.
    ///
    /// # Errors
    ///
    /// [`SortitionError::UnknownTree`].
    pub fn query_leafs(
        &self,
        tree_key: &Key,
        cursor: usize,
        count: usize,
    ) -> Result<LeafPage, SortitionError> {
        Ok(self.existing(tree_key)?.query_leafs(cursor, count))
    }

    /// Number of trees.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    /// `true` if no tree has been created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}
