//! Filepath: src/tree.rs
//! `SortitionTree` - a k-ary sum tree over a flat, slot-reusing array.
//!
//! Each active key owns one leaf slot holding its weight. Every internal slot
//! holds the sum of its children, so the root (index 0) is the total weight.
//! Parent of index `i` is `(i - 1) / k`; children of `i` are
//! `k * i + 1 ..= k * i + k`.
//!
//! | Operation      | Cost              |
//! |----------------|-------------------|
//! | `set`          | `O(log_k n)`      |
//! | `stake_of`     | `O(1)` lookup     |
//! | `total_weight` | `O(1)`            |
//! | `draw`         | `O(k * log_k n)`  |
//! | `query_leafs`  | `O(count)`        |

use std::fmt as StdFmt;

use primitive_types::U256;

use crate::journal::Store;
use crate::key::Key;
use crate::node::Node;
use crate::uniform::UniformError;

mod draw;
mod query;
mod set;
mod validate;

pub use query::{LeafPage, Leaves};

// ============================================================================
//  SortitionError
// ============================================================================

/// Errors returned by tree operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortitionError {
    /// Branching factor must be at least 2.
    InvalidBranching {
        /// The rejected branching factor.
        k: usize,
    },

    /// `init` was called on a tree that already has a branching factor,
    /// or a forest tree key is already taken.
    AlreadyInitialized,

    /// A mutating operation ran before `init`.
    NotInitialized,

    /// `draw` on a tree whose total weight is zero.
    EmptyTree,

    /// `draw` selector outside `[0, total)`.
    OutOfRange {
        /// The rejected selector.
        selector: U256,
        /// Total weight at the time of the draw.
        total: U256,
    },

    /// The all-zero key is reserved for "no entry".
    ReservedKey,

    /// The total weight would exceed `U256::MAX`.
    Overflow,

    /// No tree is registered under the given tree key.
    UnknownTree,

    /// Deriving a selector from a seed failed.
    Sampling(UniformError),

    /// Internal structure is inconsistent at `index`.
    ///
    /// Never caused by well-formed input.
    InvariantViolation {
        /// First slot found in a broken state.
        index: usize,
    },
}

impl StdFmt::Display for SortitionError {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        match self {
            Self::InvalidBranching { k } => {
                write!(f, "branching factor must be greater than 1 (got {k})")
            }

            Self::AlreadyInitialized => write!(f, "tree is already initialized"),

            Self::NotInitialized => write!(f, "tree is not initialized"),

            Self::EmptyTree => write!(f, "cannot draw from a tree with zero total weight"),

            Self::OutOfRange { selector, total } => {
                write!(f, "selector {selector} is outside [0, {total})")
            }

            Self::ReservedKey => write!(f, "the zero key is reserved"),

            Self::Overflow => write!(f, "total weight overflow"),

            Self::UnknownTree => write!(f, "no tree registered under this key"),

            Self::Sampling(err) => write!(f, "selector derivation failed: {err}"),

            Self::InvariantViolation { index } => {
                write!(f, "tree invariant violated at index {index}")
            }
        }
    }
}

impl std::error::Error for SortitionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Sampling(err) => Some(err),
            _ => None,
        }
    }
}

impl From<UniformError> for SortitionError {
    fn from(err: UniformError) -> Self {
        Self::Sampling(err)
    }
}

// ============================================================================
//  SortitionTree
// ============================================================================

/// Weighted key set supporting `O(log n)` upserts and weighted draws.
///
/// # Example
///
/// ```rust
/// use sortition::{Key, SortitionTree, U256};
///
/// let mut tree = SortitionTree::with_branching(2).unwrap();
/// tree.set(Key::from(1u64), U256::from(10u64)).unwrap();
/// tree.set(Key::from(2u64), U256::from(30u64)).unwrap();
///
/// assert_eq!(tree.total_weight(), U256::from(40u64));
/// assert_eq!(tree.stake_of(&Key::from(2u64)), U256::from(30u64));
///
/// // Selectors in [0, 10) land on key 1, [10, 40) on key 2.
/// assert_eq!(tree.draw(U256::from(9u64)).unwrap(), Key::from(1u64));
/// assert_eq!(tree.draw(U256::from(10u64)).unwrap(), Key::from(2u64));
/// ```
#[derive(Clone, Default)]
pub struct SortitionTree {
    /// Branching factor. Zero until `init`.
    k: usize,

    pub(crate) store: Store,
}

impl StdFmt::Debug for SortitionTree {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        f.debug_struct("SortitionTree")
            .field("k", &self.k)
            .field("keys", &self.len())
            .field("slots", &self.slot_count())
            .field("vacant", &self.vacant_slots())
            .field("total", &self.total_weight())
            .finish()
    }
}

impl SortitionTree {
    /// Create an uninitialized tree. Call [`init`](Self::init) before `set`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tree and initialize it with branching factor `k`.
    ///
    /// # Errors
    ///
    /// [`SortitionError::InvalidBranching`] if `k <= 1`.
    pub fn with_branching(k: usize) -> Result<Self, SortitionError> {
        let mut tree = Self::new();
        tree.init(k)?;
        Ok(tree)
    }

    /// Fix the branching factor and allocate the root.
    ///
    /// # Errors
    ///
    /// [`SortitionError::InvalidBranching`] if `k <= 1`,
    /// [`SortitionError::AlreadyInitialized`] on a second call.
    pub fn init(&mut self, k: usize) -> Result<(), SortitionError> {
        if self.is_initialized() {
            return Err(SortitionError::AlreadyInitialized);
        }
        if k <= 1 {
            return Err(SortitionError::InvalidBranching { k });
        }

        self.k = k;
        self.store.nodes.push(Node::ROOT);
        Ok(())
    }

    /// Rebuild a tree from its stored node array and vacancy stack.
    ///
    /// The key map is derived from the leaves and the result is validated
    /// before it is returned.
    ///
    /// # Errors
    ///
    /// [`SortitionError::InvalidBranching`] if `k <= 1`,
    /// [`SortitionError::InvariantViolation`] if the parts are inconsistent.
    pub fn from_parts(
        k: usize,
        nodes: Vec<Node>,
        vacant: Vec<usize>,
    ) -> Result<Self, SortitionError> {
        if k <= 1 {
            return Err(SortitionError::InvalidBranching { k });
        }
        if nodes.first().is_none_or(|root| !root.is_internal()) {
            return Err(SortitionError::InvariantViolation { index: 0 });
        }

        let mut store = Store {
            nodes,
            vacant,
            ..Store::default()
        };
        for (index, node) in store.nodes.iter().enumerate() {
            if let Some(key) = node.key() {
                if store.index_of.insert(key, index).is_some() {
                    return Err(SortitionError::InvariantViolation { index });
                }
            }
        }

        let tree = Self { k, store };
        tree.validate()?;
        Ok(tree)
    }

    /// `true` once [`init`](Self::init) has succeeded.
    #[must_use]
    #[inline]
    pub fn is_initialized(&self) -> bool {
        !self.store.nodes.is_empty()
    }

    /// The branching factor, or `None` before `init`.
    #[must_use]
    #[inline]
    pub fn branching(&self) -> Option<usize> {
        self.is_initialized().then_some(self.k)
    }

    pub(crate) fn require_branching(&self) -> Result<usize, SortitionError> {
        self.branching().ok_or(SortitionError::NotInitialized)
    }

    /// Current weight of `key`, zero if absent.
    #[must_use]
    pub fn stake_of(&self, key: &Key) -> U256 {
        self.store
            .index_of
            .get(key)
            .and_then(|&index| self.store.nodes.get(index))
            .map_or_else(U256::zero, Node::weight)
    }

    /// Sum of all active weights (the root's weight).
    #[must_use]
    #[inline]
    pub fn total_weight(&self) -> U256 {
        self.store.nodes.first().map_or_else(U256::zero, Node::weight)
    }

    /// `true` if `key` has a nonzero weight.
    #[must_use]
    #[inline]
    pub fn contains(&self, key: &Key) -> bool {
        self.store.index_of.contains_key(key)
    }

    /// Number of active keys.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.store.index_of.len()
    }

    /// `true` if no key has a nonzero weight.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.store.index_of.is_empty()
    }

    /// Length of the backing array, root included. Never shrinks.
    #[must_use]
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.store.nodes.len()
    }

    /// Number of freed slots waiting to be reused.
    #[must_use]
    #[inline]
    pub fn vacant_slots(&self) -> usize {
        self.store.vacant.len()
    }

    /// Raw view of the node array.
    #[must_use]
    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.store.nodes
    }

    /// Raw view of the vacancy stack, bottom first.
    #[must_use]
    #[inline]
    pub fn vacancies(&self) -> &[usize] {
        &self.store.vacant
    }
}
