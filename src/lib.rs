//! # `sortition`
//!
//! Weighted random selection over a dynamic set of keyed weights.
//!
//! The core is [`SortitionTree`], a k-ary sum tree stored in a flat,
//! append-only array. Every internal slot holds the sum of its children and
//! the root holds the total, so a draw descends from the root by subtracting
//! child weights from the selector until it lands on a leaf.
//!
//! | Operation      | Cost             |
//! |----------------|------------------|
//! | `set`          | `O(log_k n)`     |
//! | `draw`         | `O(k * log_k n)` |
//! | `stake_of`     | `O(1)`           |
//! | `total_weight` | `O(1)`           |
//!
//! Removed keys leave their slot on a LIFO vacancy stack for the next insert,
//! so the array never shrinks and nothing is ever relocated except the single
//! leaf moved aside when a leaf gains its first child.
//!
//! ```rust
//! use sortition::{Key, SortitionTree, U256};
//!
//! let mut tree = SortitionTree::with_branching(2).unwrap();
//! tree.set(Key::from(1u64), U256::from(10u64)).unwrap();
//! tree.set(Key::from(2u64), U256::from(20u64)).unwrap();
//!
//! // Selector from a seed, free of modulo bias.
//! let winner = tree.draw_seeded(U256::from(1234u64)).unwrap();
//! assert!(tree.contains(&winner));
//!
//! // Zero removes.
//! tree.set(winner, U256::zero()).unwrap();
//! assert_eq!(tree.len(), 1);
//! ```
//!
//! ## Atomicity
//!
//! A failed `set` leaves the tree exactly as it was. Writes are journaled and
//! rolled back if ancestor propagation fails part-way.
//!
//! ## Selectors
//!
//! `draw` rejects selectors outside `[0, total)` with
//! [`SortitionError::OutOfRange`] instead of reducing them modulo the total.
//! [`uniform::pick`] produces in-range selectors from a seed.
//!
//! ## Features
//!
//! - `tracing`: structured logs of upserts, promotions and rollbacks.
//! - `serde`: (de)serialize trees; loading validates the structure.

#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod journal;
mod tracing_helpers;

pub mod forest;
pub mod interface;
pub mod key;
pub mod node;
pub mod shared;
#[cfg(feature = "serde")]
mod snapshot;
pub mod tree;
pub mod uniform;

pub use forest::SortitionForest;
pub use interface::Sortition;
pub use key::Key;
pub use node::Node;
pub use primitive_types::U256;
pub use shared::SharedTree;
pub use tree::{LeafPage, Leaves, SortitionError, SortitionTree};
pub use uniform::UniformError;

/// Weight of a key. Also used for selectors and seeds.
pub type Weight = U256;
