//! Slot states of the flat sum-tree array.
//!
//! Every index of the backing array holds exactly one [`Node`]. The variant
//! replaces the implicit "has a key mapping / has children" bookkeeping with
//! an explicit tag, so a leaf that gains its first child becomes
//! [`Node::Internal`] in one visible transition.

use primitive_types::U256;

use crate::key::Key;

/// State of a single array slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Node {
    /// A freed leaf slot waiting on the vacancy stack. Weight is zero.
    #[default]
    Empty,

    /// Bound to one external key, holding that key's weight directly.
    Leaf {
        /// Weight of `key`.
        weight: U256,
        /// The key bound to this slot.
        key: Key,
    },

    /// Aggregate of its children. Never bound to a key.
    Internal {
        /// Sum of the children's weights.
        weight: U256,
    },
}

impl Node {
    /// A fresh internal node with zero weight (the root after `init`).
    pub(crate) const ROOT: Self = Self::Internal {
        weight: U256([0; 4]),
    };

    /// Weight held by this slot. `Empty` slots weigh zero.
    #[must_use]
    #[inline]
    pub fn weight(&self) -> U256 {
        match *self {
            Self::Empty => U256::zero(),
            Self::Leaf { weight, .. } | Self::Internal { weight } => weight,
        }
    }

    /// The bound key, if this is a leaf.
    #[must_use]
    #[inline]
    pub const fn key(&self) -> Option<Key> {
        match *self {
            Self::Leaf { key, .. } => Some(key),
            _ => None,
        }
    }

    /// `true` for [`Node::Leaf`].
    #[must_use]
    #[inline]
    pub const fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }

    /// `true` for [`Node::Internal`].
    #[must_use]
    #[inline]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    /// `true` for [`Node::Empty`].
    #[must_use]
    #[inline]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}
