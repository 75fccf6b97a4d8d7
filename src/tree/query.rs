//! Read-only views: raw leaf-level paging and active-leaf iteration.

use std::iter::Enumerate;
use std::slice::Iter;

use primitive_types::U256;

use super::SortitionTree;
use crate::key::Key;
use crate::node::Node;

/// One page of raw leaf-level slot weights.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeafPage {
    /// First index of the leaf level (`cursor` is relative to this).
    pub start_index: usize,

    /// Slot weights, freed slots included as zero.
    pub values: Vec<U256>,

    /// `true` if slots remain past this page.
    pub has_more: bool,
}

impl SortitionTree {
    /// First index `i` with `k * i + 1 >= len`: no slot from here on has children.
    #[must_use]
    pub fn leaf_level_start(&self) -> usize {
        let len = self.store.nodes.len();
        if len <= 1 || self.k == 0 {
            return 0;
        }
        (len - 1).div_ceil(self.k)
    }

    /// Up to `count` raw slot weights starting at `leaf_level_start() + cursor`.
    ///
    /// Freed slots appear as zero; callers filter them. A cursor past the end
    /// yields an empty page.
    #[must_use]
    pub fn query_leafs(&self, cursor: usize, count: usize) -> LeafPage {
        let nodes = &self.store.nodes;
        let start_index = self.leaf_level_start();

        let from = start_index.saturating_add(cursor).min(nodes.len());
        let to = from.saturating_add(count).min(nodes.len());

        LeafPage {
            start_index,
            values: nodes[from..to].iter().map(Node::weight).collect(),
            has_more: to < nodes.len(),
        }
    }

    /// Active `(key, weight)` pairs in slot order.
    #[must_use]
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves {
            inner: self.store.nodes.iter().enumerate(),
        }
    }
}

/// Iterator over active leaves. See [`SortitionTree::leaves`].
#[derive(Debug, Clone)]
pub struct Leaves<'a> {
    inner: Enumerate<Iter<'a, Node>>,
}

impl Leaves<'_> {
    /// Like `next`, but also yields the slot index.
    pub fn next_indexed(&mut self) -> Option<(usize, Key, U256)> {
        self.inner.find_map(|(index, node)| match *node {
            Node::Leaf { weight, key } => Some((index, key, weight)),
            _ => None,
        })
    }
}

impl Iterator for Leaves<'_> {
    type Item = (Key, U256);

    fn next(&mut self) -> Option<Self::Item> {
        self.next_indexed().map(|(_, key, weight)| (key, weight))
    }
}
