//! Filepath: src/journal.rs
//!
//! All-or-nothing mutation of the tree storage.
//!
//! Every write made by `set` goes through a [`Transaction`], which records an
//! undo entry before touching [`Store`]. Dropping the transaction without
//! calling [`Transaction::commit`] replays the undo log in reverse, so an
//! error returned halfway through ancestor propagation leaves no trace.
//!
//! The log is bounded by the operation: one node write per ancestor plus a
//! constant number of structural edits, i.e. `O(log_k n)` entries.

use std::collections::HashMap;

use crate::key::Key;
use crate::node::Node;
use crate::tracing_helpers::warn_log;

/// The three pieces of mutable tree state.
#[derive(Clone, Debug, Default)]
pub(crate) struct Store {
    /// Flat node array. Index 0 is the root. Append-only.
    pub(crate) nodes: Vec<Node>,

    /// Freed leaf indices, reused LIFO.
    pub(crate) vacant: Vec<usize>,

    /// Key to leaf index. The reverse direction lives in [`Node::Leaf`].
    pub(crate) index_of: HashMap<Key, usize>,
}

/// One reversible edit.
#[derive(Debug)]
enum Undo {
    /// `nodes[index]` held `prior`.
    Write { index: usize, prior: Node },

    /// A node was appended; truncate back.
    Append,

    /// An index was pushed onto the vacancy stack.
    PushVacant,

    /// `index` was popped from the vacancy stack.
    PopVacant { index: usize },

    /// `index_of[key]` held `prior` (`None` = absent).
    Bind { key: Key, prior: Option<usize> },
}

/// Scoped write access to a [`Store`] that rolls back unless committed.
pub(crate) struct Transaction<'a> {
    store: &'a mut Store,
    log: Vec<Undo>,
    committed: bool,
}

impl<'a> Transaction<'a> {
    #[inline]
    pub(crate) fn begin(store: &'a mut Store) -> Self {
        Self {
            store,
            log: Vec::new(),
            committed: false,
        }
    }

    /// Keep every edit made so far.
    #[inline]
    pub(crate) fn commit(mut self) {
        self.committed = true;
    }

    /// Node at `index`, or `Empty` past the end of the array.
    #[inline]
    pub(crate) fn node(&self, index: usize) -> Node {
        self.store.nodes.get(index).copied().unwrap_or_default()
    }

    #[inline]
    pub(crate) fn index_of(&self, key: &Key) -> Option<usize> {
        self.store.index_of.get(key).copied()
    }

    /// Overwrite an existing slot.
    pub(crate) fn write(&mut self, index: usize, node: Node) {
        if let Some(slot) = self.store.nodes.get_mut(index) {
            let prior = std::mem::replace(slot, node);
            self.log.push(Undo::Write { index, prior });
        }
    }

    /// Append a slot and return its index.
    pub(crate) fn append(&mut self, node: Node) -> usize {
        let index = self.store.nodes.len();
        self.store.nodes.push(node);
        self.log.push(Undo::Append);
        index
    }

    pub(crate) fn push_vacant(&mut self, index: usize) {
        self.store.vacant.push(index);
        self.log.push(Undo::PushVacant);
    }

    pub(crate) fn pop_vacant(&mut self) -> Option<usize> {
        let index = self.store.vacant.pop()?;
        self.log.push(Undo::PopVacant { index });
        Some(index)
    }

    pub(crate) fn bind(&mut self, key: Key, index: usize) {
        let prior = self.store.index_of.insert(key, index);
        self.log.push(Undo::Bind { key, prior });
    }

    pub(crate) fn unbind(&mut self, key: &Key) {
        if let Some(prior) = self.store.index_of.remove(key) {
            self.log.push(Undo::Bind {
                key: *key,
                prior: Some(prior),
            });
        }
    }

    fn rollback(&mut self) {
        while let Some(undo) = self.log.pop() {
            match undo {
                Undo::Write { index, prior } => {
                    if let Some(slot) = self.store.nodes.get_mut(index) {
                        *slot = prior;
                    }
                }
                Undo::Append => {
                    self.store.nodes.pop();
                }
                Undo::PushVacant => {
                    self.store.vacant.pop();
                }
                Undo::PopVacant { index } => self.store.vacant.push(index),
                Undo::Bind { key, prior } => match prior {
                    Some(index) => {
                        self.store.index_of.insert(key, index);
                    }
                    None => {
                        self.store.index_of.remove(&key);
                    }
                },
            }
        }
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.committed && !self.log.is_empty() {
            warn_log!(edits = self.log.len(), "rolling back uncommitted transaction");
            self.rollback();
        }
    }
}
