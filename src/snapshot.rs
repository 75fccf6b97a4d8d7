//! Serde support for [`SortitionTree`] (feature `serde`).
//!
//! A tree is stored as its branching factor, node array and vacancy stack.
//! The key map is redundant with the leaf slots, so it is rebuilt on load and
//! the whole structure is validated before the tree is handed back.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::node::Node;
use crate::tree::SortitionTree;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    k: usize,
    nodes: &'a [Node],
    vacant: &'a [usize],
}

#[derive(Deserialize)]
struct SnapshotOwned {
    k: usize,
    nodes: Vec<Node>,
    vacant: Vec<usize>,
}

impl Serialize for SortitionTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SnapshotRef {
            k: self.branching().unwrap_or(0),
            nodes: self.nodes(),
            vacant: self.vacancies(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SortitionTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let snapshot = SnapshotOwned::deserialize(deserializer)?;
        if snapshot.k == 0 && snapshot.nodes.is_empty() {
            return Ok(Self::new());
        }

        Self::from_parts(snapshot.k, snapshot.nodes, snapshot.vacant)
            .map_err(serde::de::Error::custom)
    }
}
