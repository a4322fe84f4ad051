// Copyright (c) Sean Lawlor
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree.

//! The quorum broadcaster. Each node owns one and asks it which nodes a
//! coordinator step scatters to.
//!
//! The "quorum" is the full node set of the owning network, this is a full
//! broadcast and never a majority subset. The lookup is live: it reads the
//! network's node set at call time instead of a snapshot taken at
//! construction, so the coordinator's scatter and gather always agree on the
//! quorum size.

use std::sync::{Arc, Weak};

use crate::node::{Node, NodeSet};


/// Per-node accessor to the set of nodes eligible to receive scattered sub-tasks.
///
/// Holds a non-owning handle to the network's node set, the network stays the
/// sole owner of its nodes.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    nodes: Weak<NodeSet>,
}

impl Broadcaster {
    pub(crate) fn new(nodes: Weak<NodeSet>) -> Self {
        Self { nodes }
    }

    /// A broadcaster which is not attached to any network, its quorum is
    /// always empty
    pub(crate) fn detached() -> Self {
        Self { nodes: Weak::new() }
    }

    /// Returns every node of the owning network, in the network's node order.
    ///
    /// Empty if the network has been torn down (or was never attached)
    pub fn gather_quorum(&self) -> Vec<Arc<Node>> {
        self.nodes
            .upgrade()
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// The number of nodes [Broadcaster::gather_quorum] would return
    pub fn quorum_size(&self) -> usize {
        self.nodes.upgrade().map(|set| set.len()).unwrap_or(0)
    }
}
