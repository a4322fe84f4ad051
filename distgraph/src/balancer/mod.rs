// Copyright (c) Sean Lawlor
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree.

//! Round-robin assignment of coordinators to newly connected clients
//!
//! RPC counts change too quickly as nodes interact to be a useful load signal,
//! so clients are simply spread cyclically over the static node set. Since the
//! node set never changes after startup, no actual queue is needed, just a
//! cursor over the fixed list.

use crate::{ConnectErr, NodeName};


/// A round-robin cursor over a fixed, ordered list of node names.
///
/// The balancer is not internally synchronized, the owning network serializes
/// access to it under its connection lock.
#[derive(Debug, Clone)]
pub struct LoadBalancer {
    pool: Vec<NodeName>,
    cursor: usize,
}

impl LoadBalancer {
    /// Build a balancer over the given node names. The order is preserved and
    /// the first assignment returns the first node.
    pub fn new(pool: Vec<NodeName>) -> Self {
        Self { pool, cursor: 0 }
    }

    /// Returns the next node in round-robin order and advances the cursor.
    ///
    /// Returns [Err(ConnectErr::NoNodes)] if the pool is empty, in which case the
    /// cursor does not move
    pub fn assign(&mut self) -> Result<NodeName, ConnectErr> {
        let Some(node) = self.pool.get(self.cursor) else {
            log::warn!("LoadBalancer::assign(): there are 0 nodes for balancing");
            return Err(ConnectErr::NoNodes);
        };
        let node = node.clone();
        self.cursor = (self.cursor + 1) % self.pool.len();
        Ok(node)
    }

    /// The number of nodes being balanced over
    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }
}
