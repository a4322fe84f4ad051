// Copyright (c) Sean Lawlor
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree.

//! Network construction settings

use crate::concurrency::Duration;
use crate::node::{GatherPolicy, NodeSettings, DEFAULT_COORDINATOR_TIMEOUT, DEFAULT_WORKER_TIMEOUT};
use crate::NodeName;

/// The number of nodes a network gets when no names are configured
pub const DEFAULT_NODE_COUNT: usize = 5;

/// The ingress channel's default capacity
pub const DEFAULT_INGRESS_BUFFER: usize = 1024;

/// Settings a [super::Network] is spawned with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// The node names, in balancing order
    pub nodes: Vec<NodeName>,
    /// Deadline of a worker's map step
    pub worker_timeout: Duration,
    /// Deadline of a coordinator's scatter, gather and reduce
    pub coordinator_timeout: Duration,
    /// Capacity of the ingress channel. Callers wait for space when it is full.
    pub ingress_buffer: usize,
    /// Handling of failed sub-replies
    pub gather_policy: GatherPolicy,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            nodes: numbered_nodes(DEFAULT_NODE_COUNT),
            worker_timeout: DEFAULT_WORKER_TIMEOUT,
            coordinator_timeout: DEFAULT_COORDINATOR_TIMEOUT,
            ingress_buffer: DEFAULT_INGRESS_BUFFER,
            gather_policy: GatherPolicy::default(),
        }
    }
}

impl NetworkConfig {
    /// Use `count` nodes named `"0"` through `"{count - 1}"`
    pub fn with_node_count(self, count: usize) -> Self {
        self.with_nodes(numbered_nodes(count))
    }

    /// Use the given node names
    pub fn with_nodes<TName>(mut self, nodes: impl IntoIterator<Item = TName>) -> Self
    where
        TName: Into<NodeName>,
    {
        self.nodes = nodes.into_iter().map(Into::into).collect();
        self
    }

    /// Set the worker deadline
    pub fn with_worker_timeout(mut self, timeout: Duration) -> Self {
        self.worker_timeout = timeout;
        self
    }

    /// Set the coordinator deadline
    pub fn with_coordinator_timeout(mut self, timeout: Duration) -> Self {
        self.coordinator_timeout = timeout;
        self
    }

    /// Set the gather policy
    pub fn with_gather_policy(mut self, policy: GatherPolicy) -> Self {
        self.gather_policy = policy;
        self
    }

    /// Set the ingress capacity, at least 1
    pub fn with_ingress_buffer(mut self, buffer: usize) -> Self {
        self.ingress_buffer = buffer.max(1);
        self
    }

    pub(crate) fn node_settings(&self) -> NodeSettings {
        if self.coordinator_timeout <= self.worker_timeout {
            log::warn!(
                "Coordinator timeout {:?} does not exceed worker timeout {:?}, timed out workers may fail the whole gather",
                self.coordinator_timeout,
                self.worker_timeout
            );
        }
        NodeSettings {
            worker_timeout: self.worker_timeout,
            coordinator_timeout: self.coordinator_timeout,
            gather_policy: self.gather_policy,
        }
    }
}

fn numbered_nodes(count: usize) -> Vec<NodeName> {
    (0..count).map(|i| i.to_string()).collect()
}
