// Copyright (c) Sean Lawlor
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree.

//! Built-in illustrative jobs. Results are decimal ASCII integers.

use async_trait::async_trait;
use bytes::Bytes;

use crate::graph::Graph;
use crate::message::Reply;
use crate::node::Node;
use crate::registry::{Job, MethodRegistry, RegistryErr};

#[cfg(test)]
mod tests;

/// Registered name of [CountNodes]
pub const COUNT_NODES: &str = "CountNodes";
/// Registered name of [CountConnectedComponents]
pub const COUNT_CONNECTED_COMPONENTS: &str = "CountConnectedComponents";

/// Counts the nodes reached by a scatter: every worker maps to `1`, the
/// coordinator sums.
pub struct CountNodes;

#[async_trait]
impl Job for CountNodes {
    async fn map(&self, _node: &Node, _args: Bytes) -> Bytes {
        Bytes::from_static(b"1")
    }

    async fn reduce(&self, _node: &Node, replies: Vec<Reply>) -> Bytes {
        sum_replies(&replies)
    }
}

/// Counts the connected components of the graph partitions held by the nodes.
/// Every worker counts its own partition, the coordinator sums.
///
/// A node without a [Graph] partition fails its map step.
pub struct CountConnectedComponents;

#[async_trait]
impl Job for CountConnectedComponents {
    async fn map(&self, node: &Node, _args: Bytes) -> Bytes {
        match node.partition::<Graph>() {
            Some(graph) => Bytes::from(graph.connected_components().to_string()),
            None => {
                log::warn!("Node '{}' holds no graph partition", node.name());
                Bytes::new()
            }
        }
    }

    async fn reduce(&self, _node: &Node, replies: Vec<Reply>) -> Bytes {
        sum_replies(&replies)
    }
}

/// Parse a decimal count payload
pub fn parse_count(payload: &[u8]) -> Option<u64> {
    std::str::from_utf8(payload).ok()?.trim().parse().ok()
}

/// Sum the decimal counts of `replies`. Payloads which are not a count are
/// skipped.
pub fn sum_replies(replies: &[Reply]) -> Bytes {
    let total: u64 = replies
        .iter()
        .filter_map(|reply| {
            let count = parse_count(&reply.payload);
            if count.is_none() {
                log::warn!("Skipping malformed count {:?}", reply.payload);
            }
            count
        })
        .sum();
    Bytes::from(total.to_string())
}

/// Register the built-in jobs
pub fn register_builtins(registry: &mut MethodRegistry) -> Result<(), RegistryErr> {
    registry.register(COUNT_NODES, CountNodes)?;
    registry.register(COUNT_CONNECTED_COMPONENTS, CountConnectedComponents)?;
    Ok(())
}

/// A registry holding only the built-in jobs
pub fn builtin_registry() -> MethodRegistry {
    let mut registry = MethodRegistry::new();
    if let Err(err) = register_builtins(&mut registry) {
        // unreachable on an empty registry
        log::error!("Failed to register built-in jobs: {err}");
    }
    registry
}
