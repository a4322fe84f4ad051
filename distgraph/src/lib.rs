// Copyright (c) Sean Lawlor
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree.

//! `distgraph`: An in-process scatter/gather RPC fabric. A fixed pool of nodes
//! executes pluggable two-phase (map, then reduce) jobs submitted by clients
//! over a channel based "network".
//!
//! ## Getting started
//!
//! A client connects to a network, gets a coordinator node assigned round-robin
//! and calls jobs by name. The coordinator scatters the job to every node of
//! the network, gathers their map results and reduces them into the reply.
//!
//! ```rust
//! use distgraph::jobs::{self, COUNT_NODES};
//! use distgraph::{Client, Network, NetworkConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = NetworkConfig::default().with_node_count(3);
//!     let (network, handle) = Network::spawn("net", config, jobs::builtin_registry())
//!         .expect("Failed to start network");
//!
//!     let client = Client::new("client");
//!     client.connect_to(&network).expect("Failed to connect");
//!
//!     let reply = client
//!         .call("net", COUNT_NODES, "")
//!         .await
//!         .expect("Call failed");
//!     assert_eq!(&reply[..], b"3");
//!
//!     network.shutdown();
//!     handle.await.unwrap();
//! }
//! ```
//!
//! ## Jobs
//!
//! Jobs implement [registry::Job] and are registered in a [registry::MethodRegistry]
//! before the network starts. Each node may additionally hold a write-once
//! local data partition (see [Node::set_partition]) which map steps read, e.g.
//! the graph fragments loaded by [graph::load_partitions].

#![warn(unused_imports)]
#![warn(unsafe_code)]
#![warn(missing_docs)]

/// The name of a [Client]
pub type ClientName = String;
/// The name of a [Node], unique within its [Network]
pub type NodeName = String;
/// The name a job is registered under
pub type MethodName = String;
/// The name of a [Network]
pub type NetworkName = String;

pub mod balancer;
pub mod broadcast;
pub mod client;
pub mod concurrency;
pub mod errors;
pub mod graph;
pub mod jobs;
pub mod message;
pub mod network;
pub mod node;
pub mod registry;
pub mod rpc;

#[cfg(test)]
mod common_test;

// re-exports
pub use client::Client;
pub use errors::{ConnectErr, DistGraphErr, PartitionErr, RpcErr, SpawnErr};
pub use message::{Reply, Request, Role, RpcReplyPort, Task};
pub use network::{Network, NetworkConfig};
pub use node::{GatherPolicy, Node, NodeSet};
pub use registry::{Job, MethodRegistry};
