// Copyright (c) Sean Lawlor
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree.

//! Spawns a network with `nodes` nodes and connects `clients` clients, each of
//! which calls `CountNodes` concurrently. Every reply must equal the node count.

use std::sync::Arc;

use clap::Args;
use distgraph::concurrency::{self, Duration, Instant};
use distgraph::jobs::{self, COUNT_NODES};
use distgraph::{Client, DistGraphErr, Network, NetworkConfig};

const NETWORK: &str = "count_nodes";

/// Configuration
#[derive(Args, Debug, Clone)]
pub struct CountNodesConfig {
    /// The number of nodes in the network
    #[arg(long, default_value_t = 5)]
    nodes: usize,
    /// The number of concurrent clients
    #[arg(long, default_value_t = 100)]
    clients: usize,
    /// Worker deadline, in milliseconds
    #[arg(long, default_value_t = 2000)]
    worker_timeout_ms: u64,
    /// Coordinator deadline, in milliseconds
    #[arg(long, default_value_t = 5000)]
    coordinator_timeout_ms: u64,
}

pub(crate) async fn run(config: CountNodesConfig) -> Result<i32, DistGraphErr> {
    let network_config = NetworkConfig::default()
        .with_node_count(config.nodes)
        .with_worker_timeout(Duration::from_millis(config.worker_timeout_ms))
        .with_coordinator_timeout(Duration::from_millis(config.coordinator_timeout_ms));
    let (network, handle) = Network::spawn(NETWORK, network_config, jobs::builtin_registry())?;

    let start = Instant::now();
    let mut calls = Vec::with_capacity(config.clients);
    for i in 0..config.clients {
        let client = Arc::new(Client::new(format!("client_{i}")));
        client.connect_to(&network)?;
        calls.push(concurrency::spawn(async move {
            client.call(NETWORK, COUNT_NODES, "").await
        }));
    }

    let expected = config.nodes.to_string();
    let mut passed = true;
    for (i, call) in futures::future::join_all(calls).await.into_iter().enumerate() {
        match call {
            Ok(Ok(reply)) if reply == expected.as_bytes() => {}
            Ok(Ok(reply)) => {
                log::error!("Client {i} counted {reply:?} nodes, expected {expected}");
                passed = false;
            }
            Ok(Err(err)) => {
                log::error!("Client {i} call failed: {err}");
                passed = false;
            }
            Err(err) => {
                log::error!("Client {i} task failed: {err}");
                passed = false;
            }
        }
    }
    let elapsed = start.elapsed();

    log::info!(
        "{} requests, {} node dispatches, {} argument bytes",
        network.total_rpcs(),
        network.rpc_count(),
        network.total_bytes()
    );
    network.shutdown();
    let _ = handle.await;

    Ok(crate::report("count-nodes", passed, elapsed))
}
