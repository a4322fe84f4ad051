// Copyright (c) Sean Lawlor
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree.

//! Loads a partitioned graph onto a network's nodes and counts its connected
//! components through the fabric. The distributed count must match the
//! sequential count over the same file.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use clap::Args;
use distgraph::concurrency::Instant;
use distgraph::graph::{self, GraphErr};
use distgraph::jobs::{self, COUNT_CONNECTED_COMPONENTS};
use distgraph::{Client, DistGraphErr, Network, NetworkConfig};

const NETWORK: &str = "components";

/// Configuration
#[derive(Args, Debug, Clone)]
pub struct ComponentsConfig {
    /// The number of nodes in the network
    #[arg(long, default_value_t = 5)]
    nodes: usize,
    /// The graph partition file
    #[arg(long)]
    graph: PathBuf,
    /// Write a test graph (two components per node) to `graph` first
    #[arg(long)]
    generate: bool,
}

fn sequential_count(config: &ComponentsConfig) -> Result<usize, GraphErr> {
    let partitions = graph::parse_partitions(BufReader::new(File::open(&config.graph)?))?;
    Ok(graph::count_components_sequentially(&partitions))
}

pub(crate) async fn run(config: ComponentsConfig) -> Result<i32, DistGraphErr> {
    let (network, handle) = Network::spawn(
        NETWORK,
        NetworkConfig::default().with_node_count(config.nodes),
        jobs::builtin_registry(),
    )?;

    if config.generate {
        graph::create_test_graphs(&config.graph, &network.nodes().names())?;
        log::info!("Wrote test graphs to '{}'", config.graph.display());
    }
    let expected = sequential_count(&config)?;
    graph::load_partitions(&config.graph, network.nodes())?;

    let client = Client::new("grapher");
    client.connect_to(&network)?;

    let start = Instant::now();
    let result = client.call(NETWORK, COUNT_CONNECTED_COMPONENTS, "").await;
    let elapsed = start.elapsed();

    let passed = match result {
        Ok(reply) => {
            let counted = jobs::parse_count(&reply);
            log::info!("Counted {counted:?} components, expected {expected}");
            counted == Some(expected as u64)
        }
        Err(err) => {
            log::error!("Call failed: {err}");
            false
        }
    };

    network.shutdown();
    let _ = handle.await;

    Ok(crate::report("components", passed, elapsed))
}
