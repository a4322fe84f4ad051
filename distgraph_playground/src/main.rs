// Copyright (c) Sean Lawlor
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree.

use std::env;

use clap::Parser;

mod components;
mod count_nodes;

#[derive(Debug, clap::Subcommand)]
enum Scenario {
    /// Count the nodes of a network from many concurrent clients
    CountNodes(count_nodes::CountNodesConfig),
    /// Count the connected components of a partitioned graph, and compare
    /// against the sequential count
    Components(components::ComponentsConfig),
}

/// distgraph scenario runner
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    scenario: Scenario,

    /// The log level, used when `RUST_LOG` is not set
    #[clap(short, long, default_value = "info")]
    log: String,
}

// MAIN //
#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() {
    let args = Args::parse();

    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", &args.log);
    }
    env_logger::builder().format_timestamp_millis().init();

    let code = tokio::select! {
        code = run(args.scenario) => code,
        _ = tokio::signal::ctrl_c() => {
            log::info!("CTRL-C pressed, exiting scenario");
            -2
        }
    };
    log::info!("Scenario exiting with code {code}");
    std::process::exit(code);
}

async fn run(scenario: Scenario) -> i32 {
    let result = match scenario {
        Scenario::CountNodes(config) => count_nodes::run(config).await,
        Scenario::Components(config) => components::run(config).await,
    };
    result.unwrap_or_else(|err| {
        log::error!("Scenario could not run: {err}");
        -3
    })
}

/// Print the scenario's outcome and map it to an exit code
pub(crate) fn report(scenario: &str, passed: bool, elapsed: std::time::Duration) -> i32 {
    if passed {
        println!("{scenario}: pass ({elapsed:?})");
        0
    } else {
        println!("{scenario}: FAIL ({elapsed:?})");
        -1
    }
}
