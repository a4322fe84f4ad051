// Copyright (c) Sean Lawlor
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree.

//! The network is the top-level fabric. It owns the fixed node set, the
//! [LoadBalancer] and the client to coordinator assignments, and runs a single
//! acceptor task draining the ingress channel.
//!
//! Acceptance is serialized through the ingress, execution is not: every
//! accepted request gets its own task which drives the coordinator's
//! [Node::dispatch] to completion, so the acceptor never waits on a job.
//!
//! ## Example
//!
//! ```rust
//! use distgraph::{Client, MethodRegistry, Network, NetworkConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (network, handle) = Network::spawn(
//!         "example",
//!         NetworkConfig::default().with_nodes(["a", "b"]),
//!         MethodRegistry::new(),
//!     )
//!     .expect("Failed to start network");
//!
//!     let first = Client::new("first");
//!     let second = Client::new("second");
//!     assert_eq!("a", first.connect_to(&network).unwrap());
//!     assert_eq!("b", second.connect_to(&network).unwrap());
//!
//!     network.shutdown();
//!     handle.await.unwrap();
//! }
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use bytes::Bytes;

use crate::balancer::LoadBalancer;
use crate::client::Client;
use crate::concurrency::{self, JoinHandle, MpscReceiver, MpscSender, WatchReceiver, WatchSender};
use crate::message::{Request, Role, Task};
use crate::node::{Node, NodeSet};
use crate::registry::MethodRegistry;
use crate::{ClientName, ConnectErr, NetworkName, NodeName, RpcErr, SpawnErr};

pub mod config;
pub use config::NetworkConfig;


/// The connection bookkeeping, guarded by a single lock
struct Connections {
    assignments: HashMap<ClientName, NodeName>,
    balancer: LoadBalancer,
}

/// An in-process network of nodes
pub struct Network {
    name: NetworkName,
    nodes: Arc<NodeSet>,
    connections: Mutex<Connections>,
    ingress: MpscSender<Request>,
    done: WatchSender<bool>,
    total_rpcs: AtomicU64,
    total_bytes: AtomicU64,
}

impl std::fmt::Debug for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Network")
            .field("name", &self.name)
            .field("nodes", &self.nodes.names())
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}

impl Network {
    /// Build the network's nodes and start its acceptor.
    ///
    /// * `name` - The network's name, which clients address it by
    /// * `config` - The [NetworkConfig]
    /// * `registry` - The jobs the nodes can execute, frozen from here on
    ///
    /// Returns the network and the acceptor's [JoinHandle], which completes after
    /// [Network::shutdown]. Fails with [SpawnErr::DuplicateNode] if a node name
    /// is configured twice.
    pub fn spawn(
        name: impl Into<NetworkName>,
        config: NetworkConfig,
        registry: impl Into<Arc<MethodRegistry>>,
    ) -> Result<(Arc<Self>, JoinHandle<()>), SpawnErr> {
        let name = name.into();
        let nodes = NodeSet::build(config.nodes.clone(), registry.into(), config.node_settings())?;
        let balancer = LoadBalancer::new(nodes.names());

        let (ingress, ingress_rx) = concurrency::mpsc_bounded(config.ingress_buffer.max(1));
        let (done, done_rx) = concurrency::watch(false);

        let network = Arc::new(Self {
            name: name.clone(),
            nodes,
            connections: Mutex::new(Connections {
                assignments: HashMap::new(),
                balancer,
            }),
            ingress,
            done,
            total_rpcs: AtomicU64::new(0),
            total_bytes: AtomicU64::new(0),
        });

        let handle = concurrency::spawn(accept_loop(
            name.clone(),
            Arc::downgrade(&network),
            ingress_rx,
            done_rx,
        ));
        log::info!(
            "Network '{name}' started with {} nodes",
            network.nodes.len()
        );
        Ok((network, handle))
    }

    /// Retrieve the name of the network
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The network's node set
    pub fn nodes(&self) -> &Arc<NodeSet> {
        &self.nodes
    }

    /// Try and retrieve a node by name
    pub fn node(&self, name: &str) -> Option<&Arc<Node>> {
        self.nodes.get(name)
    }

    /// Connect a client, assigning it a coordinator round-robin. The
    /// assignment is recorded together with the client's own connection entry.
    ///
    /// Returns the assigned coordinator. A client which already has a
    /// coordinator keeps it, and gets [ConnectErr::AlreadyConnected] back. Fails
    /// with [ConnectErr::NoNodes] if the network has no nodes.
    pub fn connect_client(self: &Arc<Self>, client: &Client) -> Result<NodeName, ConnectErr> {
        let mut connections = self.lock_connections();
        if let Some(existing) = connections.assignments.get(client.name()) {
            return Err(ConnectErr::AlreadyConnected(existing.clone()));
        }

        let coordinator = connections.balancer.assign()?;
        connections
            .assignments
            .insert(client.name().to_string(), coordinator.clone());
        client.attach(self.clone());
        drop(connections);

        log::info!(
            "Client '{}' connected to network '{}' with coordinator '{coordinator}'",
            client.name(),
            self.name
        );
        Ok(coordinator)
    }

    /// The coordinator assigned to `client`, if it is connected
    pub fn coordinator_of(&self, client: &str) -> Option<NodeName> {
        self.lock_connections().assignments.get(client).cloned()
    }

    /// The number of connected clients
    pub fn client_count(&self) -> usize {
        self.lock_connections().assignments.len()
    }

    /// Call the job `method` on behalf of `client`, through the client's
    /// coordinator.
    ///
    /// Both enqueueing on the ingress and waiting for the reply race the
    /// shutdown signal, so the call fails fast once the network shuts down.
    pub async fn call(
        &self,
        client: &str,
        method: &str,
        args: impl Into<Bytes>,
    ) -> Result<Bytes, RpcErr> {
        if self.is_shut_down() {
            return Err(RpcErr::ShutDown);
        }
        if self.coordinator_of(client).is_none() {
            log::warn!(
                "Rejecting '{method}' from unknown client '{client}' on network '{}'",
                self.name
            );
            return Err(RpcErr::UnknownClient(client.to_string()));
        }

        let (tx, rx) = concurrency::oneshot();
        let request = Request {
            task: Task::new(client, method, Role::Coordinator, args),
            reply: tx.into(),
        };

        concurrency::select! {
            _ = shutdown_signal(self.done.subscribe()) => return Err(RpcErr::ShutDown),
            sent = self.ingress.send(request) => {
                if sent.is_err() {
                    return Err(RpcErr::ShutDown);
                }
            }
        }

        let reply = concurrency::select! {
            _ = shutdown_signal(self.done.subscribe()) => return Err(RpcErr::ShutDown),
            reply = rx => reply.map_err(|_| RpcErr::ReplyDropped)??,
        };

        if reply.is_ok() {
            Ok(reply.payload)
        } else {
            Err(RpcErr::Failed(method.to_string()))
        }
    }

    /// Fire the shutdown signal. Only the first call has an effect.
    ///
    /// The acceptor stops and pending calls fail with [RpcErr::ShutDown].
    /// Work already dispatched to nodes is not recalled, it runs to completion
    /// (or its deadline) and its replies are discarded.
    pub fn shutdown(&self) {
        let fired = self.done.send_if_modified(|done| {
            if *done {
                false
            } else {
                *done = true;
                true
            }
        });
        if fired {
            log::info!("Network '{}' shutting down", self.name);
        }
    }

    /// Determine if the network has been shut down
    pub fn is_shut_down(&self) -> bool {
        *self.done.borrow()
    }

    /// The sum of every node's RPC counter
    pub fn rpc_count(&self) -> u64 {
        self.nodes.iter().map(|node| node.rpc_count()).sum()
    }

    /// The number of requests accepted from clients
    pub fn total_rpcs(&self) -> u64 {
        self.total_rpcs.load(Ordering::Relaxed)
    }

    /// The total argument size of the requests accepted from clients
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes.load(Ordering::Relaxed)
    }

    fn lock_connections(&self) -> MutexGuard<'_, Connections> {
        self.connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The coordinator node of `client`
    fn resolve_coordinator(&self, client: &str) -> Result<Arc<Node>, RpcErr> {
        let name = self
            .coordinator_of(client)
            .ok_or_else(|| RpcErr::UnknownClient(client.to_string()))?;
        self.nodes
            .get(&name)
            .cloned()
            .ok_or(RpcErr::UnknownNode(name))
    }

    fn accept(&self, request: Request) {
        self.total_rpcs.fetch_add(1, Ordering::Relaxed);
        self.total_bytes
            .fetch_add(request.task.args.len() as u64, Ordering::Relaxed);

        if request.reply.is_closed() {
            log::debug!(
                "Caller of '{}' on network '{}' is gone, not dispatching",
                request.task.method,
                self.name
            );
            return;
        }

        let coordinator = match self.resolve_coordinator(&request.task.client) {
            Ok(coordinator) => coordinator,
            Err(err) => {
                log::error!("Failed to route a request on network '{}': {err}", self.name);
                let _ = request.reply.send(Err(err));
                return;
            }
        };

        concurrency::spawn(async move {
            let Request { task, reply } = request;
            let result = coordinator.dispatch(task).await;
            // the caller may have given up already
            let _ = reply.send(Ok(result));
        });
    }
}

/// Resolves once the shutdown signal fires, or its sender is gone
async fn shutdown_signal(mut done: WatchReceiver<bool>) {
    let _ = done.wait_for(|done| *done).await;
}

async fn accept_loop(
    name: NetworkName,
    network: Weak<Network>,
    mut ingress: MpscReceiver<Request>,
    done: WatchReceiver<bool>,
) {
    loop {
        let request = concurrency::select! {
            _ = shutdown_signal(done.clone()) => break,
            request = ingress.recv() => match request {
                Some(request) => request,
                None => break,
            },
        };
        let Some(network) = network.upgrade() else {
            break;
        };
        network.accept(request);
    }
    log::debug!("Network '{name}' acceptor exited");
}
