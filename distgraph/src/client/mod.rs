// Copyright (c) Sean Lawlor
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree.

//! Clients submit jobs to networks by name.
//!
//! A client can be connected to any number of networks at once. It is assigned
//! exactly one coordinator per network, which is fixed for the client's
//! lifetime in that network.

use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;

use crate::network::Network;
use crate::{ClientName, ConnectErr, NetworkName, NodeName, RpcErr};


/// A client identity and its connection table
pub struct Client {
    name: ClientName,
    connections: DashMap<NetworkName, Arc<Network>>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("name", &self.name)
            .field("networks", &self.networks())
            .finish()
    }
}

impl Client {
    /// Create a client which is connected to nothing yet.
    ///
    /// Networks identify clients by name, so names should be unique per
    /// network.
    pub fn new(name: impl Into<ClientName>) -> Self {
        Self {
            name: name.into(),
            connections: DashMap::new(),
        }
    }

    /// Retrieve the name of the client
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Connect to `network`. See [Network::connect_client].
    ///
    /// Returns the coordinator this client was assigned
    pub fn connect_to(&self, network: &Arc<Network>) -> Result<NodeName, ConnectErr> {
        network.connect_client(self)
    }

    /// Call the job `method` with `args` on the network named `network`
    ///
    /// Fails immediately with [RpcErr::NotConnected] if this client never
    /// connected to that network
    pub async fn call(
        &self,
        network: &str,
        method: &str,
        args: impl Into<Bytes>,
    ) -> Result<Bytes, RpcErr> {
        // clone out of the table, no shard lock is held across the await
        let target = self
            .connections
            .get(network)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| RpcErr::NotConnected(network.to_string()))?;
        target.call(&self.name, method, args).await
    }

    /// Determine if this client is connected to the network named `network`
    pub fn is_connected(&self, network: &str) -> bool {
        self.connections.contains_key(network)
    }

    /// The names of the networks this client is connected to, sorted
    pub fn networks(&self) -> Vec<NetworkName> {
        let mut names = self
            .connections
            .iter()
            .map(|entry| entry.key().clone())
            .collect::<Vec<_>>();
        names.sort();
        names
    }

    pub(crate) fn attach(&self, network: Arc<Network>) {
        self.connections.insert(network.name().to_string(), network);
    }
}
