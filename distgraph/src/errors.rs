// Copyright (c) Sean Lawlor
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree.

//! Fabric error types

use std::fmt::Display;

use crate::{ClientName, MethodName, NetworkName, NodeName};

/// Errors which can result from a remote procedure call into the fabric.
///
/// Every variant is the equivalent of an `ok = false` reply: no effect occurred
/// and the call is safe to retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcErr {
    /// The calling client has never connected to the network
    UnknownClient(ClientName),
    /// The client holds no connection to the named network
    NotConnected(NetworkName),
    /// The client's coordinator is not part of the network's node set
    UnknownNode(NodeName),
    /// No job is registered under the requested method name
    MethodNotFound(MethodName),
    /// A job's map step produced an empty result
    EmptyResult(MethodName),
    /// The coordinator found no nodes to scatter to
    EmptyQuorum,
    /// Not every scattered sub-request produced a successful reply
    IncompleteGather {
        /// The number of failed (or missing) sub-replies
        failed: usize,
        /// The size of the quorum the request was scattered to
        expected: usize,
    },
    /// No reply arrived before the deadline
    Timeout,
    /// The handler dropped its reply port without replying
    ReplyDropped,
    /// The network has been shut down
    ShutDown,
    /// The call was routed, but the coordinator replied without success
    Failed(MethodName),
}

impl std::error::Error for RpcErr {}

impl Display for RpcErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownClient(client) => {
                write!(f, "Client '{client}' has no coordinator assigned")
            }
            Self::NotConnected(network) => {
                write!(f, "Not connected to network '{network}'")
            }
            Self::UnknownNode(node) => {
                write!(f, "Node '{node}' is not part of the network")
            }
            Self::MethodNotFound(method) => {
                write!(f, "Method '{method}' is not registered")
            }
            Self::EmptyResult(method) => {
                write!(f, "Method '{method}' produced an empty result")
            }
            Self::EmptyQuorum => {
                write!(f, "The quorum is empty, there are no nodes to scatter to")
            }
            Self::IncompleteGather { failed, expected } => {
                write!(f, "{failed} of {expected} sub-requests failed")
            }
            Self::Timeout => write!(f, "timeout"),
            Self::ReplyDropped => write!(f, "The reply port was dropped without a reply"),
            Self::ShutDown => write!(f, "The network has been shut down"),
            Self::Failed(method) => {
                write!(f, "Call to '{method}' failed")
            }
        }
    }
}

impl<T> From<crate::rpc::CallResult<T>> for RpcErr {
    fn from(value: crate::rpc::CallResult<T>) -> Self {
        match value {
            crate::rpc::CallResult::Timeout => RpcErr::Timeout,
            crate::rpc::CallResult::SenderError => RpcErr::ReplyDropped,
            _ => panic!("A successful `CallResult` cannot be mapped to a `RpcErr`"),
        }
    }
}

/// Errors connecting a client to a network
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectErr {
    /// The network's node set is empty, no coordinator can be assigned
    NoNodes,
    /// The client is already connected. Contains the coordinator which was
    /// assigned on the first connection, which remains unchanged.
    AlreadyConnected(NodeName),
}

impl std::error::Error for ConnectErr {}

impl Display for ConnectErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoNodes => write!(f, "There are no nodes to balance clients over"),
            Self::AlreadyConnected(coordinator) => {
                write!(
                    f,
                    "Client is already connected with coordinator '{coordinator}'"
                )
            }
        }
    }
}

/// Errors starting a network
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpawnErr {
    /// Two nodes in the configuration share a name
    DuplicateNode(NodeName),
}

impl std::error::Error for SpawnErr {}

impl Display for SpawnErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateNode(node) => {
                write!(f, "Node name '{node}' is used more than once")
            }
        }
    }
}

/// Errors setting a node's local data partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionErr {
    /// The node's partition has already been set, partitions are write-once
    AlreadySet(NodeName),
}

impl std::error::Error for PartitionErr {}

impl Display for PartitionErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadySet(node) => {
                write!(f, "Node '{node}' already holds a data partition")
            }
        }
    }
}

/// Error types which can result from the fabric
#[derive(Debug)]
pub enum DistGraphErr {
    /// An error occurred starting a network
    Spawn(SpawnErr),
    /// An error occurred connecting a client
    Connect(ConnectErr),
    /// An error occurred in a call
    Rpc(RpcErr),
    /// An error occurred registering a job
    Registry(crate::registry::RegistryErr),
    /// An error occurred loading graph partitions
    Graph(crate::graph::GraphErr),
}

impl std::error::Error for DistGraphErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn(inner) => Some(inner),
            Self::Connect(inner) => Some(inner),
            Self::Rpc(inner) => Some(inner),
            Self::Registry(inner) => Some(inner),
            Self::Graph(inner) => Some(inner),
        }
    }
}

impl From<SpawnErr> for DistGraphErr {
    fn from(value: SpawnErr) -> Self {
        DistGraphErr::Spawn(value)
    }
}

impl From<ConnectErr> for DistGraphErr {
    fn from(value: ConnectErr) -> Self {
        DistGraphErr::Connect(value)
    }
}

impl From<RpcErr> for DistGraphErr {
    fn from(value: RpcErr) -> Self {
        DistGraphErr::Rpc(value)
    }
}

impl From<crate::registry::RegistryErr> for DistGraphErr {
    fn from(value: crate::registry::RegistryErr) -> Self {
        DistGraphErr::Registry(value)
    }
}

impl From<crate::graph::GraphErr> for DistGraphErr {
    fn from(value: crate::graph::GraphErr) -> Self {
        DistGraphErr::Graph(value)
    }
}

impl Display for DistGraphErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spawn(err) => write!(f, "{err}"),
            Self::Connect(err) => write!(f, "{err}"),
            Self::Rpc(err) => write!(f, "{err}"),
            Self::Registry(err) => write!(f, "{err}"),
            Self::Graph(err) => write!(f, "{err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;
    use crate::graph::GraphErr;
    use crate::registry::RegistryErr;

    #[test]
    fn test_wrapped_errors_keep_their_source() {
        fn fail_spawn() -> Result<(), DistGraphErr> {
            let spawned: Result<(), SpawnErr> = Err(SpawnErr::DuplicateNode("a".to_string()));
            spawned?;
            Ok(())
        }
        fn fail_rpc() -> Result<(), DistGraphErr> {
            let called: Result<(), RpcErr> = Err(RpcErr::UnknownNode("b".to_string()));
            called?;
            Ok(())
        }

        let err = fail_spawn().unwrap_err();
        assert!(matches!(err, DistGraphErr::Spawn(SpawnErr::DuplicateNode(_))));
        assert_eq!(
            "Node name 'a' is used more than once",
            err.source().unwrap().to_string()
        );

        let err = fail_rpc().unwrap_err();
        assert_eq!("Node 'b' is not part of the network", err.to_string());

        let err = DistGraphErr::from(GraphErr::Partition(PartitionErr::AlreadySet("c".into())));
        let graph_err = err.source().unwrap();
        assert_eq!(
            "Node 'c' already holds a data partition",
            graph_err.source().unwrap().to_string()
        );

        let err = DistGraphErr::from(RegistryErr::AlreadyRegistered("Job".into()));
        assert!(matches!(err, DistGraphErr::Registry(_)));
        let err = DistGraphErr::from(ConnectErr::NoNodes);
        assert_eq!("There are no nodes to balance clients over", err.to_string());
    }
}
