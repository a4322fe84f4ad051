// Copyright (c) Sean Lawlor
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree.

//! Nodes are the units of compute of a network. A node has no fixed role, the
//! handler is selected by the [Role] carried on each inbound [Task]:
//!
//! 1. [Role::Coordinator]: gather the quorum from the node's [Broadcaster],
//!    scatter a worker sub-task to every member, gather exactly one reply per
//!    member (in completion order), then run the job's reduce step.
//! 2. [Role::Worker]: run the job's map step against this node's local data.
//!
//! Every dispatch is bounded by a per-role deadline, see [Node::dispatch].

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::FutureExt;
use once_cell::sync::OnceCell;

use crate::broadcast::Broadcaster;
use crate::concurrency::{self, Duration};
use crate::message::{Reply, Role, Task};
use crate::registry::MethodRegistry;
use crate::rpc;
use crate::{NodeName, PartitionErr, RpcErr, SpawnErr};


/// The default deadline for a worker's map step
pub const DEFAULT_WORKER_TIMEOUT: Duration = Duration::from_secs(2);
/// The default deadline for a coordinator's full scatter/gather/reduce step.
/// It outlives the worker deadline so a timed-out worker is still gathered as
/// a failed reply.
pub const DEFAULT_COORDINATOR_TIMEOUT: Duration = Duration::from_secs(5);

/// What a coordinator does with gathered sub-replies which are not `ok`.
///
/// The reduce step never sees a failed reply under either policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GatherPolicy {
    /// Any failed sub-reply fails the whole call without running reduce, so a
    /// partial result is never visible to the client
    #[default]
    RequireAll,
    /// Failed sub-replies are dropped and reduce runs over the successful ones.
    /// Fails only if nothing succeeded.
    SkipFailed,
}

impl GatherPolicy {
    /// Filter the gathered `replies` of a quorum of size `expected`.
    ///
    /// Replies which never arrived count as failed.
    pub fn apply(self, replies: Vec<Reply>, expected: usize) -> Result<Vec<Reply>, RpcErr> {
        let successes = replies
            .into_iter()
            .filter(|reply| reply.is_ok())
            .collect::<Vec<_>>();
        let failed = expected.saturating_sub(successes.len());

        match self {
            Self::RequireAll if failed > 0 => Err(RpcErr::IncompleteGather { failed, expected }),
            Self::SkipFailed if successes.is_empty() => {
                Err(RpcErr::IncompleteGather { failed, expected })
            }
            _ => Ok(successes),
        }
    }
}

/// Dispatch behavior shared by every node of a network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeSettings {
    /// Deadline of a worker-bound dispatch
    pub worker_timeout: Duration,
    /// Deadline of a coordinator-bound dispatch
    pub coordinator_timeout: Duration,
    /// Handling of failed sub-replies
    pub gather_policy: GatherPolicy,
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            worker_timeout: DEFAULT_WORKER_TIMEOUT,
            coordinator_timeout: DEFAULT_COORDINATOR_TIMEOUT,
            gather_policy: GatherPolicy::default(),
        }
    }
}

impl NodeSettings {
    /// The dispatch deadline for a task with the given role
    pub fn timeout_for(&self, role: Role) -> Duration {
        match role {
            Role::Coordinator => self.coordinator_timeout,
            Role::Worker => self.worker_timeout,
        }
    }
}

/// A unit of compute
pub struct Node {
    name: NodeName,
    rpc_count: AtomicU64,
    broadcaster: Broadcaster,
    registry: Arc<MethodRegistry>,
    settings: NodeSettings,
    partition: OnceCell<Box<dyn Any + Send + Sync>>,
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("rpc_count", &self.rpc_count())
            .field("has_partition", &self.partition.get().is_some())
            .finish()
    }
}

impl Node {
    fn new(
        name: NodeName,
        broadcaster: Broadcaster,
        registry: Arc<MethodRegistry>,
        settings: NodeSettings,
    ) -> Self {
        Self {
            name,
            rpc_count: AtomicU64::new(0),
            broadcaster,
            registry,
            settings,
            partition: OnceCell::new(),
        }
    }

    /// Create a node which belongs to no network. Its quorum is always empty so
    /// it can only serve as a worker, this is mostly useful for running map
    /// steps outside of the fabric (e.g. sequential reference computations).
    pub fn standalone(name: impl Into<NodeName>, registry: Arc<MethodRegistry>) -> Arc<Self> {
        Arc::new(Self::new(
            name.into(),
            Broadcaster::detached(),
            registry,
            NodeSettings::default(),
        ))
    }

    /// Retrieve the name of the node
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The number of dispatches this node has received, in either role
    pub fn rpc_count(&self) -> u64 {
        self.rpc_count.load(Ordering::Relaxed)
    }

    /// Retrieve the node's broadcaster
    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    /// Set this node's job-specific local data. A partition can only be set once
    /// and should be in place before any job referencing it runs.
    pub fn set_partition<TData>(&self, data: TData) -> Result<(), PartitionErr>
    where
        TData: Any + Send + Sync,
    {
        self.partition
            .set(Box::new(data))
            .map_err(|_| PartitionErr::AlreadySet(self.name.clone()))
    }

    /// Retrieve this node's local data, if it was set and is of type `TData`
    pub fn partition<TData>(&self) -> Option<&TData>
    where
        TData: Any,
    {
        self.partition
            .get()
            .and_then(|partition| (**partition).downcast_ref::<TData>())
    }

    /// Execute a task on this node, in the role the task carries.
    ///
    /// The handler runs in its own task. If it does not reply within the role's
    /// deadline, dispatch gives up and produces a failed [Reply]: the handler is
    /// abandoned, not cancelled, and its late result is dropped.
    pub async fn dispatch(self: &Arc<Self>, task: Task) -> Reply {
        self.rpc_count.fetch_add(1, Ordering::Relaxed);

        let role = task.role;
        let method = task.method.clone();
        log::debug!("Node '{}' dispatching '{method}' as {role}", self.name);

        let node = self.clone();
        let result = rpc::call(
            move |port| {
                concurrency::spawn(async move {
                    let reply = node.handle(task).await;
                    let _ = port.send(reply);
                });
            },
            self.settings.timeout_for(role),
        )
        .await;

        result.unwrap_or_else(|failed| {
            let err = RpcErr::from(failed);
            log::warn!(
                "Node '{}' got no reply for '{method}' as {role}: {err}",
                self.name
            );
            Reply::failure()
        })
    }

    fn handle(self: Arc<Self>, task: Task) -> BoxFuture<'static, Reply> {
        async move {
            let role = task.role;
            let method = task.method.clone();
            let result = match role {
                Role::Coordinator => self.handle_coordinator(task).await,
                Role::Worker => self.handle_worker(task).await,
            };

            match result {
                Ok(payload) => Reply::success(payload),
                Err(err) => {
                    log::warn!("Node '{}' failed '{method}' as {role}: {err}", self.name);
                    Reply::failure()
                }
            }
        }
        .boxed()
    }

    async fn handle_coordinator(&self, task: Task) -> Result<Bytes, RpcErr> {
        // nothing is scattered for a job which cannot be reduced
        if !self.registry.contains(&task.method) {
            return Err(RpcErr::MethodNotFound(task.method));
        }

        let quorum = self.broadcaster.gather_quorum();
        if quorum.is_empty() {
            return Err(RpcErr::EmptyQuorum);
        }
        let expected = quorum.len();

        // scatter
        let (tx, mut rx) = concurrency::mpsc_bounded(expected);
        for worker in quorum {
            let tx = tx.clone();
            let sub_task = task.to_worker();
            concurrency::spawn(async move {
                let reply = worker.dispatch(sub_task).await;
                let _ = tx.send(reply).await;
            });
        }
        drop(tx);

        // gather, in completion order
        let mut replies = Vec::with_capacity(expected);
        while replies.len() < expected {
            match rx.recv().await {
                Some(reply) => replies.push(reply),
                None => break,
            }
        }
        log::debug!(
            "Node '{}' gathered {} of {expected} replies for '{}'",
            self.name,
            replies.len(),
            task.method
        );

        let replies = self.settings.gather_policy.apply(replies, expected)?;
        self.registry
            .invoke_reduce(&task.method, self, replies)
            .await
    }

    async fn handle_worker(&self, task: Task) -> Result<Bytes, RpcErr> {
        let result = self
            .registry
            .invoke_map(&task.method, self, task.args)
            .await?;
        if result.is_empty() {
            return Err(RpcErr::EmptyResult(task.method));
        }
        Ok(result)
    }
}

/// The fixed node set of a network. The network is its only owner, everything
/// else refers to nodes by name or holds a weak handle.
#[derive(Debug)]
pub struct NodeSet {
    nodes: Vec<Arc<Node>>,
    index: HashMap<NodeName, usize>,
}

impl NodeSet {
    /// Build the nodes, wiring each node's broadcaster back to the set itself.
    ///
    /// Returns [Err(SpawnErr::DuplicateNode)] if a name appears twice
    pub(crate) fn build(
        names: Vec<NodeName>,
        registry: Arc<MethodRegistry>,
        settings: NodeSettings,
    ) -> Result<Arc<Self>, SpawnErr> {
        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(SpawnErr::DuplicateNode(name.clone()));
            }
        }

        Ok(Arc::new_cyclic(|set| {
            let nodes = names
                .into_iter()
                .map(|name| {
                    Arc::new(Node::new(
                        name,
                        Broadcaster::new(set.clone()),
                        registry.clone(),
                        settings,
                    ))
                })
                .collect();
            Self { nodes, index }
        }))
    }

    /// Try and retrieve a node by name
    pub fn get(&self, name: &str) -> Option<&Arc<Node>> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    /// Iterate the nodes in their configured order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Node>> {
        self.nodes.iter()
    }

    /// The node names in their configured order
    pub fn names(&self) -> Vec<NodeName> {
        self.nodes.iter().map(|node| node.name.clone()).collect()
    }

    /// The number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Determine if the set holds no node
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
