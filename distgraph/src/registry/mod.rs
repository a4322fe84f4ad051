// Copyright (c) Sean Lawlor
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree.

//! Represents the method registry, mapping a job's name to its map and reduce steps.
//!
//! Jobs are registered once, before the network starts, and the registry is
//! then frozen behind an [Arc] and shared by every node. Reads after that are
//! unsynchronized since nothing mutates it anymore.
//!
//! A job is anything implementing [Job]. Plain function pairs can be
//! registered with [MethodRegistry::register_fn].
//!
//! ## Example
//!
//! ```rust
//! use distgraph::registry::MethodRegistry;
//!
//! let mut registry = MethodRegistry::new();
//! registry
//!     .register_fn(
//!         "Echo",
//!         |_node, args| args.clone(),
//!         |_node, replies| replies.first().map(|r| r.payload.clone()).unwrap_or_default(),
//!     )
//!     .expect("Failed to register job");
//! assert!(registry.get("Echo").is_some());
//! assert!(registry.get("Missing").is_none());
//! ```

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::message::Reply;
use crate::node::Node;
use crate::{MethodName, RpcErr};

#[cfg(test)]
mod tests;

/// Errors involving the [MethodRegistry]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryErr {
    /// A job is already registered under the name
    AlreadyRegistered(MethodName),
}

impl std::error::Error for RegistryErr {}

impl Display for RegistryErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyRegistered(name) => {
                write!(f, "Job '{name}' is already registered in the method registry")
            }
        }
    }
}

/// A pluggable two-phase job.
///
/// The map step runs on every worker of the quorum against the worker's local
/// data, the reduce step runs once on the coordinator over the gathered replies.
/// Reduce must not depend on the order of `replies`, they arrive in completion
/// order.
#[async_trait]
pub trait Job: Send + Sync + 'static {
    /// Executed by a worker node. An empty result marks the computation as failed.
    async fn map(&self, node: &Node, args: Bytes) -> Bytes;

    /// Executed by the coordinator node over the successful worker replies
    async fn reduce(&self, node: &Node, replies: Vec<Reply>) -> Bytes;
}

/// A [Job] built from a pair of synchronous function values
pub struct FnJob<TMap, TReduce> {
    map: TMap,
    reduce: TReduce,
}

impl<TMap, TReduce> FnJob<TMap, TReduce>
where
    TMap: Fn(&Node, &Bytes) -> Bytes + Send + Sync + 'static,
    TReduce: Fn(&Node, &[Reply]) -> Bytes + Send + Sync + 'static,
{
    /// Pair a map step with a reduce step
    pub fn new(map: TMap, reduce: TReduce) -> Self {
        Self { map, reduce }
    }
}

#[async_trait]
impl<TMap, TReduce> Job for FnJob<TMap, TReduce>
where
    TMap: Fn(&Node, &Bytes) -> Bytes + Send + Sync + 'static,
    TReduce: Fn(&Node, &[Reply]) -> Bytes + Send + Sync + 'static,
{
    async fn map(&self, node: &Node, args: Bytes) -> Bytes {
        (self.map)(node, &args)
    }

    async fn reduce(&self, node: &Node, replies: Vec<Reply>) -> Bytes {
        (self.reduce)(node, &replies)
    }
}

/// The job name to [Job] mapping
#[derive(Default)]
pub struct MethodRegistry {
    jobs: HashMap<MethodName, Arc<dyn Job>>,
}

impl MethodRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job under `name`
    ///
    /// Returns [Err(RegistryErr::AlreadyRegistered)] if the name is taken, the
    /// existing job is kept
    pub fn register<TJob>(
        &mut self,
        name: impl Into<MethodName>,
        job: TJob,
    ) -> Result<(), RegistryErr>
    where
        TJob: Job,
    {
        let name = name.into();
        if self.jobs.contains_key(&name) {
            return Err(RegistryErr::AlreadyRegistered(name));
        }
        log::debug!("Registered job '{name}'");
        self.jobs.insert(name, Arc::new(job));
        Ok(())
    }

    /// Register a job from a map and a reduce function value. See [FnJob].
    pub fn register_fn<TMap, TReduce>(
        &mut self,
        name: impl Into<MethodName>,
        map: TMap,
        reduce: TReduce,
    ) -> Result<(), RegistryErr>
    where
        TMap: Fn(&Node, &Bytes) -> Bytes + Send + Sync + 'static,
        TReduce: Fn(&Node, &[Reply]) -> Bytes + Send + Sync + 'static,
    {
        self.register(name, FnJob::new(map, reduce))
    }

    /// Try and retrieve a job by name
    ///
    /// Returns: Some(job) if registered, None otherwise
    pub fn get(&self, name: &str) -> Option<Arc<dyn Job>> {
        self.jobs.get(name).cloned()
    }

    /// Run the map step of the job `name` on `node`
    ///
    /// Returns [Err(RpcErr::MethodNotFound)] for an unregistered job
    pub async fn invoke_map(&self, name: &str, node: &Node, args: Bytes) -> Result<Bytes, RpcErr> {
        let job = self
            .get(name)
            .ok_or_else(|| RpcErr::MethodNotFound(name.to_string()))?;
        Ok(job.map(node, args).await)
    }

    /// Run the reduce step of the job `name` on `node`
    ///
    /// Returns [Err(RpcErr::MethodNotFound)] for an unregistered job
    pub async fn invoke_reduce(
        &self,
        name: &str,
        node: &Node,
        replies: Vec<Reply>,
    ) -> Result<Bytes, RpcErr> {
        let job = self
            .get(name)
            .ok_or_else(|| RpcErr::MethodNotFound(name.to_string()))?;
        Ok(job.reduce(node, replies).await)
    }

    /// Returns the names which have been registered, sorted
    pub fn registered(&self) -> Vec<MethodName> {
        let mut names = self.jobs.keys().cloned().collect::<Vec<_>>();
        names.sort();
        names
    }

    /// Determine if a job is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.jobs.contains_key(name)
    }
}
