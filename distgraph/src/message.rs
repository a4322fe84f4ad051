// Copyright (c) Sean Lawlor
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree.

//! Value types which flow over the fabric's channels
//!
//! A [Request] is what enters the network's ingress, it pairs a routable
//! [Task] with a one-time use [RpcReplyPort]. A [Reply] is what flows back.

use bytes::Bytes;

use crate::concurrency::OneshotSender;
use crate::{ClientName, MethodName, RpcErr};

/// The role a node plays for a single request. The role travels with the
/// message, so one node may be a coordinator for one job while acting as a
/// worker for another at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Client-originated. The receiving node scatters the task to the quorum,
    /// gathers the replies and reduces them.
    Coordinator,
    /// Scattered by a coordinator. The receiving node runs the job's map step
    /// on its local data.
    Worker,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Coordinator => write!(f, "coordinator"),
            Self::Worker => write!(f, "worker"),
        }
    }
}

/// The routable body of a [Request]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// The client on whose behalf the task runs
    pub client: ClientName,
    /// The job to execute
    pub method: MethodName,
    /// Which handler the receiving node selects
    pub role: Role,
    /// The opaque argument payload
    pub args: Bytes,
}

impl Task {
    /// Build a new task
    pub fn new(
        client: impl Into<ClientName>,
        method: impl Into<MethodName>,
        role: Role,
        args: impl Into<Bytes>,
    ) -> Self {
        Self {
            client: client.into(),
            method: method.into(),
            role,
            args: args.into(),
        }
    }

    /// Derive the worker-bound sub-task a coordinator scatters. Method and
    /// argument are shared, only the role changes.
    pub fn to_worker(&self) -> Self {
        Self {
            role: Role::Worker,
            ..self.clone()
        }
    }
}

/// A request entering the network: the [Task] plus the private port the
/// reply is delivered on
pub struct Request {
    /// What to execute
    pub task: Task,
    /// Where the result goes. A request the network cannot route is answered
    /// with the routing error instead of a [Reply].
    pub reply: RpcReplyPort<Result<Reply, RpcErr>>,
}

/// The reply to a [Task]. `ok = false` means timeout or routing failure, never
/// a partial result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Whether the task succeeded
    pub ok: bool,
    /// The opaque result payload. Empty on failure.
    pub payload: Bytes,
}

impl Reply {
    /// A successful reply carrying `payload`
    pub fn success(payload: impl Into<Bytes>) -> Self {
        Self {
            ok: true,
            payload: payload.into(),
        }
    }

    /// A failed reply
    pub fn failure() -> Self {
        Self {
            ok: false,
            payload: Bytes::new(),
        }
    }

    /// Determine if the reply is a success
    pub fn is_ok(&self) -> bool {
        self.ok
    }
}

/// A remote procedure call's reply port. Wrapper of [tokio::sync::oneshot::Sender]
pub struct RpcReplyPort<TMsg> {
    port: OneshotSender<TMsg>,
}

impl<TMsg> RpcReplyPort<TMsg> {
    /// Send a message to the reply port. This consumes the port
    ///
    /// Returns [Ok(())] if the message was delivered, [Err(TMsg)] with the message
    /// if the receiver was dropped (the caller gave up waiting)
    pub fn send(self, msg: TMsg) -> Result<(), TMsg> {
        self.port.send(msg)
    }

    /// Determine if the port is closed (i.e. the receiver has been dropped)
    pub fn is_closed(&self) -> bool {
        self.port.is_closed()
    }
}

impl<TMsg> From<OneshotSender<TMsg>> for RpcReplyPort<TMsg> {
    fn from(value: OneshotSender<TMsg>) -> Self {
        Self { port: value }
    }
}
