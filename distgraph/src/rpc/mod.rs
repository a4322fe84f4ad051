// Copyright (c) Sean Lawlor
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree.

//! Deadline-bound remote procedure calls
//!
//! A `call` hands a one-time use [RpcReplyPort] to a runner (which usually spawns
//! the actual work) and then waits for the reply, up to a timeout. When the
//! deadline wins the race, the receiver is dropped: the runner keeps going but
//! its eventual `send` fails and the result is discarded. Nothing needs to be
//! cleaned up by the caller.
//!
//! ## Example
//!
//! ```rust
//! use distgraph::concurrency::{self, Duration};
//! use distgraph::rpc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let result = rpc::call(
//!         |port| {
//!             concurrency::spawn(async move {
//!                 let _ = port.send("a reply".to_string());
//!             });
//!         },
//!         Duration::from_millis(100),
//!     )
//!     .await;
//!     assert_eq!("a reply", result.unwrap());
//! }
//! ```

use crate::concurrency::{self, Duration};
use crate::message::RpcReplyPort;

pub mod call_result;
pub use call_result::CallResult;
#[cfg(test)]
mod tests;

/// Builds a one-time use reply port, hands it to `runner` and awaits the
/// reply with the specified timeout
///
/// * `runner` - The [FnOnce] which starts the work and eventually replies on the port
/// * `timeout` - The [Duration] until the operation times out
///
/// Returns [CallResult::Success] with the reply, [CallResult::Timeout] if the
/// deadline elapsed first, [CallResult::SenderError] if the port was dropped
pub async fn call<TReply, TRunner>(runner: TRunner, timeout: Duration) -> CallResult<TReply>
where
    TRunner: FnOnce(RpcReplyPort<TReply>),
{
    let (tx, rx) = concurrency::oneshot();
    runner(tx.into());

    match concurrency::timeout(timeout, rx).await {
        Ok(Ok(result)) => CallResult::Success(result),
        Ok(Err(_send_err)) => CallResult::SenderError,
        Err(_timeout_err) => CallResult::Timeout,
    }
}
