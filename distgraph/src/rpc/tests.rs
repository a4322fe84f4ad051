// Copyright (c) Sean Lawlor
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree.

//! Tests for deadline-bound calls

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::common_test::periodic_check;
use crate::concurrency::{self, Duration};
use crate::rpc::{self, CallResult};

#[tokio::test]
async fn test_call_success() {
    let result = rpc::call(
        |port| {
            concurrency::spawn(async move {
                let _ = port.send(42u32);
            });
        },
        Duration::from_millis(100),
    )
    .await;

    assert_eq!(CallResult::Success(42u32), result);
}

#[tokio::test]
async fn test_call_timeout() {
    let result: CallResult<u32> = rpc::call(
        |port| {
            concurrency::spawn(async move {
                concurrency::sleep(Duration::from_millis(500)).await;
                let _ = port.send(42u32);
            });
        },
        Duration::from_millis(50),
    )
    .await;

    assert!(result.is_timeout());
}

#[tokio::test]
async fn test_call_dropped_port() {
    let result: CallResult<u32> = rpc::call(|port| drop(port), Duration::from_millis(100)).await;
    assert!(result.is_send_error());
}

#[tokio::test]
async fn test_late_reply_is_discarded() {
    let finished = Arc::new(AtomicBool::new(false));
    let delivered = Arc::new(AtomicBool::new(true));

    let handler_finished = finished.clone();
    let handler_delivered = delivered.clone();
    let result: CallResult<u32> = rpc::call(
        move |port| {
            concurrency::spawn(async move {
                concurrency::sleep(Duration::from_millis(100)).await;
                handler_delivered.store(port.send(7u32).is_ok(), Ordering::SeqCst);
                handler_finished.store(true, Ordering::SeqCst);
            });
        },
        Duration::from_millis(10),
    )
    .await;
    assert!(result.is_timeout());

    // the abandoned handler still runs to completion, but nobody is listening
    periodic_check(
        || finished.load(Ordering::SeqCst),
        Duration::from_millis(1000),
    )
    .await;
    assert!(!delivered.load(Ordering::SeqCst));
}

#[test]
fn test_call_result_mapping() {
    let success = CallResult::Success(2u8).map(|v| v * 2);
    assert_eq!(CallResult::Success(4u8), success);

    let timeout: CallResult<u8> = CallResult::Timeout;
    assert_eq!(CallResult::Timeout, timeout.map(|v| v * 2));

    let fallback = CallResult::<u8>::SenderError.unwrap_or_else(|failed| {
        assert!(failed.is_send_error());
        0
    });
    assert_eq!(0, fallback);
}
