// Copyright (c) Sean Lawlor
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree.

use crate::concurrency::sleep;
use crate::concurrency::Duration;
use crate::concurrency::Instant;

pub async fn periodic_check<F>(check: F, timeout: Duration)
where
    F: Fn() -> bool,
{
    let start = Instant::now();
    while start.elapsed() < timeout {
        if check() {
            break;
        }
        sleep(Duration::from_millis(10)).await;
    }

    assert!(check(), "Periodic check failed after {timeout:?}");
}
