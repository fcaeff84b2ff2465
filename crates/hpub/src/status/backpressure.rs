// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Producer-side backpressure.
//!
//! A producer at `position` wanting to append `length` bytes may do so only
//! if the whole range stays below the limit:
//!
//! ```text
//!   position            position + length        limit
//!      |--------------------|                      |
//!      [ data to be written )  still free          ^ first disallowed byte
//! ```
//!
//! Waiting is normal flow, not a failure: [`wait_for_capacity`] spins, then
//! yields, then parks briefly until the consumer catches up or the timeout
//! expires.

use super::{LimitBarrier, Position};
use crossbeam::utils::Backoff;
use std::time::{Duration, Instant};

/// Park duration once spinning and yielding are exhausted.
const PARK_INTERVAL: Duration = Duration::from_micros(50);

/// True if `length` bytes can be written at `position` without reaching the limit.
#[inline]
pub fn has_capacity<B: LimitBarrier + ?Sized>(barrier: &B, position: Position, length: u64) -> bool {
    match position.checked_add(length) {
        Some(end) => end <= barrier.limit(),
        None => false,
    }
}

/// Wait until `length` bytes can be written at `position`.
///
/// Returns `true` once capacity is available, `false` if `timeout` elapsed
/// first. `None` waits indefinitely.
///
/// Must not be called with a range that can never fit (e.g. `length` larger
/// than the barrier's window) without a timeout.
pub fn wait_for_capacity<B: LimitBarrier + ?Sized>(
    barrier: &B,
    position: Position,
    length: u64,
    timeout: Option<Duration>,
) -> bool {
    if has_capacity(barrier, position, length) {
        return true;
    }

    let deadline = timeout.map(|t| Instant::now() + t);
    let backoff = Backoff::new();

    loop {
        if has_capacity(barrier, position, length) {
            return true;
        }

        if let Some(d) = deadline {
            if Instant::now() >= d {
                log::trace!(
                    "[Flow] capacity wait timed out position={} length={} limit={}",
                    position,
                    length,
                    barrier.limit()
                );
                return false;
            }
        }

        if backoff.is_completed() {
            std::thread::park_timeout(PARK_INTERVAL);
        } else {
            backoff.snooze();
        }
    }
}
