// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Stream progress tracking and flow control.
//!
//! A consumer publishes how far it has read through a stream as a
//! [`Position`]; a producer turns one or more of those positions into a
//! write ceiling through a [`LimitBarrier`].
//!
//! ```text
//!   consumer thread                         producer thread(s)
//!   ---------------                         ------------------
//!   PositionWriter::advance_to(p)  --->  PositionReader::position()
//!        (Release store)                      (Acquire load)
//!                                                 |
//!                                    WindowedLimitBarrier::limit()
//!                                         = position + window
//!                                                 |
//!                                   write allowed iff end <= limit
//! ```
//!
//! # Modules
//! - `position`: atomic single-writer position and its read-only views
//! - `limit`: windowed limit barriers (single and multi consumer)
//! - `backpressure`: producer-side capacity checks and waiting
//!
//! # Example
//! ```
//! use hpub::status::{position_pair, LimitBarrier, WindowedLimitBarrier};
//!
//! let (mut writer, reader) = position_pair(0);
//! let barrier = WindowedLimitBarrier::new(reader, 64 * 1024);
//!
//! assert_eq!(barrier.limit(), 64 * 1024);
//! writer.advance(4096);
//! assert_eq!(barrier.limit(), 64 * 1024 + 4096);
//! ```

/// Producer-side capacity checks and waiting.
pub mod backpressure;
/// Windowed limit barriers.
pub mod limit;
/// Atomic single-writer positions.
pub mod position;

pub use backpressure::{has_capacity, wait_for_capacity};
pub use limit::{MinWindowedLimitBarrier, WindowedLimitBarrier};
pub use position::{position_pair, AtomicPosition, PositionReader, PositionWriter, StaticPosition};

use std::sync::Arc;

/// Progress through a logical, unbounded stream (bytes or sequence numbers).
///
/// Physical buffers wrap via modular indexing elsewhere; at this layer
/// positions only ever grow.
pub type Position = u64;

/// Exposes a single consumer's progress.
///
/// `position()` returns a recent value: readers eventually observe every
/// advance the owner publishes and never observe a decrease, but the value
/// may lag the owner's latest store.
pub trait PositionIndicator {
    /// Current position of the consumer.
    fn position(&self) -> Position;
}

/// Producer-visible write ceiling.
///
/// Writes that would place data at or beyond `limit()` must wait until the
/// limit advances. The barrier does not enforce this; overrunning it is a
/// protocol error on the caller's side.
pub trait LimitBarrier {
    /// Current write limit.
    fn limit(&self) -> Position;
}

impl<T: PositionIndicator + ?Sized> PositionIndicator for &T {
    #[inline]
    fn position(&self) -> Position {
        (**self).position()
    }
}

impl<T: PositionIndicator + ?Sized> PositionIndicator for Arc<T> {
    #[inline]
    fn position(&self) -> Position {
        (**self).position()
    }
}

impl<T: PositionIndicator + ?Sized> PositionIndicator for Box<T> {
    #[inline]
    fn position(&self) -> Position {
        (**self).position()
    }
}

impl<T: LimitBarrier + ?Sized> LimitBarrier for &T {
    #[inline]
    fn limit(&self) -> Position {
        (**self).limit()
    }
}

impl<T: LimitBarrier + ?Sized> LimitBarrier for Arc<T> {
    #[inline]
    fn limit(&self) -> Position {
        (**self).limit()
    }
}

impl<T: LimitBarrier + ?Sized> LimitBarrier for Box<T> {
    #[inline]
    fn limit(&self) -> Position {
        (**self).limit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indicator_through_arc_and_box() {
        let fixed = Arc::new(StaticPosition::new(42));
        assert_eq!(fixed.position(), 42);

        let boxed: Box<dyn PositionIndicator + Send + Sync> = Box::new(StaticPosition::new(7));
        assert_eq!(boxed.position(), 7);
    }

    #[test]
    fn test_barrier_as_trait_object() {
        let barrier: Arc<dyn LimitBarrier + Send + Sync> =
            Arc::new(WindowedLimitBarrier::new(StaticPosition::new(10), 5));
        assert_eq!(barrier.limit(), 15);
    }
}
