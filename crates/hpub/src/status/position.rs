// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Single-writer / multi-reader stream positions.
//!
//! # Synchronization Protocol
//!
//! Owner (consumer) advance:
//! 1. Compute new position from the local copy (no atomic read needed)
//! 2. Publish: `value = new` (Release)
//!
//! Reader (producer / reporter):
//! 1. Load `value` (Acquire)
//!
//! Only [`PositionWriter`] can store, and it is not `Clone`, so the
//! single-writer discipline is enforced by ownership rather than by
//! convention.

use super::{Position, PositionIndicator};
use crossbeam::utils::CachePadded;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Cache-line padded atomic position.
///
/// Padding keeps a hot consumer position from false-sharing with whatever
/// the allocator places next to it.
#[derive(Debug, Default)]
pub struct AtomicPosition {
    value: CachePadded<AtomicU64>,
}

impl AtomicPosition {
    /// Create a position starting at `initial`.
    pub fn new(initial: Position) -> Self {
        Self {
            value: CachePadded::new(AtomicU64::new(initial)),
        }
    }

    /// Load with Acquire ordering.
    #[inline]
    pub fn get(&self) -> Position {
        self.value.load(Ordering::Acquire)
    }

    /// Store with Release ordering.
    ///
    /// Crate-private: stores go through [`PositionWriter`] which guarantees
    /// monotonicity.
    #[inline]
    pub(crate) fn set_ordered(&self, position: Position) {
        self.value.store(position, Ordering::Release);
    }
}

impl PositionIndicator for AtomicPosition {
    #[inline]
    fn position(&self) -> Position {
        self.get()
    }
}

/// Create a writer and a first reader over a fresh position.
///
/// # Example
/// ```
/// use hpub::status::{position_pair, PositionIndicator};
///
/// let (mut writer, reader) = position_pair(100);
/// let other = reader.clone();
///
/// writer.advance_to(250);
/// assert_eq!(reader.position(), 250);
/// assert_eq!(other.position(), 250);
/// ```
pub fn position_pair(initial: Position) -> (PositionWriter, PositionReader) {
    let writer = PositionWriter::new(initial);
    let reader = writer.reader();
    (writer, reader)
}

/// The owning consumer's handle to its position.
///
/// Keeps a local copy of the last published value so advancing never needs
/// to read the shared atomic.
#[derive(Debug)]
pub struct PositionWriter {
    shared: Arc<AtomicPosition>,
    local: Position,
}

impl PositionWriter {
    /// Create a writer starting at `initial`.
    pub fn new(initial: Position) -> Self {
        Self {
            shared: Arc::new(AtomicPosition::new(initial)),
            local: initial,
        }
    }

    /// Hand out a read-only view for producers or reporters.
    pub fn reader(&self) -> PositionReader {
        PositionReader {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Last position published by this writer.
    #[inline]
    pub fn get(&self) -> Position {
        self.local
    }

    /// Advance by `delta` after consuming that much of the stream.
    ///
    /// Saturates at `u64::MAX` instead of wrapping.
    #[inline]
    pub fn advance(&mut self, delta: u64) -> Position {
        if delta != 0 {
            self.local = self.local.saturating_add(delta);
            self.shared.set_ordered(self.local);
        }
        self.local
    }

    /// Move to `position` if it is ahead of the current one.
    ///
    /// Returns `false` (and publishes nothing) when `position` is behind:
    /// positions never decrease.
    #[inline]
    pub fn advance_to(&mut self, position: Position) -> bool {
        if position < self.local {
            log::debug!(
                "[Flow] ignoring position regression {} -> {}",
                self.local,
                position
            );
            return false;
        }
        if position > self.local {
            self.local = position;
            self.shared.set_ordered(position);
        }
        true
    }
}

impl PositionIndicator for PositionWriter {
    #[inline]
    fn position(&self) -> Position {
        self.local
    }
}

/// Read-only, cloneable view of a consumer position.
#[derive(Debug, Clone)]
pub struct PositionReader {
    shared: Arc<AtomicPosition>,
}

impl PositionIndicator for PositionReader {
    #[inline]
    fn position(&self) -> Position {
        self.shared.get()
    }
}

/// A position that never moves.
///
/// Useful for fixed ceilings (e.g. a pre-sized buffer with no consumer
/// feedback) and for tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StaticPosition(Position);

impl StaticPosition {
    /// Create a fixed position.
    pub const fn new(position: Position) -> Self {
        Self(position)
    }
}

impl PositionIndicator for StaticPosition {
    #[inline]
    fn position(&self) -> Position {
        self.0
    }
}
