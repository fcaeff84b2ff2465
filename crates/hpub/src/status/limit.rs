// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Windowed limit barriers.
//!
//! A limit is a window further along than a consumer position. With a single
//! consumer that is [`WindowedLimitBarrier`]; when several consumers read the
//! same buffer the slowest one gates the producer
//! ([`MinWindowedLimitBarrier`]).

use super::{LimitBarrier, Position, PositionIndicator};
use crate::error::{Error, Result};

/// Limit barrier defined as `indicator.position() + window`.
///
/// The sum saturates at `u64::MAX`; a stream would need to move ~18 EB before
/// that matters.
#[derive(Debug, Clone)]
pub struct WindowedLimitBarrier<P> {
    indicator: P,
    window: u64,
}

impl<P: PositionIndicator> WindowedLimitBarrier<P> {
    /// Create a barrier `window` ahead of `indicator`.
    pub fn new(indicator: P, window: u64) -> Self {
        Self { indicator, window }
    }

    /// Configured window.
    pub fn window(&self) -> u64 {
        self.window
    }

    /// Underlying position indicator.
    pub fn indicator(&self) -> &P {
        &self.indicator
    }
}

impl<P: PositionIndicator> LimitBarrier for WindowedLimitBarrier<P> {
    #[inline]
    fn limit(&self) -> Position {
        self.indicator.position().saturating_add(self.window)
    }
}

/// Limit barrier over several consumers: `min(positions) + window`.
#[derive(Debug, Clone)]
pub struct MinWindowedLimitBarrier<P> {
    indicators: Vec<P>,
    window: u64,
}

impl<P: PositionIndicator> MinWindowedLimitBarrier<P> {
    /// Create a barrier over `indicators`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if `indicators` is empty; a barrier with no
    /// consumer has no defined limit.
    pub fn new(indicators: Vec<P>, window: u64) -> Result<Self> {
        if indicators.is_empty() {
            return Err(Error::Config(
                "limit barrier needs at least one position indicator".to_string(),
            ));
        }
        Ok(Self { indicators, window })
    }

    /// Configured window.
    pub fn window(&self) -> u64 {
        self.window
    }

    /// Number of consumers gating this barrier.
    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    /// Always false: construction rejects an empty consumer set.
    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    /// Position of the slowest consumer.
    pub fn min_position(&self) -> Position {
        self.indicators
            .iter()
            .map(PositionIndicator::position)
            .min()
            .unwrap_or(0)
    }
}

impl<P: PositionIndicator> LimitBarrier for MinWindowedLimitBarrier<P> {
    #[inline]
    fn limit(&self) -> Position {
        self.min_position().saturating_add(self.window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{position_pair, StaticPosition};

    #[test]
    fn test_limit_is_position_plus_window() {
        let barrier = WindowedLimitBarrier::new(StaticPosition::new(1000), 256);
        assert_eq!(barrier.limit(), 1256);
        assert_eq!(barrier.window(), 256);
        assert_eq!(barrier.indicator().position(), 1000);
    }

    #[test]
    fn test_zero_window() {
        let barrier = WindowedLimitBarrier::new(StaticPosition::new(42), 0);
        assert_eq!(barrier.limit(), 42);
    }

    #[test]
    fn test_limit_saturates() {
        let barrier = WindowedLimitBarrier::new(StaticPosition::new(u64::MAX - 3), 10);
        assert_eq!(barrier.limit(), u64::MAX);
    }

    #[test]
    fn test_limit_follows_writer() {
        let (mut writer, reader) = position_pair(0);
        let barrier = WindowedLimitBarrier::new(reader, 64);

        let mut last = barrier.limit();
        for step in [1u64, 5, 0, 100, 3] {
            writer.advance(step);
            let now = barrier.limit();
            assert!(now >= last);
            last = now;
        }
        assert_eq!(last, 109 + 64);
    }

    #[test]
    fn test_random_positions_and_windows() {
        let mut rng = fastrand::Rng::with_seed(0x5EED);
        for _ in 0..1000 {
            let p = rng.u64(..u64::MAX / 2);
            let w = rng.u64(..u64::MAX / 2);
            let barrier = WindowedLimitBarrier::new(StaticPosition::new(p), w);
            assert_eq!(barrier.limit(), p + w);
        }
    }

    #[test]
    fn test_min_barrier_rejects_empty() {
        let result = MinWindowedLimitBarrier::<StaticPosition>::new(Vec::new(), 10);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_min_barrier_tracks_slowest() {
        let (mut fast, fast_reader) = position_pair(0);
        let (mut slow, slow_reader) = position_pair(0);
        let barrier =
            MinWindowedLimitBarrier::new(vec![fast_reader, slow_reader], 1024).expect("non-empty");
        assert_eq!(barrier.len(), 2);
        assert!(!barrier.is_empty());

        fast.advance_to(5000);
        assert_eq!(barrier.limit(), 1024);

        slow.advance_to(300);
        assert_eq!(barrier.min_position(), 300);
        assert_eq!(barrier.limit(), 1324);

        slow.advance_to(9000);
        assert_eq!(barrier.limit(), 5000 + 1024);
    }
}
