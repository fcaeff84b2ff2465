// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! hpub configuration - constants and runtime defaults.
//!
//! # Architecture
//!
//! - **Level 1 (Static)**: compile-time constants (term lengths, intervals, TTL)
//! - **Level 2 (Dynamic)**: `FlowControlConfig` / `ReporterConfig`, defaults
//!   overridable from the environment, builder-style setters
//!
//! # Environment Variables
//!
//! - `HPUB_TERM_LENGTH`: term buffer length in bytes (default: 16 MiB)
//! - `HPUB_REPORT_INTERVAL_MS`: rate report interval in ms (default: 1000)

use crate::error::{Error, Result};
use crate::status::{PositionIndicator, WindowedLimitBarrier};
use crate::telemetry::CallbackFailurePolicy;
use std::time::Duration;

// =======================================================================
// Term buffer geometry
// =======================================================================

/// Smallest supported term buffer (64 KiB).
pub const TERM_MIN_LENGTH: u64 = 64 * 1024;

/// Largest supported term buffer (1 GiB).
pub const TERM_MAX_LENGTH: u64 = 1024 * 1024 * 1024;

/// Default term buffer length (16 MiB).
pub const DEFAULT_TERM_LENGTH: u64 = 16 * 1024 * 1024;

// =======================================================================
// Telemetry / transport defaults
// =======================================================================

/// Default rate reporting interval.
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Default multicast TTL / hop limit (stay on the local segment).
pub const DEFAULT_MULTICAST_TTL: u32 = 1;

/// Default name for the rate reporter thread.
pub const DEFAULT_REPORTER_THREAD_NAME: &str = "hpub-rate-reporter";

const ENV_TERM_LENGTH: &str = "HPUB_TERM_LENGTH";
const ENV_REPORT_INTERVAL_MS: &str = "HPUB_REPORT_INTERVAL_MS";

/// Check that `term_length` is a power of two within
/// [`TERM_MIN_LENGTH`]..=[`TERM_MAX_LENGTH`].
pub fn validate_term_length(term_length: u64) -> Result<()> {
    if !(TERM_MIN_LENGTH..=TERM_MAX_LENGTH).contains(&term_length) {
        return Err(Error::Config(format!(
            "term length {} outside {}..={}",
            term_length, TERM_MIN_LENGTH, TERM_MAX_LENGTH
        )));
    }
    if !term_length.is_power_of_two() {
        return Err(Error::Config(format!(
            "term length {} is not a power of two",
            term_length
        )));
    }
    Ok(())
}

/// Producer flow-control window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowControlConfig {
    /// Maximum lead of a producer over its consumer, in bytes.
    pub window: u64,
}

impl Default for FlowControlConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_TERM_LENGTH / 2,
        }
    }
}

impl FlowControlConfig {
    /// Explicit window.
    pub fn new(window: u64) -> Self {
        Self { window }
    }

    /// Window of half a term, so a producer never laps the term a consumer
    /// is still reading.
    ///
    /// # Errors
    ///
    /// `Error::Config` if `term_length` fails [`validate_term_length`].
    pub fn from_term_length(term_length: u64) -> Result<Self> {
        validate_term_length(term_length)?;
        Ok(Self {
            window: term_length / 2,
        })
    }

    /// Read `HPUB_TERM_LENGTH`, falling back to [`DEFAULT_TERM_LENGTH`] when unset.
    ///
    /// # Errors
    ///
    /// `Error::Config` if the variable is set but not a valid term length.
    pub fn from_env() -> Result<Self> {
        match std::env::var(ENV_TERM_LENGTH) {
            Ok(raw) => {
                let term_length = raw.trim().parse::<u64>().map_err(|_| {
                    Error::Config(format!("{}='{}' is not a number", ENV_TERM_LENGTH, raw))
                })?;
                Self::from_term_length(term_length)
            }
            Err(_) => Ok(Self::default()),
        }
    }

    /// Build a barrier `window` ahead of `indicator`.
    pub fn barrier<P: PositionIndicator>(&self, indicator: P) -> WindowedLimitBarrier<P> {
        WindowedLimitBarrier::new(indicator, self.window)
    }
}

/// Rate reporter configuration.
#[derive(Debug, Clone)]
pub struct ReporterConfig {
    /// Nominal reporting interval.
    pub interval: Duration,
    /// What to do when the report callback panics.
    pub failure_policy: CallbackFailurePolicy,
    /// Name given to the spawned reporter thread.
    pub thread_name: String,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        let interval = match std::env::var(ENV_REPORT_INTERVAL_MS) {
            Ok(raw) => parse_interval_ms(&raw).unwrap_or_else(|e| {
                log::warn!("[Config] {}, using {:?}", e, DEFAULT_REPORT_INTERVAL);
                DEFAULT_REPORT_INTERVAL
            }),
            Err(_) => DEFAULT_REPORT_INTERVAL,
        };
        Self {
            interval,
            failure_policy: CallbackFailurePolicy::default(),
            thread_name: DEFAULT_REPORTER_THREAD_NAME.to_string(),
        }
    }
}

/// Parse a `HPUB_REPORT_INTERVAL_MS` value: a positive number of milliseconds.
fn parse_interval_ms(raw: &str) -> Result<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(Error::Config(format!(
            "{}='{}' must be non-zero",
            ENV_REPORT_INTERVAL_MS, raw
        ))),
        Ok(ms) => Ok(Duration::from_millis(ms)),
        Err(_) => Err(Error::Config(format!(
            "{}='{}' is not a number",
            ENV_REPORT_INTERVAL_MS, raw
        ))),
    }
}

impl ReporterConfig {
    /// Config with an explicit interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }

    /// Read `HPUB_REPORT_INTERVAL_MS`, falling back to
    /// [`DEFAULT_REPORT_INTERVAL`] when unset.
    ///
    /// # Errors
    ///
    /// `Error::Config` if the variable is set but not a positive number of
    /// milliseconds. (`Default` logs the same problem and falls back.)
    pub fn from_env() -> Result<Self> {
        let interval = match std::env::var(ENV_REPORT_INTERVAL_MS) {
            Ok(raw) => parse_interval_ms(&raw)?,
            Err(_) => DEFAULT_REPORT_INTERVAL,
        };
        Ok(Self {
            interval,
            failure_policy: CallbackFailurePolicy::default(),
            thread_name: DEFAULT_REPORTER_THREAD_NAME.to_string(),
        })
    }

    /// Set the reporting interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the callback failure policy.
    pub fn with_failure_policy(mut self, policy: CallbackFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Set the reporter thread name.
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Reject a zero interval (the loop would never suspend).
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(Error::Config(
                "rate report interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{LimitBarrier, StaticPosition};

    #[test]
    fn test_term_length_validation() {
        assert!(validate_term_length(TERM_MIN_LENGTH).is_ok());
        assert!(validate_term_length(TERM_MAX_LENGTH).is_ok());
        assert!(validate_term_length(DEFAULT_TERM_LENGTH).is_ok());
        assert!(validate_term_length(TERM_MIN_LENGTH / 2).is_err());
        assert!(validate_term_length(TERM_MAX_LENGTH * 2).is_err());
        assert!(validate_term_length(TERM_MIN_LENGTH + 1).is_err());
    }

    #[test]
    fn test_window_from_term_length() {
        let cfg = FlowControlConfig::from_term_length(128 * 1024).expect("valid term");
        assert_eq!(cfg.window, 64 * 1024);
        assert!(matches!(
            FlowControlConfig::from_term_length(1000),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_default_window() {
        assert_eq!(FlowControlConfig::default().window, DEFAULT_TERM_LENGTH / 2);
        assert_eq!(FlowControlConfig::new(10).window, 10);
    }

    #[test]
    fn test_barrier_from_config() {
        let barrier = FlowControlConfig::new(512).barrier(StaticPosition::new(100));
        assert_eq!(barrier.limit(), 612);
    }

    #[test]
    fn test_reporter_config_builder() {
        let cfg = ReporterConfig::new(Duration::from_millis(250))
            .with_failure_policy(CallbackFailurePolicy::SkipInterval)
            .with_thread_name("rates");

        assert_eq!(cfg.interval, Duration::from_millis(250));
        assert_eq!(cfg.failure_policy, CallbackFailurePolicy::SkipInterval);
        assert_eq!(cfg.thread_name, "rates");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_interval_env_value_parsing() {
        assert_eq!(
            parse_interval_ms("250").expect("valid"),
            Duration::from_millis(250)
        );
        assert_eq!(
            parse_interval_ms(" 1000 ").expect("whitespace trimmed"),
            Duration::from_secs(1)
        );
        assert!(matches!(parse_interval_ms("fast"), Err(Error::Config(_))));
        assert!(matches!(parse_interval_ms("-5"), Err(Error::Config(_))));
        assert!(matches!(parse_interval_ms("0"), Err(Error::Config(_))));
    }

    #[test]
    fn test_reporter_config_rejects_zero_interval() {
        let cfg = ReporterConfig::default().with_interval(Duration::ZERO);
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
    }
}
