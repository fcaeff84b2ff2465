// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Throughput telemetry.
//!
//! [`RateReporter`] counts messages and bytes from any number of threads and
//! reports per-interval rates from one background loop.

/// Periodic message/byte rate reporting.
pub mod rate_reporter;

pub use rate_reporter::{
    CallbackFailurePolicy, LogReporter, RateReporter, RateReporterHandle, RateSample, Reporter,
};
