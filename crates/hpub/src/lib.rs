// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # hpub - publication flow-control and transport plumbing
//!
//! Building blocks for a high-throughput message publication layer:
//! monotonic stream positions, producer limit barriers, UDP endpoint
//! parsing and a background throughput reporter.
//!
//! ## Quick Start
//!
//! ```rust
//! use hpub::{position_pair, LimitBarrier, WindowedLimitBarrier};
//!
//! // Consumer owns the writer, producer holds a reader behind a barrier.
//! let (mut consumed, reader) = position_pair(0);
//! let barrier = WindowedLimitBarrier::new(reader, 64 * 1024);
//! assert_eq!(barrier.limit(), 64 * 1024);
//!
//! consumed.advance(4096);
//! assert_eq!(barrier.limit(), 4096 + 64 * 1024);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |  producer --(has_capacity / wait_for_capacity)--> LimitBarrier      |
//! |                                                       |             |
//! |                           limit = position + window   |             |
//! |                                                       v             |
//! |  consumer --(PositionWriter::advance)--> PositionIndicator          |
//! +---------------------------------------------------------------------+
//! |  transport: "host:port" / "[v6%scope]:port" -> SocketEndpoint -> UDP|
//! +---------------------------------------------------------------------+
//! |  telemetry: on_message() counters -> RateReporter loop -> Reporter  |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Modules Overview
//!
//! - [`status`] - positions, limit barriers, back-pressure helpers
//! - [`transport`] - endpoint parsing, resolvers, UDP sockets
//! - [`telemetry`] - rate reporting
//! - [`config`] - constants and runtime defaults
//!
//! ## Logging
//!
//! All diagnostics go through the `log` facade; install any logger
//! (e.g. `env_logger`) in the binary to see them.

/// Constants and runtime configuration (term lengths, windows, intervals).
pub mod config;
/// Crate-wide error type.
pub mod error;
/// Stream positions and producer limit barriers.
pub mod status;
/// Throughput telemetry.
pub mod telemetry;
/// Endpoint parsing and UDP socket setup.
pub mod transport;

pub use config::{FlowControlConfig, ReporterConfig};
pub use error::{Error, Result};
pub use status::{
    has_capacity, position_pair, wait_for_capacity, AtomicPosition, LimitBarrier,
    MinWindowedLimitBarrier, Position, PositionIndicator, PositionReader, PositionWriter,
    StaticPosition, WindowedLimitBarrier,
};
pub use telemetry::{
    CallbackFailurePolicy, LogReporter, RateReporter, RateReporterHandle, RateSample, Reporter,
};
pub use transport::{EndpointError, Resolver, SocketEndpoint, StaticResolver, SystemResolver};

/// hpub version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
