// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Endpoint resolution and UDP socket setup.
//!
//! Everything here runs on the setup path: host-name lookups block, so
//! parse endpoints before the data path starts.
//!
//! # Modules
//!
//! - `endpoint` - endpoint grammar, [`SocketEndpoint`], [`EndpointError`]
//! - `resolver` - injected host-name resolution
//! - `udp` - binding/opening sockets for a parsed endpoint
//!
//! # Example
//!
//! ```no_run
//! use hpub::transport::{bind_endpoint, SocketEndpoint};
//!
//! let endpoint = SocketEndpoint::parse("239.192.11.87:20123").unwrap();
//! assert!(endpoint.is_multicast());
//! let socket = bind_endpoint(&endpoint).unwrap();
//! ```

/// Endpoint specification grammar and resolved endpoints.
pub mod endpoint;
/// Host-name resolver capability.
pub mod resolver;
/// UDP socket helpers for endpoints.
pub mod udp;

pub use endpoint::{parse, AddressFamily, EndpointError, SocketEndpoint};
pub use resolver::{Resolver, StaticResolver, SystemResolver};
pub use udp::{bind_endpoint, open_send_socket, SendOptions};
