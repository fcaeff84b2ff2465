// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Host-name resolution capability.
//!
//! The endpoint parser never talks to DNS itself; it hands non-numeric hosts
//! to a [`Resolver`]. Production code uses [`SystemResolver`]; tests inject a
//! [`StaticResolver`] or a closure for deterministic answers.

use dashmap::DashMap;
use std::io;
use std::net::{IpAddr, ToSocketAddrs};

/// Resolves a host name to one or more addresses.
///
/// Implementations may block. Call only from setup paths, never from a
/// latency-sensitive data path.
pub trait Resolver {
    /// Resolve `host` (without port) to its addresses, in preference order.
    fn resolve(&self, host: &str) -> io::Result<Vec<IpAddr>>;
}

impl<F> Resolver for F
where
    F: Fn(&str) -> io::Result<Vec<IpAddr>>,
{
    fn resolve(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        self(host)
    }
}

/// Resolver backed by the operating system (`getaddrinfo` via `std::net`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl Resolver for SystemResolver {
    fn resolve(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        let addrs: Vec<IpAddr> = (host, 0u16)
            .to_socket_addrs()?
            .map(|sa| sa.ip())
            .collect();
        log::debug!("[Endpoint] resolved '{}' -> {:?}", host, addrs);
        Ok(addrs)
    }
}

/// In-memory host table.
///
/// Host names are matched case-insensitively. Entries may be added from any
/// thread while other threads resolve.
///
/// # Example
/// ```
/// use hpub::transport::{Resolver, StaticResolver};
/// use std::net::{IpAddr, Ipv4Addr};
///
/// let resolver = StaticResolver::new()
///     .with_host("localhost", IpAddr::V4(Ipv4Addr::LOCALHOST));
/// assert_eq!(
///     resolver.resolve("LocalHost").unwrap(),
///     vec![IpAddr::V4(Ipv4Addr::LOCALHOST)]
/// );
/// ```
#[derive(Debug, Default)]
pub struct StaticResolver {
    hosts: DashMap<String, Vec<IpAddr>>,
}

impl StaticResolver {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with_host(self, host: &str, addr: IpAddr) -> Self {
        self.insert(host, addr);
        self
    }

    /// Append `addr` to the answers for `host`.
    pub fn insert(&self, host: &str, addr: IpAddr) {
        self.hosts
            .entry(host.to_ascii_lowercase())
            .or_default()
            .push(addr);
    }

    /// Drop all answers for `host`.
    pub fn remove(&self, host: &str) -> bool {
        self.hosts.remove(&host.to_ascii_lowercase()).is_some()
    }

    /// Number of known hosts.
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// True if no host is registered.
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

impl Resolver for StaticResolver {
    fn resolve(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        self.hosts
            .get(&host.to_ascii_lowercase())
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("host '{}' not in static table", host),
                )
            })
    }
}
