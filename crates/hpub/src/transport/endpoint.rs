// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Socket endpoint specifications.
//!
//! Parses the textual endpoint form used by channel configuration into a
//! resolved, address-family-aware [`SocketEndpoint`].
//!
//! # Grammar
//!
//! ```text
//! spec           := host_port | bracketed_ipv6
//! host_port      := host ":" port
//! bracketed_ipv6 := "[" ipv6_literal [ "%" scope_id ] "]" ":" port
//! scope_id       := 1*( ALPHA / DIGIT / "." / "-" / "_" / "~" )
//! port           := 1*DIGIT            ; numeric value in [0, 65535]
//! ```
//!
//! Outside brackets exactly one colon is allowed, so an unbracketed IPv6
//! literal can never be mistaken for `host:port`.
//!
//! # Examples
//!
//! ```
//! use hpub::transport::{parse, AddressFamily, StaticResolver};
//! use std::net::{IpAddr, Ipv4Addr};
//!
//! let resolver = StaticResolver::new()
//!     .with_host("localhost", IpAddr::V4(Ipv4Addr::LOCALHOST));
//!
//! let ep = parse("192.168.1.20:55", &resolver).unwrap();
//! assert_eq!(ep.family(), AddressFamily::Ipv4);
//! assert_eq!(ep.port(), 55);
//!
//! let ep = parse("[::1%eth0]:40456", &resolver).unwrap();
//! assert_eq!(ep.scope_id(), Some("eth0"));
//!
//! let ep = parse("localhost:7411", &resolver).unwrap();
//! assert!(ep.ip().is_loopback());
//!
//! assert!(parse("192.168.1.20::123", &resolver).is_err());
//! ```

use super::resolver::{Resolver, SystemResolver};
use std::fmt;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV6};
use std::str::FromStr;

/// Address family of a resolved endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    /// IPv4
    Ipv4,
    /// IPv6
    Ipv6,
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::Ipv4 => write!(f, "IPv4"),
            AddressFamily::Ipv6 => write!(f, "IPv6"),
        }
    }
}

/// Resolved network destination.
///
/// Equality and hashing use the numeric address, port and scope id; the
/// literal text it was parsed from is not kept, so `[FC07::3]:1` and
/// `[fc07::3]:1` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SocketEndpoint {
    addr: IpAddr,
    port: u16,
    scope_id: Option<String>,
}

impl SocketEndpoint {
    /// Build an endpoint from parts (no scope).
    pub fn new(addr: IpAddr, port: u16) -> Self {
        Self {
            addr,
            port,
            scope_id: None,
        }
    }

    /// Build an IPv6 endpoint with a scope/zone id.
    ///
    /// # Errors
    ///
    /// `InvalidFormat` if `scope_id` is empty or has characters outside
    /// letters, digits and `. - _ ~`, i.e. anything whose canonical form
    /// would not parse back.
    pub fn with_scope(
        addr: Ipv6Addr,
        port: u16,
        scope_id: impl Into<String>,
    ) -> Result<Self, EndpointError> {
        let scope_id = scope_id.into();
        let endpoint = Self {
            addr: IpAddr::V6(addr),
            port,
            scope_id: Some(scope_id),
        };
        if let Some(scope) = endpoint.scope_id() {
            validate_scope_id(&endpoint.to_string(), scope)?;
        }
        Ok(endpoint)
    }

    /// Parse using the operating system resolver for host names.
    pub fn parse(spec: &str) -> Result<Self, EndpointError> {
        parse(spec, &SystemResolver)
    }

    /// Parse using an injected resolver for host names.
    pub fn parse_with<R: Resolver + ?Sized>(
        spec: &str,
        resolver: &R,
    ) -> Result<Self, EndpointError> {
        parse(spec, resolver)
    }

    /// Address family.
    pub fn family(&self) -> AddressFamily {
        match self.addr {
            IpAddr::V4(_) => AddressFamily::Ipv4,
            IpAddr::V6(_) => AddressFamily::Ipv6,
        }
    }

    /// Numeric address.
    pub fn ip(&self) -> IpAddr {
        self.addr
    }

    /// Port number.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// IPv6 scope/zone id, if one was given.
    pub fn scope_id(&self) -> Option<&str> {
        self.scope_id.as_deref()
    }

    /// True for IPv6 endpoints.
    pub fn is_ipv6(&self) -> bool {
        self.addr.is_ipv6()
    }

    /// True if the address lies in a multicast range (224.0.0.0/4 or ff00::/8).
    pub fn is_multicast(&self) -> bool {
        self.addr.is_multicast()
    }

    /// Numeric scope index for socket calls.
    ///
    /// Decimal scope ids are used as-is; anything else is looked up as an
    /// interface name. Unknown interfaces and scope-less endpoints give `0`.
    pub fn scope_index(&self) -> u32 {
        match self.scope_id.as_deref() {
            None => 0,
            Some(scope) => scope
                .parse::<u32>()
                .unwrap_or_else(|_| interface_index(scope)),
        }
    }

    /// Convert to a `SocketAddr` usable with std / socket2 sockets.
    pub fn to_socket_addr(&self) -> SocketAddr {
        match self.addr {
            IpAddr::V4(v4) => SocketAddr::new(IpAddr::V4(v4), self.port),
            IpAddr::V6(v6) => SocketAddr::V6(SocketAddrV6::new(v6, self.port, 0, self.scope_index())),
        }
    }
}

impl fmt::Display for SocketEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.addr, &self.scope_id) {
            (IpAddr::V4(v4), _) => write!(f, "{}:{}", v4, self.port),
            (IpAddr::V6(v6), Some(scope)) => write!(f, "[{}%{}]:{}", v6, scope, self.port),
            (IpAddr::V6(v6), None) => write!(f, "[{}]:{}", v6, self.port),
        }
    }
}

impl FromStr for SocketEndpoint {
    type Err = EndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<SocketEndpoint> for SocketAddr {
    fn from(ep: SocketEndpoint) -> Self {
        ep.to_socket_addr()
    }
}

/// Error parsing or resolving an endpoint specification.
#[derive(Debug)]
pub enum EndpointError {
    /// Text violates the endpoint grammar. Permanent; retrying the same text
    /// will fail the same way.
    InvalidFormat {
        /// Offending specification
        spec: String,
        /// What was wrong with it
        reason: String,
    },
    /// The resolver could not produce an address for the host name.
    HostUnresolvable {
        /// Host name handed to the resolver
        host: String,
        /// Resolver failure, if it reported one (absent for an empty answer)
        source: Option<io::Error>,
    },
}

impl EndpointError {
    fn invalid(spec: &str, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        log::debug!("[Endpoint] rejecting '{}': {}", spec, reason);
        EndpointError::InvalidFormat {
            spec: spec.to_string(),
            reason,
        }
    }

    /// True for grammar violations.
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, EndpointError::InvalidFormat { .. })
    }

    /// True for resolver failures.
    pub fn is_host_unresolvable(&self) -> bool {
        matches!(self, EndpointError::HostUnresolvable { .. })
    }
}

impl fmt::Display for EndpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointError::InvalidFormat { spec, reason } => {
                write!(f, "invalid endpoint '{}': {}", spec, reason)
            }
            EndpointError::HostUnresolvable {
                host,
                source: Some(e),
            } => write!(f, "unresolvable host '{}': {}", host, e),
            EndpointError::HostUnresolvable { host, source: None } => {
                write!(f, "unresolvable host '{}': no addresses returned", host)
            }
        }
    }
}

impl std::error::Error for EndpointError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EndpointError::HostUnresolvable { source: Some(e), .. } => Some(e),
            _ => None,
        }
    }
}

/// Parse an endpoint specification, resolving host names through `resolver`.
///
/// # Errors
///
/// - `InvalidFormat` on any grammar violation (missing/empty/non-numeric/
///   out-of-range port, unbracketed extra colon, malformed IPv6 literal,
///   invalid scope id)
/// - `HostUnresolvable` if `resolver` fails or returns no address
pub fn parse<R: Resolver + ?Sized>(spec: &str, resolver: &R) -> Result<SocketEndpoint, EndpointError> {
    if spec.starts_with('[') {
        parse_bracketed(spec)
    } else {
        parse_host_port(spec, resolver)
    }
}

/// `[ipv6[%scope]]:port`
fn parse_bracketed(spec: &str) -> Result<SocketEndpoint, EndpointError> {
    let close = spec
        .find(']')
        .ok_or_else(|| EndpointError::invalid(spec, "missing closing ']' for IPv6 literal"))?;

    let inner = &spec[1..close];
    let rest = &spec[close + 1..];

    let port_str = rest
        .strip_prefix(':')
        .ok_or_else(|| EndpointError::invalid(spec, "missing ':<port>' after ']'"))?;
    let port = parse_port(spec, port_str)?;

    let (literal, scope) = match inner.split_once('%') {
        Some((literal, scope)) => (literal, Some(scope)),
        None => (inner, None),
    };

    if literal.is_empty() {
        return Err(EndpointError::invalid(spec, "empty IPv6 literal"));
    }

    let addr = literal.parse::<Ipv6Addr>().map_err(|_| {
        EndpointError::invalid(spec, format!("invalid IPv6 literal '{}'", literal))
    })?;

    match scope {
        Some(scope) => {
            validate_scope_id(spec, scope)?;
            Ok(SocketEndpoint {
                addr: IpAddr::V6(addr),
                port,
                scope_id: Some(scope.to_string()),
            })
        }
        None => Ok(SocketEndpoint::new(IpAddr::V6(addr), port)),
    }
}

/// `host:port` with exactly one colon.
fn parse_host_port<R: Resolver + ?Sized>(
    spec: &str,
    resolver: &R,
) -> Result<SocketEndpoint, EndpointError> {
    if spec.contains(['[', ']']) {
        return Err(EndpointError::invalid(
            spec,
            "brackets are only allowed around a leading IPv6 literal",
        ));
    }

    let (host, port_str) = match spec.matches(':').count() {
        0 => return Err(EndpointError::invalid(spec, "missing ':<port>'")),
        1 => spec
            .split_once(':')
            .ok_or_else(|| EndpointError::invalid(spec, "missing ':<port>'"))?,
        n => {
            return Err(EndpointError::invalid(
                spec,
                format!(
                    "{} colons outside brackets (IPv6 literals must be written as [addr]:port)",
                    n
                ),
            ))
        }
    };

    if host.is_empty() {
        return Err(EndpointError::invalid(spec, "missing host"));
    }
    if host.contains('%') {
        return Err(EndpointError::invalid(
            spec,
            "scope id is only allowed inside an IPv6 bracket literal",
        ));
    }

    let port = parse_port(spec, port_str)?;

    if let Ok(v4) = host.parse::<Ipv4Addr>() {
        return Ok(SocketEndpoint::new(IpAddr::V4(v4), port));
    }

    let addr = resolve_host(host, resolver)?;
    Ok(SocketEndpoint::new(addr, port))
}

fn resolve_host<R: Resolver + ?Sized>(host: &str, resolver: &R) -> Result<IpAddr, EndpointError> {
    match resolver.resolve(host) {
        Ok(addrs) => addrs
            .first()
            .copied()
            .ok_or_else(|| EndpointError::HostUnresolvable {
                host: host.to_string(),
                source: None,
            }),
        Err(e) => {
            log::debug!("[Endpoint] resolver failed for '{}': {}", host, e);
            Err(EndpointError::HostUnresolvable {
                host: host.to_string(),
                source: Some(e),
            })
        }
    }
}

/// Decimal digits only, value in 0..=65535. Leading zeros are accepted.
fn parse_port(spec: &str, port_str: &str) -> Result<u16, EndpointError> {
    if port_str.is_empty() {
        return Err(EndpointError::invalid(spec, "empty port"));
    }
    if let Some(c) = port_str.chars().find(|c| !c.is_ascii_digit()) {
        return Err(EndpointError::invalid(
            spec,
            format!("non-numeric port '{}' (unexpected {:?})", port_str, c),
        ));
    }

    let value = port_str.bytes().try_fold(0u32, |acc, b| {
        acc.checked_mul(10)
            .and_then(|v| v.checked_add(u32::from(b - b'0')))
            .filter(|v| *v <= u32::from(u16::MAX))
    });

    value
        .and_then(|v| u16::try_from(v).ok())
        .ok_or_else(|| {
            EndpointError::invalid(spec, format!("port '{}' out of range 0-65535", port_str))
        })
}

/// Scope ids: letters, digits and `. - _ ~`, at least one character.
fn validate_scope_id(spec: &str, scope: &str) -> Result<(), EndpointError> {
    if scope.is_empty() {
        return Err(EndpointError::invalid(spec, "empty scope id after '%'"));
    }
    if let Some(c) = scope.chars().find(|c| !is_scope_char(*c)) {
        return Err(EndpointError::invalid(
            spec,
            format!("invalid character {:?} in scope id '{}'", c, scope),
        ));
    }
    Ok(())
}

#[inline]
fn is_scope_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '~')
}

/// Interface index for a named zone (0 if unknown).
#[cfg(unix)]
fn interface_index(name: &str) -> u32 {
    let Ok(c_name) = std::ffi::CString::new(name) else {
        return 0;
    };
    // SAFETY: `c_name` is a valid NUL-terminated string that outlives the call;
    // if_nametoindex only reads it and returns 0 on failure.
    unsafe { libc::if_nametoindex(c_name.as_ptr()) }
}

#[cfg(not(unix))]
fn interface_index(_name: &str) -> u32 {
    0
}
