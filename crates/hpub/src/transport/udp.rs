// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! UDP sockets for parsed endpoints.
//!
//! Receivers bind an endpoint; senders open a connected socket towards one.
//! Multicast endpoints join their group with `SO_REUSEADDR`, so several
//! groups can share a port on the same host. On unix the socket binds the
//! group address itself, which keeps each socket to its own group's
//! datagrams; elsewhere binding a group address is not portable, so the
//! wildcard address is bound and groups sharing a port see each other's
//! traffic.

use super::endpoint::{AddressFamily, SocketEndpoint};
use crate::config::DEFAULT_MULTICAST_TTL;
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};

/// Options for sockets that send towards an endpoint.
#[derive(Debug, Clone, Copy)]
pub struct SendOptions {
    /// Multicast TTL / hop limit (ignored for unicast).
    pub multicast_ttl: u32,
    /// Deliver our own multicast packets back to local receivers.
    pub multicast_loop: bool,
    /// Local IPv4 interface for outgoing multicast (`UNSPECIFIED` = kernel choice).
    pub interface_v4: Ipv4Addr,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            multicast_ttl: DEFAULT_MULTICAST_TTL,
            multicast_loop: true,
            interface_v4: Ipv4Addr::UNSPECIFIED,
        }
    }
}

fn new_udp_socket(family: AddressFamily) -> io::Result<Socket> {
    let domain = match family {
        AddressFamily::Ipv4 => Domain::IPV4,
        AddressFamily::Ipv6 => Domain::IPV6,
    };
    Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))
}

/// Local address a multicast receiver binds for `endpoint`.
///
/// The group address on unix, the wildcard address of the family elsewhere.
fn multicast_bind_addr(endpoint: &SocketEndpoint) -> SocketAddr {
    if cfg!(unix) {
        return endpoint.to_socket_addr();
    }
    match endpoint.family() {
        AddressFamily::Ipv4 => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), endpoint.port()),
        AddressFamily::Ipv6 => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), endpoint.port()),
    }
}

/// Bind a receiving socket for `endpoint`.
///
/// Unicast endpoints bind their own address. Multicast endpoints set
/// `SO_REUSEADDR`, bind the group address on unix (the wildcard address
/// elsewhere) on the endpoint port and join the group; IPv6 joins on the
/// endpoint's scope interface.
///
/// Two groups sharing a port are isolated on unix. On other platforms each
/// socket also receives datagrams sent to the other group; filter on the
/// destination if that matters.
pub fn bind_endpoint(endpoint: &SocketEndpoint) -> io::Result<UdpSocket> {
    let socket = new_udp_socket(endpoint.family())?;
    socket.set_reuse_address(true)?;

    if !endpoint.is_multicast() {
        socket.bind(&endpoint.to_socket_addr().into())?;
        log::debug!("[UDP] bound unicast endpoint {}", endpoint);
        return Ok(socket.into());
    }

    let bind_addr = multicast_bind_addr(endpoint);
    match endpoint.ip() {
        IpAddr::V4(group) => {
            socket.bind(&bind_addr.into())?;
            socket.join_multicast_v4(&group, &Ipv4Addr::UNSPECIFIED)?;
            log::debug!(
                "[UDP] bound {} and joined multicast group {}",
                bind_addr,
                group
            );
        }
        IpAddr::V6(group) => {
            socket.set_only_v6(true)?;
            socket.bind(&bind_addr.into())?;
            let iface = endpoint.scope_index();
            socket.join_multicast_v6(&group, iface)?;
            log::debug!(
                "[UDP] bound {} and joined multicast group {} on interface {}",
                bind_addr,
                group,
                iface
            );
        }
    }

    Ok(socket.into())
}

/// Open a socket connected to `endpoint` for sending.
///
/// The local side is an ephemeral port on the wildcard address of the
/// endpoint's family.
pub fn open_send_socket(endpoint: &SocketEndpoint, options: &SendOptions) -> io::Result<UdpSocket> {
    let socket = new_udp_socket(endpoint.family())?;

    let local: SocketAddr = match endpoint.family() {
        AddressFamily::Ipv4 => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
        AddressFamily::Ipv6 => {
            socket.set_only_v6(true)?;
            SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0)
        }
    };
    socket.bind(&local.into())?;

    if endpoint.is_multicast() {
        match endpoint.family() {
            AddressFamily::Ipv4 => {
                socket.set_multicast_ttl_v4(options.multicast_ttl)?;
                socket.set_multicast_loop_v4(options.multicast_loop)?;
                if !options.interface_v4.is_unspecified() {
                    socket.set_multicast_if_v4(&options.interface_v4)?;
                }
            }
            AddressFamily::Ipv6 => {
                socket.set_multicast_hops_v6(options.multicast_ttl)?;
                socket.set_multicast_loop_v6(options.multicast_loop)?;
                let iface = endpoint.scope_index();
                if iface != 0 {
                    socket.set_multicast_if_v6(iface)?;
                }
            }
        }
    }

    socket.connect(&endpoint.to_socket_addr().into())?;
    log::debug!(
        "[UDP] send socket connected to {} (multicast={})",
        endpoint,
        endpoint.is_multicast()
    );
    Ok(socket.into())
}
