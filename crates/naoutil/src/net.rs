// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Local address selection.

use crate::{Error, Result};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};

/// IP of the local interface that routes to `dest`.
///
/// `dest` is a host name or an IP literal. A UDP socket is connected to it
/// (nothing is sent) and its local address is read back.
pub fn local_ip_for(dest: &str) -> Result<IpAddr> {
    let target = (dest, 0)
        .to_socket_addrs()
        .map_err(|e| Error::Resolve {
            host: dest.to_string(),
            reason: e.to_string(),
        })?
        .min_by_key(|addr| addr.is_ipv6())
        .ok_or_else(|| Error::Resolve {
            host: dest.to_string(),
            reason: "no address".into(),
        })?;

    let bind: SocketAddr = if target.is_ipv6() {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    };

    let socket = UdpSocket::bind(bind)?;
    socket.connect(target)?;
    let ip = socket.local_addr()?.ip();
    log::debug!("[Net] Local address towards {} ({}) is {}", dest, target, ip);
    Ok(ip)
}
