// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Robot Discovery
//!
//! Robots advertise their middleware endpoint on the local network as a
//! DNS-SD service (`_naoqi._tcp`). Discovery turns those advertisements into
//! a list of [`RobotRecord`]s that the [resolver](crate::resolver) picks from.
//!
//! ## Backends
//!
//! | Backend | Use Case | Type |
//! |---------|----------|------|
//! | **mDNS / DNS-SD** | LAN, robots announce themselves | [`MdnsDiscovery`] |
//! | **Static list** | Known robots, tests, no multicast | [`StaticDiscovery`] |
//!
//! The order of the returned list matters: it is the order in which the
//! services were found, and the resolver falls back to the first entry.
//!
//! ```rust,ignore
//! use naoutil::discovery::{DiscoveryBackend, MdnsDiscovery, MdnsDiscoveryConfig};
//!
//! let discovery = MdnsDiscovery::new(MdnsDiscoveryConfig::default());
//! for robot in discovery.find_all(false)? {
//!     println!("{} at {}:{}", robot.robot_name, robot.ip_address, robot.port);
//! }
//! ```

#[cfg(feature = "mdns")]
mod mdns;

#[cfg(feature = "mdns")]
pub use mdns::{MdnsDiscovery, MdnsDiscoveryConfig};

use crate::Result;
use serde::{Deserialize, Serialize};

/// DNS-SD service type advertised by the robot middleware.
pub const NAOQI_SERVICE_TYPE: &str = "_naoqi._tcp.local.";

/// One advertised robot endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotRecord {
    /// Service instance name (usually the robot's name).
    pub robot_name: String,
    /// mDNS host name, e.g. `nao.local`.
    pub host_name: String,
    /// Address to connect to. Normally an IP literal.
    pub ip_address: String,
    /// Middleware port.
    pub port: u16,
    /// The service runs on this very host.
    #[serde(default)]
    pub local: bool,
    /// Preferred robot when nothing explicit was asked for.
    #[serde(default)]
    pub favorite: bool,
}

impl RobotRecord {
    /// Create a remote, non-favorite record.
    pub fn new(
        robot_name: impl Into<String>,
        host_name: impl Into<String>,
        ip_address: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            robot_name: robot_name.into(),
            host_name: host_name.into(),
            ip_address: ip_address.into(),
            port,
            local: false,
            favorite: false,
        }
    }

    /// Mark the record as running on this host.
    pub fn local(mut self, local: bool) -> Self {
        self.local = local;
        self
    }

    /// Mark the record as favorite.
    pub fn favorite(mut self, favorite: bool) -> Self {
        self.favorite = favorite;
        self
    }

    /// True if `id` equals the address, the host name or the robot name.
    pub fn matches_id(&self, id: &str) -> bool {
        self.ip_address == id || self.host_name == id || self.robot_name == id
    }
}

/// Source of discovered robots.
///
/// Implementations return robots in discovery order.
pub trait DiscoveryBackend: Send + Sync {
    /// Find every reachable robot.
    ///
    /// `ipv6` selects IPv6 addresses instead of IPv4 ones.
    fn find_all(&self, ipv6: bool) -> Result<Vec<RobotRecord>>;
}

/// Fixed list of robots.
#[derive(Debug, Clone, Default)]
pub struct StaticDiscovery {
    robots: Vec<RobotRecord>,
}

impl StaticDiscovery {
    pub fn new(robots: Vec<RobotRecord>) -> Self {
        Self { robots }
    }

    pub fn robots(&self) -> &[RobotRecord] {
        &self.robots
    }
}

impl DiscoveryBackend for StaticDiscovery {
    fn find_all(&self, ipv6: bool) -> Result<Vec<RobotRecord>> {
        // Host names are kept either way; only literal addresses are filtered.
        Ok(self
            .robots
            .iter()
            .filter(|r| match r.ip_address.parse::<std::net::IpAddr>() {
                Ok(ip) => ip.is_ipv6() == ipv6,
                Err(_) => true,
            })
            .cloned()
            .collect())
    }
}

impl<F> DiscoveryBackend for F
where
    F: Fn(bool) -> Result<Vec<RobotRecord>> + Send + Sync,
{
    fn find_all(&self, ipv6: bool) -> Result<Vec<RobotRecord>> {
        self(ipv6)
    }
}

/// Extract the instance name from a DNS-SD full name.
///
/// `"nao._naoqi._tcp.local."` becomes `"nao"`. Escaped dots (`\.`) inside
/// the instance label are kept.
pub fn robot_name_from_fullname(fullname: &str) -> String {
    let mut name = String::new();
    let mut chars = fullname.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    name.push(next);
                }
            }
            '.' => break,
            c => name.push(c),
        }
    }
    name
}
