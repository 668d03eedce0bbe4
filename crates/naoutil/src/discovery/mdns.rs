// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! mDNS / DNS-SD discovery of robot middleware endpoints.
//!
//! Browses `_naoqi._tcp.local.` for a bounded window and returns every
//! resolved instance. One record is produced per (instance, address) pair,
//! so a robot reachable over both wired and wireless links shows up twice.
//!
//! # Environment Variables
//!
//! - `NAOUTIL_DISCOVERY_TIMEOUT_MS`: browse window (default: 2000)

use super::{robot_name_from_fullname, DiscoveryBackend, RobotRecord, NAOQI_SERVICE_TYPE};
use crate::{Error, Result};
use mdns_sd::{ServiceDaemon, ServiceEvent};
use std::collections::HashSet;
use std::net::IpAddr;
use std::time::{Duration, Instant};

/// Configuration for mDNS discovery.
#[derive(Debug, Clone)]
pub struct MdnsDiscoveryConfig {
    /// Fully qualified DNS-SD service type to browse.
    pub service_type: String,

    /// How long to collect answers.
    pub timeout: Duration,

    /// Robot or host names flagged as favorite.
    pub favorites: Vec<String>,
}

impl Default for MdnsDiscoveryConfig {
    fn default() -> Self {
        Self {
            service_type: NAOQI_SERVICE_TYPE.to_string(),
            timeout: Duration::from_millis(
                std::env::var("NAOUTIL_DISCOVERY_TIMEOUT_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(2000),
            ),
            favorites: Vec::new(),
        }
    }
}

impl MdnsDiscoveryConfig {
    /// Set the browse window.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the favorite robot names.
    pub fn with_favorites(mut self, favorites: Vec<String>) -> Self {
        self.favorites = favorites;
        self
    }
}

/// Discovery through the host's multicast DNS.
pub struct MdnsDiscovery {
    config: MdnsDiscoveryConfig,
}

impl MdnsDiscovery {
    pub fn new(config: MdnsDiscoveryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MdnsDiscoveryConfig {
        &self.config
    }

    fn browse(&self, ipv6: bool) -> Result<Vec<RobotRecord>> {
        let daemon = ServiceDaemon::new().map_err(|e| Error::Discovery(e.to_string()))?;
        let receiver = daemon
            .browse(&self.config.service_type)
            .map_err(|e| Error::Discovery(e.to_string()))?;

        let local_addrs = local_addresses();
        let deadline = Instant::now() + self.config.timeout;
        let mut robots: Vec<RobotRecord> = Vec::new();

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }

            match receiver.recv_timeout(remaining) {
                Ok(ServiceEvent::ServiceResolved(info)) => {
                    let found = records_for_service(
                        info.get_fullname(),
                        info.get_hostname(),
                        info.get_addresses().iter().copied(),
                        info.get_port(),
                        ipv6,
                        &local_addrs,
                        &self.config.favorites,
                    );
                    merge_records(&mut robots, found);
                }
                Ok(ServiceEvent::SearchStarted(ty)) => {
                    log::trace!("[Discovery] Browsing {}", ty);
                }
                Ok(event) => {
                    log::trace!("[Discovery] Ignored event {:?}", event);
                }
                Err(e) => {
                    // Timeout or daemon gone; keep what was collected.
                    log::debug!("[Discovery] Browse ended: {}", e);
                    break;
                }
            }
        }

        if let Err(e) = daemon.stop_browse(&self.config.service_type) {
            log::debug!("[Discovery] stop_browse failed: {}", e);
        }
        if let Err(e) = daemon.shutdown() {
            log::debug!("[Discovery] daemon shutdown failed: {}", e);
        }

        log::info!(
            "[Discovery] {} endpoint(s) for {} in {:?}",
            robots.len(),
            self.config.service_type,
            self.config.timeout
        );
        Ok(robots)
    }
}

impl DiscoveryBackend for MdnsDiscovery {
    fn find_all(&self, ipv6: bool) -> Result<Vec<RobotRecord>> {
        self.browse(ipv6)
    }
}

/// Addresses bound to this host's interfaces.
fn local_addresses() -> HashSet<IpAddr> {
    match local_ip_address::list_afinet_netifas() {
        Ok(ifs) => ifs.into_iter().map(|(_name, ip)| ip).collect(),
        Err(e) => {
            log::debug!("[Discovery] Failed to list network interfaces: {}", e);
            HashSet::new()
        }
    }
}

/// Append `found` to `robots`, skipping (robot name, address) pairs already
/// present.
pub(crate) fn merge_records(robots: &mut Vec<RobotRecord>, found: Vec<RobotRecord>) {
    for robot in found {
        let known = robots
            .iter()
            .any(|r| r.robot_name == robot.robot_name && r.ip_address == robot.ip_address);
        if known {
            continue;
        }
        log::debug!(
            "[Discovery] Found {} at {}:{} (local={})",
            robot.robot_name,
            robot.ip_address,
            robot.port,
            robot.local
        );
        robots.push(robot);
    }
}

/// Build records for one resolved service instance.
pub(crate) fn records_for_service(
    fullname: &str,
    hostname: &str,
    addresses: impl IntoIterator<Item = IpAddr>,
    port: u16,
    ipv6: bool,
    local_addrs: &HashSet<IpAddr>,
    favorites: &[String],
) -> Vec<RobotRecord> {
    let robot_name = robot_name_from_fullname(fullname);
    let host_name = hostname.trim_end_matches('.').to_string();
    let favorite = favorites
        .iter()
        .any(|f| *f == robot_name || *f == host_name);

    let mut addrs: Vec<IpAddr> = addresses
        .into_iter()
        .filter(|ip| ip.is_ipv6() == ipv6)
        .collect();
    addrs.sort();

    addrs
        .into_iter()
        .map(|ip| RobotRecord {
            robot_name: robot_name.clone(),
            host_name: host_name.clone(),
            ip_address: ip.to_string(),
            port,
            local: ip.is_loopback() || local_addrs.contains(&ip),
            favorite,
        })
        .collect()
}
