// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Endpoint resolution against a realistic robot list.
//!
//! The dataset mirrors a busy lab network: several robots, one of them
//! `nao.local`, one on an unusual port, and this host advertising itself on
//! two interfaces at the end of the list.

use naoutil::discovery::{DiscoveryBackend, RobotRecord, StaticDiscovery};
use naoutil::resolver::{resolve_endpoint, Endpoint};
use naoutil::{Error, Result};

fn lab_robots() -> Vec<RobotRecord> {
    vec![
        RobotRecord::new("Pepper", "Pepper.local", "138.37.60.137", 9559),
        RobotRecord::new("naoFernando", "naoFernando.local", "138.37.60.4", 9559),
        RobotRecord::new("MacDave", "MacDave.local", "138.37.60.166", 9559),
        RobotRecord::new("nao", "nao.local", "138.37.60.85", 9559),
        RobotRecord::new("MBP15", "MBP15.local", "138.37.60.162", 9559),
        RobotRecord::new("mydell2", "mydell2.local", "138.37.60.170", 9559),
        RobotRecord::new("ALD-XXXX-LA", "ALD-XXXX-LA.local", "138.37.60.160", 57074),
        RobotRecord::new("Xor", "Xor.local", "138.37.60.59", 9559),
        RobotRecord::new("Vanilo", "Vanilo.local", "138.37.60.116", 9559),
        RobotRecord::new("zirup", "zirup.local", "138.37.60.66", 9559).local(true),
        RobotRecord::new("zirup", "zirup.local", "169.254.95.24", 9559).local(true),
    ]
}

fn lab() -> StaticDiscovery {
    StaticDiscovery::new(lab_robots())
}

fn resolve(backend: &dyn DiscoveryBackend, id: Option<&str>, port: Option<u16>) -> Endpoint {
    resolve_endpoint(backend, id, port)
}

#[test]
fn test_default_params_pick_local_robot() {
    assert_eq!(resolve(&lab(), None, None), Endpoint::new("138.37.60.66", 9559));
}

#[test]
fn test_unusual_port_with_host_name() {
    assert_eq!(
        resolve(&lab(), Some("ALD-XXXX-LA.local"), None),
        Endpoint::new("138.37.60.160", 57074)
    );
}

#[test]
fn test_unusual_port_with_host_name_and_port() {
    assert_eq!(
        resolve(&lab(), Some("ALD-XXXX-LA.local"), Some(57074)),
        Endpoint::new("138.37.60.160", 57074)
    );
}

#[test]
fn test_explicit_port_overrides_discovered() {
    assert_eq!(
        resolve(&lab(), Some("nao.local"), Some(7777)),
        Endpoint::new("138.37.60.85", 7777)
    );
}

#[test]
fn test_unknown_id_used_verbatim() {
    assert_eq!(
        resolve(&lab(), Some("unknown"), None),
        Endpoint::new("unknown", 9559)
    );
}

#[test]
fn test_id_by_ip_address() {
    assert_eq!(
        resolve(&lab(), Some("138.37.60.160"), None),
        Endpoint::new("138.37.60.160", 57074)
    );
}

#[test]
fn test_id_by_host_name() {
    assert_eq!(
        resolve(&lab(), Some("Pepper.local"), None),
        Endpoint::new("138.37.60.137", 9559)
    );
}

#[test]
fn test_id_by_robot_name() {
    assert_eq!(
        resolve(&lab(), Some("Pepper"), None),
        Endpoint::new("138.37.60.137", 9559)
    );
}

#[test]
fn test_nothing_discovered_falls_back_to_nao_local() {
    let empty = StaticDiscovery::default();
    assert_eq!(resolve(&empty, None, None), Endpoint::new("nao.local", 9559));
}

#[test]
fn test_no_local_robot_picks_first() {
    let mut robots = lab_robots();
    robots.truncate(robots.len() - 2);
    let backend = StaticDiscovery::new(robots);
    assert_eq!(resolve(&backend, None, None), Endpoint::new("138.37.60.137", 9559));
}

#[test]
fn test_favorite_beats_local() {
    let mut robots = lab_robots();
    robots[5].favorite = true;
    let backend = StaticDiscovery::new(robots);
    assert_eq!(resolve(&backend, None, None), Endpoint::new("138.37.60.170", 9559));
}

#[test]
fn test_discovery_failure_is_not_fatal() {
    let failing = |_ipv6: bool| -> Result<Vec<RobotRecord>> {
        Err(Error::Discovery("daemon not running".into()))
    };
    assert_eq!(resolve(&failing, None, None), Endpoint::default());
    assert_eq!(
        resolve(&failing, Some("10.1.1.1"), Some(9000)),
        Endpoint::new("10.1.1.1", 9000)
    );
}

#[test]
fn test_resolver_asks_for_ipv4() {
    let backend = |ipv6: bool| -> Result<Vec<RobotRecord>> {
        assert!(!ipv6);
        Ok(vec![RobotRecord::new("only", "only.local", "10.0.0.9", 9559)])
    };
    assert_eq!(resolve(&backend, None, None), Endpoint::new("10.0.0.9", 9559));
}
