// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Endpoint resolution.
//!
//! Picks the robot to connect to from the discovered list:
//!
//! 1. explicit id (address, host name or robot name), exact match
//! 2. favorite robot
//! 3. robot running on this host
//! 4. first robot discovered
//! 5. `nao.local:9559`
//!
//! An explicit id that matches nothing is used verbatim. An explicit port
//! always wins over the discovered one.

use crate::discovery::{DiscoveryBackend, RobotRecord};
use std::fmt;

/// Host used when nothing was discovered.
pub const DEFAULT_HOST: &str = "nao.local";

/// Default middleware port.
pub const DEFAULT_PORT: u16 = 9559;

/// Where to reach a robot's middleware.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    /// IP literal or host name.
    pub address: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.address.contains(':') {
            write!(f, "[{}]:{}", self.address, self.port)
        } else {
            write!(f, "{}:{}", self.address, self.port)
        }
    }
}

/// Discover robots and pick one.
///
/// Discovery errors are logged and handled as an empty list, so this never
/// fails.
pub fn resolve_endpoint(
    backend: &dyn DiscoveryBackend,
    robot_id: Option<&str>,
    port: Option<u16>,
) -> Endpoint {
    let robots = match backend.find_all(false) {
        Ok(robots) => robots,
        Err(e) => {
            log::warn!("[Resolver] Discovery failed, assuming no robot: {}", e);
            Vec::new()
        }
    };
    select_endpoint(&robots, robot_id, port)
}

/// Pick an endpoint from an already discovered list.
pub fn select_endpoint(
    robots: &[RobotRecord],
    robot_id: Option<&str>,
    port: Option<u16>,
) -> Endpoint {
    if let Some(id) = robot_id {
        return match robots.iter().find(|r| r.matches_id(id)) {
            Some(robot) => {
                log::debug!("[Resolver] '{}' matches {}", id, robot.robot_name);
                endpoint_for(robot, port)
            }
            None => {
                log::debug!("[Resolver] '{}' not discovered, using it verbatim", id);
                Endpoint::new(id, port.unwrap_or(DEFAULT_PORT))
            }
        };
    }

    let chosen = robots
        .iter()
        .find(|r| r.favorite)
        .or_else(|| robots.iter().find(|r| r.local))
        .or_else(|| robots.first());

    match chosen {
        Some(robot) => {
            log::debug!(
                "[Resolver] Selected {} (favorite={}, local={})",
                robot.robot_name,
                robot.favorite,
                robot.local
            );
            endpoint_for(robot, port)
        }
        None => {
            log::debug!("[Resolver] No robot discovered, falling back to {}", DEFAULT_HOST);
            Endpoint::new(DEFAULT_HOST, port.unwrap_or(DEFAULT_PORT))
        }
    }
}

fn endpoint_for(robot: &RobotRecord, port: Option<u16>) -> Endpoint {
    Endpoint::new(robot.ip_address.clone(), port.unwrap_or(robot.port))
}
