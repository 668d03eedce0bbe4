// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! naoutil configuration.
//!
//! Defaults work out of the box; a TOML file and environment variables can
//! override them.
//!
//! ```toml
//! robot = "nao.local"
//! port = 9559
//! discovery_timeout_ms = 1500
//! favorites = ["mydell2"]
//! resources_dir = "resources"
//!
//! [[robots]]
//! robot_name = "lab-nao"
//! host_name = "lab-nao.local"
//! ip_address = "192.168.1.20"
//! port = 9559
//! ```
//!
//! # Environment Variables
//!
//! - `NAOUTIL_ROBOT`: robot id (address, host name or robot name)
//! - `NAOUTIL_PORT`: robot middleware port
//! - `NAOUTIL_BROKER_IP`: local broker address
//! - `NAOUTIL_DISCOVERY_TIMEOUT_MS`: mDNS browse window
//! - `NAOUTIL_RESOURCES`: resources directory

use crate::discovery::{DiscoveryBackend, RobotRecord, StaticDiscovery, NAOQI_SERVICE_TYPE};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// naoutil configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NaoutilConfig {
    /// Robot to connect to (address, host name or robot name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub robot: Option<String>,

    /// Robot middleware port, overriding the discovered one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Local broker address (default: interface routing to the robot).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broker_ip: Option<String>,

    /// Local broker port (0 lets the middleware choose).
    #[serde(default)]
    pub broker_port: u16,

    /// Browse for IPv6 addresses instead of IPv4.
    #[serde(default)]
    pub ipv6: bool,

    /// mDNS browse window in milliseconds.
    #[serde(default = "default_discovery_timeout")]
    pub discovery_timeout_ms: u64,

    /// DNS-SD service type robots advertise.
    #[serde(default = "default_service_type")]
    pub service_type: String,

    /// Robot or host names preferred when no robot is named.
    #[serde(default)]
    pub favorites: Vec<String>,

    /// Directory holding property and text resources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources_dir: Option<PathBuf>,

    /// Known robots. When non-empty, mDNS is not used.
    #[serde(default)]
    pub robots: Vec<RobotRecord>,
}

fn default_discovery_timeout() -> u64 {
    2000
}

fn default_service_type() -> String {
    NAOQI_SERVICE_TYPE.to_string()
}

impl Default for NaoutilConfig {
    fn default() -> Self {
        Self {
            robot: None,
            port: None,
            broker_ip: None,
            broker_port: 0,
            ipv6: false,
            discovery_timeout_ms: default_discovery_timeout(),
            service_type: default_service_type(),
            favorites: Vec::new(),
            resources_dir: None,
            robots: Vec::new(),
        }
    }
}

impl NaoutilConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by the environment.
    pub fn from_env() -> Result<Self> {
        Self::default().apply_env()
    }

    /// Override fields from `NAOUTIL_*` environment variables.
    pub fn apply_env(self) -> Result<Self> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(robot) = var("NAOUTIL_ROBOT") {
            self.robot = Some(robot);
        }
        if let Some(port) = var("NAOUTIL_PORT") {
            self.port = Some(parse_var("NAOUTIL_PORT", &port)?);
        }
        if let Some(ip) = var("NAOUTIL_BROKER_IP") {
            self.broker_ip = Some(ip);
        }
        if let Some(ms) = var("NAOUTIL_DISCOVERY_TIMEOUT_MS") {
            self.discovery_timeout_ms = parse_var("NAOUTIL_DISCOVERY_TIMEOUT_MS", &ms)?;
        }
        if let Some(dir) = var("NAOUTIL_RESOURCES") {
            self.resources_dir = Some(PathBuf::from(dir));
        }
        self.validate()?;
        Ok(self)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.port == Some(0) {
            return Err(Error::Config("port cannot be 0".into()));
        }
        if self.discovery_timeout_ms == 0 {
            return Err(Error::Config("discovery_timeout_ms cannot be 0".into()));
        }
        if !self.service_type.starts_with('_') || !self.service_type.ends_with(".local.") {
            return Err(Error::Config(format!(
                "service_type '{}' must look like '_name._tcp.local.'",
                self.service_type
            )));
        }
        for (i, robot) in self.robots.iter().enumerate() {
            if robot.port == 0 {
                return Err(Error::Config(format!("robot {} has port 0", i)));
            }
            if robot.ip_address.is_empty() {
                return Err(Error::Config(format!("robot {} has no ip_address", i)));
            }
        }
        Ok(())
    }

    /// mDNS browse window as a Duration.
    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_millis(self.discovery_timeout_ms)
    }

    /// Build the discovery backend this configuration describes.
    pub fn discovery_backend(&self) -> Box<dyn DiscoveryBackend> {
        if !self.robots.is_empty() {
            let robots = self
                .robots
                .iter()
                .cloned()
                .map(|r| {
                    let favorite = r.favorite
                        || self
                            .favorites
                            .iter()
                            .any(|f| *f == r.robot_name || *f == r.host_name);
                    r.favorite(favorite)
                })
                .collect();
            return Box::new(StaticDiscovery::new(robots));
        }
        self.network_backend()
    }

    #[cfg(feature = "mdns")]
    fn network_backend(&self) -> Box<dyn DiscoveryBackend> {
        use crate::discovery::{MdnsDiscovery, MdnsDiscoveryConfig};

        Box::new(MdnsDiscovery::new(MdnsDiscoveryConfig {
            service_type: self.service_type.clone(),
            timeout: self.discovery_timeout(),
            favorites: self.favorites.clone(),
        }))
    }

    #[cfg(not(feature = "mdns"))]
    fn network_backend(&self) -> Box<dyn DiscoveryBackend> {
        log::warn!("[Config] Built without mDNS and no robots configured");
        Box::new(StaticDiscovery::default())
    }

    /// Save configuration to a TOML file.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("cannot serialize: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{}='{}' is not a valid number", key, value)))
}
