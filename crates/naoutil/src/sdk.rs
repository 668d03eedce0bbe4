// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Seams to the robot middleware SDK.
//!
//! naoutil never talks to a robot by itself. A binding to the vendor SDK
//! implements these traits and everything else in the crate builds on
//! them:
//!
//! ```text
//! Middleware
//! +-- create_broker()    -> Broker        (local broker joined to the robot)
//! +-- create_proxy()     -> ServiceProxy  (remote calls on a named service)
//! +-- register_module()  <- ModuleHandler (callbacks from the robot)
//! ```

use crate::Result;
use std::fmt;
use std::sync::Arc;

/// Dynamically typed middleware value.
pub type Value = serde_json::Value;

/// Remote-procedure handle bound to one service on the robot.
pub trait ServiceProxy: Send + Sync {
    /// Service this proxy talks to, e.g. `ALMemory`.
    fn service_name(&self) -> &str;

    /// Call `method` with positional arguments.
    fn call(&self, method: &str, args: &[Value]) -> Result<Value>;
}

/// Target of calls made by the middleware into this process.
pub trait ModuleHandler: Send + Sync {
    /// Handle a call to `method` on this module.
    fn invoke(&self, method: &str, args: &[Value]) -> Result<Value>;
}

/// Everything needed to start a local broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerSpec {
    /// Broker name, unique per process.
    pub name: String,
    /// Address the local broker listens on.
    pub broker_ip: String,
    /// Port the local broker listens on (0 lets the middleware choose).
    pub broker_port: u16,
    /// Robot middleware address.
    pub robot_ip: String,
    /// Robot middleware port.
    pub robot_port: u16,
}

impl fmt::Display for BrokerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}:{} -> {}:{})",
            self.name, self.broker_ip, self.broker_port, self.robot_ip, self.robot_port
        )
    }
}

/// A running local broker.
pub trait Broker: Send + Sync {
    fn spec(&self) -> &BrokerSpec;

    /// Stop the broker and leave the robot's network.
    fn shutdown(&self) -> Result<()>;
}

/// Entry point of an SDK binding.
pub trait Middleware: Send + Sync {
    fn create_broker(&self, spec: &BrokerSpec) -> Result<Arc<dyn Broker>>;

    fn create_proxy(&self, service: &str) -> Result<Arc<dyn ServiceProxy>>;

    /// Make `handler` reachable by the robot under `name`.
    fn register_module(&self, name: &str, handler: Arc<dyn ModuleHandler>) -> Result<()>;

    fn unregister_module(&self, name: &str) -> Result<()>;
}
