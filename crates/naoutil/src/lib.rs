// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! naoutil - utilities for NAO robot applications
//!
//! Finds robots on the local network, connects local brokers to them and
//! gives robot code one environment for services, events and localized
//! resources.
//!
//! # Features
//!
//! - **Discovery**: Browse mDNS for robots, or use a static list
//! - **Endpoint Resolution**: Pick the robot to talk to by id, favorite or locality
//! - **Broker Sessions**: Scoped local brokers, shut down exactly once
//! - **Event Relay**: Memory events and micro-events to Rust closures
//! - **Resources**: `.properties`/JSON lookup with language fallback
//!
//! The robot middleware itself is abstracted behind the [`sdk`] traits so an
//! SDK binding (or a test double) can be plugged in.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use naoutil::{BrokerOptions, BrokerSession, NaoEnvironment};
//!
//! let session = BrokerSession::create(middleware.clone(), "MyBroker", BrokerOptions::default())?;
//! let env = NaoEnvironment::new(middleware);
//! let greeting = env.localized_text("defaults", "hello")?;
//! ```
//!
//! # Configuration File
//!
//! ```toml
//! robot = "nao.local"
//! favorites = ["mydell2"]
//! discovery_timeout_ms = 1500
//! ```

pub mod broker;
pub mod config;
pub mod discovery;
pub mod env;
pub mod error;
pub mod events;
pub mod i18n;
pub mod jsonobj;
pub mod module;
pub mod naming;
pub mod net;
pub mod properties;
pub mod proxy;
pub mod resolver;
pub mod sdk;

#[cfg(test)]
mod fake;

pub use broker::{with_session, with_session_using, BrokerOptions, BrokerSession};
pub use config::NaoutilConfig;
#[cfg(feature = "mdns")]
pub use discovery::{MdnsDiscovery, MdnsDiscoveryConfig};
pub use discovery::{DiscoveryBackend, RobotRecord, StaticDiscovery};
pub use env::{EnvLog, NaoEnvironment, TracingLog};
pub use error::{Error, Result};
pub use events::EventRelay;
pub use module::Module;
pub use properties::PropertyCache;
pub use proxy::ProxyCache;
pub use resolver::{resolve_endpoint, Endpoint, DEFAULT_HOST, DEFAULT_PORT};
pub use sdk::{Broker, BrokerSpec, Middleware, ModuleHandler, ServiceProxy, Value};
