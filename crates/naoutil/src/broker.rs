// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Broker sessions.
//!
//! A [`BrokerSession`] finds the robot, works out which local address can
//! reach it, starts a local broker joined to the robot's middleware and shuts
//! it down again exactly once, either explicitly or when dropped.
//!
//! ```rust,ignore
//! use naoutil::broker::{with_session, BrokerOptions};
//!
//! with_session(middleware, "MyBroker", BrokerOptions::default(), |session| {
//!     session.proxy("tts")?.call("say", &["Hello".into()])?;
//!     Ok(())
//! })?;
//! // The broker has been shut down here.
//! ```

use crate::config::NaoutilConfig;
use crate::discovery::DiscoveryBackend;
use crate::events::EventRelay;
use crate::net::local_ip_for;
use crate::proxy::ProxyCache;
use crate::resolver::{resolve_endpoint, Endpoint};
use crate::sdk::{Broker, BrokerSpec, Middleware, ServiceProxy};
use crate::{Error, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Optional overrides for [`BrokerSession::create`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrokerOptions {
    /// Local broker address (default: interface routing to the robot).
    pub broker_ip: Option<String>,
    /// Local broker port (default: 0).
    pub broker_port: Option<u16>,
    /// Robot id: address, host name or robot name.
    pub robot_id: Option<String>,
    /// Robot middleware port.
    pub robot_port: Option<u16>,
}

impl BrokerOptions {
    /// Options taken from a configuration.
    pub fn from_config(config: &NaoutilConfig) -> Self {
        Self {
            broker_ip: config.broker_ip.clone(),
            broker_port: Some(config.broker_port),
            robot_id: config.robot.clone(),
            robot_port: config.port,
        }
    }

    pub fn broker_ip(mut self, ip: impl Into<String>) -> Self {
        self.broker_ip = Some(ip.into());
        self
    }

    pub fn broker_port(mut self, port: u16) -> Self {
        self.broker_port = Some(port);
        self
    }

    pub fn robot(mut self, id: impl Into<String>) -> Self {
        self.robot_id = Some(id.into());
        self
    }

    pub fn robot_port(mut self, port: u16) -> Self {
        self.robot_port = Some(port);
        self
    }

    /// Fill the unset fields from `config`. Explicit values win.
    pub fn or_config(self, config: &NaoutilConfig) -> Self {
        let fallback = Self::from_config(config);
        Self {
            broker_ip: self.broker_ip.or(fallback.broker_ip),
            broker_port: self.broker_port.or(fallback.broker_port),
            robot_id: self.robot_id.or(fallback.robot_id),
            robot_port: self.robot_port.or(fallback.robot_port),
        }
    }
}

/// A local broker connected to a robot.
pub struct BrokerSession {
    broker: Arc<dyn Broker>,
    endpoint: Endpoint,
    proxies: ProxyCache,
    events: Mutex<Option<Arc<EventRelay>>>,
    closed: AtomicBool,
}

impl BrokerSession {
    /// Start a broker configured from `NAOUTIL_*` variables.
    ///
    /// Unset `options` fields take the robot, port and broker address from
    /// the environment, which also picks the discovery backend.
    pub fn create(
        middleware: Arc<dyn Middleware>,
        name: &str,
        options: BrokerOptions,
    ) -> Result<Self> {
        let config = NaoutilConfig::from_env()?;
        let backend = config.discovery_backend();
        Self::create_with(middleware, name, options.or_config(&config), backend.as_ref())
    }

    /// Start a broker using `backend` for discovery.
    pub fn create_with(
        middleware: Arc<dyn Middleware>,
        name: &str,
        options: BrokerOptions,
        backend: &dyn DiscoveryBackend,
    ) -> Result<Self> {
        let endpoint = resolve_endpoint(backend, options.robot_id.as_deref(), options.robot_port);
        let broker_ip = match options.broker_ip {
            Some(ip) => ip,
            None => local_ip_for(&endpoint.address)?.to_string(),
        };

        let spec = BrokerSpec {
            name: name.to_string(),
            broker_ip,
            broker_port: options.broker_port.unwrap_or(0),
            robot_ip: endpoint.address.clone(),
            robot_port: endpoint.port,
        };

        let broker = middleware.create_broker(&spec)?;
        log::info!("[Broker] Started {}", spec);

        Ok(Self {
            broker,
            endpoint,
            proxies: ProxyCache::new(middleware),
            events: Mutex::new(None),
            closed: AtomicBool::new(false),
        })
    }

    pub fn spec(&self) -> &BrokerSpec {
        self.broker.spec()
    }

    /// The robot endpoint this session joined.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn broker(&self) -> &Arc<dyn Broker> {
        &self.broker
    }

    pub fn proxies(&self) -> &ProxyCache {
        &self.proxies
    }

    /// Memoized proxy by service name or alias.
    pub fn proxy(&self, name: &str) -> Result<Arc<dyn ServiceProxy>> {
        self.proxies.get(name)
    }

    /// Event relay bound to this session's middleware.
    ///
    /// Fails once the session has been shut down.
    pub fn events(&self) -> Result<Arc<EventRelay>> {
        let mut slot = self.events.lock();
        // Checked under the lock so shutdown cannot race a new relay in.
        if self.is_closed() {
            return Err(Error::Middleware("session closed".into()));
        }
        if let Some(relay) = slot.as_ref() {
            return Ok(Arc::clone(relay));
        }
        let relay = EventRelay::shared(self.proxies.middleware())?;
        *slot = Some(Arc::clone(&relay));
        Ok(relay)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Shut the broker down. Later calls do nothing.
    pub fn shutdown(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        // Release subscriptions while the broker is still up.
        self.events.lock().take();
        self.broker.shutdown()?;
        log::info!("[Broker] Shut down '{}'", self.spec().name);
        Ok(())
    }
}

impl Drop for BrokerSession {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::warn!("[Broker] Shutdown of '{}' failed: {}", self.spec().name, e);
        }
    }
}

impl std::fmt::Debug for BrokerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerSession")
            .field("spec", self.spec())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Run `f` with a fresh session and shut it down afterwards.
pub fn with_session<T, F>(
    middleware: Arc<dyn Middleware>,
    name: &str,
    options: BrokerOptions,
    f: F,
) -> Result<T>
where
    F: FnOnce(&BrokerSession) -> Result<T>,
{
    let session = BrokerSession::create(middleware, name, options)?;
    run_scoped(session, f)
}

/// [`with_session`] with an explicit discovery backend.
pub fn with_session_using<T, F>(
    middleware: Arc<dyn Middleware>,
    name: &str,
    options: BrokerOptions,
    backend: &dyn DiscoveryBackend,
    f: F,
) -> Result<T>
where
    F: FnOnce(&BrokerSession) -> Result<T>,
{
    let session = BrokerSession::create_with(middleware, name, options, backend)?;
    run_scoped(session, f)
}

fn run_scoped<T, F>(session: BrokerSession, f: F) -> Result<T>
where
    F: FnOnce(&BrokerSession) -> Result<T>,
{
    let result = f(&session);
    let closed = session.shutdown();
    let value = result?;
    closed?;
    Ok(value)
}
