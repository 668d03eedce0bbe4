// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Robot environment.
//!
//! [`NaoEnvironment`] is what behaviour code passes around instead of loose
//! proxies and loggers: one value giving access to services, resources and a
//! log sink.

use crate::config::NaoutilConfig;
use crate::i18n::{self, DEFAULT_LANGUAGE};
use crate::properties::PropertyCache;
use crate::proxy::ProxyCache;
use crate::sdk::{Middleware, ServiceProxy, Value};
use crate::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Environment variable naming the resources directory.
pub const RESOURCES_ENV: &str = "NAOUTIL_RESOURCES";

/// Directory used when nothing else names one.
pub const DEFAULT_RESOURCES_DIR: &str = "resources";

/// Where environment messages go.
pub trait EnvLog: Send + Sync {
    fn log(&self, msg: &str);
}

/// Sends messages to the `log` crate at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl EnvLog for TracingLog {
    fn log(&self, msg: &str) {
        log::info!(target: "naoutil::env", "{}", msg);
    }
}

impl<F> EnvLog for F
where
    F: Fn(&str) + Send + Sync,
{
    fn log(&self, msg: &str) {
        self(msg)
    }
}

/// Services, resources and logging for robot code.
pub struct NaoEnvironment {
    log: Arc<dyn EnvLog>,
    proxies: ProxyCache,
    resources_dir: PathBuf,
    properties: Arc<PropertyCache>,
}

impl NaoEnvironment {
    /// Environment with default logging and resources lookup.
    pub fn new(middleware: Arc<dyn Middleware>) -> Self {
        Self::from_parts(
            Arc::new(TracingLog),
            ProxyCache::new(middleware),
            default_resources_dir(None),
        )
    }

    /// Environment seeded with existing proxies.
    pub fn with_proxies(
        middleware: Arc<dyn Middleware>,
        proxies: HashMap<String, Arc<dyn ServiceProxy>>,
    ) -> Result<Self> {
        Ok(Self::from_parts(
            Arc::new(TracingLog),
            ProxyCache::with_proxies(middleware, proxies)?,
            default_resources_dir(None),
        ))
    }

    /// Environment using the configured resources directory.
    pub fn from_config(middleware: Arc<dyn Middleware>, config: &NaoutilConfig) -> Self {
        Self::from_parts(
            Arc::new(TracingLog),
            ProxyCache::new(middleware),
            default_resources_dir(config.resources_dir.as_deref()),
        )
    }

    fn from_parts(log: Arc<dyn EnvLog>, proxies: ProxyCache, resources_dir: PathBuf) -> Self {
        Self {
            log,
            proxies,
            resources_dir,
            properties: Arc::new(PropertyCache::new()),
        }
    }

    pub fn with_log(mut self, log: Arc<dyn EnvLog>) -> Self {
        self.log = log;
        self
    }

    pub fn with_resources_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resources_dir = dir.into();
        self
    }

    pub fn with_property_cache(mut self, cache: Arc<PropertyCache>) -> Self {
        self.properties = cache;
        self
    }

    pub fn log(&self, msg: &str) {
        self.log.log(msg);
    }

    /// Proxy by service name or alias (`tts`, `motion`, `memory`, ...).
    pub fn proxy(&self, name: &str) -> Result<Arc<dyn ServiceProxy>> {
        self.proxies.get(name)
    }

    pub fn memory(&self) -> Result<Arc<dyn ServiceProxy>> {
        self.proxies.memory()
    }

    pub fn motion(&self) -> Result<Arc<dyn ServiceProxy>> {
        self.proxies.motion()
    }

    pub fn tts(&self) -> Result<Arc<dyn ServiceProxy>> {
        self.proxies.tts()
    }

    pub fn proxies(&self) -> &ProxyCache {
        &self.proxies
    }

    pub fn resources_dir(&self) -> &Path {
        &self.resources_dir
    }

    /// Non-localized property `key` from set `base`.
    pub fn get_property(&self, base: &str, key: &str) -> Result<Option<Value>> {
        self.properties.get_property(&self.resources_dir, base, key)
    }

    /// [`get_property`](Self::get_property) falling back to `default`.
    pub fn get_property_or(
        &self,
        base: &str,
        key: &str,
        default: impl Into<Value>,
    ) -> Result<Value> {
        Ok(self.get_property(base, key)?.unwrap_or_else(|| default.into()))
    }

    /// Language code of the robot's current voice, `en` if unknown.
    pub fn current_language(&self) -> Result<String> {
        let reply = self.tts()?.call("getLanguage", &[])?;
        let name = reply.as_str().unwrap_or_default();
        Ok(match i18n::language_to_code(name) {
            Some(code) => code.to_string(),
            None => {
                log::debug!(
                    "[I18n] Unknown language '{}', using '{}'",
                    name,
                    DEFAULT_LANGUAGE
                );
                DEFAULT_LANGUAGE.to_string()
            }
        })
    }

    /// Property `key` of `base` in the current language.
    pub fn localized_text(&self, base: &str, key: &str) -> Result<Option<Value>> {
        let lang = self.current_language()?;
        i18n::get_property_in(&self.properties, &self.resources_dir, base, &lang, key)
    }

    /// Text options of `base` in the current language.
    pub fn localized_options(
        &self,
        base: &str,
        key: Option<&str>,
        separator: &str,
    ) -> Result<Vec<String>> {
        let lang = self.current_language()?;
        i18n::read_text_options_in(
            &self.properties,
            &self.resources_dir,
            base,
            &lang,
            key,
            separator,
        )
    }
}

impl std::fmt::Debug for NaoEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NaoEnvironment")
            .field("resources_dir", &self.resources_dir)
            .field("proxies", &self.proxies.len())
            .finish()
    }
}

/// Explicit directory, else `$NAOUTIL_RESOURCES`, else `./resources`.
pub fn default_resources_dir(explicit: Option<&Path>) -> PathBuf {
    resources_dir_from(explicit, std::env::var_os(RESOURCES_ENV).map(PathBuf::from))
}

fn resources_dir_from(explicit: Option<&Path>, from_env: Option<PathBuf>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or(from_env)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_RESOURCES_DIR))
}
