// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Lazily created, memoized service proxies.
//!
//! ```rust,ignore
//! let proxies = ProxyCache::new(middleware);
//! proxies.get("tts")?.call("say", &["Hello".into()])?;
//! // Same proxy object as above
//! let tts = proxies.get("ALTextToSpeech")?;
//! ```

use crate::sdk::{Middleware, ServiceProxy};
use crate::{Error, Result};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;

/// Short capability names and the service each stands for.
pub const ALIASES: &[(&str, &str)] = &[
    ("memory", "ALMemory"),
    ("motion", "ALMotion"),
    ("tts", "ALTextToSpeech"),
    ("leds", "ALLeds"),
    ("audio", "ALAudioDevice"),
    ("player", "ALAudioPlayer"),
    ("posture", "ALRobotPosture"),
    ("sonar", "ALSonar"),
    ("video", "ALVideoDevice"),
    ("behavior", "ALBehaviorManager"),
    ("speech_recognition", "ALSpeechRecognition"),
    ("navigation", "ALNavigation"),
    ("battery", "ALBattery"),
    ("life", "ALAutonomousLife"),
];

/// Full service name for a capability name or alias.
pub fn service_name(name: &str) -> Result<&str> {
    if name.starts_with("AL") {
        return Ok(name);
    }
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, service)| *service)
        .ok_or_else(|| Error::UnknownCapability(name.to_string()))
}

/// One proxy per service, created on first use.
pub struct ProxyCache {
    middleware: Arc<dyn Middleware>,
    proxies: DashMap<String, Arc<dyn ServiceProxy>>,
}

impl ProxyCache {
    pub fn new(middleware: Arc<dyn Middleware>) -> Self {
        Self {
            middleware,
            proxies: DashMap::new(),
        }
    }

    /// Seed the cache with existing proxies, keyed by name or alias.
    pub fn with_proxies(
        middleware: Arc<dyn Middleware>,
        proxies: HashMap<String, Arc<dyn ServiceProxy>>,
    ) -> Result<Self> {
        let cache = Self::new(middleware);
        for (name, proxy) in proxies {
            cache.proxies.insert(service_name(&name)?.to_string(), proxy);
        }
        Ok(cache)
    }

    /// Proxy for `name` (service name or alias).
    pub fn get(&self, name: &str) -> Result<Arc<dyn ServiceProxy>> {
        let service = service_name(name)?;
        if let Some(proxy) = self.proxies.get(service) {
            return Ok(Arc::clone(proxy.value()));
        }

        // Two racing callers may both create a proxy; the first insert wins.
        let proxy = self.middleware.create_proxy(service)?;
        log::debug!("[Proxy] Created proxy for {}", service);
        let entry = self.proxies.entry(service.to_string()).or_insert(proxy);
        Ok(Arc::clone(entry.value()))
    }

    pub fn memory(&self) -> Result<Arc<dyn ServiceProxy>> {
        self.get("memory")
    }

    pub fn motion(&self) -> Result<Arc<dyn ServiceProxy>> {
        self.get("motion")
    }

    pub fn tts(&self) -> Result<Arc<dyn ServiceProxy>> {
        self.get("tts")
    }

    /// True if a proxy for `name` already exists.
    pub fn contains(&self, name: &str) -> bool {
        service_name(name).is_ok_and(|s| self.proxies.contains_key(s))
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    pub fn middleware(&self) -> &Arc<dyn Middleware> {
        &self.middleware
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeMiddleware;

    #[test]
    fn test_service_name() {
        assert_eq!(service_name("tts").unwrap(), "ALTextToSpeech");
        assert_eq!(service_name("ALMotion").unwrap(), "ALMotion");
        assert_eq!(service_name("ALCustomThing").unwrap(), "ALCustomThing");
        assert!(matches!(
            service_name("foo"),
            Err(Error::UnknownCapability(name)) if name == "foo"
        ));
    }

    #[test]
    fn test_alias_and_full_name_share_slot() {
        let middleware = Arc::new(FakeMiddleware::new());
        let cache = ProxyCache::new(middleware.clone());

        let a = cache.get("tts").unwrap();
        let b = cache.get("ALTextToSpeech").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(middleware.proxies_created(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_named_accessors() {
        let middleware = Arc::new(FakeMiddleware::new());
        let cache = ProxyCache::new(middleware);
        assert_eq!(cache.memory().unwrap().service_name(), "ALMemory");
        assert_eq!(cache.motion().unwrap().service_name(), "ALMotion");
        assert_eq!(cache.tts().unwrap().service_name(), "ALTextToSpeech");
        assert!(cache.contains("memory"));
        assert!(!cache.contains("leds"));
    }

    #[test]
    fn test_seeded_proxies_are_used() {
        let middleware = Arc::new(FakeMiddleware::new());
        let seed = middleware.create_proxy("ALMemory").unwrap();
        let mut proxies = HashMap::new();
        proxies.insert("memory".to_string(), Arc::clone(&seed));

        let cache = ProxyCache::with_proxies(middleware.clone(), proxies).unwrap();
        assert!(Arc::ptr_eq(&cache.get("ALMemory").unwrap(), &seed));
        assert_eq!(middleware.proxies_created(), 1);
    }

    #[test]
    fn test_unknown_alias_creates_nothing() {
        let middleware = Arc::new(FakeMiddleware::new());
        let cache = ProxyCache::new(middleware.clone());
        assert!(cache.get("foo").is_err());
        assert_eq!(middleware.proxies_created(), 0);
    }
}
