// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-process middleware used by unit tests.

use crate::sdk::{Broker, BrokerSpec, Middleware, ModuleHandler, ServiceProxy, Value};
use crate::{Error, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub(crate) struct FakeBroker {
    spec: BrokerSpec,
    pub(crate) shutdowns: AtomicUsize,
}

impl Broker for FakeBroker {
    fn spec(&self) -> &BrokerSpec {
        &self.spec
    }

    fn shutdown(&self) -> Result<()> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct Shared {
    modules: HashMap<String, Arc<dyn ModuleHandler>>,
    /// data name -> (module, callback, message)
    events: HashMap<String, (String, String, String)>,
    micro_events: HashMap<String, (String, String, String)>,
    calls: Vec<(String, String, Vec<Value>)>,
}

pub(crate) struct FakeProxy {
    service: String,
    shared: Arc<Mutex<Shared>>,
    language: String,
}

impl ServiceProxy for FakeProxy {
    fn service_name(&self) -> &str {
        &self.service
    }

    fn call(&self, method: &str, args: &[Value]) -> Result<Value> {
        let arg = |i: usize| -> String {
            args.get(i)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        let mut shared = self.shared.lock();
        shared
            .calls
            .push((self.service.clone(), method.to_string(), args.to_vec()));

        match (self.service.as_str(), method) {
            ("ALMemory", "subscribeToEvent") => {
                shared
                    .events
                    .insert(arg(0), (arg(1), arg(2), String::new()));
            }
            ("ALMemory", "unsubscribeToEvent") => {
                shared.events.remove(&arg(0));
            }
            ("ALMemory", "subscribeToMicroEvent") => {
                shared
                    .micro_events
                    .insert(arg(0), (arg(1), arg(3), arg(2)));
            }
            ("ALMemory", "unsubscribeToMicroEvent") => {
                shared.micro_events.remove(&arg(0));
            }
            ("ALTextToSpeech", "getLanguage") => return Ok(Value::from(self.language.clone())),
            _ => {}
        }
        Ok(Value::Null)
    }
}

pub(crate) struct FakeMiddleware {
    shared: Arc<Mutex<Shared>>,
    brokers: Mutex<Vec<Arc<FakeBroker>>>,
    proxies_created: AtomicUsize,
    language: String,
}

impl FakeMiddleware {
    pub(crate) fn new() -> Self {
        Self::with_language("English")
    }

    pub(crate) fn with_language(language: &str) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared::default())),
            brokers: Mutex::new(Vec::new()),
            proxies_created: AtomicUsize::new(0),
            language: language.to_string(),
        }
    }

    pub(crate) fn has_module(&self, name: &str) -> bool {
        self.shared.lock().modules.contains_key(name)
    }

    pub(crate) fn brokers(&self) -> Vec<Arc<FakeBroker>> {
        self.brokers.lock().clone()
    }

    pub(crate) fn proxies_created(&self) -> usize {
        self.proxies_created.load(Ordering::SeqCst)
    }

    pub(crate) fn calls(&self) -> Vec<(String, String, Vec<Value>)> {
        self.shared.lock().calls.clone()
    }

    pub(crate) fn raise_event(&self, name: &str, value: Value) {
        let target = self.shared.lock().events.get(name).cloned();
        self.dispatch(name, value, target);
    }

    pub(crate) fn raise_micro_event(&self, name: &str, value: Value) {
        let target = self.shared.lock().micro_events.get(name).cloned();
        self.dispatch(name, value, target);
    }

    fn dispatch(&self, name: &str, value: Value, target: Option<(String, String, String)>) {
        let Some((module, callback, message)) = target else {
            return;
        };
        let handler = self.shared.lock().modules.get(&module).cloned();
        if let Some(handler) = handler {
            handler
                .invoke(
                    &callback,
                    &[Value::from(name), value, Value::from(message)],
                )
                .expect("callback");
        }
    }
}

impl Middleware for FakeMiddleware {
    fn create_broker(&self, spec: &BrokerSpec) -> Result<Arc<dyn Broker>> {
        let broker = Arc::new(FakeBroker {
            spec: spec.clone(),
            shutdowns: AtomicUsize::new(0),
        });
        self.brokers.lock().push(Arc::clone(&broker));
        Ok(broker)
    }

    fn create_proxy(&self, service: &str) -> Result<Arc<dyn ServiceProxy>> {
        if !service.starts_with("AL") {
            return Err(Error::Middleware(format!("no such service {}", service)));
        }
        self.proxies_created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(FakeProxy {
            service: service.to_string(),
            shared: Arc::clone(&self.shared),
            language: self.language.clone(),
        }))
    }

    fn register_module(&self, name: &str, handler: Arc<dyn ModuleHandler>) -> Result<()> {
        self.shared.lock().modules.insert(name.to_string(), handler);
        Ok(())
    }

    fn unregister_module(&self, name: &str) -> Result<()> {
        self.shared.lock().modules.remove(name);
        Ok(())
    }
}
