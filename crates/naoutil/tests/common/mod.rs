// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Recording middleware shared by the integration tests.

#![allow(dead_code)]

use naoutil::{Broker, BrokerSpec, Error, Middleware, ModuleHandler, Result, ServiceProxy, Value};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

pub fn resources_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/resources")
}

pub struct RecordingBroker {
    spec: BrokerSpec,
    pub shutdowns: AtomicUsize,
}

impl RecordingBroker {
    pub fn shutdown_called(&self) -> bool {
        self.shutdowns.load(Ordering::SeqCst) > 0
    }
}

impl Broker for RecordingBroker {
    fn spec(&self) -> &BrokerSpec {
        &self.spec
    }

    fn shutdown(&self) -> Result<()> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// data name -> (module, callback method, message)
type Subscriptions = HashMap<String, (String, String, String)>;

#[derive(Default)]
struct State {
    modules: HashMap<String, Arc<dyn ModuleHandler>>,
    events: Subscriptions,
    micro_events: Subscriptions,
    data: HashMap<String, Value>,
}

struct RecordingProxy {
    service: String,
    state: Arc<Mutex<State>>,
    language: String,
}

impl ServiceProxy for RecordingProxy {
    fn service_name(&self) -> &str {
        &self.service
    }

    fn call(&self, method: &str, args: &[Value]) -> Result<Value> {
        let arg = |i: usize| {
            args.get(i)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let mut state = self.state.lock();
        match (self.service.as_str(), method) {
            ("ALMemory", "subscribeToEvent") => {
                state.events.insert(arg(0), (arg(1), arg(2), String::new()));
            }
            ("ALMemory", "unsubscribeToEvent") => {
                state.events.remove(&arg(0));
            }
            ("ALMemory", "subscribeToMicroEvent") => {
                state.micro_events.insert(arg(0), (arg(1), arg(3), arg(2)));
            }
            ("ALMemory", "unsubscribeToMicroEvent") => {
                state.micro_events.remove(&arg(0));
            }
            ("ALMemory", "insertData") => {
                state
                    .data
                    .insert(arg(0), args.get(1).cloned().unwrap_or(Value::Null));
            }
            ("ALMemory", "getData") => {
                return Ok(state.data.get(&arg(0)).cloned().unwrap_or(Value::Null));
            }
            ("ALTextToSpeech", "getLanguage") => return Ok(Value::from(self.language.as_str())),
            _ => {}
        }
        Ok(Value::Null)
    }
}

pub struct RecordingMiddleware {
    state: Arc<Mutex<State>>,
    brokers: Mutex<Vec<Arc<RecordingBroker>>>,
    proxies: Mutex<Vec<String>>,
    language: String,
    refuse_brokers: AtomicBool,
}

impl RecordingMiddleware {
    pub fn new() -> Arc<Self> {
        Self::speaking("English")
    }

    pub fn speaking(language: &str) -> Arc<Self> {
        Arc::new(Self {
            state: Arc::new(Mutex::new(State::default())),
            brokers: Mutex::new(Vec::new()),
            proxies: Mutex::new(Vec::new()),
            language: language.to_string(),
            refuse_brokers: AtomicBool::new(false),
        })
    }

    pub fn refuse_brokers(&self) {
        self.refuse_brokers.store(true, Ordering::SeqCst);
    }

    pub fn last_broker(&self) -> Arc<RecordingBroker> {
        self.brokers
            .lock()
            .last()
            .cloned()
            .expect("a broker was created")
    }

    pub fn broker_count(&self) -> usize {
        self.brokers.lock().len()
    }

    pub fn proxies_created(&self) -> Vec<String> {
        self.proxies.lock().clone()
    }

    pub fn has_module(&self, name: &str) -> bool {
        self.state.lock().modules.contains_key(name)
    }

    pub fn raise_event(&self, name: &str, value: Value) {
        let target = self.state.lock().events.get(name).cloned();
        self.deliver(name, value, target);
    }

    pub fn raise_micro_event(&self, name: &str, value: Value) {
        let target = self.state.lock().micro_events.get(name).cloned();
        self.deliver(name, value, target);
    }

    fn deliver(&self, name: &str, value: Value, target: Option<(String, String, String)>) {
        let Some((module, method, message)) = target else {
            return;
        };
        let handler = self.state.lock().modules.get(&module).cloned();
        if let Some(handler) = handler {
            handler
                .invoke(&method, &[Value::from(name), value, Value::from(message)])
                .expect("callback succeeds");
        }
    }
}

impl Middleware for RecordingMiddleware {
    fn create_broker(&self, spec: &BrokerSpec) -> Result<Arc<dyn Broker>> {
        if self.refuse_brokers.load(Ordering::SeqCst) {
            return Err(Error::Middleware(format!("cannot start {}", spec.name)));
        }
        let broker = Arc::new(RecordingBroker {
            spec: spec.clone(),
            shutdowns: AtomicUsize::new(0),
        });
        self.brokers.lock().push(Arc::clone(&broker));
        Ok(broker)
    }

    fn create_proxy(&self, service: &str) -> Result<Arc<dyn ServiceProxy>> {
        self.proxies.lock().push(service.to_string());
        Ok(Arc::new(RecordingProxy {
            service: service.to_string(),
            state: Arc::clone(&self.state),
            language: self.language.clone(),
        }))
    }

    fn register_module(&self, name: &str, handler: Arc<dyn ModuleHandler>) -> Result<()> {
        self.state.lock().modules.insert(name.to_string(), handler);
        Ok(())
    }

    fn unregister_module(&self, name: &str) -> Result<()> {
        self.state.lock().modules.remove(name);
        Ok(())
    }
}
