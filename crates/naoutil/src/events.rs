// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Memory event relay.
//!
//! The robot's memory service delivers events by calling a named method on a
//! registered module. [`EventRelay`] owns one such module per middleware
//! connection and fans the calls out to plain Rust closures:
//!
//! ```text
//! ALMemory --onEvent(name, value, msg)--> SubscriberModule --> user callback
//! ```
//!
//! ```rust,ignore
//! let relay = EventRelay::shared(&middleware)?;
//! relay.subscribe_to_event("FrontTactilTouched", |name, value, _msg| {
//!     println!("{} = {}", name, value);
//! })?;
//! ```

use crate::module::{middleware_key, Module};
use crate::sdk::{Middleware, ModuleHandler, ServiceProxy, Value};
use crate::{Error, Result};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, Weak};

/// Method the memory service calls for events.
pub const EVENT_CALLBACK: &str = "onEvent";

/// Method the memory service calls for micro-events.
pub const MICRO_EVENT_CALLBACK: &str = "onMicroEvent";

/// User callback: `(data_name, value, message)`.
pub type EventCallback = Arc<dyn Fn(&str, &Value, &str) + Send + Sync>;

/// Relays are shared per middleware instance, keyed by its address.
static SHARED: OnceLock<Mutex<HashMap<usize, Weak<EventRelay>>>> = OnceLock::new();

/// Module handler receiving memory callbacks.
#[derive(Default)]
struct SubscriberModule {
    events: DashMap<String, EventCallback>,
    micro_events: DashMap<String, EventCallback>,
}

impl SubscriberModule {
    fn dispatch(table: &DashMap<String, EventCallback>, args: &[Value]) -> Result<Value> {
        let name = args
            .first()
            .and_then(Value::as_str)
            .ok_or_else(|| Error::InvalidArgument("event name must be a string".into()))?;
        let value = args.get(1).unwrap_or(&Value::Null);
        let message = args.get(2).and_then(Value::as_str).unwrap_or_default();

        // Callbacks may unsubscribe; never call them under the map lock.
        let callback = table.get(name).map(|cb| Arc::clone(cb.value()));
        match callback {
            Some(cb) => cb(name, value, message),
            None => log::debug!("[Events] No callback for '{}', ignored", name),
        }
        Ok(Value::Null)
    }
}

impl ModuleHandler for SubscriberModule {
    fn invoke(&self, method: &str, args: &[Value]) -> Result<Value> {
        match method {
            EVENT_CALLBACK => Self::dispatch(&self.events, args),
            MICRO_EVENT_CALLBACK => Self::dispatch(&self.micro_events, args),
            other => Err(Error::InvalidArgument(format!(
                "unknown callback method '{}'",
                other
            ))),
        }
    }
}

/// Maps memory events to user callbacks.
pub struct EventRelay {
    subscriber: Arc<SubscriberModule>,
    memory: Arc<dyn ServiceProxy>,
    module: Module,
}

impl EventRelay {
    /// Create a relay with its own module registration.
    pub fn new(middleware: Arc<dyn Middleware>) -> Result<Self> {
        let memory = middleware.create_proxy("ALMemory")?;
        Self::with_memory(middleware, memory)
    }

    /// Create a relay on an existing memory proxy.
    pub fn with_memory(
        middleware: Arc<dyn Middleware>,
        memory: Arc<dyn ServiceProxy>,
    ) -> Result<Self> {
        let subscriber = Arc::new(SubscriberModule::default());
        let module = Module::register(middleware, None, Arc::clone(&subscriber))?;
        Ok(Self {
            subscriber,
            memory,
            module,
        })
    }

    /// The live relay for `middleware`, created on first use.
    ///
    /// The relay is released once the last returned handle is dropped.
    pub fn shared(middleware: &Arc<dyn Middleware>) -> Result<Arc<Self>> {
        let key = middleware_key(middleware);
        let mut relays = SHARED.get_or_init(|| Mutex::new(HashMap::new())).lock();
        relays.retain(|_, relay| relay.strong_count() > 0);

        if let Some(relay) = relays.get(&key).and_then(Weak::upgrade) {
            return Ok(relay);
        }

        let relay = Arc::new(Self::new(Arc::clone(middleware))?);
        relays.insert(key, Arc::downgrade(&relay));
        Ok(relay)
    }

    /// Module name the memory service calls back into.
    pub fn module_name(&self) -> &str {
        self.module.name()
    }

    pub fn subscribe_to_event<F>(&self, data_name: &str, callback: F) -> Result<()>
    where
        F: Fn(&str, &Value, &str) + Send + Sync + 'static,
    {
        self.subscriber
            .events
            .insert(data_name.to_string(), Arc::new(callback));
        let result = self.memory.call(
            "subscribeToEvent",
            &[
                Value::from(data_name),
                Value::from(self.module_name()),
                Value::from(EVENT_CALLBACK),
            ],
        );
        if let Err(e) = result {
            self.subscriber.events.remove(data_name);
            return Err(e);
        }
        log::debug!("[Events] Subscribed to event '{}'", data_name);
        Ok(())
    }

    /// Does nothing if `data_name` was not subscribed.
    pub fn unsubscribe_to_event(&self, data_name: &str) -> Result<()> {
        if !self.subscriber.events.contains_key(data_name) {
            return Ok(());
        }
        self.memory.call(
            "unsubscribeToEvent",
            &[Value::from(data_name), Value::from(self.module_name())],
        )?;
        self.subscriber.events.remove(data_name);
        log::debug!("[Events] Unsubscribed from event '{}'", data_name);
        Ok(())
    }

    pub fn subscribe_to_micro_event<F>(
        &self,
        data_name: &str,
        callback: F,
        message: &str,
    ) -> Result<()>
    where
        F: Fn(&str, &Value, &str) + Send + Sync + 'static,
    {
        self.subscriber
            .micro_events
            .insert(data_name.to_string(), Arc::new(callback));
        let result = self.memory.call(
            "subscribeToMicroEvent",
            &[
                Value::from(data_name),
                Value::from(self.module_name()),
                Value::from(message),
                Value::from(MICRO_EVENT_CALLBACK),
            ],
        );
        if let Err(e) = result {
            self.subscriber.micro_events.remove(data_name);
            return Err(e);
        }
        log::debug!("[Events] Subscribed to micro-event '{}'", data_name);
        Ok(())
    }

    /// Does nothing if `data_name` was not subscribed.
    pub fn unsubscribe_to_micro_event(&self, data_name: &str) -> Result<()> {
        if !self.subscriber.micro_events.contains_key(data_name) {
            return Ok(());
        }
        self.memory.call(
            "unsubscribeToMicroEvent",
            &[Value::from(data_name), Value::from(self.module_name())],
        )?;
        self.subscriber.micro_events.remove(data_name);
        log::debug!("[Events] Unsubscribed from micro-event '{}'", data_name);
        Ok(())
    }

    /// Currently subscribed event names, sorted.
    pub fn subscribed_events(&self) -> Vec<String> {
        sorted_keys(&self.subscriber.events)
    }

    /// Currently subscribed micro-event names, sorted.
    pub fn subscribed_micro_events(&self) -> Vec<String> {
        sorted_keys(&self.subscriber.micro_events)
    }
}

fn sorted_keys(table: &DashMap<String, EventCallback>) -> Vec<String> {
    let mut names: Vec<String> = table.iter().map(|e| e.key().clone()).collect();
    names.sort();
    names
}

impl Drop for EventRelay {
    fn drop(&mut self) {
        for name in self.subscribed_events() {
            if let Err(e) = self.unsubscribe_to_event(&name) {
                log::warn!("[Events] Failed to unsubscribe '{}' on drop: {}", name, e);
            }
        }
        for name in self.subscribed_micro_events() {
            if let Err(e) = self.unsubscribe_to_micro_event(&name) {
                log::warn!("[Events] Failed to unsubscribe '{}' on drop: {}", name, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeMiddleware;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn middleware() -> (Arc<FakeMiddleware>, Arc<dyn Middleware>) {
        let fake = Arc::new(FakeMiddleware::new());
        let dynamic: Arc<dyn Middleware> = fake.clone();
        (fake, dynamic)
    }

    #[test]
    fn test_module_name_derived_from_type() {
        let (fake, mw) = middleware();
        let relay = EventRelay::new(mw).unwrap();
        assert_eq!(relay.module_name(), "naoutil_events_SubscriberModule");
        assert!(fake.has_module("naoutil_events_SubscriberModule"));
    }

    #[test]
    fn test_unknown_method_rejected() {
        let subscriber = SubscriberModule::default();
        assert!(matches!(
            subscriber.invoke("onSomething", &[]),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            subscriber.invoke(EVENT_CALLBACK, &[Value::from(1)]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_unsubscribe_unknown_is_noop() {
        let (fake, mw) = middleware();
        let relay = EventRelay::new(mw).unwrap();
        relay.unsubscribe_to_event("nothing").unwrap();
        relay.unsubscribe_to_micro_event("nothing").unwrap();
        assert!(fake
            .calls()
            .iter()
            .all(|(_, method, _)| !method.starts_with("unsubscribe")));
    }

    #[test]
    fn test_callback_may_unsubscribe_itself() {
        let (fake, mw) = middleware();
        let relay = EventRelay::shared(&mw).unwrap();
        let hits = Arc::new(AtomicUsize::new(0));

        let weak = Arc::downgrade(&relay);
        let counter = Arc::clone(&hits);
        relay
            .subscribe_to_event("once", move |name, _, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                if let Some(relay) = weak.upgrade() {
                    relay.unsubscribe_to_event(name).unwrap();
                }
            })
            .unwrap();

        fake.raise_event("once", Value::from(1));
        fake.raise_event("once", Value::from(2));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(relay.subscribed_events().is_empty());
    }

    #[test]
    fn test_shared_relay_is_reused_and_released() {
        let (fake, mw) = middleware();
        let a = EventRelay::shared(&mw).unwrap();
        let b = EventRelay::shared(&mw).unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let name = a.module_name().to_string();
        drop(a);
        drop(b);
        assert!(!fake.has_module(&name));
    }

    #[test]
    fn test_drop_unsubscribes_everything() {
        let (fake, mw) = middleware();
        let relay = EventRelay::new(mw).unwrap();
        relay.subscribe_to_event("a", |_, _, _| {}).unwrap();
        relay.subscribe_to_micro_event("b", |_, _, _| {}, "msg").unwrap();
        drop(relay);

        let methods: Vec<String> = fake.calls().into_iter().map(|(_, m, _)| m).collect();
        assert!(methods.contains(&"unsubscribeToEvent".to_string()));
        assert!(methods.contains(&"unsubscribeToMicroEvent".to_string()));
    }
}
