// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Module registration.
//!
//! A module is an object the robot can call back into. [`Module`] registers
//! a [`ModuleHandler`] with the middleware, names it after its Rust type when
//! no name is given, and keeps it in a process-wide registry so callbacks can
//! be routed by name. Dropping the [`Module`] unregisters it.

use crate::naming::module_name_for;
use crate::sdk::{Middleware, ModuleHandler};
use crate::Result;
use dashmap::DashMap;
use std::sync::{Arc, OnceLock};

/// Live modules keyed by (middleware address, module name).
static REGISTRY: OnceLock<DashMap<(usize, String), Arc<dyn ModuleHandler>>> = OnceLock::new();

fn registry() -> &'static DashMap<(usize, String), Arc<dyn ModuleHandler>> {
    REGISTRY.get_or_init(DashMap::new)
}

fn same_handler(a: &Arc<dyn ModuleHandler>, b: &Arc<dyn ModuleHandler>) -> bool {
    std::ptr::eq(Arc::as_ptr(a).cast::<()>(), Arc::as_ptr(b).cast::<()>())
}

/// Identity of a middleware instance.
pub(crate) fn middleware_key(middleware: &Arc<dyn Middleware>) -> usize {
    Arc::as_ptr(middleware).cast::<()>() as usize
}

/// A handler registered with the middleware.
pub struct Module {
    name: String,
    middleware: Arc<dyn Middleware>,
    handler: Arc<dyn ModuleHandler>,
}

impl Module {
    /// Register `handler` under `name`, or under a name derived from `H`.
    pub fn register<H>(
        middleware: Arc<dyn Middleware>,
        name: Option<&str>,
        handler: Arc<H>,
    ) -> Result<Self>
    where
        H: ModuleHandler + 'static,
    {
        let name = name.map_or_else(module_name_for::<H>, str::to_string);
        let handler: Arc<dyn ModuleHandler> = handler;

        middleware.register_module(&name, Arc::clone(&handler))?;
        let key = (middleware_key(&middleware), name.clone());
        if registry().insert(key, Arc::clone(&handler)).is_some() {
            log::debug!("[Module] '{}' replaced an existing registration", name);
        }
        log::debug!("[Module] Registered '{}'", name);

        Ok(Self {
            name,
            middleware,
            handler,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handler(&self) -> &Arc<dyn ModuleHandler> {
        &self.handler
    }

    /// Find a live module by name on any middleware.
    pub fn lookup(name: &str) -> Option<Arc<dyn ModuleHandler>> {
        registry()
            .iter()
            .find(|e| e.key().1 == name)
            .map(|e| Arc::clone(e.value()))
    }

    /// Find the module `name` registered with `middleware`.
    pub fn lookup_in(
        middleware: &Arc<dyn Middleware>,
        name: &str,
    ) -> Option<Arc<dyn ModuleHandler>> {
        registry()
            .get(&(middleware_key(middleware), name.to_string()))
            .map(|h| Arc::clone(h.value()))
    }

    /// Names of all live modules, sorted and deduplicated.
    pub fn registered_names() -> Vec<String> {
        let mut names: Vec<String> = registry().iter().map(|e| e.key().1.clone()).collect();
        names.sort();
        names.dedup();
        names
    }
}

impl Drop for Module {
    fn drop(&mut self) {
        let key = (middleware_key(&self.middleware), self.name.clone());
        let current = registry()
            .remove_if(&key, |_, h| same_handler(h, &self.handler))
            .is_some();
        if !current {
            // A newer registration owns the name on this middleware.
            log::debug!("[Module] '{}' was replaced, leaving it registered", self.name);
            return;
        }
        if let Err(e) = self.middleware.unregister_module(&self.name) {
            log::warn!("[Module] Failed to unregister '{}': {}", self.name, e);
        } else {
            log::debug!("[Module] Unregistered '{}'", self.name);
        }
    }
}

impl std::fmt::Debug for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Module").field("name", &self.name).finish()
    }
}
