//! Namespaced event bus.
//!
//! [`BusNamespaces`] maps a namespace name to its own [`EventRegistry`], so
//! buses in different namespaces never share listener tables. Within a
//! namespace each bus is its own owner: clones of a bus share a table, two
//! separately created buses do not.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::error::{EventError, Result};
use crate::listener::{Callback, Target};
use crate::registry::{EventRegistry, Scope};

/// Shared map of namespace name to registry.
///
/// Clones share the same map; create one per application and hand it to
/// whatever needs a bus.
pub struct BusNamespaces<P> {
    registries: Arc<RwLock<HashMap<String, EventRegistry<String, P>>>>,
}

impl<P> Clone for BusNamespaces<P> {
    fn clone(&self) -> Self {
        Self {
            registries: Arc::clone(&self.registries),
        }
    }
}

impl<P> Default for BusNamespaces<P> {
    fn default() -> Self {
        Self {
            registries: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<P> BusNamespaces<P> {
    /// Creates an empty namespace map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the registry for `namespace`, creating it on first use.
    pub fn registry(&self, namespace: &str) -> Result<EventRegistry<String, P>> {
        if namespace.is_empty() {
            return Err(EventError::InvalidArgument(
                "namespace must not be empty".to_string(),
            ));
        }
        let mut registries = self
            .registries
            .write()
            .map_err(|e| EventError::LockPoisoned(e.to_string()))?;
        let registry = registries
            .entry(namespace.to_string())
            .or_insert_with(|| {
                debug!(namespace, "namespace created");
                EventRegistry::new()
            })
            .clone();
        Ok(registry)
    }

    /// Returns a factory producing buses in `namespace`.
    pub fn define(&self, namespace: impl Into<String>) -> Result<BusFactory<P>> {
        let namespace = namespace.into();
        let registry = self.registry(&namespace)?;
        Ok(BusFactory {
            namespace,
            registry,
        })
    }

    /// Number of live buses holding listeners in `namespace`.
    pub fn live_buses(&self, namespace: &str) -> usize {
        self.registries
            .read()
            .ok()
            .and_then(|registries| registries.get(namespace).map(EventRegistry::scope_count))
            .unwrap_or(0)
    }

    /// Names of all namespaces created so far, sorted.
    pub fn namespaces(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .registries
            .read()
            .map(|registries| registries.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }
}

/// Creates buses bound to one namespace.
pub struct BusFactory<P> {
    namespace: String,
    registry: EventRegistry<String, P>,
}

impl<P> Clone for BusFactory<P> {
    fn clone(&self) -> Self {
        Self {
            namespace: self.namespace.clone(),
            registry: self.registry.clone(),
        }
    }
}

impl<P> BusFactory<P> {
    /// Returns the namespace of the buses this factory creates.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Creates a new bus with its own listener table.
    pub fn create(&self) -> EventBus<P> {
        EventBus {
            namespace: self.namespace.clone(),
            scope: self.registry.scope(),
        }
    }
}

/// An event bus with string event names, partitioned by namespace.
pub struct EventBus<P> {
    namespace: String,
    scope: Scope<String, P>,
}

impl<P> Clone for EventBus<P> {
    fn clone(&self) -> Self {
        Self {
            namespace: self.namespace.clone(),
            scope: self.scope.clone(),
        }
    }
}

impl<P> EventBus<P> {
    /// Creates a bus in `namespace` of the given map.
    pub fn new(namespaces: &BusNamespaces<P>, namespace: impl Into<String>) -> Result<Self> {
        Ok(namespaces.define(namespace)?.create())
    }

    /// Returns the namespace of this bus.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Registers a persistent listener.
    pub fn on(&self, event: &str, callback: Callback<P>, group: Option<&str>) -> Result<()> {
        self.scope.on(event_name(event)?, callback, group)
    }

    /// Registers a one-shot listener.
    pub fn once(&self, event: &str, callback: Callback<P>, group: Option<&str>) -> Result<()> {
        self.scope.once(event_name(event)?, callback, group)
    }

    /// Removes listeners of `event` selected by `target`.
    ///
    /// `"*"` as target clears `event` across all groups.
    pub fn off(&self, event: &str, target: impl Into<Target<P>>) -> Result<usize> {
        self.scope.off(&event.to_string(), target)
    }

    /// Removes every listener of every event on this bus.
    pub fn clear(&self) -> Result<usize> {
        self.scope.clear()
    }

    /// Invokes this bus's listeners for `event` in registration order.
    pub fn emit(&self, event: &str, payload: &P) -> usize {
        self.scope.emit(&event.to_string(), payload)
    }

    /// Number of listeners registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.scope.listener_count(&event.to_string())
    }

    /// Drops this bus's listener table.
    pub fn dispose(self) {
        self.scope.dispose()
    }
}

fn event_name(event: &str) -> Result<String> {
    if event.is_empty() {
        return Err(EventError::InvalidArgument(
            "event name must not be empty".to_string(),
        ));
    }
    Ok(event.to_string())
}
