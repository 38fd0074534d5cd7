//! EventRegistry - owner-scoped listener tables.
//!
//! The registry is a side table mapping an owner to its [`EventTable`]. Each
//! [`Scope`] owns an `Arc` key and the registry only keeps a `Weak` to it, so
//! dropping every handle of a scope lets its table be pruned on the next
//! registry access. [`Scope::dispose`] removes it immediately.
//!
//! Locks are never held while a listener runs: dispatch snapshots the
//! callbacks under the write lock, releases it, then invokes them. Listeners
//! may therefore call `on`/`off`/`emit` re-entrantly.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

use tracing::{debug, warn};

use crate::error::{EventError, Result};
use crate::listener::{dispatch, resolve_group, Callback, Target};
use crate::table::EventTable;

/// Identity of a scope. Only its address and id matter.
#[derive(Debug)]
struct OwnerKey {
    id: u64,
}

struct ScopeEntry<E, P> {
    owner: Weak<OwnerKey>,
    table: EventTable<E, P>,
}

impl<E, P> ScopeEntry<E, P> {
    fn is_live(&self) -> bool {
        self.owner.strong_count() > 0
    }
}

/// Internal state of the registry.
struct RegistryState<E, P> {
    /// Tables by owner id; ids are allocated in creation order.
    scopes: BTreeMap<u64, ScopeEntry<E, P>>,
}

impl<E, P> RegistryState<E, P> {
    fn prune(&mut self) -> usize {
        let before = self.scopes.len();
        self.scopes.retain(|_, entry| entry.is_live());
        before - self.scopes.len()
    }
}

/// Thread-safe registry of owner-scoped listener tables.
///
/// Cloning is cheap and clones share the same tables.
pub struct EventRegistry<E, P> {
    state: Arc<RwLock<RegistryState<E, P>>>,
    next_owner: Arc<AtomicU64>,
}

impl<E, P> Clone for EventRegistry<E, P> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            next_owner: Arc::clone(&self.next_owner),
        }
    }
}

impl<E, P> Default for EventRegistry<E, P> {
    fn default() -> Self {
        Self {
            state: Arc::new(RwLock::new(RegistryState {
                scopes: BTreeMap::new(),
            })),
            next_owner: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl<E, P> EventRegistry<E, P>
where
    E: Eq + Hash + Clone + Debug,
{
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new owner with its own, initially empty, listener table.
    ///
    /// The table is allocated lazily on first registration.
    pub fn scope(&self) -> Scope<E, P> {
        let id = self.next_owner.fetch_add(1, Ordering::Relaxed);
        Scope {
            registry: self.clone(),
            owner: Arc::new(OwnerKey { id }),
        }
    }

    /// Emits `event` to every live scope, in scope creation order.
    ///
    /// All snapshots are taken under one lock before any listener runs.
    /// Returns the number of listeners invoked.
    pub fn emit_all(&self, event: &E, payload: &P) -> usize {
        let callbacks: Vec<Callback<P>> = {
            let mut state = match self.state.write() {
                Ok(state) => state,
                Err(e) => {
                    warn!(event = ?event, "emit skipped: {}", e);
                    return 0;
                }
            };
            state.prune();
            state
                .scopes
                .values_mut()
                .flat_map(|entry| entry.table.take_snapshot(event))
                .collect()
        };
        dispatch(event, &callbacks, payload)
    }

    /// Drops tables whose owner is gone and returns how many were dropped.
    pub fn prune(&self) -> usize {
        match self.state.write() {
            Ok(mut state) => state.prune(),
            Err(_) => 0,
        }
    }

    /// Number of scopes holding a table whose owner is still alive.
    pub fn scope_count(&self) -> usize {
        self.state
            .read()
            .map(|state| state.scopes.values().filter(|entry| entry.is_live()).count())
            .unwrap_or(0)
    }

    fn with_table<T>(
        &self,
        owner: &Arc<OwnerKey>,
        f: impl FnOnce(&mut EventTable<E, P>) -> T,
    ) -> Result<T> {
        let mut state = self
            .state
            .write()
            .map_err(|e| EventError::LockPoisoned(e.to_string()))?;
        state.prune();
        let entry = state.scopes.entry(owner.id).or_insert_with(|| ScopeEntry {
            owner: Arc::downgrade(owner),
            table: EventTable::new(),
        });
        Ok(f(&mut entry.table))
    }
}

/// One owner's view of an [`EventRegistry`].
///
/// Clones share the owner and therefore the listener table.
pub struct Scope<E, P> {
    registry: EventRegistry<E, P>,
    owner: Arc<OwnerKey>,
}

impl<E, P> Clone for Scope<E, P> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            owner: Arc::clone(&self.owner),
        }
    }
}

impl<E, P> Scope<E, P>
where
    E: Eq + Hash + Clone + Debug,
{
    /// Returns the owner id of this scope.
    pub fn id(&self) -> u64 {
        self.owner.id
    }

    /// Returns the registry this scope belongs to.
    pub fn registry(&self) -> &EventRegistry<E, P> {
        &self.registry
    }

    /// Registers a persistent listener. Never fires immediately.
    pub fn on(&self, event: E, callback: Callback<P>, group: Option<&str>) -> Result<()> {
        self.add(event, callback, group, false)
    }

    /// Registers a listener that is removed after its first dispatch.
    pub fn once(&self, event: E, callback: Callback<P>, group: Option<&str>) -> Result<()> {
        self.add(event, callback, group, true)
    }

    fn add(&self, event: E, callback: Callback<P>, group: Option<&str>, once: bool) -> Result<()> {
        let group = resolve_group(group)?;
        debug!(scope = self.owner.id, event = ?event, group = %group, once, "listener added");
        self.registry
            .with_table(&self.owner, |table| table.add(event, callback, group, once))?;
        Ok(())
    }

    /// Removes listeners of `event` selected by `target`.
    ///
    /// Returns the number of records removed.
    pub fn off(&self, event: &E, target: impl Into<Target<P>>) -> Result<usize> {
        let target = target.into();
        let removed = self
            .registry
            .with_table(&self.owner, |table| table.remove(event, &target))?;
        debug!(scope = self.owner.id, event = ?event, removed, "listeners removed");
        Ok(removed)
    }

    /// Removes every listener of every event in this scope.
    ///
    /// The scope stays registered and may be used again. Returns the number
    /// of records removed.
    pub fn clear(&self) -> Result<usize> {
        let removed = self.registry.with_table(&self.owner, |table| table.clear())?;
        debug!(scope = self.owner.id, removed, "scope cleared");
        Ok(removed)
    }

    /// Invokes this scope's listeners for `event` in registration order.
    ///
    /// Fired one-shot listeners are dropped before the first callback runs.
    /// A panicking listener is logged and skipped. Returns the number of
    /// listeners invoked.
    pub fn emit(&self, event: &E, payload: &P) -> usize {
        let callbacks = match self
            .registry
            .with_table(&self.owner, |table| table.take_snapshot(event))
        {
            Ok(callbacks) => callbacks,
            Err(e) => {
                warn!(scope = self.owner.id, event = ?event, "emit skipped: {}", e);
                return 0;
            }
        };
        dispatch(event, &callbacks, payload)
    }

    /// Number of listeners registered for `event`.
    pub fn listener_count(&self, event: &E) -> usize {
        self.registry
            .state
            .read()
            .ok()
            .and_then(|state| {
                state
                    .scopes
                    .get(&self.owner.id)
                    .map(|entry| entry.table.len(event))
            })
            .unwrap_or(0)
    }

    /// Returns true if no listener is registered for any event.
    pub fn is_empty(&self) -> bool {
        self.registry
            .state
            .read()
            .ok()
            .and_then(|state| {
                state
                    .scopes
                    .get(&self.owner.id)
                    .map(|entry| entry.table.is_empty())
            })
            .unwrap_or(true)
    }

    /// Drops this scope's listener table now.
    ///
    /// Other clones of the scope see an empty table afterwards and may
    /// register again.
    pub fn dispose(self) {
        if let Ok(mut state) = self.registry.state.write() {
            state.scopes.remove(&self.owner.id);
        }
        debug!(scope = self.owner.id, "scope disposed");
    }
}
