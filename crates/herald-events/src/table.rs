//! Per-owner listener table.
//!
//! A plain data structure with no locking; the registry wraps it.

use std::collections::HashMap;
use std::hash::Hash;

use crate::listener::{Callback, Listener, Target};

/// Event name to ordered listener list.
#[derive(Debug)]
pub struct EventTable<E, P> {
    events: HashMap<E, Vec<Listener<P>>>,
    next_id: u64,
}

impl<E, P> Default for EventTable<E, P> {
    fn default() -> Self {
        Self {
            events: HashMap::new(),
            next_id: 1,
        }
    }
}

impl<E: Eq + Hash, P> EventTable<E, P> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a listener and returns its registration id.
    pub fn add(&mut self, event: E, callback: Callback<P>, group: String, once: bool) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.events.entry(event).or_default().push(Listener {
            id,
            group,
            callback,
            once,
        });
        id
    }

    /// Removes the listeners of `event` selected by `target` and returns how
    /// many went. Other events are never touched.
    pub fn remove(&mut self, event: &E, target: &Target<P>) -> usize {
        let Some(listeners) = self.events.get_mut(event) else {
            return 0;
        };
        let before = listeners.len();
        listeners.retain(|listener| !target.matches(listener));
        let removed = before - listeners.len();
        if listeners.is_empty() {
            self.events.remove(event);
        }
        removed
    }

    /// Removes every listener of every event and returns how many went.
    pub fn clear(&mut self) -> usize {
        let removed = self.total();
        self.events.clear();
        removed
    }

    /// Takes the dispatch snapshot for `event`.
    ///
    /// Returns the callbacks in registration order and drops the one-shot
    /// records from the live list, so they are gone before any of them runs.
    pub fn take_snapshot(&mut self, event: &E) -> Vec<Callback<P>> {
        let Some(listeners) = self.events.get_mut(event) else {
            return Vec::new();
        };
        let snapshot = listeners
            .iter()
            .map(|listener| listener.callback.clone())
            .collect();
        listeners.retain(|listener| !listener.once);
        if listeners.is_empty() {
            self.events.remove(event);
        }
        snapshot
    }

    /// Returns the listeners registered for `event`.
    pub fn listeners(&self, event: &E) -> &[Listener<P>] {
        self.events.get(event).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of listeners registered for `event`.
    pub fn len(&self, event: &E) -> usize {
        self.listeners(event).len()
    }

    /// Returns true if no listener is registered for any event.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Total number of listeners across all events.
    pub fn total(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }
}
