//! Scoped event registry and namespaced event bus for Herald.
//!
//! This crate provides synchronous, in-process pub/sub primitives:
//! - `EventTable` - ordered listener lists per event name, with group tags
//!   and one-shot records
//! - `EventRegistry` / `Scope` - owner-scoped tables kept behind
//!   `Arc<RwLock<T>>`, with owners tracked through `Weak` references
//! - `EventBus` - string-named events partitioned by namespace
//!
//! Dispatch snapshots the listener list, drops fired one-shot records, then
//! invokes every callback in registration order with panics caught and
//! logged.
//!
//! # Example
//!
//! ```
//! use herald_events::{BusNamespaces, Callback, EventBus, Target};
//!
//! let namespaces = BusNamespaces::<String>::new();
//! let bus = EventBus::new(&namespaces, "app").unwrap();
//!
//! let greet = Callback::new(|name: &String| println!("hello {}", name));
//! bus.on("greet", greet.clone(), Some("ui")).unwrap();
//! bus.once("greet", Callback::new(|_: &String| println!("first only")), None).unwrap();
//!
//! assert_eq!(bus.emit("greet", &"world".to_string()), 2);
//! assert_eq!(bus.emit("greet", &"again".to_string()), 1);
//!
//! bus.off("greet", Target::from(&greet)).unwrap();
//! assert_eq!(bus.listener_count("greet"), 0);
//! ```

pub mod bus;
pub mod error;
pub mod listener;
pub mod registry;
pub mod table;

pub use bus::{BusFactory, BusNamespaces, EventBus};
pub use error::{EventError, Result};
pub use listener::{
    dispatch, resolve_group, Callback, Listener, ListenerFn, Target, DEFAULT_GROUP, WILDCARD,
};
pub use registry::{EventRegistry, Scope};
pub use table::EventTable;
