//! Login status state machine for Herald.
//!
//! This crate layers a small cyclic state machine on top of the
//! `herald-events` registry:
//! - `StatusStore` - shared state, last result and result history, plus the
//!   listener registry; `StatusStore::global()` is the process singleton
//! - `LoginStatus` - a holder with its own listener table over a store
//!
//! ```text
//! Pending --logging()--> InProgress --success(v)--> Succeeded
//!    ^                        |                          |
//!    +------ fail(e) ---------+                          |
//!    ^---------------------- logging() again -------------+
//! ```
//!
//! Late subscribers to `logging` or `success` are called immediately when the
//! state has already been reached. Failures are edge-triggered only.

pub mod config;
pub mod error;
pub mod holder;
pub mod store;

pub use config::{StatusConfig, DEFAULT_GROUP_ENV, HISTORY_LIMIT_ENV};
pub use error::{AuthError, Result};
pub use holder::LoginStatus;
pub use store::{LoginRegistry, StatusStore};
