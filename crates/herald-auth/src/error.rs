//! Error types for login status operations.

use herald_events::EventError;
use thiserror::Error;

/// Errors that can occur during login status operations.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Listener registry error.
    #[error("event error: {0}")]
    Events(#[from] EventError),

    /// Lock poisoned (thread panicked while holding lock).
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Result type alias for login status operations.
pub type Result<T> = std::result::Result<T, AuthError>;
