//! Login state machine states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Current login state.
///
/// The machine is cyclic: `Pending -> InProgress -> Succeeded`, a failure
/// drops `InProgress` back to `Pending`, and re-authentication moves
/// `Succeeded` back to `InProgress`. No transition is forbidden structurally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoginState {
    /// No session.
    #[default]
    Pending,
    /// Authentication underway.
    InProgress,
    /// Authenticated.
    Succeeded,
}

impl LoginState {
    /// Returns the wire name of this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginState::Pending => "pending",
            LoginState::InProgress => "in_progress",
            LoginState::Succeeded => "succeeded",
        }
    }

    /// Returns true if a session is established.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, LoginState::Succeeded)
    }
}

impl fmt::Display for LoginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
