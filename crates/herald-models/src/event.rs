//! Login event names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of events published by a login status holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoginEvent {
    /// Authentication started.
    Logging,
    /// Authentication succeeded.
    Success,
    /// Authentication failed.
    Fail,
    /// Any state transition.
    StatusChange,
}

impl LoginEvent {
    /// All events, in declaration order.
    pub const ALL: [LoginEvent; 4] = [
        LoginEvent::Logging,
        LoginEvent::Success,
        LoginEvent::Fail,
        LoginEvent::StatusChange,
    ];

    /// Returns the wire name of this event.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginEvent::Logging => "logging",
            LoginEvent::Success => "success",
            LoginEvent::Fail => "fail",
            LoginEvent::StatusChange => "status-change",
        }
    }
}

impl fmt::Display for LoginEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoginEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LoginEvent::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| format!("unknown login event: {}", s))
    }
}
