//! Status store configuration.

use herald_events::{resolve_group, DEFAULT_GROUP};
use tracing::warn;

use crate::error::Result;

/// Environment variable for the result history limit.
pub const HISTORY_LIMIT_ENV: &str = "HERALD_HISTORY_LIMIT";

/// Environment variable for the group used when none is given.
pub const DEFAULT_GROUP_ENV: &str = "HERALD_DEFAULT_GROUP";

/// Configuration for a [`StatusStore`](crate::StatusStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusConfig {
    /// How many login results are retained in the history.
    pub history_limit: usize,
    /// Group assigned to listeners registered without one.
    pub default_group: String,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            history_limit: 16,
            default_group: DEFAULT_GROUP.to_string(),
        }
    }
}

impl StatusConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a config from `HERALD_*` environment variables.
    ///
    /// Unset or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds a config from variables returned by `lookup`.
    fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(HISTORY_LIMIT_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(limit) => config.history_limit = limit,
                Err(e) => warn!("ignoring {}={:?}: {}", HISTORY_LIMIT_ENV, raw, e),
            }
        }

        if let Some(group) = lookup(DEFAULT_GROUP_ENV) {
            match resolve_group(Some(group.trim())) {
                Ok(group) => config.default_group = group,
                Err(e) => warn!("ignoring {}: {}", DEFAULT_GROUP_ENV, e),
            }
        }

        config
    }

    /// Sets the history limit.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Sets the default listener group.
    ///
    /// Fails with `InvalidArgument` for an empty group or `"*"`.
    pub fn with_default_group(mut self, group: impl AsRef<str>) -> Result<Self> {
        self.default_group = resolve_group(Some(group.as_ref()))?;
        Ok(self)
    }
}
