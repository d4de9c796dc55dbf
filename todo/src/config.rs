//! Configuration management for the todo application.
//!
//! Loads configuration from environment variables with sensible defaults.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `TODO_TEXT_POLICY` | `accept` |
//! | `TODO_LOG_LEVEL` | `info` |
//! | `TODO_BROADCAST_CAPACITY` | `16` |
//! | `TODO_MAX_DISPATCH_DEPTH` | `32` |

use crate::policy::TextPolicy;
use composable_store_runtime::StoreConfig;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Errors raised while reading configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A variable was set to something unusable
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        /// Variable name
        key: &'static str,
        /// Value found
        value: String,
        /// What was wrong with it
        reason: String,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Handling of new todo text
    pub text_policy: TextPolicy,
    /// Log level used when `RUST_LOG` is not set (trace, debug, info, warn, error)
    pub log_level: String,
    /// Capacity of the event broadcast channel
    pub broadcast_capacity: usize,
    /// Limit on nested dispatches in the store
    pub max_dispatch_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        let store = StoreConfig::default();
        Self {
            text_policy: TextPolicy::default(),
            log_level: "info".to_string(),
            broadcast_capacity: store.broadcast_capacity,
            max_dispatch_depth: store.max_dispatch_depth,
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable is set but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let text_policy = match lookup("TODO_TEXT_POLICY") {
            Some(value) => value.parse::<TextPolicy>().map_err(|error| {
                ConfigError::Invalid {
                    key: "TODO_TEXT_POLICY",
                    reason: error.to_string(),
                    value,
                }
            })?,
            None => defaults.text_policy,
        };

        let log_level = lookup("TODO_LOG_LEVEL").unwrap_or(defaults.log_level);

        let broadcast_capacity =
            parse_positive(&lookup, "TODO_BROADCAST_CAPACITY", defaults.broadcast_capacity)?;
        let max_dispatch_depth =
            parse_positive(&lookup, "TODO_MAX_DISPATCH_DEPTH", defaults.max_dispatch_depth)?;

        Ok(Self {
            text_policy,
            log_level,
            broadcast_capacity,
            max_dispatch_depth,
        })
    }

    /// Runtime configuration for the store
    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::default()
            .with_broadcast_capacity(self.broadcast_capacity)
            .with_max_dispatch_depth(self.max_dispatch_depth)
    }
}

fn parse_positive<F>(lookup: &F, key: &'static str, default: usize) -> Result<usize, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(key) else {
        return Ok(default);
    };

    match value.trim().parse::<usize>() {
        Ok(0) => Err(ConfigError::Invalid {
            key,
            value,
            reason: "must be greater than zero".to_string(),
        }),
        Ok(parsed) => Ok(parsed),
        Err(error) => Err(ConfigError::Invalid {
            key,
            reason: error.to_string(),
            value,
        }),
    }
}
