//! Core runtime configuration.
//!
//! # Responsibility
//! - Describe the knobs the composition root needs: store location, logging
//!   and delete semantics.
//! - Parse them from TOML. Environment parsing stays with the host.
//!
//! # Invariants
//! - Unknown keys are rejected instead of silently ignored.
//! - Every field has a default, so an empty document is valid.

use crate::logging::default_log_level;
use crate::notify::DEFAULT_CHANNEL_CAPACITY;
use crate::service::DeletePolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config `{}`: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// SQLite file; `None` keeps the store in memory.
    pub database_path: Option<PathBuf>,
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` disables file logs.
    pub log_dir: Option<PathBuf>,
    pub delete_policy: DeletePolicy,
    /// Per-subscriber buffer of the in-process event bus.
    pub event_channel_capacity: usize,
    pub event_sink: EventSink,
}

/// Where a host sends domain events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSink {
    /// In-process `tokio::sync::broadcast` bus.
    #[default]
    Broadcast,
    /// One JSON log line per event.
    Log,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
            delete_policy: DeletePolicy::default(),
            event_channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            event_sink: EventSink::default(),
        }
    }
}

impl CoreConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}
