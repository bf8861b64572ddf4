//! Engine configuration.
//!
//! Values are layered: built-in defaults, then an optional configuration
//! file, then `WAYPOINT_*` environment variables.

use crate::builder::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable prefix, e.g. `WAYPOINT_CASCADE_LIMIT=16`.
pub const ENV_PREFIX: &str = "WAYPOINT";

/// Default metadata key carrying the entity id.
pub const DEFAULT_IDENTITY_KEY: &str = "entity_id";

/// Runtime knobs for machines and the factory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum events processed by one `send`, including the first.
    pub cascade_limit: usize,

    /// Optional wall-clock budget for one `send`, in milliseconds.
    pub deadline_ms: Option<u64>,

    /// Metadata key the persistence interceptor reads the entity id from.
    pub identity_key: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cascade_limit: 64,
            deadline_ms: None,
            identity_key: DEFAULT_IDENTITY_KEY.to_string(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from an optional file and the environment.
    ///
    /// The file format is inferred from its extension (TOML, JSON, YAML...).
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigurationError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(true));
        }
        builder = builder.add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let config: EngineConfig = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ConfigurationError::InvalidConfig(e.to_string()))?;

        config.validate()?;
        tracing::debug!(?config, "engine configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.cascade_limit == 0 {
            return Err(ConfigurationError::InvalidConfig(
                "cascade_limit must be at least 1".to_string(),
            ));
        }
        if self.identity_key.trim().is_empty() {
            return Err(ConfigurationError::InvalidConfig(
                "identity_key must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }

    pub fn with_cascade_limit(mut self, limit: usize) -> Self {
        self.cascade_limit = limit;
        self
    }

    pub fn with_identity_key(mut self, key: impl Into<String>) -> Self {
        self.identity_key = key.into();
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline_ms = Some(u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX));
        self
    }
}
