// crates/tracker-client/src/config.rs

//! Client configuration, loaded from a TOML file.
//!
//! The file is optional; every field has a default.
//!
//! ```toml
//! server_addr = "203.0.113.5:9000"
//! password = "secret"
//! poll_interval_ms = 250
//! trail_darken = 0.3
//! dot = "●"
//!
//! [world_bounds]
//! min_x = -1000.0
//! max_x = 1000.0
//! min_y = -1000.0
//! max_y = 1000.0
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracker_protocol::{CodecError, WorldBounds};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl From<CodecError> for ConfigError {
    fn from(e: CodecError) -> Self {
        ConfigError::ValidationError(e.to_string())
    }
}

/// Configuration for the tracker client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    pub server_addr: String,
    pub password: String,
    pub world_bounds: WorldBounds,
    /// How often the clipboard is checked for a new position.
    pub poll_interval_ms: u64,
    /// How much older trail points are darkened, 0.0..=1.0.
    pub trail_darken: f64,
    /// Marker drawn for each trail point.
    pub dot: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:9000".to_string(),
            password: String::new(),
            world_bounds: WorldBounds {
                min_x: -1000.0,
                max_x: 1000.0,
                min_y: -1000.0,
                max_y: 1000.0,
            },
            poll_interval_ms: 250,
            trail_darken: 0.3,
            dot: "●".to_string(),
        }
    }
}

impl ClientConfig {
    /// Load from `path`, or defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.world_bounds.validate()?;

        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.trail_darken) {
            return Err(ConfigError::ValidationError(format!(
                "trail_darken must be within 0.0..=1.0, got {}",
                self.trail_darken
            )));
        }
        if self.dot.chars().count() != 1 {
            return Err(ConfigError::ValidationError(format!(
                "dot must be a single character, got {:?}",
                self.dot
            )));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
