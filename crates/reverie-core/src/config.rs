//! Configuration loading and typed config structures.
//!
//! The canonical configuration lives in `reverie-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror
//! the YAML structure and provides a loader that reads and validates the
//! file. Every field has a default, so a missing file or a partial file
//! is always usable.

use std::path::Path;

use reverie_sigils::SigilConfig;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
///
/// Mirrors the structure of `reverie-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EngineConfig {
    /// World-level settings (name, seed, timing).
    #[serde(default)]
    pub world: WorldConfig,

    /// SCUP and reflective-loop settings.
    #[serde(default)]
    pub scup: ScupConfig,

    /// Sigil lifecycle settings.
    #[serde(default)]
    pub sigils: SigilConfig,

    /// Event bus settings.
    #[serde(default)]
    pub events: EventsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// The `REVERIE_TICK_LOG` environment variable overrides
    /// `logging.tick_log_path` so deployments can redirect the tick log
    /// without editing the file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.logging.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.logging.apply_env_overrides();
        Ok(config)
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducible subsystem noise.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Real-time milliseconds per tick.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Milliseconds a subsystem may spend in `tick()` before it is
    /// treated as failed for that tick.
    #[serde(default = "default_subsystem_timeout_ms")]
    pub subsystem_timeout_ms: u64,

    /// Maximum number of ticks before the run ends (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            tick_interval_ms: default_tick_interval_ms(),
            subsystem_timeout_ms: default_subsystem_timeout_ms(),
            max_ticks: 0,
        }
    }
}

/// SCUP and reflective-loop configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScupConfig {
    /// Urgency fed to the SCUP calculation every tick.
    #[serde(default = "default_baseline_urgency")]
    pub baseline_urgency: f64,

    /// SCUP below which the reflective loop pauses.
    #[serde(default = "default_pause_threshold")]
    pub pause_threshold: f64,

    /// Ticks the reflective loop stays paused once triggered.
    #[serde(default = "default_pause_cooldown_ticks")]
    pub pause_cooldown_ticks: u64,
}

impl Default for ScupConfig {
    fn default() -> Self {
        Self {
            baseline_urgency: default_baseline_urgency(),
            pause_threshold: default_pause_threshold(),
            pause_cooldown_ticks: default_pause_cooldown_ticks(),
        }
    }
}

/// Event bus configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventsConfig {
    /// Maximum number of events retained in the bus history.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Path of the append-only `tick,scup,zone` log.
    #[serde(default = "default_tick_log_path")]
    pub tick_log_path: String,
}

impl LoggingConfig {
    /// Override the tick log path from the environment when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("REVERIE_TICK_LOG") {
            self.tick_log_path = val;
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            tick_log_path: default_tick_log_path(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "Reverie".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_tick_interval_ms() -> u64 {
    1000
}

const fn default_subsystem_timeout_ms() -> u64 {
    250
}

const fn default_baseline_urgency() -> f64 {
    0.5
}

const fn default_pause_threshold() -> f64 {
    0.3
}

const fn default_pause_cooldown_ticks() -> u64 {
    10
}

const fn default_history_limit() -> usize {
    1000
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_tick_log_path() -> String {
    "logs/tick_zone.csv".to_owned()
}
