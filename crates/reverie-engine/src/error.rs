//! Binary-level error type for the Reverie engine.

use reverie_core::config::ConfigError;
use reverie_core::runner::RunnerError;

/// Errors that can occur while starting or running the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration could not be loaded.
    #[error("config error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },

    /// The tick log file could not be opened.
    #[error("tick log error: {source}")]
    TickLog {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The simulation loop failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: RunnerError,
    },
}
