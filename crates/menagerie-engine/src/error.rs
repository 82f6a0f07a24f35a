//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode during startup and the frame
//! loop so `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Simulation configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: menagerie_core::ConfigError,
    },

    /// The `host` section of the config file was invalid.
    #[error("host config error: {message}")]
    HostConfig {
        /// Description of the problem.
        message: String,
    },

    /// Opening the replay file or installing the signal handler failed.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
