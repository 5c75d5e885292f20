//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode between reading the config and
//! writing the report, so `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: signalling_core::config::ConfigError,
    },

    /// An experiment or comparison failed.
    #[error("experiment error: {source}")]
    Experiment {
        /// The underlying experiment error.
        #[from]
        source: signalling_core::experiment::ExperimentError,
    },

    /// The report could not be written.
    #[error("report error: {source}")]
    Report {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}
