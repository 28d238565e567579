//! Error types for thermo-schedule

use thiserror::Error;

/// Errors surfaced by the fallible edges of the crate (config loading, JSON
/// transport, host lookups). Parsing, normalization, validation and
/// coordinate math never fail; they recover or clamp instead.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ConfigError(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Unknown day key: {0}")]
    UnknownDay(String),

    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    #[error("Unknown transition: {0}")]
    UnknownTransition(String),
}
