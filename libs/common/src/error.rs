//! Custom error types for the common library
//!
//! This module defines the error types raised by the persistence store and the
//! configuration loader.

use thiserror::Error;

/// Custom error type for key/value store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing file could not be read or written
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored document could not be encoded or decoded
    #[error("Store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store was configured with an unusable location
    #[error("Store configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with StoreError
pub type StoreResult<T> = Result<T, StoreError>;

/// Error raised while assembling the client configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A source could not be read or a value had the wrong type
    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),

    /// A value was read but is not acceptable
    #[error("Invalid configuration value for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Type alias for Result with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;
