//! Error handling for the NovaDE core layer.
//!
//! The main error type is [`CoreError`], which wraps the more specific
//! [`ConfigError`] and [`LoggingError`].

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type shared by the configuration, logging and utility modules.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Errors related to configuration loading, parsing, or validation.
    #[error("Configuration Error: {0}")]
    Config(#[from] ConfigError),

    /// Errors raised while installing the global logger.
    #[error("Logging Error: {0}")]
    Logging(#[from] LoggingError),

    /// Filesystem operations (creating directories, reading files) that failed
    /// outside of configuration loading.
    #[error("Filesystem Error: {message} (Path: {path:?})")]
    Filesystem {
        message: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Error type for configuration-related operations.
///
/// Usually wrapped by [`CoreError::Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration file exists but could not be read.
    #[error("Failed to read configuration file from {path:?}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file is not valid TOML or does not match the schema.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Parsed values are out of range or inconsistent.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    /// An XDG base directory could not be determined (usually no HOME).
    #[error("Could not determine base directory for {dir_type}")]
    DirectoryUnavailable { dir_type: String },
}

/// Error type for logging setup.
#[derive(Error, Debug)]
pub enum LoggingError {
    /// The global subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    InitializationFailure(String),

    /// The configured level could not be turned into a filter.
    #[error("Failed to set log filter: {0}")]
    FilterError(String),

    /// An I/O error while preparing a log file.
    #[error("Logging I/O error: {0}")]
    IoError(#[from] io::Error),
}
