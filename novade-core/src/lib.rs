//! # NovaDE Core Library (`novade-core`)
//!
//! Foundational pieces shared by the NovaDE extensions service:
//!
//! - **Error Handling**: [`CoreError`] with the more specific [`ConfigError`] and
//!   [`LoggingError`].
//! - **Configuration Management**: TOML-based loading of [`CoreConfig`] through
//!   [`ConfigLoader`], merging a system-wide file with the user's file.
//! - **Logging**: a `tracing` subscriber configured from [`LoggingConfig`], with an
//!   optional rolling log file.
//! - **Utilities**: XDG path resolution and small filesystem helpers.
//!
//! ```rust,ignore
//! use novade_core::config::ConfigLoader;
//! use novade_core::logging::init_logging;
//!
//! fn main() -> Result<(), novade_core::CoreError> {
//!     let config = ConfigLoader::load()?;
//!     init_logging(&config.logging, false)?;
//!     tracing::info!("bus name: {}", config.service.bus_name);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod config;
pub mod logging;
pub mod utils;

pub use error::{CoreError, ConfigError, LoggingError};
pub use config::{ConfigLoader, CoreConfig, LoggingConfig, PrefsConfig, ServiceConfig};
pub use logging::{init_logging, init_minimal_logging};
