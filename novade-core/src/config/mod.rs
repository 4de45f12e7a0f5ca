//! Configuration Management.
//!
//! - [`types`]: the schema ([`CoreConfig`], [`LoggingConfig`], [`ServiceConfig`],
//!   [`PrefsConfig`]).
//! - [`defaults`]: default values used when a file or field is missing.
//! - [`loader`]: [`ConfigLoader`], which reads the system and user files,
//!   merges them and validates the result.
//!
//! ```rust,ignore
//! use novade_core::config::ConfigLoader;
//!
//! match ConfigLoader::load() {
//!     Ok(config) => println!("idle timeout: {}s", config.service.idle_timeout_secs),
//!     Err(e) => {
//!         novade_core::logging::init_minimal_logging();
//!         tracing::error!("Configuration error: {}", e);
//!     }
//! }
//! ```

pub mod defaults;
pub mod types;
pub mod loader;

pub use types::{CoreConfig, LoggingConfig, PrefsConfig, ServiceConfig};
pub use loader::ConfigLoader;
