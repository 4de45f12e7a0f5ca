//! Configuration data structures.
//!
//! These structs are populated by deserializing TOML. Missing fields take the
//! values from [`super::defaults`]; unknown fields are rejected.

use serde::Deserialize;
use std::path::PathBuf;
use super::defaults;

/// Settings for the logging subsystem.
///
/// ```
/// use novade_core::config::LoggingConfig;
/// use std::path::PathBuf;
///
/// let log_config: LoggingConfig = toml::from_str(r#"
/// level = "debug"
/// file_path = "/var/log/novade-extensions.log"
/// "#).unwrap();
/// assert_eq!(log_config.level, "debug");
/// assert_eq!(log_config.file_path, Some(PathBuf::from("/var/log/novade-extensions.log")));
/// assert_eq!(log_config.format, "text");
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// One of "trace", "debug", "info", "warn", "error" (case-insensitive).
    #[serde(default = "defaults::default_log_level")]
    pub level: String,
    /// Optional log file. Relative paths are resolved against the app state directory.
    #[serde(default = "defaults::default_log_file_path")]
    pub file_path: Option<PathBuf>,
    /// "text" or "json".
    #[serde(default = "defaults::default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::default_log_level(),
            file_path: defaults::default_log_file_path(),
            format: defaults::default_log_format(),
        }
    }
}

/// Bus names and lifetime settings of the extensions service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Well-known name requested on the session bus.
    #[serde(default = "defaults::default_bus_name")]
    pub bus_name: String,
    /// Object path the extensions interface is served at.
    #[serde(default = "defaults::default_object_path")]
    pub object_path: String,
    /// Well-known name of the shell that owns the real extension state.
    #[serde(default = "defaults::default_upstream_bus_name")]
    pub upstream_bus_name: String,
    /// Object path of the shell's extensions interface.
    #[serde(default = "defaults::default_upstream_object_path")]
    pub upstream_object_path: String,
    /// Seconds without calls or holds before the service exits.
    #[serde(default = "defaults::default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    /// Never exit on idle.
    #[serde(default)]
    pub persist: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bus_name: defaults::default_bus_name(),
            object_path: defaults::default_object_path(),
            upstream_bus_name: defaults::default_upstream_bus_name(),
            upstream_object_path: defaults::default_upstream_object_path(),
            idle_timeout_secs: defaults::default_idle_timeout_secs(),
            persist: false,
        }
    }
}

/// How the preferences dialog is launched.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrefsConfig {
    /// Executable of the preferences viewer.
    #[serde(default = "defaults::default_prefs_command")]
    pub command: String,
    /// Arguments placed before the generated ones.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Default for PrefsConfig {
    fn default() -> Self {
        Self {
            command: defaults::default_prefs_command(),
            extra_args: Vec::new(),
        }
    }
}

/// Root configuration structure.
///
/// ```
/// use novade_core::config::CoreConfig;
///
/// let config: CoreConfig = toml::from_str(r#"
/// [service]
/// idle_timeout_secs = 10
/// "#).unwrap();
/// assert_eq!(config.service.idle_timeout_secs, 10);
/// assert_eq!(config.service.bus_name, "org.gnome.Shell.Extensions");
/// assert_eq!(config.logging.level, "info");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoreConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub prefs: PrefsConfig,
}
