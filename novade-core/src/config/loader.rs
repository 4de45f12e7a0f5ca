//! Configuration loading.
//!
//! [`ConfigLoader::load`] reads two optional TOML files:
//!
//! 1. the system file, `/etc/novade/extensions.toml`, or the path in
//!    `NOVADE_EXTENSIONS_SYSTEM_CONFIG` when that variable is set;
//! 2. the user file, `extensions.toml` in the application config directory.
//!
//! User tables are merged into system tables key by key. Missing or empty files
//! are skipped. The merged document is deserialized into [`CoreConfig`] and then
//! validated: log level and format are normalized, relative log paths are
//! resolved against the application state directory, and the idle timeout must
//! be positive. Setting `NOVADE_EXTENSIONS_PERSIST=1` forces `service.persist`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use toml::{Table, Value};

use crate::config::CoreConfig;
use crate::error::{ConfigError, CoreError};
use crate::utils::fs as nova_fs;
use crate::utils::paths::{get_app_config_dir, get_app_state_dir};

/// Default location of the system-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/novade/extensions.toml";
/// Overrides [`SYSTEM_CONFIG_PATH`].
pub const SYSTEM_CONFIG_ENV: &str = "NOVADE_EXTENSIONS_SYSTEM_CONFIG";
/// When set to `1`, the service never exits on idle.
pub const PERSIST_ENV: &str = "NOVADE_EXTENSIONS_PERSIST";
/// File name of the user configuration inside the app config directory.
pub const USER_CONFIG_FILE: &str = "extensions.toml";

/// Namespace for configuration loading.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads, merges and validates the configuration from the standard locations.
    pub fn load() -> Result<CoreConfig, CoreError> {
        let system_path = env::var_os(SYSTEM_CONFIG_ENV)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(SYSTEM_CONFIG_PATH));
        let user_path = get_app_config_dir()?.join(USER_CONFIG_FILE);

        let mut config = Self::load_from_paths(&system_path, &user_path)?;
        Self::apply_persist_override(&mut config, env::var(PERSIST_ENV).ok().as_deref());
        Ok(config)
    }

    /// Loads the two given files (either may be absent) and validates the result.
    pub fn load_from_paths(system_path: &Path, user_path: &Path) -> Result<CoreConfig, CoreError> {
        let system_table = Self::read_table(system_path)?;
        let user_table = Self::read_table(user_path)?;

        let mut config = match Self::merge_tables(system_table, user_table) {
            Some(table) => Value::Table(table)
                .try_into::<CoreConfig>()
                .map_err(ConfigError::ParseError)?,
            None => CoreConfig::default(),
        };

        Self::validate_config(&mut config)?;
        Ok(config)
    }

    fn read_table(path: &Path) -> Result<Option<Table>, CoreError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No configuration file at {:?}", path);
                return Ok(None);
            }
            Err(e) => {
                return Err(ConfigError::ReadError { path: path.to_path_buf(), source: e }.into());
            }
        };

        if content.trim().is_empty() {
            return Ok(None);
        }
        let table = toml::from_str::<Table>(&content).map_err(ConfigError::ParseError)?;
        Ok(Some(table))
    }

    /// Merges two optional tables; `override_table` wins on conflicts.
    fn merge_tables(base: Option<Table>, override_table: Option<Table>) -> Option<Table> {
        match (base, override_table) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(mut b), Some(o)) => {
                Self::merge_into(&mut b, &o);
                Some(b)
            }
        }
    }

    fn merge_into(base: &mut Table, override_table: &Table) {
        for (key, override_item) in override_table {
            match base.get_mut(key) {
                Some(Value::Table(base_sub)) if override_item.is_table() => {
                    if let Value::Table(override_sub) = override_item {
                        Self::merge_into(base_sub, override_sub);
                    }
                }
                Some(base_item) => *base_item = override_item.clone(),
                None => {
                    base.insert(key.clone(), override_item.clone());
                }
            }
        }
    }

    fn apply_persist_override(config: &mut CoreConfig, persist_var: Option<&str>) {
        if persist_var == Some("1") {
            config.service.persist = true;
        }
    }

    fn validate_config(config: &mut CoreConfig) -> Result<(), CoreError> {
        let level_lower = config.logging.level.to_lowercase();
        match level_lower.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => config.logging.level = level_lower,
            _ => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level: '{}'. Must be one of trace, debug, info, warn, error.",
                    config.logging.level
                ))
                .into());
            }
        }

        let format_lower = config.logging.format.to_lowercase();
        match format_lower.as_str() {
            "text" | "json" => config.logging.format = format_lower,
            _ => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log format: '{}'. Must be one of text, json.",
                    config.logging.format
                ))
                .into());
            }
        }

        if config.service.idle_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "service.idle_timeout_secs must be greater than 0.".to_string(),
            )
            .into());
        }

        for (field, value) in [
            ("service.bus_name", &config.service.bus_name),
            ("service.upstream_bus_name", &config.service.upstream_bus_name),
            ("prefs.command", &config.prefs.command),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!("{} must not be empty.", field)).into());
            }
        }

        for (field, value) in [
            ("service.object_path", &config.service.object_path),
            ("service.upstream_object_path", &config.service.upstream_object_path),
        ] {
            if !value.starts_with('/') {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be an absolute object path, got '{}'.",
                    field, value
                ))
                .into());
            }
        }

        if let Some(path) = config.logging.file_path.take() {
            let resolved = if path.is_absolute() { path } else { get_app_state_dir()?.join(path) };
            if let Some(parent) = resolved.parent() {
                nova_fs::ensure_dir_exists(parent)?;
            }
            config.logging.file_path = Some(resolved);
        }

        Ok(())
    }
}
