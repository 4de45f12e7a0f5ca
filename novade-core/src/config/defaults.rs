//! Default configuration values, referenced from `#[serde(default = ...)]`.

use std::path::PathBuf;

pub(super) fn default_log_level() -> String {
    "info".to_string()
}

pub(super) fn default_log_file_path() -> Option<PathBuf> {
    None
}

pub(super) fn default_log_format() -> String {
    "text".to_string()
}

pub(super) fn default_bus_name() -> String {
    "org.gnome.Shell.Extensions".to_string()
}

pub(super) fn default_object_path() -> String {
    "/org/gnome/Shell/Extensions".to_string()
}

pub(super) fn default_upstream_bus_name() -> String {
    "org.gnome.Shell".to_string()
}

pub(super) fn default_upstream_object_path() -> String {
    "/org/gnome/Shell".to_string()
}

/// Matches the shell's own D-Bus services, which exit two seconds after going idle.
pub(super) fn default_idle_timeout_secs() -> u64 {
    2
}

pub(super) fn default_prefs_command() -> String {
    "novade-extension-prefs".to_string()
}
