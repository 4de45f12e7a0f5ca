//! XDG Base Directory and application-specific path resolution.
//!
//! Application directories are derived with `directories-next` from the
//! `QUALIFIER`/`ORGANIZATION`/`APPLICATION` triple below.

use std::path::PathBuf;
use directories_next::{BaseDirs, ProjectDirs};
use crate::error::{ConfigError, CoreError};

const QUALIFIER: &str = "org";
const ORGANIZATION: &str = "NovaDE";
const APPLICATION: &str = "NovaDE";

fn project_dirs(dir_type: &str) -> Result<ProjectDirs, CoreError> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION).ok_or_else(|| {
        CoreError::Config(ConfigError::DirectoryUnavailable { dir_type: dir_type.to_string() })
    })
}

/// Returns the application-specific configuration directory
/// (e.g. `~/.config/novade` on Linux).
pub fn get_app_config_dir() -> Result<PathBuf, CoreError> {
    project_dirs("App Config").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Returns the base state directory, `$XDG_STATE_HOME` or `~/.local/state`.
///
/// `directories-next` has no state directory, so on non-Linux platforms the
/// local data directory is used instead.
pub fn get_state_base_dir() -> Result<PathBuf, CoreError> {
    BaseDirs::new()
        .map(|dirs| {
            #[cfg(target_os = "linux")]
            {
                match std::env::var("XDG_STATE_HOME") {
                    Ok(state_home) if !state_home.is_empty() => PathBuf::from(state_home),
                    _ => dirs.home_dir().join(".local/state"),
                }
            }
            #[cfg(not(target_os = "linux"))]
            {
                dirs.data_local_dir().to_path_buf()
            }
        })
        .ok_or_else(|| CoreError::Config(ConfigError::DirectoryUnavailable {
            dir_type: "State Base".to_string(),
        }))
}

/// Returns the application-specific state directory, used for log files.
pub fn get_app_state_dir() -> Result<PathBuf, CoreError> {
    get_state_base_dir().map(|base| base.join(ORGANIZATION).join(APPLICATION))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_absolute_or_unavailable(res: Result<PathBuf, CoreError>) {
        match res {
            Ok(path) => assert!(path.is_absolute(), "not absolute: {:?}", path),
            // No HOME in some CI sandboxes.
            Err(CoreError::Config(ConfigError::DirectoryUnavailable { .. })) => {}
            Err(e) => panic!("unexpected error: {:?}", e),
        }
    }

    #[test]
    fn test_app_config_dir() {
        assert_absolute_or_unavailable(get_app_config_dir());
    }

    #[test]
    fn test_app_state_dir_is_nested_in_base() {
        if let (Ok(base), Ok(app)) = (get_state_base_dir(), get_app_state_dir()) {
            assert!(app.starts_with(&base));
            assert!(app.ends_with("NovaDE/NovaDE"));
        }
    }
}
