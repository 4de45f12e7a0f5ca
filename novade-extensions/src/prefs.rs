//! Preferences dialogs.
//!
//! The service never draws the dialog itself. A [`PrefsLauncher`] turns a
//! [`PrefsRequest`] into a running dialog and hands back a [`PrefsDialog`] whose
//! [`closed`](PrefsDialog::closed) future resolves when the dialog's own close
//! request fires. The default launcher runs an external preferences viewer and
//! treats the process exit as the close request.

use std::fmt;
use std::future::Future;
use std::process::Stdio;

use futures_util::future::{BoxFuture, FutureExt};
use novade_core::config::PrefsConfig;
use tokio::process::Command;

use crate::error::ExtensionsError;
use crate::extension::ExtensionDescriptor;

/// A toplevel window owned by another process, given as a handle string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalWindow {
    /// An exported `xdg_foreign` handle.
    Wayland(String),
    /// An X11 window id.
    X11(u64),
}

impl ExternalWindow {
    /// Parses `wayland:<handle>` or `x11:<hex xid>`. Returns `None` for anything
    /// else, including the empty string.
    pub fn parse(handle: &str) -> Option<Self> {
        if let Some(wayland_handle) = handle.strip_prefix("wayland:") {
            if wayland_handle.is_empty() {
                return None;
            }
            return Some(Self::Wayland(wayland_handle.to_string()));
        }

        if let Some(xid) = handle.strip_prefix("x11:") {
            let digits = xid.strip_prefix("0x").or_else(|| xid.strip_prefix("0X")).unwrap_or(xid);
            return u64::from_str_radix(digits, 16).ok().filter(|xid| *xid != 0).map(Self::X11);
        }

        None
    }
}

impl fmt::Display for ExternalWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wayland(handle) => write!(f, "wayland:{}", handle),
            Self::X11(xid) => write!(f, "x11:{:x}", xid),
        }
    }
}

/// Everything needed to build one preferences dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefsRequest {
    pub descriptor: ExtensionDescriptor,
    /// Window the dialog is made transient for.
    pub parent_window: Option<ExternalWindow>,
    /// `None` when the caller did not pass a `modal` option.
    pub modal: Option<bool>,
}

/// Handle of a dialog that is being shown.
pub struct PrefsDialog {
    uuid: String,
    closed: BoxFuture<'static, ()>,
}

impl PrefsDialog {
    pub fn new(uuid: impl Into<String>, closed: impl Future<Output = ()> + Send + 'static) -> Self {
        Self { uuid: uuid.into(), closed: closed.boxed() }
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// Resolves once the dialog requested to be closed.
    pub fn closed(self) -> BoxFuture<'static, ()> {
        self.closed
    }
}

impl fmt::Debug for PrefsDialog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrefsDialog").field("uuid", &self.uuid).finish_non_exhaustive()
    }
}

/// Shows preferences dialogs.
///
/// `launch` is synchronous: it only starts the dialog. It is called while the
/// service's dialog slot is locked.
pub trait PrefsLauncher: Send + Sync {
    fn launch(&self, request: PrefsRequest) -> Result<PrefsDialog, ExtensionsError>;
}

/// Runs the configured preferences viewer as a child process.
///
/// The viewer receives `--uuid`, `--path`, `--descriptor <json>` and, when
/// given, `--parent-window <handle>` and `--modal`, after the configured
/// `extra_args`.
#[derive(Debug, Clone)]
pub struct CommandPrefsLauncher {
    config: PrefsConfig,
}

impl CommandPrefsLauncher {
    pub fn new(config: PrefsConfig) -> Self {
        Self { config }
    }

    fn command_args(&self, request: &PrefsRequest) -> Vec<String> {
        let descriptor = &request.descriptor;
        let mut args = self.config.extra_args.clone();
        args.extend([
            "--uuid".to_string(),
            descriptor.uuid.clone(),
            "--path".to_string(),
            descriptor.path.to_string_lossy().into_owned(),
            "--descriptor".to_string(),
            descriptor.to_json().to_string(),
        ]);
        if let Some(parent) = &request.parent_window {
            args.push("--parent-window".to_string());
            args.push(parent.to_string());
        }
        if request.modal == Some(true) {
            args.push("--modal".to_string());
        }
        args
    }
}

impl PrefsLauncher for CommandPrefsLauncher {
    fn launch(&self, request: PrefsRequest) -> Result<PrefsDialog, ExtensionsError> {
        let uuid = request.descriptor.uuid.clone();
        let args = self.command_args(&request);

        let mut child = Command::new(&self.config.command)
            .args(&args)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|e| ExtensionsError::DialogLaunch {
                uuid: uuid.clone(),
                message: format!("Failed to launch '{}' for {}: {}", self.config.command, uuid, e),
            })?;

        tracing::info!(pid = ?child.id(), "Showing preferences of {}", request.descriptor.name());

        let closed_uuid = uuid.clone();
        Ok(PrefsDialog::new(uuid, async move {
            match child.wait().await {
                Ok(status) => tracing::debug!("Preferences of {} closed ({})", closed_uuid, status),
                Err(e) => tracing::warn!("Lost track of the preferences viewer of {}: {}", closed_uuid, e),
            }
        }))
    }
}
