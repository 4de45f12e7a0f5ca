//! Errors returned to callers of the extensions interface.
//!
//! Faults coming back from the shell are carried as [`UpstreamFault`] and are
//! replied with their original error name and message. The other variants of
//! [`ExtensionsError`] are raised locally by the preferences operation.

use thiserror::Error;
use zbus::names::ErrorName;
use zbus::{DBusError, Message, MessageBuilder, MessageHeader};

/// Error name used when the upstream failure has no D-Bus name of its own.
pub const FAILED_ERROR_NAME: &str = "org.freedesktop.DBus.Error.Failed";
/// Error name of the "dialog already open" condition.
pub const ALREADY_SHOWING_ERROR_NAME: &str = "org.gnome.Shell.Extensions.Error.AlreadyShowing";
const INVALID_ARGS_ERROR_NAME: &str = "org.freedesktop.DBus.Error.InvalidArgs";

/// A fault reported by the shell, reduced to what travels on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{name}: {message}")]
pub struct UpstreamFault {
    pub name: String,
    pub message: String,
}

impl UpstreamFault {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { name: name.into(), message: message.into() }
    }

    /// A generic `org.freedesktop.DBus.Error.Failed` fault.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(FAILED_ERROR_NAME, message)
    }
}

impl From<zbus::Error> for UpstreamFault {
    fn from(err: zbus::Error) -> Self {
        match err {
            zbus::Error::MethodError(name, message, _) => {
                Self::new(name.to_string(), message.unwrap_or_default())
            }
            zbus::Error::FDO(fdo) => Self::new(
                fdo.name().to_string(),
                fdo.description().unwrap_or_default(),
            ),
            other => Self::failed(other.to_string()),
        }
    }
}

/// Property getters can only fail with a standard FDO error.
impl From<UpstreamFault> for zbus::fdo::Error {
    fn from(fault: UpstreamFault) -> Self {
        zbus::fdo::Error::Failed(fault.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ExtensionsError {
    /// The shell answered with an error; relayed unchanged.
    #[error(transparent)]
    Upstream(#[from] UpstreamFault),

    #[error("Already showing a prefs dialog")]
    AlreadyShowing,

    /// The shell returned extension info the dialog cannot be built from.
    #[error("{0}")]
    InvalidDescriptor(String),

    #[error("{message}")]
    DialogLaunch { uuid: String, message: String },
}

impl ExtensionsError {
    pub fn error_name(&self) -> &str {
        match self {
            Self::Upstream(fault) => &fault.name,
            Self::AlreadyShowing => ALREADY_SHOWING_ERROR_NAME,
            Self::InvalidDescriptor(_) => INVALID_ARGS_ERROR_NAME,
            Self::DialogLaunch { .. } => FAILED_ERROR_NAME,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Upstream(fault) => &fault.message,
            Self::AlreadyShowing => "Already showing a prefs dialog",
            Self::InvalidDescriptor(message) => message,
            Self::DialogLaunch { message, .. } => message,
        }
    }
}

impl DBusError for ExtensionsError {
    fn create_reply(&self, call: &MessageHeader<'_>) -> zbus::Result<Message> {
        MessageBuilder::error(call, self.error_name())?.build(&(self.message(),))
    }

    fn name(&self) -> ErrorName<'_> {
        ErrorName::from_str_unchecked(self.error_name())
    }

    fn description(&self) -> Option<&str> {
        Some(self.message())
    }
}
