//! NovaDE extensions service.
//!
//! Publishes `org.gnome.Shell.Extensions` on the session bus and forwards every
//! call to the shell's own extensions interface. The preferences dialog is the
//! only thing handled locally.

pub mod dbus_clients;
pub mod dbus_integration;
pub mod dbus_interfaces;
pub mod error;
pub mod extension;
pub mod lifetime;
pub mod prefs;
pub mod service;

pub use dbus_clients::{ExtensionStateChange, ExtensionsBackend};
pub use dbus_interfaces::ExtensionsService;
pub use error::{ExtensionsError, UpstreamFault};
pub use extension::{ExtensionDescriptor, ExtensionInfo, ExtensionMap};
pub use lifetime::{HoldGuard, ServiceLifetime};
pub use prefs::{ExternalWindow, PrefsDialog, PrefsLauncher, PrefsRequest};
