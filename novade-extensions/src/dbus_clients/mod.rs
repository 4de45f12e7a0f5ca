//! Clients of the shell's own D-Bus interfaces.
//!
//! [`ExtensionsBackend`] is the seam between the published interface and the
//! shell. [`shell_extensions_client::ShellExtensionsClient`] implements it over a
//! `zbus` proxy; tests substitute their own implementation.

pub mod shell_extensions_client;

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::error::UpstreamFault;
use crate::extension::{ExtensionInfo, ExtensionMap};

pub use shell_extensions_client::ShellExtensionsClient;

/// One `ExtensionStateChanged` emission of the shell.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionStateChange {
    pub uuid: String,
    pub state: ExtensionInfo,
}

/// The shell's extension interface, as seen by the forwarding service.
///
/// Every call maps to exactly one upstream call. Faults are returned as they
/// were received.
#[async_trait]
pub trait ExtensionsBackend: Send + Sync {
    async fn list_extensions(&self) -> Result<ExtensionMap, UpstreamFault>;
    async fn get_extension_info(&self, uuid: &str) -> Result<ExtensionInfo, UpstreamFault>;
    async fn get_extension_errors(&self, uuid: &str) -> Result<Vec<String>, UpstreamFault>;
    async fn install_remote_extension(&self, uuid: &str) -> Result<String, UpstreamFault>;
    async fn uninstall_extension(&self, uuid: &str) -> Result<bool, UpstreamFault>;
    async fn enable_extension(&self, uuid: &str) -> Result<bool, UpstreamFault>;
    async fn disable_extension(&self, uuid: &str) -> Result<bool, UpstreamFault>;
    async fn check_for_updates(&self) -> Result<(), UpstreamFault>;

    async fn shell_version(&self) -> Result<String, UpstreamFault>;
    async fn user_extensions_enabled(&self) -> Result<bool, UpstreamFault>;
    async fn set_user_extensions_enabled(&self, enabled: bool) -> Result<(), UpstreamFault>;

    /// Stream of the shell's `ExtensionStateChanged` signal.
    async fn receive_extension_state_changed(
        &self,
    ) -> Result<BoxStream<'static, ExtensionStateChange>, UpstreamFault>;

    /// Yields once per change of the shell's `UserExtensionsEnabled` property.
    async fn receive_user_extensions_enabled_changed(
        &self,
    ) -> Result<BoxStream<'static, ()>, UpstreamFault>;
}
