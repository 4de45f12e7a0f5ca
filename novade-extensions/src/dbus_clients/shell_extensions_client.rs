//! # Shell Extensions D-Bus Client
//!
//! Typed client for the `org.gnome.Shell.Extensions` interface the shell
//! exports on `org.gnome.Shell` at `/org/gnome/Shell`.

use std::collections::HashMap;

use async_trait::async_trait;
use futures_util::stream::{BoxStream, StreamExt};
use zbus::names::InterfaceName;
use zbus::{dbus_proxy, fdo, zvariant::OwnedValue, CacheProperties, Connection};

use super::{ExtensionStateChange, ExtensionsBackend};
use crate::dbus_integration::{DbusManagerError, Result};
use crate::error::UpstreamFault;
use crate::extension::{ExtensionInfo, ExtensionMap};

/// Interface implemented by the shell and re-exported by this service.
pub const SHELL_EXTENSIONS_INTERFACE: &str = "org.gnome.Shell.Extensions";

#[dbus_proxy(
    interface = "org.gnome.Shell.Extensions",
    default_service = "org.gnome.Shell",
    default_path = "/org/gnome/Shell"
)]
trait ShellExtensions {
    fn list_extensions(&self) -> zbus::Result<HashMap<String, HashMap<String, OwnedValue>>>;

    fn get_extension_info(&self, uuid: &str) -> zbus::Result<HashMap<String, OwnedValue>>;

    fn get_extension_errors(&self, uuid: &str) -> zbus::Result<Vec<String>>;

    /// Returns the installation result ("successful", "cancelled", ...).
    fn install_remote_extension(&self, uuid: &str) -> zbus::Result<String>;

    fn uninstall_extension(&self, uuid: &str) -> zbus::Result<bool>;

    fn enable_extension(&self, uuid: &str) -> zbus::Result<bool>;

    fn disable_extension(&self, uuid: &str) -> zbus::Result<bool>;

    fn check_for_updates(&self) -> zbus::Result<()>;

    #[dbus_proxy(signal)]
    fn extension_state_changed(
        &self,
        uuid: String,
        state: HashMap<String, OwnedValue>,
    ) -> zbus::Result<()>;

    #[dbus_proxy(property)]
    fn shell_version(&self) -> zbus::Result<String>;

    #[dbus_proxy(property)]
    fn user_extensions_enabled(&self) -> zbus::Result<bool>;

    #[dbus_proxy(property)]
    fn set_user_extensions_enabled(&self, value: bool) -> zbus::Result<()>;
}

/// [`ExtensionsBackend`] talking to the running shell.
#[derive(Debug, Clone)]
pub struct ShellExtensionsClient {
    proxy: ShellExtensionsProxy<'static>,
    /// Uncached reads, for values that must reflect a write just made.
    properties: fdo::PropertiesProxy<'static>,
}

impl ShellExtensionsClient {
    /// Creates a client for the extensions interface at `destination`/`path`.
    pub async fn new(connection: &Connection, destination: &str, path: &str) -> Result<Self> {
        let proxy = ShellExtensionsProxy::builder(connection)
            .destination(destination.to_owned())
            .and_then(|builder| builder.path(path.to_owned()))
            .map_err(|e| DbusManagerError::ProxyCreationFailed { source: e })?
            .build()
            .await
            .map_err(|e| DbusManagerError::ProxyCreationFailed { source: e })?;
        let properties = fdo::PropertiesProxy::builder(connection)
            .destination(destination.to_owned())
            .and_then(|builder| builder.path(path.to_owned()))
            .map_err(|e| DbusManagerError::ProxyCreationFailed { source: e })?
            .cache_properties(CacheProperties::No)
            .build()
            .await
            .map_err(|e| DbusManagerError::ProxyCreationFailed { source: e })?;

        tracing::debug!("Created shell extensions proxy for {} at {}", destination, path);
        Ok(Self { proxy, properties })
    }
}

#[async_trait]
impl ExtensionsBackend for ShellExtensionsClient {
    async fn list_extensions(&self) -> std::result::Result<ExtensionMap, UpstreamFault> {
        Ok(self.proxy.list_extensions().await?)
    }

    async fn get_extension_info(&self, uuid: &str) -> std::result::Result<ExtensionInfo, UpstreamFault> {
        Ok(self.proxy.get_extension_info(uuid).await?)
    }

    async fn get_extension_errors(&self, uuid: &str) -> std::result::Result<Vec<String>, UpstreamFault> {
        Ok(self.proxy.get_extension_errors(uuid).await?)
    }

    async fn install_remote_extension(&self, uuid: &str) -> std::result::Result<String, UpstreamFault> {
        Ok(self.proxy.install_remote_extension(uuid).await?)
    }

    async fn uninstall_extension(&self, uuid: &str) -> std::result::Result<bool, UpstreamFault> {
        Ok(self.proxy.uninstall_extension(uuid).await?)
    }

    async fn enable_extension(&self, uuid: &str) -> std::result::Result<bool, UpstreamFault> {
        Ok(self.proxy.enable_extension(uuid).await?)
    }

    async fn disable_extension(&self, uuid: &str) -> std::result::Result<bool, UpstreamFault> {
        Ok(self.proxy.disable_extension(uuid).await?)
    }

    async fn check_for_updates(&self) -> std::result::Result<(), UpstreamFault> {
        Ok(self.proxy.check_for_updates().await?)
    }

    async fn shell_version(&self) -> std::result::Result<String, UpstreamFault> {
        Ok(self.proxy.shell_version().await?)
    }

    /// Read from the shell rather than the proxy cache: the cache only
    /// catches up with a write once the shell's own notification arrives.
    async fn user_extensions_enabled(&self) -> std::result::Result<bool, UpstreamFault> {
        let value = self
            .properties
            .get(InterfaceName::from_static_str_unchecked(SHELL_EXTENSIONS_INTERFACE), "UserExtensionsEnabled")
            .await
            .map_err(zbus::Error::from)?;
        bool::try_from(value).map_err(|e| UpstreamFault::failed(format!("UserExtensionsEnabled is not a boolean: {}", e)))
    }

    async fn set_user_extensions_enabled(&self, enabled: bool) -> std::result::Result<(), UpstreamFault> {
        Ok(self.proxy.set_user_extensions_enabled(enabled).await?)
    }

    async fn receive_extension_state_changed(
        &self,
    ) -> std::result::Result<BoxStream<'static, ExtensionStateChange>, UpstreamFault> {
        let stream = self.proxy.receive_extension_state_changed().await?;
        Ok(stream
            .filter_map(|signal| async move {
                match signal.args() {
                    Ok(args) => Some(ExtensionStateChange {
                        uuid: args.uuid().clone(),
                        state: args.state().clone(),
                    }),
                    Err(e) => {
                        tracing::warn!("Ignoring malformed ExtensionStateChanged from the shell: {}", e);
                        None
                    }
                }
            })
            .boxed())
    }

    async fn receive_user_extensions_enabled_changed(
        &self,
    ) -> std::result::Result<BoxStream<'static, ()>, UpstreamFault> {
        let stream = self.proxy.receive_user_extensions_enabled_changed().await;
        Ok(stream.map(|_| ()).boxed())
    }
}
