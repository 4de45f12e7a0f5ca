//! # `org.gnome.Shell.Extensions` service
//!
//! Every method is forwarded to the shell through an [`ExtensionsBackend`] and
//! the reply, or the shell's fault, is returned as received. The exception is
//! `OpenExtensionPrefs`, which shows a preferences dialog after fetching the
//! extension's info. Only one dialog exists at a time; while it is open the
//! service holds its [`ServiceLifetime`] so it does not exit on idle. Every
//! call to the shell holds it too, for as long as the shell takes to answer.
//!
//! The shell's `ExtensionStateChanged` signal and its `UserExtensionsEnabled`
//! change notifications are re-emitted by [`relay_upstream_signals`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::StreamExt;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use zbus::zvariant::{OwnedValue, Value};
use zbus::{dbus_interface, fdo, InterfaceRef, SignalContext};

use crate::dbus_clients::{ExtensionStateChange, ExtensionsBackend};
use crate::error::{ExtensionsError, UpstreamFault};
use crate::extension::{ExtensionDescriptor, ExtensionInfo, ExtensionMap};
use crate::lifetime::{HoldGuard, ServiceLifetime};
use crate::prefs::{ExternalWindow, PrefsLauncher, PrefsRequest};

/// The dialog currently shown. Dropping it releases the service hold.
struct OpenDialog {
    uuid: String,
    _hold: HoldGuard,
}

pub struct ExtensionsService {
    backend: Arc<dyn ExtensionsBackend>,
    launcher: Arc<dyn PrefsLauncher>,
    lifetime: Arc<ServiceLifetime>,
    prefs_dialog: Arc<Mutex<Option<OpenDialog>>>,
}

impl ExtensionsService {
    pub fn new(
        backend: Arc<dyn ExtensionsBackend>,
        launcher: Arc<dyn PrefsLauncher>,
        lifetime: Arc<ServiceLifetime>,
    ) -> Self {
        Self { backend, launcher, lifetime, prefs_dialog: Arc::new(Mutex::new(None)) }
    }

    /// Whether a preferences dialog is open.
    pub fn is_showing_prefs(&self) -> bool {
        self.prefs_dialog.lock().is_some()
    }

    /// Uuid of the extension whose preferences are shown.
    pub fn prefs_uuid(&self) -> Option<String> {
        self.prefs_dialog.lock().as_ref().map(|dialog| dialog.uuid.clone())
    }

    /// Runs `call` with a hold on the service lifetime.
    async fn tracked<F: Future>(&self, call: F) -> F::Output {
        let _busy = self.lifetime.hold();
        call.await
    }

    async fn forward<T>(
        &self,
        method: &str,
        call: impl Future<Output = Result<T, UpstreamFault>>,
    ) -> Result<T, ExtensionsError> {
        tracing::debug!("Forwarding {} to the shell", method);
        self.tracked(call).await.map_err(|fault| {
            tracing::debug!("{} failed in the shell: {}", method, fault);
            ExtensionsError::from(fault)
        })
    }

    async fn show_prefs(
        &self,
        uuid: &str,
        parent_window: &str,
        options: &HashMap<String, OwnedValue>,
    ) -> Result<(), ExtensionsError> {
        let info = self.forward("GetExtensionInfo", self.backend.get_extension_info(uuid)).await?;

        let dialog = {
            let mut slot = self.prefs_dialog.lock();
            if let Some(open) = slot.as_ref() {
                tracing::debug!("Refusing prefs for {}: {} is still shown", uuid, open.uuid);
                return Err(ExtensionsError::AlreadyShowing);
            }

            let request = PrefsRequest {
                descriptor: ExtensionDescriptor::deserialize(&info)?,
                parent_window: parse_parent_window(parent_window),
                modal: modal_option(options),
            };
            let dialog = self.launcher.launch(request)?;
            *slot = Some(OpenDialog { uuid: dialog.uuid().to_owned(), _hold: self.lifetime.hold() });
            dialog
        };

        let slot = Arc::clone(&self.prefs_dialog);
        tokio::spawn(async move {
            dialog.closed().await;
            let closed = slot.lock().take();
            if let Some(closed) = closed {
                tracing::info!("Preferences dialog of {} closed", closed.uuid);
            }
        });
        Ok(())
    }
}

fn parse_parent_window(handle: &str) -> Option<ExternalWindow> {
    if handle.is_empty() {
        return None;
    }
    let parent = ExternalWindow::parse(handle);
    if parent.is_none() {
        tracing::warn!("Ignoring invalid parent window handle '{}'", handle);
    }
    parent
}

fn modal_option(options: &HashMap<String, OwnedValue>) -> Option<bool> {
    match options.get("modal").map(|value| &**value) {
        Some(Value::Bool(modal)) => Some(*modal),
        Some(other) => {
            tracing::warn!("Ignoring non-boolean 'modal' option: {:?}", other);
            None
        }
        None => None,
    }
}

#[dbus_interface(name = "org.gnome.Shell.Extensions")]
impl ExtensionsService {
    pub async fn list_extensions(&self) -> Result<ExtensionMap, ExtensionsError> {
        self.forward("ListExtensions", self.backend.list_extensions()).await
    }

    pub async fn get_extension_info(&self, uuid: String) -> Result<ExtensionInfo, ExtensionsError> {
        self.forward("GetExtensionInfo", self.backend.get_extension_info(&uuid)).await
    }

    pub async fn get_extension_errors(&self, uuid: String) -> Result<Vec<String>, ExtensionsError> {
        self.forward("GetExtensionErrors", self.backend.get_extension_errors(&uuid)).await
    }

    pub async fn install_remote_extension(&self, uuid: String) -> Result<String, ExtensionsError> {
        self.forward("InstallRemoteExtension", self.backend.install_remote_extension(&uuid)).await
    }

    pub async fn uninstall_extension(&self, uuid: String) -> Result<bool, ExtensionsError> {
        self.forward("UninstallExtension", self.backend.uninstall_extension(&uuid)).await
    }

    pub async fn enable_extension(&self, uuid: String) -> Result<bool, ExtensionsError> {
        self.forward("EnableExtension", self.backend.enable_extension(&uuid)).await
    }

    pub async fn disable_extension(&self, uuid: String) -> Result<bool, ExtensionsError> {
        self.forward("DisableExtension", self.backend.disable_extension(&uuid)).await
    }

    /// Same as `OpenExtensionPrefs(uuid, "", {})`.
    pub async fn launch_extension_prefs(&self, uuid: String) -> Result<(), ExtensionsError> {
        self.show_prefs(&uuid, "", &HashMap::new()).await
    }

    /// Shows the preferences of `uuid`, transient for `parent_window` when it is
    /// a valid handle. The only option read is `modal` (boolean).
    pub async fn open_extension_prefs(
        &self,
        uuid: String,
        parent_window: String,
        options: HashMap<String, OwnedValue>,
    ) -> Result<(), ExtensionsError> {
        self.show_prefs(&uuid, &parent_window, &options).await
    }

    pub async fn check_for_updates(&self) -> Result<(), ExtensionsError> {
        self.forward("CheckForUpdates", self.backend.check_for_updates()).await
    }

    #[dbus_interface(property)]
    pub async fn shell_version(&self) -> fdo::Result<String> {
        Ok(self.tracked(self.backend.shell_version()).await?)
    }

    #[dbus_interface(property)]
    pub async fn user_extensions_enabled(&self) -> fdo::Result<bool> {
        Ok(self.tracked(self.backend.user_extensions_enabled()).await?)
    }

    /// Written through to the shell. The `PropertiesChanged` sent once this
    /// returns reads the value back from the shell, so the write has to be
    /// acknowledged first or it would carry the old value. A failed write is
    /// logged and leaves the shell's value in place.
    #[dbus_interface(property)]
    pub async fn set_user_extensions_enabled(&mut self, enabled: bool) {
        tracing::debug!("Forwarding Set(UserExtensionsEnabled, {}) to the shell", enabled);
        if let Err(fault) = self.tracked(self.backend.set_user_extensions_enabled(enabled)).await {
            tracing::warn!("Setting UserExtensionsEnabled={} failed in the shell: {}", enabled, fault);
        }
    }

    #[dbus_interface(signal)]
    pub async fn extension_state_changed(
        ctxt: &SignalContext<'_>,
        uuid: &str,
        state: &HashMap<String, OwnedValue>,
    ) -> zbus::Result<()>;
}

/// Emission side of the service, as needed by [`relay_upstream_signals`].
#[async_trait]
pub trait ServiceSignals: Send + Sync {
    async fn extension_state_changed(&self, change: &ExtensionStateChange) -> zbus::Result<()>;

    /// Emits `PropertiesChanged` for `UserExtensionsEnabled` with the shell's current value.
    async fn user_extensions_enabled_changed(&self) -> zbus::Result<()>;
}

/// [`ServiceSignals`] of a served [`ExtensionsService`].
pub struct InterfaceSignals {
    iface: InterfaceRef<ExtensionsService>,
}

impl InterfaceSignals {
    pub fn new(iface: InterfaceRef<ExtensionsService>) -> Self {
        Self { iface }
    }
}

#[async_trait]
impl ServiceSignals for InterfaceSignals {
    async fn extension_state_changed(&self, change: &ExtensionStateChange) -> zbus::Result<()> {
        ExtensionsService::extension_state_changed(self.iface.signal_context(), &change.uuid, &change.state).await
    }

    async fn user_extensions_enabled_changed(&self) -> zbus::Result<()> {
        let iface = self.iface.get().await;
        iface.user_extensions_enabled_changed(self.iface.signal_context()).await
    }
}

/// Subscribes to the shell's signals and re-emits them through `signals`.
///
/// Subscription errors are returned; emission errors are logged and the relay
/// keeps running until both upstream streams end.
pub async fn relay_upstream_signals<S>(
    backend: Arc<dyn ExtensionsBackend>,
    signals: S,
) -> Result<JoinHandle<()>, UpstreamFault>
where
    S: ServiceSignals + 'static,
{
    let mut state_changes = backend.receive_extension_state_changed().await?;
    let mut enabled_changes = backend.receive_user_extensions_enabled_changed().await?;

    Ok(tokio::spawn(async move {
        loop {
            tokio::select! {
                Some(change) = state_changes.next() => {
                    if let Err(e) = signals.extension_state_changed(&change).await {
                        tracing::warn!("Failed to re-emit ExtensionStateChanged for {}: {}", change.uuid, e);
                    }
                }
                Some(()) = enabled_changes.next() => {
                    if let Err(e) = signals.user_extensions_enabled_changed().await {
                        tracing::warn!("Failed to emit UserExtensionsEnabled change: {}", e);
                    }
                }
                else => {
                    tracing::debug!("Shell signal streams ended, stopping relay");
                    break;
                }
            }
        }
    }))
}
