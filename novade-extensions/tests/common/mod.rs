#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::channel::{mpsc, oneshot};
use futures::stream::{BoxStream, StreamExt};
use parking_lot::Mutex;
use tokio::sync::RwLock;
use tracing_subscriber::{fmt, EnvFilter};
use zbus::zvariant::{OwnedValue, Value};

use novade_extensions::dbus_interfaces::ServiceSignals;
use novade_extensions::{
    ExtensionInfo, ExtensionMap, ExtensionStateChange, ExtensionsBackend, ExtensionsError, ExtensionsService,
    PrefsDialog, PrefsLauncher, PrefsRequest, ServiceLifetime, UpstreamFault,
};

pub const IDLE_TIMEOUT: Duration = Duration::from_secs(2);

pub fn init_tracing() {
    let _ = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::from_default_env().add_directive("novade_extensions=debug".parse().unwrap()))
        .with_test_writer()
        .try_init();
}

pub fn value<'a>(v: impl Into<Value<'a>>) -> OwnedValue {
    OwnedValue::from(v.into())
}

pub fn info(entries: &[(&str, OwnedValue)]) -> ExtensionInfo {
    entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

/// Info as the shell serializes it for an installed per-user extension.
pub fn installed_extension(uuid: &str, name: &str) -> ExtensionInfo {
    info(&[
        ("uuid", value(uuid)),
        ("name", value(name)),
        ("type", value(2.0f64)),
        ("state", value(1.0f64)),
        ("path", value(format!("/home/user/.local/share/gnome-shell/extensions/{}", uuid))),
        ("error", value("")),
        ("hasPrefs", value(true)),
        ("hasUpdate", value(false)),
        ("canChange", value(true)),
    ])
}

/// Stands in for the shell. Unknown uuids get `{}` from `GetExtensionInfo`,
/// as the shell does.
pub struct MockBackend {
    pub extensions: Mutex<ExtensionMap>,
    /// When set, every call fails with this fault.
    pub fault: Mutex<Option<UpstreamFault>>,
    pub calls: Mutex<Vec<String>>,
    pub user_extensions_enabled: Mutex<bool>,
    /// How long `InstallRemoteExtension` and property writes take to answer.
    pub latency: Mutex<Duration>,
    state_tx: Mutex<Option<mpsc::UnboundedSender<ExtensionStateChange>>>,
    state_rx: Mutex<Option<mpsc::UnboundedReceiver<ExtensionStateChange>>>,
    enabled_tx: Mutex<Option<mpsc::UnboundedSender<()>>>,
    enabled_rx: Mutex<Option<mpsc::UnboundedReceiver<()>>>,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        let (state_tx, state_rx) = mpsc::unbounded();
        let (enabled_tx, enabled_rx) = mpsc::unbounded();
        Arc::new(Self {
            extensions: Mutex::new(HashMap::new()),
            fault: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            user_extensions_enabled: Mutex::new(true),
            latency: Mutex::new(Duration::ZERO),
            state_tx: Mutex::new(Some(state_tx)),
            state_rx: Mutex::new(Some(state_rx)),
            enabled_tx: Mutex::new(Some(enabled_tx)),
            enabled_rx: Mutex::new(Some(enabled_rx)),
        })
    }

    pub fn with_extension(self: Arc<Self>, uuid: &str, info: ExtensionInfo) -> Arc<Self> {
        self.extensions.lock().insert(uuid.to_string(), info);
        self
    }

    pub fn fail_with(&self, fault: UpstreamFault) {
        *self.fault.lock() = Some(fault);
    }

    pub fn clear_fault(&self) {
        *self.fault.lock() = None;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// The shell emitting `ExtensionStateChanged`.
    pub fn emit_state_change(&self, uuid: &str, state: ExtensionInfo) {
        if let Some(tx) = self.state_tx.lock().as_ref() {
            let _ = tx.unbounded_send(ExtensionStateChange { uuid: uuid.to_string(), state });
        }
    }

    /// Ends both signal streams.
    pub fn close_signals(&self) {
        self.state_tx.lock().take();
        self.enabled_tx.lock().take();
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = latency;
    }

    async fn respond_later(&self) {
        let latency = *self.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    fn call(&self, name: String) -> Result<(), UpstreamFault> {
        self.calls.lock().push(name);
        match self.fault.lock().clone() {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ExtensionsBackend for MockBackend {
    async fn list_extensions(&self) -> Result<ExtensionMap, UpstreamFault> {
        self.call("ListExtensions".to_string())?;
        Ok(self.extensions.lock().clone())
    }

    async fn get_extension_info(&self, uuid: &str) -> Result<ExtensionInfo, UpstreamFault> {
        self.call(format!("GetExtensionInfo({})", uuid))?;
        Ok(self.extensions.lock().get(uuid).cloned().unwrap_or_default())
    }

    async fn get_extension_errors(&self, uuid: &str) -> Result<Vec<String>, UpstreamFault> {
        self.call(format!("GetExtensionErrors({})", uuid))?;
        Ok(vec![format!("{}: first error", uuid), format!("{}: second error", uuid)])
    }

    async fn install_remote_extension(&self, uuid: &str) -> Result<String, UpstreamFault> {
        self.call(format!("InstallRemoteExtension({})", uuid))?;
        self.respond_later().await;
        Ok("successful".to_string())
    }

    async fn uninstall_extension(&self, uuid: &str) -> Result<bool, UpstreamFault> {
        self.call(format!("UninstallExtension({})", uuid))?;
        Ok(self.extensions.lock().remove(uuid).is_some())
    }

    async fn enable_extension(&self, uuid: &str) -> Result<bool, UpstreamFault> {
        self.call(format!("EnableExtension({})", uuid))?;
        Ok(self.extensions.lock().contains_key(uuid))
    }

    async fn disable_extension(&self, uuid: &str) -> Result<bool, UpstreamFault> {
        self.call(format!("DisableExtension({})", uuid))?;
        Ok(self.extensions.lock().contains_key(uuid))
    }

    async fn check_for_updates(&self) -> Result<(), UpstreamFault> {
        self.call("CheckForUpdates".to_string())
    }

    async fn shell_version(&self) -> Result<String, UpstreamFault> {
        self.call("Get(ShellVersion)".to_string())?;
        Ok("46.2".to_string())
    }

    async fn user_extensions_enabled(&self) -> Result<bool, UpstreamFault> {
        self.call("Get(UserExtensionsEnabled)".to_string())?;
        Ok(*self.user_extensions_enabled.lock())
    }

    /// Applies the value and confirms it with a change notification.
    async fn set_user_extensions_enabled(&self, enabled: bool) -> Result<(), UpstreamFault> {
        self.call(format!("Set(UserExtensionsEnabled, {})", enabled))?;
        self.respond_later().await;
        *self.user_extensions_enabled.lock() = enabled;
        if let Some(tx) = self.enabled_tx.lock().as_ref() {
            let _ = tx.unbounded_send(());
        }
        Ok(())
    }

    async fn receive_extension_state_changed(
        &self,
    ) -> Result<BoxStream<'static, ExtensionStateChange>, UpstreamFault> {
        self.state_rx
            .lock()
            .take()
            .map(|rx| rx.boxed())
            .ok_or_else(|| UpstreamFault::failed("already subscribed"))
    }

    async fn receive_user_extensions_enabled_changed(&self) -> Result<BoxStream<'static, ()>, UpstreamFault> {
        self.enabled_rx
            .lock()
            .take()
            .map(|rx| rx.boxed())
            .ok_or_else(|| UpstreamFault::failed("already subscribed"))
    }
}

/// Records requests; each dialog stays open until [`MockLauncher::close`].
#[derive(Default)]
pub struct MockLauncher {
    pub requests: Mutex<Vec<PrefsRequest>>,
    pub fail: Mutex<bool>,
    closers: Mutex<Vec<oneshot::Sender<()>>>,
}

impl MockLauncher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn requests(&self) -> Vec<PrefsRequest> {
        self.requests.lock().clone()
    }

    /// Fires the close request of the most recently launched dialog.
    pub fn close(&self) {
        if let Some(tx) = self.closers.lock().pop() {
            let _ = tx.send(());
        }
    }
}

impl PrefsLauncher for MockLauncher {
    fn launch(&self, request: PrefsRequest) -> Result<PrefsDialog, ExtensionsError> {
        let uuid = request.descriptor.uuid.clone();
        if *self.fail.lock() {
            return Err(ExtensionsError::DialogLaunch { uuid, message: "viewer not found".to_string() });
        }
        self.requests.lock().push(request);

        let (tx, rx) = oneshot::channel();
        self.closers.lock().push(tx);
        Ok(PrefsDialog::new(uuid, async move {
            let _ = rx.await;
        }))
    }
}

pub struct Harness {
    pub backend: Arc<MockBackend>,
    pub launcher: Arc<MockLauncher>,
    pub lifetime: Arc<ServiceLifetime>,
    pub service: ExtensionsService,
}

pub fn harness(backend: Arc<MockBackend>) -> Harness {
    let launcher = MockLauncher::new();
    let lifetime = ServiceLifetime::new(IDLE_TIMEOUT);
    let service = ExtensionsService::new(backend.clone(), launcher.clone(), lifetime.clone());
    Harness { backend, launcher, lifetime, service }
}

/// Emitted signals, read back from the service the way the object server does.
#[derive(Default)]
pub struct RecordedSignals {
    pub state_changes: Vec<ExtensionStateChange>,
    /// Value carried by each `UserExtensionsEnabled` change notification.
    pub enabled_changes: Vec<bool>,
}

pub struct RecordingSignals {
    service: Arc<RwLock<ExtensionsService>>,
    pub recorded: Arc<Mutex<RecordedSignals>>,
}

impl RecordingSignals {
    pub fn new(service: Arc<RwLock<ExtensionsService>>) -> Self {
        Self { service, recorded: Arc::new(Mutex::new(RecordedSignals::default())) }
    }
}

#[async_trait]
impl ServiceSignals for RecordingSignals {
    async fn extension_state_changed(&self, change: &ExtensionStateChange) -> zbus::Result<()> {
        self.recorded.lock().state_changes.push(change.clone());
        Ok(())
    }

    async fn user_extensions_enabled_changed(&self) -> zbus::Result<()> {
        let enabled = self.service.read().await.user_extensions_enabled().await?;
        self.recorded.lock().enabled_changes.push(enabled);
        Ok(())
    }
}

/// Yields to spawned tasks until `condition` holds.
pub async fn wait_for(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition not reached in time");
}
