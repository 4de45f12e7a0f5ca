//! Wiring of the extensions service on the session bus.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use novade_core::config::CoreConfig;

use crate::dbus_clients::{ExtensionsBackend, ShellExtensionsClient};
use crate::dbus_integration::DbusServiceManager;
use crate::dbus_interfaces::{relay_upstream_signals, ExtensionsService, InterfaceSignals};
use crate::lifetime::ServiceLifetime;
use crate::prefs::{CommandPrefsLauncher, PrefsLauncher};

/// Serves the extensions interface until the service goes idle or Ctrl+C.
///
/// The bus name is requested only after the object is served and the shell's
/// signals are subscribed to.
pub async fn run(config: CoreConfig) -> anyhow::Result<()> {
    let service_config = &config.service;

    let dbus_manager = DbusServiceManager::new_session().await?;
    let connection = dbus_manager.connection();

    let backend: Arc<dyn ExtensionsBackend> = Arc::new(
        ShellExtensionsClient::new(
            &connection,
            &service_config.upstream_bus_name,
            &service_config.upstream_object_path,
        )
        .await?,
    );
    let launcher: Arc<dyn PrefsLauncher> = Arc::new(CommandPrefsLauncher::new(config.prefs.clone()));
    let lifetime = ServiceLifetime::new(Duration::from_secs(service_config.idle_timeout_secs));

    let service = ExtensionsService::new(Arc::clone(&backend), launcher, Arc::clone(&lifetime));
    let iface_ref = dbus_manager
        .serve_extensions_service(service, &service_config.object_path)
        .await?;

    let relay = relay_upstream_signals(backend, InterfaceSignals::new(iface_ref))
        .await
        .context("Failed to subscribe to the shell's extension signals")?;

    dbus_manager.request_name(&service_config.bus_name).await?;
    tracing::info!(
        "Extensions service ready on {} at {} (upstream {} at {})",
        service_config.bus_name,
        service_config.object_path,
        service_config.upstream_bus_name,
        service_config.upstream_object_path
    );

    let persist = service_config.persist;
    tokio::select! {
        _ = lifetime.wait_for_idle(), if !persist => {
            tracing::info!("No activity for {:?}, exiting.", lifetime.idle_timeout());
        }
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => tracing::info!("Ctrl+C received, shutting down service."),
            Err(err) => tracing::error!("Failed to listen for Ctrl+C signal: {}", err),
        },
    }

    relay.abort();
    Ok(())
}
