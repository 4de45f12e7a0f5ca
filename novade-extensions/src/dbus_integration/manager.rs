use std::sync::Arc;

use thiserror::Error;
use zbus::names::WellKnownName;
use zbus::{Connection, Error as ZbusError, InterfaceRef};

use crate::dbus_interfaces::extensions_service::ExtensionsService;

#[derive(Debug, Error)]
pub enum DbusManagerError {
    #[error("D-Bus connection failed: {0}")]
    ConnectionFailed(#[from] ZbusError),
    #[error("Failed to request D-Bus service name '{name}': {source}")]
    NameRequestFailed { name: String, source: ZbusError },
    #[error("Failed to serve D-Bus object at path '{path}': {source}")]
    ServeAtFailed { path: String, source: ZbusError },
    #[error("An interface is already served at path '{path}'")]
    PathInUse { path: String },
    #[error("Failed to create D-Bus proxy: {source}")]
    ProxyCreationFailed { source: ZbusError },
}

pub type Result<T> = std::result::Result<T, DbusManagerError>;

/// Owns the session bus connection of the extensions service.
#[derive(Clone)]
pub struct DbusServiceManager {
    session_bus: Arc<Connection>,
}

impl DbusServiceManager {
    /// Connects to the session bus.
    pub async fn new_session() -> Result<Self> {
        tracing::info!("Connecting to the D-Bus session bus...");
        let connection = Connection::session().await?;
        tracing::info!(
            "Connected to the session bus. Unique name: {}",
            connection.unique_name().map_or_else(|| "<unknown>".to_string(), |n| n.to_string())
        );
        Ok(Self::from_connection(connection))
    }

    pub fn from_connection(connection: Connection) -> Self {
        Self { session_bus: Arc::new(connection) }
    }

    pub fn connection(&self) -> Arc<Connection> {
        self.session_bus.clone()
    }

    /// Requests a well-known name. Done last, once every object is served, so
    /// activated callers never see a half-initialized service.
    pub async fn request_name(&self, name: &str) -> Result<()> {
        let well_known_name = WellKnownName::try_from(name).map_err(|e| DbusManagerError::NameRequestFailed {
            name: name.to_string(),
            source: ZbusError::from(e),
        })?;

        tracing::info!("Requesting D-Bus name: {}", name);
        self.session_bus
            .request_name(well_known_name)
            .await
            .map_err(|e| DbusManagerError::NameRequestFailed { name: name.to_string(), source: e })?;
        tracing::info!("Acquired D-Bus name: {}", name);
        Ok(())
    }

    /// Registers `service` at `path` and returns a reference used to emit its
    /// signals and property notifications.
    pub async fn serve_extensions_service(
        &self,
        service: ExtensionsService,
        path: &str,
    ) -> Result<InterfaceRef<ExtensionsService>> {
        let object_server = self.session_bus.object_server();
        let added = object_server
            .at(path, service)
            .await
            .map_err(|e| DbusManagerError::ServeAtFailed { path: path.to_string(), source: e })?;
        if !added {
            return Err(DbusManagerError::PathInUse { path: path.to_string() });
        }

        let iface_ref = object_server
            .interface::<_, ExtensionsService>(path)
            .await
            .map_err(|e| DbusManagerError::ServeAtFailed { path: path.to_string(), source: e })?;

        tracing::info!("ExtensionsService registered at {}", path);
        Ok(iface_ref)
    }
}
