//! Interfaces published by the service.

pub mod extensions_service;

pub use extensions_service::{relay_upstream_signals, ExtensionsService, InterfaceSignals, ServiceSignals};
