//! Session bus connection and object registration.

pub mod manager;

pub use manager::{DbusManagerError, DbusServiceManager, Result};
