//! Extension descriptors as serialized by the shell.
//!
//! `GetExtensionInfo` returns an `a{sv}` where a fixed set of keys describes the
//! shell's view of the extension (type, state, path, ...) and every other key is
//! a field of the extension's `metadata.json`. Only the preferences dialog looks
//! inside; forwarded calls relay the map untouched.

use std::collections::HashMap;
use std::path::PathBuf;

use serde_json::{Map as JsonMap, Number, Value as JsonValue};
use zbus::zvariant::{OwnedValue, Value};

use crate::error::ExtensionsError;

/// Metadata map of one extension, as sent over the bus.
pub type ExtensionInfo = HashMap<String, OwnedValue>;
/// `ListExtensions` reply: uuid → info.
pub type ExtensionMap = HashMap<String, ExtensionInfo>;

/// Keys the shell adds next to the metadata fields.
pub const SERIALIZED_PROPERTIES: [&str; 7] =
    ["type", "state", "path", "error", "hasPrefs", "hasUpdate", "canChange"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionType {
    System,
    PerUser,
    Unknown(u32),
}

impl From<u32> for ExtensionType {
    fn from(value: u32) -> Self {
        match value {
            1 => Self::System,
            2 => Self::PerUser,
            other => Self::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionState {
    Enabled,
    Disabled,
    Error,
    OutOfDate,
    Downloading,
    Initialized,
    Uninstalled,
    Unknown(u32),
}

impl From<u32> for ExtensionState {
    fn from(value: u32) -> Self {
        match value {
            1 => Self::Enabled,
            2 => Self::Disabled,
            3 => Self::Error,
            4 => Self::OutOfDate,
            5 => Self::Downloading,
            6 => Self::Initialized,
            99 => Self::Uninstalled,
            other => Self::Unknown(other),
        }
    }
}

/// Extension representation handed to the preferences dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionDescriptor {
    pub uuid: String,
    pub kind: ExtensionType,
    pub state: ExtensionState,
    pub path: PathBuf,
    pub error: String,
    pub has_prefs: bool,
    pub has_update: bool,
    pub can_change: bool,
    /// Every key that is not one of [`SERIALIZED_PROPERTIES`].
    pub metadata: ExtensionInfo,
}

impl ExtensionDescriptor {
    /// Splits a serialized extension into shell properties and metadata.
    ///
    /// The uuid comes from the metadata. The shell answers `{}` for extensions
    /// it does not know, which is rejected here.
    pub fn deserialize(info: &ExtensionInfo) -> Result<Self, ExtensionsError> {
        let mut metadata = ExtensionInfo::new();
        for (key, value) in info {
            if !SERIALIZED_PROPERTIES.contains(&key.as_str()) {
                metadata.insert(key.clone(), value.clone());
            }
        }

        let uuid = metadata
            .get("uuid")
            .and_then(|v| as_str(v))
            .filter(|uuid| !uuid.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| {
                ExtensionsError::InvalidDescriptor("Extension info has no uuid".to_string())
            })?;

        let number = |key: &str| info.get(key).and_then(|v| as_u32(v)).unwrap_or(0);
        let flag = |key: &str| info.get(key).and_then(|v| as_bool(v)).unwrap_or(false);
        let string = |key: &str| info.get(key).and_then(|v| as_str(v)).unwrap_or_default().to_owned();

        Ok(Self {
            uuid,
            kind: ExtensionType::from(number("type")),
            state: ExtensionState::from(number("state")),
            path: PathBuf::from(string("path")),
            error: string("error"),
            has_prefs: flag("hasPrefs"),
            has_update: flag("hasUpdate"),
            can_change: flag("canChange"),
            metadata,
        })
    }

    /// Display name from the metadata, falling back to the uuid.
    pub fn name(&self) -> &str {
        self.metadata.get("name").and_then(|v| as_str(v)).unwrap_or(&self.uuid)
    }

    /// JSON form used to hand the descriptor to an out-of-process viewer.
    pub fn to_json(&self) -> JsonValue {
        let metadata: JsonMap<String, JsonValue> = self
            .metadata
            .iter()
            .map(|(key, value)| (key.clone(), variant_to_json(value)))
            .collect();

        serde_json::json!({
            "uuid": self.uuid,
            "path": self.path.to_string_lossy(),
            "error": self.error,
            "hasPrefs": self.has_prefs,
            "hasUpdate": self.has_update,
            "canChange": self.can_change,
            "metadata": metadata,
        })
    }
}

fn unwrap_variant<'a, 'v>(value: &'a Value<'v>) -> &'a Value<'v> {
    match value {
        Value::Value(inner) => unwrap_variant(inner),
        other => other,
    }
}

fn as_str<'a>(value: &'a Value<'_>) -> Option<&'a str> {
    match unwrap_variant(value) {
        Value::Str(s) => Some(s.as_str()),
        _ => None,
    }
}

fn as_bool(value: &Value<'_>) -> Option<bool> {
    match unwrap_variant(value) {
        Value::Bool(b) => Some(*b),
        _ => None,
    }
}

/// The shell serializes numbers as doubles.
fn as_u32(value: &Value<'_>) -> Option<u32> {
    match unwrap_variant(value) {
        Value::F64(n) if *n >= 0.0 && n.fract() == 0.0 && *n <= f64::from(u32::MAX) => Some(*n as u32),
        Value::U8(n) => Some(u32::from(*n)),
        Value::U16(n) => Some(u32::from(*n)),
        Value::U32(n) => Some(*n),
        Value::I16(n) => u32::try_from(*n).ok(),
        Value::I32(n) => u32::try_from(*n).ok(),
        Value::I64(n) => u32::try_from(*n).ok(),
        Value::U64(n) => u32::try_from(*n).ok(),
        _ => None,
    }
}

/// Converts a D-Bus value into JSON. The shell only sends strings, booleans,
/// doubles and string arrays as metadata; anything without a JSON counterpart
/// becomes `null`.
pub fn variant_to_json(value: &Value<'_>) -> JsonValue {
    match unwrap_variant(value) {
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::U8(n) => JsonValue::from(*n),
        Value::U16(n) => JsonValue::from(*n),
        Value::U32(n) => JsonValue::from(*n),
        Value::U64(n) => JsonValue::from(*n),
        Value::I16(n) => JsonValue::from(*n),
        Value::I32(n) => JsonValue::from(*n),
        Value::I64(n) => JsonValue::from(*n),
        Value::F64(n) => Number::from_f64(*n).map(JsonValue::Number).unwrap_or(JsonValue::Null),
        Value::Str(s) => JsonValue::String(s.as_str().to_owned()),
        Value::ObjectPath(p) => JsonValue::String(p.as_str().to_owned()),
        Value::Signature(s) => JsonValue::String(s.as_str().to_owned()),
        Value::Array(array) => JsonValue::Array(array.get().iter().map(variant_to_json).collect()),
        Value::Structure(structure) => {
            JsonValue::Array(structure.fields().iter().map(variant_to_json).collect())
        }
        _ => JsonValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ov<'a>(value: impl Into<Value<'a>>) -> OwnedValue {
        OwnedValue::from(value.into())
    }

    fn sample_info() -> ExtensionInfo {
        let mut info = ExtensionInfo::new();
        info.insert("uuid".into(), ov("foo@bar"));
        info.insert("name".into(), ov("Foo"));
        info.insert("description".into(), ov("Does foo things"));
        info.insert("shell-version".into(), ov(vec!["45", "46"]));
        info.insert("type".into(), ov(2.0f64));
        info.insert("state".into(), ov(1.0f64));
        info.insert("path".into(), ov("/home/user/.local/share/gnome-shell/extensions/foo@bar"));
        info.insert("error".into(), ov(""));
        info.insert("hasPrefs".into(), ov(true));
        info.insert("hasUpdate".into(), ov(false));
        info.insert("canChange".into(), ov(true));
        info
    }

    #[test]
    fn test_deserialize_splits_properties_and_metadata() {
        let descriptor = ExtensionDescriptor::deserialize(&sample_info()).unwrap();

        assert_eq!(descriptor.uuid, "foo@bar");
        assert_eq!(descriptor.kind, ExtensionType::PerUser);
        assert_eq!(descriptor.state, ExtensionState::Enabled);
        assert_eq!(
            descriptor.path,
            PathBuf::from("/home/user/.local/share/gnome-shell/extensions/foo@bar")
        );
        assert!(descriptor.has_prefs);
        assert!(!descriptor.has_update);
        assert!(descriptor.can_change);
        assert_eq!(descriptor.name(), "Foo");

        let mut keys: Vec<&str> = descriptor.metadata.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["description", "name", "shell-version", "uuid"]);
    }

    #[test]
    fn test_deserialize_rejects_empty_info() {
        let err = ExtensionDescriptor::deserialize(&ExtensionInfo::new()).unwrap_err();
        assert!(matches!(err, ExtensionsError::InvalidDescriptor(_)), "got {:?}", err);
        assert_eq!(err.error_name(), "org.freedesktop.DBus.Error.InvalidArgs");
    }

    #[test]
    fn test_missing_shell_properties_use_defaults() {
        let mut info = ExtensionInfo::new();
        info.insert("uuid".into(), ov("bare@example.com"));

        let descriptor = ExtensionDescriptor::deserialize(&info).unwrap();
        assert_eq!(descriptor.kind, ExtensionType::Unknown(0));
        assert_eq!(descriptor.state, ExtensionState::Unknown(0));
        assert!(!descriptor.has_prefs);
        assert_eq!(descriptor.name(), "bare@example.com");
    }

    #[test]
    fn test_state_codes() {
        assert_eq!(ExtensionState::from(3), ExtensionState::Error);
        assert_eq!(ExtensionState::from(99), ExtensionState::Uninstalled);
        assert_eq!(ExtensionState::from(42), ExtensionState::Unknown(42));
        assert_eq!(ExtensionType::from(1), ExtensionType::System);
    }

    #[test]
    fn test_as_u32_rejects_fractional_and_negative_doubles() {
        assert_eq!(as_u32(&Value::F64(4.0)), Some(4));
        assert_eq!(as_u32(&Value::F64(4.5)), None);
        assert_eq!(as_u32(&Value::F64(-1.0)), None);
        assert_eq!(as_u32(&Value::I32(6)), Some(6));
    }

    #[test]
    fn test_to_json_contains_metadata() {
        let descriptor = ExtensionDescriptor::deserialize(&sample_info()).unwrap();
        let json = descriptor.to_json();

        assert_eq!(json["uuid"], "foo@bar");
        assert_eq!(json["hasPrefs"], true);
        assert_eq!(json["metadata"]["name"], "Foo");
        assert_eq!(json["metadata"]["shell-version"], serde_json::json!(["45", "46"]));
        assert!(json["metadata"].get("state").is_none());
    }
}
