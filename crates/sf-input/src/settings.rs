//! Opaque provider settings
//!
//! The coordinator stores one settings blob per provider and forwards it,
//! serialized as JSON text, to `InputProvider::start`. It never looks
//! inside except to build and recognize the probe marker.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};

use sf_core::error::ProviderError;

/// Key of the marker object passed during the registration probe.
///
/// Reserved: provider tables from the configuration file must not use it.
pub const PROBE_KEY: &str = "__probe";

/// Settings blob for one provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings(Value);

impl ProviderSettings {
    /// Empty settings (`{}`)
    pub fn empty() -> Self {
        ProviderSettings(Value::Object(Map::new()))
    }

    /// Marker configuration used by the registration probe
    pub fn probe() -> Self {
        ProviderSettings(json!({ PROBE_KEY: true }))
    }

    pub fn from_value(value: Value) -> Self {
        ProviderSettings(value)
    }

    /// Build settings from any serializable structure
    pub fn from_serialize<T: Serialize>(settings: &T) -> Result<Self, ProviderError> {
        serde_json::to_value(settings)
            .map(ProviderSettings)
            .map_err(|e| ProviderError::InvalidSettings(e.to_string()))
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Text handed to `start`
    pub fn to_json(&self) -> String {
        self.0.to_string()
    }

    /// Whether serialized settings are the probe marker
    pub fn is_probe(settings: &str) -> bool {
        serde_json::from_str::<Value>(settings)
            .ok()
            .and_then(|value| value.get(PROBE_KEY).and_then(Value::as_bool))
            .unwrap_or(false)
    }

    /// Parse serialized settings into a provider's own structure.
    ///
    /// Empty text is treated as `{}`.
    pub fn parse<T: DeserializeOwned>(settings: &str) -> Result<T, ProviderError> {
        let text = if settings.trim().is_empty() { "{}" } else { settings };
        serde_json::from_str(text).map_err(|e| ProviderError::InvalidSettings(e.to_string()))
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Value> for ProviderSettings {
    fn from(value: Value) -> Self {
        ProviderSettings(value)
    }
}
