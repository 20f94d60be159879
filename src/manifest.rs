use std::collections::BTreeMap;

use crate::foundation::error::{OverlayError, OverlayResult};

/// The JSON document served at a template manifest URL.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct JsonManifest {
    /// Manifest URLs that must never be loaded.
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub blacklist: Vec<UrlEntry>,
    /// Manifest URLs to load once there is room.
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub whitelist: Vec<UrlEntry>,
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub templates: Vec<TemplateDescriptor>,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UrlEntry {
    pub url: String,
}

/// Rendering parameters of one template, kept verbatim for the template entity to interpret.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TemplateDescriptor {
    #[serde(flatten)]
    pub params: BTreeMap<String, serde_json::Value>,
}

impl TemplateDescriptor {
    pub fn name(&self) -> Option<&str> {
        self.params.get("name").and_then(serde_json::Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.params.get(key)
    }
}

fn null_as_empty<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    let v: Option<Vec<T>> = serde::Deserialize::deserialize(d)?;
    Ok(v.unwrap_or_default())
}

pub fn parse_manifest(bytes: &[u8]) -> OverlayResult<JsonManifest> {
    serde_json::from_slice(bytes).map_err(|e| OverlayError::malformed_manifest(e.to_string()))
}
