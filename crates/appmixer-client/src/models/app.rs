//! App catalog wire models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::stringify_map;

/// Entry of the `GET /apps` catalog. The API keys entries by app name, so
/// `name` is filled from the key when the catalog is flattened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSummary {
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub label: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub icon: String,
}

/// Component manifest from `GET /apps/components`.
///
/// Port and property definitions vary per component and are kept as raw JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentManifest {
    pub name: String,

    #[serde(default, deserialize_with = "super::null_as_default")]
    pub author: String,

    #[serde(default, deserialize_with = "super::null_as_default")]
    pub icon: String,

    #[serde(default, deserialize_with = "super::null_as_default")]
    pub description: String,

    #[serde(default)]
    pub auth: Option<serde_json::Map<String, serde_json::Value>>,

    #[serde(default)]
    pub in_ports: Option<serde_json::Value>,

    #[serde(default)]
    pub out_ports: Option<serde_json::Value>,

    #[serde(default)]
    pub properties: Option<serde_json::Value>,

    #[serde(default, deserialize_with = "super::null_as_default")]
    pub webhook: bool,

    #[serde(default, deserialize_with = "super::null_as_default")]
    pub webhook_async: bool,

    #[serde(default, deserialize_with = "super::null_as_default")]
    pub http_request_methods: Vec<String>,

    #[serde(default)]
    pub state: Option<serde_json::Map<String, serde_json::Value>>,

    #[serde(default, deserialize_with = "super::null_as_default")]
    pub private: bool,
}

impl ComponentManifest {
    #[must_use]
    pub fn auth_strings(&self) -> BTreeMap<String, String> {
        self.auth.as_ref().map(stringify_map).unwrap_or_default()
    }

    #[must_use]
    pub fn state_strings(&self) -> BTreeMap<String, String> {
        self.state.as_ref().map(stringify_map).unwrap_or_default()
    }
}
