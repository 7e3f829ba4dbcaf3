//! Account wire models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::stringify_map;

/// Account as returned by `GET /accounts` and `GET /accounts/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub account_id: String,

    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,

    /// `null` when the account was never given a display name.
    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default, deserialize_with = "super::null_as_default")]
    pub service: String,

    #[serde(default, deserialize_with = "super::null_as_default")]
    pub user_id: String,

    #[serde(default)]
    pub profile_info: Option<serde_json::Map<String, serde_json::Value>>,

    #[serde(default, deserialize_with = "super::null_as_default")]
    pub icon: String,

    #[serde(default, deserialize_with = "super::null_as_default")]
    pub label: String,
}

impl AccountResponse {
    /// Display name with `null` mapped to the empty string.
    #[must_use]
    pub fn display_name_or_empty(&self) -> String {
        self.display_name.clone().unwrap_or_default()
    }

    /// Profile info with every value rendered as a string.
    #[must_use]
    pub fn profile_info_strings(&self) -> BTreeMap<String, String> {
        self.profile_info
            .as_ref()
            .map(stringify_map)
            .unwrap_or_default()
    }
}

/// Body of `POST /accounts`.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub service: String,
    pub token: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl std::fmt::Debug for CreateAccountRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateAccountRequest")
            .field("service", &self.service)
            .field("token", &"[REDACTED]")
            .field("display_name", &self.display_name)
            .finish()
    }
}

/// Response of `POST /accounts`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountResponse {
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub account_id: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub token_id: String,
}

/// Body of `PUT /accounts/{id}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    pub display_name: String,
}
