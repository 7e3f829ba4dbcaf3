//! Desired specs and reconciled records.
//!
//! A spec is what the host wants; a record is what the last operation saw
//! remotely, plus the few values that are write-only on the API side.

use std::collections::BTreeMap;

use appmixer_client::models::{AccountResponse, UserResponse};
use serde::{Deserialize, Serialize};

/// Desired user.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSpec {
    /// Login name. Fixed after creation.
    pub username: String,

    pub email: String,

    pub password: String,

    /// `None` leaves the remote scope as it is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Vec<String>>,

    /// `None` leaves the remote vendor list as it is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<Vec<String>>,
}

impl std::fmt::Debug for UserSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserSpec")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("scope", &self.scope)
            .field("vendor", &self.vendor)
            .finish()
    }
}

/// Reconciled user.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub email: String,

    /// Last password this host set; the API never returns it.
    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub is_active: bool,

    #[serde(default)]
    pub plan: BTreeMap<String, String>,

    #[serde(default)]
    pub scope: Vec<String>,

    #[serde(default)]
    pub vendor: Vec<String>,

    #[serde(default)]
    pub created: String,
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("is_active", &self.is_active)
            .field("plan", &self.plan)
            .field("scope", &self.scope)
            .field("vendor", &self.vendor)
            .field("created", &self.created)
            .finish()
    }
}

impl UserRecord {
    /// Build a record from an API response, keeping a known password.
    #[must_use]
    pub fn from_response(user: &UserResponse, password: impl Into<String>) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            password: password.into(),
            is_active: user.is_active,
            plan: user.plan_map(),
            scope: user.scope.clone(),
            vendor: user.vendor_list(),
            created: user.created.clone(),
        }
    }
}

/// Desired service-linked account.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSpec {
    /// Service identifier, e.g. `appmixer:slack`. Fixed after creation.
    pub service: String,

    /// Credentials for the service. Values must be strings. Fixed after
    /// creation and never stored.
    pub token: BTreeMap<String, serde_json::Value>,

    /// `None` leaves the remote display name as it is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl std::fmt::Debug for AccountSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountSpec")
            .field("service", &self.service)
            .field("token", &"[REDACTED]")
            .field("display_name", &self.display_name)
            .finish()
    }
}

/// Reconciled account. Holds a fingerprint of the token, never the token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: String,
    pub service: String,

    /// Empty when the API reports `null`.
    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub user_id: String,

    #[serde(default)]
    pub profile_info: BTreeMap<String, String>,

    #[serde(default)]
    pub icon: String,

    #[serde(default)]
    pub label: String,

    /// Hex SHA-256 of the token the account was created with. Empty for
    /// imported accounts until the next update adopts the configured token.
    #[serde(default)]
    pub token_fingerprint: String,
}

impl AccountRecord {
    /// Build a record from an API response, keeping a known fingerprint.
    #[must_use]
    pub fn from_response(account: &AccountResponse, token_fingerprint: impl Into<String>) -> Self {
        Self {
            id: account.account_id.clone(),
            service: account.service.clone(),
            display_name: account.display_name_or_empty(),
            name: account.name.clone(),
            user_id: account.user_id.clone(),
            profile_info: account.profile_info_strings(),
            icon: account.icon.clone(),
            label: account.label.clone(),
            token_fingerprint: token_fingerprint.into(),
        }
    }
}
