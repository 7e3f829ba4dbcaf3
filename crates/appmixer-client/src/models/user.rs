//! User wire models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::stringify_value;

/// Default sort order for user listings (newest first).
pub const DEFAULT_USER_SORT: &str = "created:-1";

/// Default page size for user listings.
pub const DEFAULT_USER_LIMIT: u32 = 30;

/// User as returned by `GET /users/{id}`, `GET /users` and `GET /user`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,

    #[serde(default, deserialize_with = "super::null_as_default")]
    pub username: String,

    #[serde(default, deserialize_with = "super::null_as_default")]
    pub is_active: bool,

    #[serde(default, deserialize_with = "super::null_as_default")]
    pub email: String,

    /// Either an object or a bare plan name, depending on the deployment.
    #[serde(default)]
    pub plan: Option<serde_json::Value>,

    #[serde(default, deserialize_with = "super::null_as_default")]
    pub scope: Vec<String>,

    #[serde(default)]
    pub vendor: Option<Vec<String>>,

    #[serde(default, deserialize_with = "super::null_as_default")]
    pub created: String,
}

impl UserResponse {
    /// Plan as a string map (see [`normalize_plan`]).
    #[must_use]
    pub fn plan_map(&self) -> BTreeMap<String, String> {
        self.plan.as_ref().map(normalize_plan).unwrap_or_default()
    }

    /// Vendor list, empty when the API omits it.
    #[must_use]
    pub fn vendor_list(&self) -> Vec<String> {
        self.vendor.clone().unwrap_or_default()
    }
}

/// Normalize the polymorphic `plan` field into a string map.
///
/// An object keeps its keys with values stringified, a bare string becomes
/// `{"name": <plan>}`, anything else yields an empty map.
#[must_use]
pub fn normalize_plan(plan: &serde_json::Value) -> BTreeMap<String, String> {
    match plan {
        serde_json::Value::Object(obj) => obj
            .iter()
            .map(|(k, v)| (k.clone(), stringify_value(v)))
            .collect(),
        serde_json::Value::String(name) => BTreeMap::from([("name".to_string(), name.clone())]),
        _ => BTreeMap::new(),
    }
}

/// Body of `POST /user`.
#[derive(Clone, Serialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for CreateUserRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserRequest")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Response of `POST /user`. Carries no id; the caller looks it up by username.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserResponse {
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub token: String,
}

/// Body of `PUT /users/{id}`. Absent fields are left unchanged remotely.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<Vec<String>>,
}

impl UpdateUserRequest {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scope.is_none() && self.vendor.is_none()
    }
}

/// Body of `POST /user/reset-password`.
#[derive(Clone, Serialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for ResetPasswordRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetPasswordRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Response of `DELETE /users/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteTicket {
    pub ticket: String,
}

/// State of a background user deletion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletionStatus {
    Completed,
    Failed,
    Cancelled,
    /// Any status the API reports that is not terminal.
    #[default]
    #[serde(other)]
    Pending,
}

impl DeletionStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DeletionStatus::Completed => "completed",
            DeletionStatus::Failed => "failed",
            DeletionStatus::Cancelled => "cancelled",
            DeletionStatus::Pending => "pending",
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DeletionStatus::Pending)
    }
}

impl std::fmt::Display for DeletionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response of `GET /users/{id}/delete-status/{ticket}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteStatus {
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub status: DeletionStatus,

    #[serde(default, deserialize_with = "super::null_as_default")]
    pub steps_done: u32,

    #[serde(default, deserialize_with = "super::null_as_default")]
    pub steps_total: u32,
}

impl DeleteStatus {
    #[must_use]
    pub fn new(status: DeletionStatus) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }
}

/// Query for `GET /users`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserListQuery {
    pub filter: Option<String>,
    pub pattern: Option<String>,
    pub sort: String,
    pub limit: u32,
    pub offset: u32,
}

impl Default for UserListQuery {
    fn default() -> Self {
        Self {
            filter: None,
            pattern: None,
            sort: DEFAULT_USER_SORT.to_string(),
            limit: DEFAULT_USER_LIMIT,
            offset: 0,
        }
    }
}

impl UserListQuery {
    /// Encoded query string, without the leading `?`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(filter) = self.filter.as_deref().filter(|f| !f.is_empty()) {
            params.push(("filter", filter.to_string()));
        }
        if let Some(pattern) = self.pattern.as_deref().filter(|p| !p.is_empty()) {
            params.push(("pattern", pattern.to_string()));
        }
        if !self.sort.is_empty() {
            params.push(("sort", self.sort.clone()));
        }
        params.push(("limit", self.limit.to_string()));
        params.push(("offset", self.offset.to_string()));

        params
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Response of `GET /users/count`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct UserCount {
    pub count: u64,
}
