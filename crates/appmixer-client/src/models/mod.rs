//! Wire models for the Appmixer API.

pub mod account;
pub mod app;
pub mod user;

pub use account::{
    AccountResponse, CreateAccountRequest, CreateAccountResponse, UpdateAccountRequest,
};
pub use app::{AppSummary, ComponentManifest};
pub use user::{
    normalize_plan, CreateUserRequest, CreateUserResponse, DeleteStatus, DeleteTicket,
    DeletionStatus, ResetPasswordRequest, UpdateUserRequest, UserCount, UserListQuery,
    UserResponse,
};

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

/// Decode a field whose `null` means the same as a missing key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Render a JSON value the way the API's loosely typed maps are displayed.
///
/// Strings are taken verbatim (no surrounding quotes), `null` becomes an empty
/// string, everything else uses its compact JSON form.
#[must_use]
pub fn stringify_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Coerce a loosely typed JSON object into a string map.
#[must_use]
pub fn stringify_map(map: &serde_json::Map<String, serde_json::Value>) -> BTreeMap<String, String> {
    map.iter()
        .map(|(k, v)| (k.clone(), stringify_value(v)))
        .collect()
}
