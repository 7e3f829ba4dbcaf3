//! Desired state loaded from YAML.
//!
//! ```yaml
//! version: "1"
//! users:
//!   - name: alice
//!     username: alice
//!     email: alice@example.com
//!     password: s3cret-pass
//!     scope: [user]
//! accounts:
//!   - name: support-slack
//!     service: appmixer:slack
//!     display_name: Support bot
//!     token:
//!       apiKey: xoxb-...
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use appmixer_reconciler::{AccountSpec, UserSpec, MIN_PASSWORD_LENGTH};
use serde::Deserialize;

use crate::error::{CliError, CliResult};

/// Supported desired-state format version.
pub const SUPPORTED_VERSION: &str = "1";

/// A user entry, keyed by a local name.
#[derive(Debug, Clone, Deserialize)]
pub struct UserEntry {
    pub name: String,
    #[serde(flatten)]
    pub spec: UserSpec,
}

/// An account entry, keyed by a local name.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountEntry {
    pub name: String,
    #[serde(flatten)]
    pub spec: AccountSpec,
}

/// Root of a desired-state file.
#[derive(Debug, Clone, Deserialize)]
pub struct DesiredState {
    pub version: String,
    #[serde(default)]
    pub users: Vec<UserEntry>,
    #[serde(default)]
    pub accounts: Vec<AccountEntry>,
}

impl DesiredState {
    /// Load and parse a YAML file.
    pub fn load(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Err(CliError::Validation(format!(
                "File not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| CliError::Io(format!("Failed to read file {}: {}", path.display(), e)))?;

        Self::parse(&content)
    }

    /// Parse YAML text, reporting the location of syntax errors.
    pub fn parse(content: &str) -> CliResult<Self> {
        serde_yaml::from_str(content).map_err(|e| {
            let location = if let Some(loc) = e.location() {
                format!(" at line {}, column {}", loc.line(), loc.column())
            } else {
                String::new()
            };
            CliError::Validation(format!("Invalid YAML{location}: {e}"))
        })
    }

    /// Check the version, entry names, and fields that can be checked offline.
    pub fn validate(&self) -> CliResult<()> {
        if self.version != SUPPORTED_VERSION {
            return Err(CliError::Validation(format!(
                "Unsupported config version '{}'. Only version '{SUPPORTED_VERSION}' is supported.",
                self.version
            )));
        }

        check_unique_names("user", self.users.iter().map(|u| u.name.as_str()))?;
        check_unique_names("account", self.accounts.iter().map(|a| a.name.as_str()))?;

        let mut usernames = HashSet::new();
        for user in &self.users {
            let spec = &user.spec;
            if spec.username.trim().is_empty() {
                return Err(CliError::Validation(format!(
                    "User '{}' must have a username",
                    user.name
                )));
            }
            if !spec.email.contains('@') {
                return Err(CliError::Validation(format!(
                    "User '{}' has an invalid email '{}'",
                    user.name, spec.email
                )));
            }
            if spec.password.chars().count() < MIN_PASSWORD_LENGTH {
                return Err(CliError::Validation(format!(
                    "User '{}': password must be at least {MIN_PASSWORD_LENGTH} characters long",
                    user.name
                )));
            }
            if !usernames.insert(spec.username.as_str()) {
                return Err(CliError::Validation(format!(
                    "Username '{}' is declared more than once",
                    spec.username
                )));
            }
        }

        for account in &self.accounts {
            if account.spec.service.trim().is_empty() {
                return Err(CliError::Validation(format!(
                    "Account '{}' must have a service",
                    account.name
                )));
            }
            if account.spec.token.is_empty() {
                return Err(CliError::Validation(format!(
                    "Account '{}' must have a token",
                    account.name
                )));
            }
        }

        Ok(())
    }

    /// User specs keyed by entry name.
    #[must_use]
    pub fn user_specs(&self) -> BTreeMap<String, UserSpec> {
        self.users
            .iter()
            .map(|u| (u.name.clone(), u.spec.clone()))
            .collect()
    }

    /// Account specs keyed by entry name.
    #[must_use]
    pub fn account_specs(&self) -> BTreeMap<String, AccountSpec> {
        self.accounts
            .iter()
            .map(|a| (a.name.clone(), a.spec.clone()))
            .collect()
    }
}

fn check_unique_names<'a>(kind: &str, names: impl Iterator<Item = &'a str>) -> CliResult<()> {
    let mut seen = HashSet::new();
    for name in names {
        if name.is_empty() || name.len() > 64 {
            return Err(CliError::Validation(format!(
                "{kind} name '{name}' must be 1-64 characters"
            )));
        }
        if !seen.insert(name) {
            return Err(CliError::Validation(format!(
                "Duplicate {kind} name '{name}'"
            )));
        }
    }
    Ok(())
}
