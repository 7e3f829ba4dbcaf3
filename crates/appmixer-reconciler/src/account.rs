//! Account reconciler.

use std::collections::BTreeMap;

use appmixer_client::models::{CreateAccountRequest, UpdateAccountRequest};
use appmixer_client::{AppmixerClient, ClientError};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::error::{ReconcileError, ReconcileResult};
use crate::state::{AccountRecord, AccountSpec};
use crate::traits::Reconciler;

const KIND: &str = "account";

/// How an account is looked up on read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AccountReadStrategy {
    /// `GET /accounts/{id}`.
    #[default]
    Direct,
    /// `GET /accounts`, then match on `accountId`. For deployments whose
    /// direct lookup is unreliable.
    ListAndFilter,
}

/// Known causes of a rejected account creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountCreateFailure {
    InvalidCredentials,
    MissingKey,
    Other,
}

impl AccountCreateFailure {
    /// Classify from the API's error message.
    ///
    /// The API reports these only as free text, so this matches on phrases.
    #[must_use]
    pub fn classify(err: &ClientError) -> Self {
        let message = err.to_string();
        if message.contains("Credentials validation failed") || message.contains("Invalid credentials")
        {
            AccountCreateFailure::InvalidCredentials
        } else if message.contains("missing") && message.contains("required key") {
            AccountCreateFailure::MissingKey
        } else {
            AccountCreateFailure::Other
        }
    }

    fn into_error(self, service: &str, source: ClientError) -> ReconcileError {
        let service = service.to_string();
        match self {
            AccountCreateFailure::InvalidCredentials => {
                ReconcileError::InvalidCredentials { service, source }
            }
            AccountCreateFailure::MissingKey => {
                ReconcileError::MissingCredentialKey { service, source }
            }
            AccountCreateFailure::Other => ReconcileError::AccountCreate { service, source },
        }
    }
}

/// Hex SHA-256 over the key-sorted JSON form of a token map.
#[must_use]
pub fn token_fingerprint(token: &BTreeMap<String, serde_json::Value>) -> String {
    // BTreeMap serializes in key order, so equal maps hash equally.
    let canonical = serde_json::to_vec(token).unwrap_or_default();
    hex::encode(Sha256::digest(&canonical))
}

/// Check that every token value is a string and return the string map.
fn string_token(token: &BTreeMap<String, serde_json::Value>) -> ReconcileResult<BTreeMap<String, String>> {
    token
        .iter()
        .map(|(key, value)| match value {
            serde_json::Value::String(s) => Ok((key.clone(), s.clone())),
            _ => Err(ReconcileError::Validation(format!(
                "value for key '{key}' in 'token' map is not a string"
            ))),
        })
        .collect()
}

/// Reconciler for service-linked accounts.
#[derive(Debug, Clone, Default)]
pub struct AccountReconciler {
    read_strategy: AccountReadStrategy,
}

impl AccountReconciler {
    #[must_use]
    pub fn new(read_strategy: AccountReadStrategy) -> Self {
        Self { read_strategy }
    }

    #[must_use]
    pub fn read_strategy(&self) -> AccountReadStrategy {
        self.read_strategy
    }

    async fn fetch(
        &self,
        client: &AppmixerClient,
        id: &str,
        token_fingerprint: &str,
    ) -> ReconcileResult<Option<AccountRecord>> {
        let found = match self.read_strategy {
            AccountReadStrategy::Direct => client
                .find_account(id)
                .await
                .map_err(|e| ReconcileError::transport(KIND, "read", id, e))?,
            AccountReadStrategy::ListAndFilter => client
                .list_accounts(None)
                .await
                .map_err(|e| ReconcileError::transport(KIND, "list accounts to read", id, e))?
                .into_iter()
                .find(|a| a.account_id == id),
        };

        match found {
            Some(account) => Ok(Some(AccountRecord::from_response(&account, token_fingerprint))),
            None => {
                warn!(account_id = %id, "Account not found, removing from state");
                Ok(None)
            }
        }
    }

    async fn refresh(
        &self,
        client: &AppmixerClient,
        id: &str,
        token_fingerprint: &str,
    ) -> ReconcileResult<AccountRecord> {
        self.fetch(client, id, token_fingerprint)
            .await?
            .ok_or_else(|| ReconcileError::NotFound {
                kind: "Account",
                id: id.to_string(),
            })
    }
}

#[async_trait]
impl Reconciler for AccountReconciler {
    type Spec = AccountSpec;
    type Record = AccountRecord;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn record_id<'a>(&self, record: &'a AccountRecord) -> &'a str {
        &record.id
    }

    fn requires_replacement(&self, record: &AccountRecord, spec: &AccountSpec) -> bool {
        if record.service != spec.service {
            return true;
        }
        // Imported records have no fingerprint yet and adopt the configured token.
        !record.token_fingerprint.is_empty()
            && record.token_fingerprint != token_fingerprint(&spec.token)
    }

    fn changed_fields(&self, record: &AccountRecord, spec: &AccountSpec) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if spec
            .display_name
            .as_ref()
            .is_some_and(|name| *name != record.display_name)
        {
            fields.push("display_name");
        }
        // Imported records record the configured token's fingerprint on their
        // first update. Nothing is sent for it.
        if record.token_fingerprint.is_empty() {
            fields.push("token (adopted locally)");
        }
        fields
    }

    async fn create(
        &self,
        client: &AppmixerClient,
        spec: &AccountSpec,
    ) -> ReconcileResult<AccountRecord> {
        info!(service = %spec.service, "Creating Appmixer account");

        let token = string_token(&spec.token)?;
        let fingerprint = token_fingerprint(&spec.token);

        let response = client
            .create_account(&CreateAccountRequest {
                service: spec.service.clone(),
                token,
                display_name: spec.display_name.clone(),
            })
            .await
            .map_err(|e| AccountCreateFailure::classify(&e).into_error(&spec.service, e))?;

        if response.account_id.is_empty() {
            return Err(ReconcileError::MissingId {
                kind: KIND,
                context: format!("service {}", spec.service),
            });
        }

        info!(
            account_id = %response.account_id,
            token_id = %response.token_id,
            "Created Appmixer account"
        );

        Ok(AccountRecord {
            id: response.account_id,
            service: spec.service.clone(),
            display_name: spec.display_name.clone().unwrap_or_default(),
            token_fingerprint: fingerprint,
            ..AccountRecord::default()
        })
    }

    async fn read(
        &self,
        client: &AppmixerClient,
        record: &AccountRecord,
    ) -> ReconcileResult<Option<AccountRecord>> {
        self.fetch(client, &record.id, &record.token_fingerprint)
            .await
    }

    async fn update(
        &self,
        client: &AppmixerClient,
        record: &AccountRecord,
        spec: &AccountSpec,
    ) -> ReconcileResult<AccountRecord> {
        let id = record.id.as_str();

        if let Some(display_name) = spec
            .display_name
            .as_ref()
            .filter(|name| **name != record.display_name)
        {
            info!(account_id = %id, display_name = %display_name, "Updating account display name");
            client
                .update_account(
                    id,
                    &UpdateAccountRequest {
                        display_name: display_name.clone(),
                    },
                )
                .await
                .map_err(|e| ReconcileError::transport(KIND, "update display_name for", id, e))?;
        } else {
            debug!(account_id = %id, "No display name change");
        }

        let fingerprint = if record.token_fingerprint.is_empty() {
            token_fingerprint(&spec.token)
        } else {
            record.token_fingerprint.clone()
        };
        self.refresh(client, id, &fingerprint).await
    }

    async fn delete(&self, client: &AppmixerClient, record: &AccountRecord) -> ReconcileResult<()> {
        let id = record.id.as_str();
        info!(account_id = %id, "Deleting Appmixer account");

        match client.delete_account(id).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                warn!(account_id = %id, "Account already deleted");
                Ok(())
            }
            Err(e) => Err(ReconcileError::transport(KIND, "delete", id, e)),
        }
    }

    async fn import(&self, client: &AppmixerClient, id: &str) -> ReconcileResult<AccountRecord> {
        info!(account_id = %id, "Importing Appmixer account");
        self.refresh(client, id, "").await
    }
}
