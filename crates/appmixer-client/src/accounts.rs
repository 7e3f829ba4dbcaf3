//! Account endpoints.

use tracing::debug;

use crate::client::{segment, AppmixerClient};
use crate::error::ClientResult;
use crate::models::{
    AccountResponse, CreateAccountRequest, CreateAccountResponse, UpdateAccountRequest,
};

impl AppmixerClient {
    /// Link a service account (`POST /accounts`).
    pub async fn create_account(
        &self,
        request: &CreateAccountRequest,
    ) -> ClientResult<CreateAccountResponse> {
        debug!(service = %request.service, "Creating account");
        self.post("/accounts", request).await
    }

    /// Fetch one account by id (`GET /accounts/{id}`).
    pub async fn get_account(&self, id: &str) -> ClientResult<AccountResponse> {
        self.get(&format!("/accounts/{}", segment(id))).await
    }

    /// Fetch one account by id, mapping not-found to `None`.
    pub async fn find_account(&self, id: &str) -> ClientResult<Option<AccountResponse>> {
        match self.get_account(id).await {
            Ok(account) => Ok(Some(account)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// List the caller's accounts, optionally filtered (`GET /accounts?filter=`).
    pub async fn list_accounts(&self, filter: Option<&str>) -> ClientResult<Vec<AccountResponse>> {
        let path = match filter.filter(|f| !f.is_empty()) {
            Some(filter) => format!("/accounts?filter={}", urlencoding::encode(filter)),
            None => "/accounts".to_string(),
        };
        debug!(path = %path, "Listing accounts");
        self.get(&path).await
    }

    /// Rename an account (`PUT /accounts/{id}`).
    pub async fn update_account(&self, id: &str, request: &UpdateAccountRequest) -> ClientResult<()> {
        debug!(account_id = %id, "Updating account");
        self.put_unit(&format!("/accounts/{}", segment(id)), request)
            .await
    }

    /// Remove an account (`DELETE /accounts/{id}`).
    pub async fn delete_account(&self, id: &str) -> ClientResult<()> {
        debug!(account_id = %id, "Deleting account");
        self.delete_unit(&format!("/accounts/{}", segment(id)))
            .await
    }
}
