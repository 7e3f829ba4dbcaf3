//! User endpoints.

use tracing::debug;

use crate::client::{segment, AppmixerClient};
use crate::error::ClientResult;
use crate::models::{
    CreateUserRequest, CreateUserResponse, DeleteStatus, DeleteTicket, ResetPasswordRequest,
    UpdateUserRequest, UserCount, UserListQuery, UserResponse,
};
use crate::scope::{require_scope, ADMIN_SCOPE};

impl AppmixerClient {
    /// Register a user (`POST /user`). The response carries no id.
    pub async fn create_user(&self, request: &CreateUserRequest) -> ClientResult<CreateUserResponse> {
        debug!(username = %request.username, "Creating user");
        self.post("/user", request).await
    }

    /// Users whose username or email matches `pattern` (`GET /users?pattern=`).
    pub async fn find_users_by_pattern(&self, pattern: &str) -> ClientResult<Vec<UserResponse>> {
        let path = format!("/users?pattern={}", urlencoding::encode(pattern));
        self.get(&path).await
    }

    /// Fetch one user by id.
    pub async fn get_user(&self, id: &str) -> ClientResult<UserResponse> {
        self.get(&format!("/users/{}", segment(id))).await
    }

    /// Fetch one user by id, mapping not-found to `None`.
    pub async fn find_user(&self, id: &str) -> ClientResult<Option<UserResponse>> {
        match self.get_user(id).await {
            Ok(user) => Ok(Some(user)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// The authenticated caller (`GET /user`).
    pub async fn current_user(&self) -> ClientResult<UserResponse> {
        self.get("/user").await
    }

    /// Update scope and/or vendor of a user (`PUT /users/{id}`).
    pub async fn update_user(&self, id: &str, request: &UpdateUserRequest) -> ClientResult<()> {
        debug!(user_id = %id, "Updating user permissions");
        self.put_unit(&format!("/users/{}", segment(id)), request)
            .await
    }

    /// Set another user's password (`POST /user/reset-password`).
    pub async fn reset_password(&self, request: &ResetPasswordRequest) -> ClientResult<()> {
        debug!(email = %request.email, "Resetting user password");
        self.post_unit("/user/reset-password", request).await
    }

    /// Start a background deletion (`DELETE /users/{id}`).
    pub async fn delete_user(&self, id: &str) -> ClientResult<DeleteTicket> {
        debug!(user_id = %id, "Requesting user deletion");
        self.delete(&format!("/users/{}", segment(id))).await
    }

    /// Progress of a background deletion.
    pub async fn delete_status(&self, id: &str, ticket: &str) -> ClientResult<DeleteStatus> {
        self.get(&format!(
            "/users/{}/delete-status/{}",
            segment(id),
            segment(ticket)
        ))
        .await
    }

    /// List all users. Requires the admin scope.
    pub async fn list_users(&self, query: &UserListQuery) -> ClientResult<Vec<UserResponse>> {
        require_scope(self.session(), ADMIN_SCOPE, "Listing all users")?;
        self.get(&format!("/users?{}", query.to_query_string()))
            .await
    }

    /// Total number of users. Requires the admin scope.
    pub async fn count_users(&self) -> ClientResult<u64> {
        require_scope(self.session(), ADMIN_SCOPE, "Getting user count")?;
        let count: UserCount = self.get("/users/count").await?;
        Ok(count.count)
    }
}
