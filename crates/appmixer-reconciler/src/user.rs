//! User reconciler.
//!
//! Users carry two safety rules on top of the admin gate: the authenticated
//! caller can neither change its own scope/vendor/password nor delete
//! itself. All local checks run before the first request so a rejected
//! operation leaves nothing half-applied.

use appmixer_client::models::{CreateUserRequest, ResetPasswordRequest, UpdateUserRequest};
use appmixer_client::{has_scope, AppmixerClient, ADMIN_SCOPE};
use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{ReconcileError, ReconcileResult};
use crate::poller::DeletionPoller;
use crate::state::{UserRecord, UserSpec};
use crate::traits::Reconciler;

/// Minimum password length accepted by the API, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 5;

const KIND: &str = "user";

/// Reconciler for Appmixer users.
#[derive(Debug, Clone, Default)]
pub struct UserReconciler {
    poller: DeletionPoller,
}

/// What an update would change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct UserChanges {
    scope: bool,
    vendor: bool,
    password: bool,
}

impl UserChanges {
    /// An unset or empty declared list leaves the remote value alone.
    fn between(record: &UserRecord, spec: &UserSpec) -> Self {
        Self {
            scope: declared(spec.scope.as_ref()).is_some_and(|s| *s != record.scope),
            vendor: declared(spec.vendor.as_ref()).is_some_and(|v| *v != record.vendor),
            password: spec.password != record.password,
        }
    }

    fn permissions(&self) -> bool {
        self.scope || self.vendor
    }

    fn any(&self) -> bool {
        self.permissions() || self.password
    }

    fn fields(&self) -> Vec<&'static str> {
        [
            (self.scope, "scope"),
            (self.vendor, "vendor"),
            (self.password, "password"),
        ]
        .into_iter()
        .filter_map(|(changed, field)| changed.then_some(field))
        .collect()
    }
}

fn validate_password(password: &str) -> ReconcileResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ReconcileError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    Ok(())
}

fn require_admin(client: &AppmixerClient, operation: &str) -> ReconcileResult<()> {
    if has_scope(client.session(), ADMIN_SCOPE) {
        Ok(())
    } else {
        Err(ReconcileError::PermissionDenied {
            operation: operation.to_string(),
        })
    }
}

fn declared(list: Option<&Vec<String>>) -> Option<&Vec<String>> {
    list.filter(|l| !l.is_empty())
}

impl UserReconciler {
    #[must_use]
    pub fn new(poller: DeletionPoller) -> Self {
        Self { poller }
    }

    #[must_use]
    pub fn poller(&self) -> &DeletionPoller {
        &self.poller
    }

    /// Look up the id of a freshly created user by exact username.
    async fn recover_id(&self, client: &AppmixerClient, username: &str) -> ReconcileResult<String> {
        let candidates = client
            .find_users_by_pattern(username)
            .await
            .map_err(|e| ReconcileError::transport(KIND, "look up", username, e))?;

        candidates
            .into_iter()
            .find(|u| u.username == username)
            .map(|u| u.id)
            .ok_or_else(|| ReconcileError::IdentityRecovery {
                username: username.to_string(),
            })
    }

    async fn fetch(
        &self,
        client: &AppmixerClient,
        id: &str,
        password: &str,
    ) -> ReconcileResult<Option<UserRecord>> {
        let user = client
            .find_user(id)
            .await
            .map_err(|e| ReconcileError::transport(KIND, "read", id, e))?;

        match user {
            Some(user) => Ok(Some(UserRecord::from_response(&user, password))),
            None => {
                info!(user_id = %id, "User no longer exists");
                Ok(None)
            }
        }
    }

    /// Read after a write; the entity must still exist.
    async fn refresh(
        &self,
        client: &AppmixerClient,
        id: &str,
        password: &str,
    ) -> ReconcileResult<UserRecord> {
        self.fetch(client, id, password)
            .await?
            .ok_or_else(|| ReconcileError::NotFound {
                kind: "User",
                id: id.to_string(),
            })
    }
}

#[async_trait]
impl Reconciler for UserReconciler {
    type Spec = UserSpec;
    type Record = UserRecord;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn record_id<'a>(&self, record: &'a UserRecord) -> &'a str {
        &record.id
    }

    fn requires_replacement(&self, record: &UserRecord, spec: &UserSpec) -> bool {
        record.username != spec.username
    }

    fn changed_fields(&self, record: &UserRecord, spec: &UserSpec) -> Vec<&'static str> {
        UserChanges::between(record, spec).fields()
    }

    async fn create(&self, client: &AppmixerClient, spec: &UserSpec) -> ReconcileResult<UserRecord> {
        info!(username = %spec.username, email = %spec.email, "Creating Appmixer user");

        validate_password(&spec.password)?;

        let permissions = UpdateUserRequest {
            scope: declared(spec.scope.as_ref()).cloned(),
            vendor: declared(spec.vendor.as_ref()).cloned(),
        };
        if !permissions.is_empty() {
            require_admin(client, "Setting scope or vendor")?;
        }

        client
            .create_user(&CreateUserRequest {
                email: spec.email.clone(),
                username: spec.username.clone(),
                password: spec.password.clone(),
            })
            .await
            .map_err(|e| ReconcileError::transport(KIND, "create", &spec.username, e))?;

        let id = self.recover_id(client, &spec.username).await?;
        debug!(user_id = %id, username = %spec.username, "Recovered id of created user");

        if !permissions.is_empty() {
            client
                .update_user(&id, &permissions)
                .await
                .map_err(|e| ReconcileError::transport(KIND, "set permissions of", &id, e))?;
        }

        let record = self.refresh(client, &id, &spec.password).await?;
        info!(user_id = %record.id, "Created Appmixer user");
        Ok(record)
    }

    async fn read(
        &self,
        client: &AppmixerClient,
        record: &UserRecord,
    ) -> ReconcileResult<Option<UserRecord>> {
        self.fetch(client, &record.id, &record.password).await
    }

    async fn update(
        &self,
        client: &AppmixerClient,
        record: &UserRecord,
        spec: &UserSpec,
    ) -> ReconcileResult<UserRecord> {
        let id = record.id.as_str();
        let is_self = client.session().is_self(id);
        let changes = UserChanges::between(record, spec);

        info!(
            user_id = %id,
            is_self,
            scope_changed = changes.scope,
            vendor_changed = changes.vendor,
            password_changed = changes.password,
            "Updating Appmixer user"
        );

        if is_self && changes.permissions() {
            return Err(ReconcileError::SelfModification(
                "Modifying your own permissions is not allowed for security reasons".into(),
            ));
        }
        if !is_self && changes.any() {
            require_admin(client, "Modifying other users (scope, vendor, or password)")?;
        }
        if changes.password {
            if is_self {
                return Err(ReconcileError::SelfModification(
                    "Cannot update your own password here. Use the Appmixer UI or API directly"
                        .into(),
                ));
            }
            validate_password(&spec.password)?;
        }

        if changes.permissions() {
            let request = UpdateUserRequest {
                scope: changes.scope.then(|| spec.scope.clone()).flatten(),
                vendor: changes.vendor.then(|| spec.vendor.clone()).flatten(),
            };
            client
                .update_user(id, &request)
                .await
                .map_err(|e| ReconcileError::transport(KIND, "update", id, e))?;
        }

        let mut password = record.password.clone();
        if changes.password {
            client
                .reset_password(&ResetPasswordRequest {
                    email: spec.email.clone(),
                    password: spec.password.clone(),
                })
                .await
                .map_err(|e| ReconcileError::transport(KIND, "reset password of", id, e))?;
            info!(user_id = %id, "Password reset");
            password = spec.password.clone();
        }

        self.refresh(client, id, &password).await
    }

    async fn delete(&self, client: &AppmixerClient, record: &UserRecord) -> ReconcileResult<()> {
        let id = record.id.as_str();
        info!(user_id = %id, "Deleting Appmixer user");

        if client.session().is_self(id) {
            return Err(ReconcileError::SelfModification(
                "Deleting your own account is not allowed for security reasons".into(),
            ));
        }
        require_admin(client, "Deleting users")?;

        let ticket = client
            .delete_user(id)
            .await
            .map_err(|e| ReconcileError::transport(KIND, "delete", id, e))?
            .ticket;

        let ticket_ref = ticket.as_str();
        self.poller
            .wait_for(ticket_ref, move || async move {
                client
                    .delete_status(id, ticket_ref)
                    .await
                    .map_err(|e| ReconcileError::transport(KIND, "check deletion of", id, e))
            })
            .await
    }

    async fn import(&self, client: &AppmixerClient, id: &str) -> ReconcileResult<UserRecord> {
        info!(user_id = %id, "Importing Appmixer user");
        self.refresh(client, id, "").await
    }
}
