//! Reconciliation error types.

use appmixer_client::models::DeletionStatus;
use appmixer_client::ClientError;
use thiserror::Error;

/// Result alias for reconciler operations.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Error returned by a reconciler operation.
#[derive(Debug, Error)]
pub enum ReconcileError {
    // Local checks (no request issued)
    /// Desired state failed a local check.
    #[error("{0}")]
    Validation(String),

    /// The session lacks the admin scope.
    #[error("{operation} requires admin permissions")]
    PermissionDenied { operation: String },

    /// The operation targets the authenticated caller and is refused.
    #[error("{0}")]
    SelfModification(String),

    // Remote failures
    /// A request failed; carries which entity and step it belonged to.
    #[error("failed to {verb} {kind} '{id}': {source}")]
    Transport {
        kind: &'static str,
        verb: &'static str,
        id: String,
        #[source]
        source: ClientError,
    },

    /// The user was created but the follow-up lookup did not find it.
    #[error("Failed to find newly created user with username {username}")]
    IdentityRecovery { username: String },

    /// A write succeeded but the response carried no id.
    #[error("API did not return an id after creating the {kind} for {context}")]
    MissingId { kind: &'static str, context: String },

    /// A direct lookup found nothing.
    #[error("{kind} with ID {id} not found")]
    NotFound { kind: &'static str, id: String },

    // Background deletion
    #[error("User deletion failed with status: {status}")]
    DeletionFailed { status: DeletionStatus },

    #[error("User deletion did not complete after {attempts} status checks (last status: {last_status})")]
    DeletionTimedOut {
        attempts: u32,
        last_status: DeletionStatus,
    },

    #[error("User deletion was cancelled while waiting on ticket {ticket}")]
    DeletionCancelled { ticket: String },

    // Account creation
    #[error(
        "Failed to create account for service '{service}': Invalid credentials provided in the \
         'token' attribute. Please check the required keys and values for this service type. \
         Original error: {source}"
    )]
    InvalidCredentials {
        service: String,
        #[source]
        source: ClientError,
    },

    #[error(
        "Failed to create account for service '{service}': Missing required key in the 'token' \
         attribute. Please check the required keys for this service type. Original error: {source}"
    )]
    MissingCredentialKey {
        service: String,
        #[source]
        source: ClientError,
    },

    #[error("failed to create account for service '{service}': {source}")]
    AccountCreate {
        service: String,
        #[source]
        source: ClientError,
    },
}

impl ReconcileError {
    /// Wrap a client error with entity context.
    pub fn transport(
        kind: &'static str,
        verb: &'static str,
        id: impl Into<String>,
        source: ClientError,
    ) -> Self {
        ReconcileError::Transport {
            kind,
            verb,
            id: id.into(),
            source,
        }
    }

    /// Whether the failure was detected locally, before any request.
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ReconcileError::Validation(_)
                | ReconcileError::PermissionDenied { .. }
                | ReconcileError::SelfModification(_)
        )
    }

    /// Underlying client error, if the failure came from the API.
    #[must_use]
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            ReconcileError::Transport { source, .. }
            | ReconcileError::InvalidCredentials { source, .. }
            | ReconcileError::MissingCredentialKey { source, .. }
            | ReconcileError::AccountCreate { source, .. } => Some(source),
            _ => None,
        }
    }
}
