//! Permission gate over the session's granted scopes.

use crate::auth::Session;
use crate::error::{ClientError, ClientResult};

/// Scope that unlocks user administration.
pub const ADMIN_SCOPE: &str = "admin";

/// Whether the session was granted `scope`.
#[must_use]
pub fn has_scope(session: &Session, scope: &str) -> bool {
    session.scope().iter().any(|s| s == scope)
}

/// Fail with [`ClientError::PermissionDenied`] unless the session holds `scope`.
///
/// `operation` names the guarded action in the error, e.g. "Listing all users".
pub fn require_scope(session: &Session, scope: &str, operation: &str) -> ClientResult<()> {
    if has_scope(session, scope) {
        Ok(())
    } else {
        Err(ClientError::PermissionDenied {
            operation: operation.to_string(),
            scope: scope.to_string(),
        })
    }
}
