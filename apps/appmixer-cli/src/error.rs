//! CLI error types and exit codes

use appmixer_client::{ClientError, ConfigError};
use appmixer_reconciler::ReconcileError;
use thiserror::Error;

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General error
/// - 2: Authentication or permission failure
/// - 3: Network error
/// - 4: Validation error
/// - 5: Server error
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Connection failed: {0}\n\nTroubleshooting:\n  - Check your internet connection\n  - Verify APPMIXER_API_URL is correct\n  - Try again in a few moments")]
    ConnectionFailed(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Interrupted: {0}")]
    Cancelled(String),

    /// A reconciliation step failed for a reason other than the above.
    #[error("{0}")]
    Reconcile(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::AuthenticationFailed(_) | CliError::PermissionDenied(_) => 2,
            CliError::Network(_) | CliError::ConnectionFailed(_) => 3,
            CliError::Validation(_) | CliError::NotFound(_) => 4,
            CliError::Server(_) => 5,
            CliError::Api { status, .. } => {
                if *status >= 500 {
                    5
                } else if *status == 401 || *status == 403 {
                    2
                } else {
                    4
                }
            }
            CliError::Io(_) | CliError::Config(_) | CliError::Reconcile(_) => 1,
            CliError::Cancelled(_) => 130,
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {self}");
        } else {
            eprintln!("Error: {self}");
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {suggestion}");
            } else {
                eprintln!("\nSuggestion: {suggestion}");
            }
        }
    }

    /// Get a suggested action for this error
    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::AuthenticationFailed(_) => {
                Some("Check APPMIXER_EMAIL and APPMIXER_PASSWORD (or --email/--password).")
            }
            CliError::PermissionDenied(_) => {
                Some("This operation needs a session with the 'admin' scope.")
            }
            CliError::ConnectionFailed(_) => Some("Check your network connection and try again."),
            CliError::Config(_) => {
                Some("Set APPMIXER_API_URL, APPMIXER_EMAIL and APPMIXER_PASSWORD, or pass them as flags.")
            }
            _ => None,
        }
    }
}

impl From<ClientError> for CliError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Api {
                status, message, ..
            } => match status {
                404 => CliError::NotFound(message),
                _ => CliError::Api { status, message },
            },
            ClientError::AuthenticationFailed { status, body } => {
                CliError::AuthenticationFailed(format!("status {status}: {body}"))
            }
            e @ ClientError::PermissionDenied { .. } => CliError::PermissionDenied(e.to_string()),
            ClientError::Http(e) => e.into(),
            ClientError::Parse(message) => CliError::Server(message),
            ClientError::InvalidConfig(message) => CliError::Config(message),
            ClientError::Config(e) => e.into(),
        }
    }
}

impl From<ReconcileError> for CliError {
    fn from(e: ReconcileError) -> Self {
        match e {
            ReconcileError::Validation(message) => CliError::Validation(message),
            e @ (ReconcileError::PermissionDenied { .. } | ReconcileError::SelfModification(_)) => {
                CliError::PermissionDenied(e.to_string())
            }
            e @ ReconcileError::NotFound { .. } => CliError::NotFound(e.to_string()),
            e @ ReconcileError::DeletionCancelled { .. } => CliError::Cancelled(e.to_string()),
            e => CliError::Reconcile(e.to_string()),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<reqwest::Error> for CliError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            CliError::ConnectionFailed(e.to_string())
        } else if e.is_timeout() {
            CliError::Network("Request timed out".to_string())
        } else {
            CliError::Network(e.to_string())
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Config(format!("JSON error: {e}"))
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(e: serde_yaml::Error) -> Self {
        CliError::Config(format!("YAML error: {e}"))
    }
}
