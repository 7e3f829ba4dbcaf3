//! Connection and reconciler settings.
//!
//! Every value can come from a flag or from the environment (a `.env` file is
//! loaded first by the binary). Flags win over the environment.

use std::time::Duration;

use appmixer_client::config::DEFAULT_TIMEOUT_SECS;
use appmixer_client::{AppmixerClient, ClientConfig};
use appmixer_reconciler::poller::{DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL};
use appmixer_reconciler::{AccountReadStrategy, AccountReconciler, DeletionPoller, UserReconciler};
use clap::{Args, ValueEnum};
use tokio_util::sync::CancellationToken;

use crate::error::{CliError, CliResult};

/// Account lookup mode, as chosen on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum AccountRead {
    /// `GET /accounts/{id}`
    #[default]
    Direct,
    /// `GET /accounts`, filtered locally
    List,
}

impl From<AccountRead> for AccountReadStrategy {
    fn from(mode: AccountRead) -> Self {
        match mode {
            AccountRead::Direct => AccountReadStrategy::Direct,
            AccountRead::List => AccountReadStrategy::ListAndFilter,
        }
    }
}

/// Global connection flags shared by every command.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Appmixer API base URL
    #[arg(long, env = "APPMIXER_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Login email
    #[arg(long, env = "APPMIXER_EMAIL", global = true)]
    pub email: Option<String>,

    /// Login password
    #[arg(long, env = "APPMIXER_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "APPMIXER_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    pub timeout_secs: u64,

    /// Maximum status checks while waiting for a user deletion
    #[arg(long, env = "APPMIXER_DELETE_MAX_ATTEMPTS", default_value_t = DEFAULT_MAX_ATTEMPTS, global = true)]
    pub delete_max_attempts: u32,

    /// Seconds between deletion status checks
    #[arg(long, env = "APPMIXER_DELETE_POLL_INTERVAL_SECS", default_value_t = DEFAULT_POLL_INTERVAL.as_secs(), global = true)]
    pub delete_poll_interval_secs: u64,

    /// How accounts are looked up when refreshing state
    #[arg(long, value_enum, default_value_t = AccountRead::Direct, global = true)]
    pub account_read: AccountRead,
}

/// Resolved settings for one CLI invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub connection: ConnectionArgs,
    pub cancel: CancellationToken,
}

impl Settings {
    #[must_use]
    pub fn new(connection: ConnectionArgs, cancel: CancellationToken) -> Self {
        Self { connection, cancel }
    }

    /// Client configuration from flags/environment.
    pub fn client_config(&self) -> CliResult<ClientConfig> {
        let c = &self.connection;
        let api_url = required(c.api_url.as_deref(), "APPMIXER_API_URL", "--api-url")?;
        let email = required(c.email.as_deref(), "APPMIXER_EMAIL", "--email")?;
        let password = required(c.password.as_deref(), "APPMIXER_PASSWORD", "--password")?;

        let config = ClientConfig::new(api_url, email, password).with_timeout_secs(c.timeout_secs);
        config.validate()?;
        Ok(config)
    }

    /// Authenticate and return a client bound to the session.
    pub async fn connect(&self) -> CliResult<AppmixerClient> {
        let config = self.client_config()?;
        Ok(AppmixerClient::authenticate(&config).await?)
    }

    /// Deletion poller tied to this invocation's cancellation token.
    #[must_use]
    pub fn poller(&self) -> DeletionPoller {
        DeletionPoller::new(
            self.connection.delete_max_attempts,
            Duration::from_secs(self.connection.delete_poll_interval_secs),
        )
        .with_cancellation(self.cancel.clone())
    }

    #[must_use]
    pub fn user_reconciler(&self) -> UserReconciler {
        UserReconciler::new(self.poller())
    }

    #[must_use]
    pub fn account_reconciler(&self) -> AccountReconciler {
        AccountReconciler::new(self.connection.account_read.into())
    }
}

fn required<'a>(value: Option<&'a str>, var: &str, flag: &str) -> CliResult<&'a str> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| CliError::Config(format!("missing {var} (or {flag})")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection() -> ConnectionArgs {
        ConnectionArgs {
            api_url: Some("https://api.example.com".into()),
            email: Some("admin@example.com".into()),
            password: Some("hunter22".into()),
            timeout_secs: 10,
            delete_max_attempts: 7,
            delete_poll_interval_secs: 1,
            account_read: AccountRead::List,
        }
    }

    #[test]
    fn test_client_config_from_flags() {
        let settings = Settings::new(connection(), CancellationToken::new());
        let config = settings.client_config().unwrap();
        assert_eq!(config.api_url, "https://api.example.com");
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn test_missing_email_names_variable() {
        let mut c = connection();
        c.email = None;
        let err = Settings::new(c, CancellationToken::new())
            .client_config()
            .unwrap_err();
        assert!(err.to_string().contains("APPMIXER_EMAIL"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut c = connection();
        c.timeout_secs = 0;
        assert!(Settings::new(c, CancellationToken::new())
            .client_config()
            .is_err());
    }

    #[test]
    fn test_reconcilers_use_settings() {
        let settings = Settings::new(connection(), CancellationToken::new());
        assert_eq!(settings.poller().max_attempts, 7);
        assert_eq!(settings.poller().interval, Duration::from_secs(1));
        assert_eq!(
            settings.account_reconciler().read_strategy(),
            AccountReadStrategy::ListAndFilter
        );
    }
}
