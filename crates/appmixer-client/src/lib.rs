//! # Appmixer client
//!
//! Authenticated REST client for the Appmixer API.
//!
//! The crate is organised leaf-first:
//!
//! - [`client`]: the authenticated transport (bearer injection, JSON
//!   encoding, uniform error extraction for non-2xx responses)
//! - [`auth`]: session bootstrap, exchanging credentials for a token and the
//!   caller's identity and scopes once per process
//! - [`scope`]: the permission gate consulted before privileged calls
//! - [`users`], [`accounts`], [`apps`]: endpoint methods and collection
//!   readers layered on the transport
//!
//! ## Example
//!
//! ```ignore
//! use appmixer_client::{AppmixerClient, ClientConfig};
//!
//! let config = ClientConfig::from_env()?;
//! let client = AppmixerClient::authenticate(&config).await?;
//! let accounts = client.list_accounts(None).await?;
//! ```

pub mod accounts;
pub mod apps;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod scope;
pub mod users;

pub use auth::{Session, SessionUser};
pub use client::AppmixerClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, ClientResult};
pub use scope::{has_scope, require_scope, ADMIN_SCOPE};

/// Re-exported so callers can name HTTP methods without a direct reqwest
/// dependency.
pub use reqwest::Method;
