//! # Appmixer reconciler
//!
//! Create/read/update/delete/import lifecycles that drive remote Appmixer
//! users and accounts towards a declared spec.
//!
//! Each entity kind implements the [`Reconciler`] capability trait. A host
//! (plan/apply driver) owns persistence: it stores the returned record and
//! hands it back on the next call. The authenticated [`AppmixerClient`] is
//! passed explicitly to every operation.
//!
//! [`AppmixerClient`]: appmixer_client::AppmixerClient

pub mod account;
pub mod error;
pub mod poller;
pub mod state;
pub mod traits;
pub mod user;

pub use account::{token_fingerprint, AccountCreateFailure, AccountReadStrategy, AccountReconciler};
pub use error::{ReconcileError, ReconcileResult};
pub use poller::DeletionPoller;
pub use state::{AccountRecord, AccountSpec, UserRecord, UserSpec};
pub use traits::Reconciler;
pub use user::{UserReconciler, MIN_PASSWORD_LENGTH};
