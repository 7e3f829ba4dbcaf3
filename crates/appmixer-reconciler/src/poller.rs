//! Polling for background deletions.
//!
//! `DELETE /users/{id}` answers with a ticket; the deletion itself runs as a
//! background job whose status is fetched until it turns terminal.

use std::future::Future;
use std::time::Duration;

use appmixer_client::models::{DeleteStatus, DeletionStatus};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{ReconcileError, ReconcileResult};

/// Default number of status fetches before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;

/// Default delay between status fetches.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Bounded fixed-delay poller for deletion tickets.
#[derive(Debug, Clone)]
pub struct DeletionPoller {
    /// Maximum number of status fetches.
    pub max_attempts: u32,
    /// Delay between two fetches.
    pub interval: Duration,
    cancel: CancellationToken,
}

impl Default for DeletionPoller {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL)
    }
}

impl DeletionPoller {
    #[must_use]
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop waiting when `cancel` fires.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Fetch the status of `ticket` until it is terminal.
    ///
    /// `fetch` is called once per attempt. `completed` returns `Ok`,
    /// `failed`/`cancelled` return [`ReconcileError::DeletionFailed`], and a
    /// fetch error aborts immediately. Running out of attempts returns
    /// [`ReconcileError::DeletionTimedOut`]; no delay follows the last attempt.
    pub async fn wait_for<F, Fut>(&self, ticket: &str, mut fetch: F) -> ReconcileResult<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ReconcileResult<DeleteStatus>>,
    {
        let mut last_status = DeletionStatus::Pending;

        for attempt in 1..=self.max_attempts {
            let status = fetch().await?;
            debug!(
                ticket,
                attempt,
                status = %status.status,
                steps_done = status.steps_done,
                steps_total = status.steps_total,
                "Checked deletion status"
            );

            match status.status {
                DeletionStatus::Completed => {
                    info!(ticket, attempts = attempt, "Deletion completed");
                    return Ok(());
                }
                terminal if terminal.is_terminal() => {
                    warn!(ticket, status = %terminal, "Deletion ended unsuccessfully");
                    return Err(ReconcileError::DeletionFailed { status: terminal });
                }
                pending => last_status = pending,
            }

            if attempt < self.max_attempts {
                tokio::select! {
                    biased;
                    () = self.cancel.cancelled() => {
                        warn!(ticket, attempt, "Deletion wait cancelled");
                        return Err(ReconcileError::DeletionCancelled {
                            ticket: ticket.to_string(),
                        });
                    }
                    () = tokio::time::sleep(self.interval) => {}
                }
            }
        }

        warn!(
            ticket,
            attempts = self.max_attempts,
            "Deletion did not complete in time"
        );
        Err(ReconcileError::DeletionTimedOut {
            attempts: self.max_attempts,
            last_status,
        })
    }
}
