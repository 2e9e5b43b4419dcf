//! Waiting for a staged file to leave the processing state.

use crate::error::WorkflowError;
use crate::staging::{FileState, RemoteFile, StagingService};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Bounds on how long and how often a processing file is re-checked.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub backoff_factor: f64,
    /// Refreshes allowed before giving up.
    pub max_attempts: u32,
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(10),
            backoff_factor: 1.5,
            max_attempts: 120,
            timeout: Duration::from_secs(600),
        }
    }
}

impl PollPolicy {
    fn next_interval(&self, current: Duration) -> Duration {
        Duration::try_from_secs_f64(current.as_secs_f64() * self.backoff_factor)
            .unwrap_or(self.max_interval)
            .min(self.max_interval)
    }
}

/// Re-fetch `file` until it is no longer processing.
///
/// Returns the ready handle, [`WorkflowError::StagingFailed`] if the service
/// reports failure, [`WorkflowError::PollTimeout`] once the policy runs out,
/// or [`WorkflowError::Cancelled`] when `cancel` fires.
pub async fn wait_until_ready(
    staging: &dyn StagingService,
    mut file: RemoteFile,
    policy: &PollPolicy,
    cancel: &CancellationToken,
) -> Result<RemoteFile, WorkflowError> {
    let started = Instant::now();
    // No deadline when the timeout runs past what the clock can represent.
    let deadline = started.checked_add(policy.timeout);
    let mut interval = policy.initial_interval;
    let mut attempts = 0u32;

    while file.state == FileState::Processing {
        let past_deadline = match (deadline, Instant::now().checked_add(interval)) {
            (Some(deadline), Some(next)) => next > deadline,
            (Some(_), None) => true,
            (None, _) => false,
        };
        if attempts >= policy.max_attempts || past_deadline {
            warn!(file = %file.name, attempts, "gave up waiting for remote processing");
            return Err(WorkflowError::PollTimeout {
                name: file.name,
                attempts,
                elapsed: started.elapsed(),
            });
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                info!(file = %file.name, "polling cancelled");
                return Err(WorkflowError::Cancelled);
            }
            _ = tokio::time::sleep(interval) => {}
        }

        file = staging.refresh(&file.name).await?;
        attempts += 1;
        debug!(file = %file.name, attempt = attempts, state = ?file.state, "polled staged file");
        interval = policy.next_interval(interval);
    }

    if file.state == FileState::Failed {
        return Err(WorkflowError::StagingFailed {
            message: file.failure_message(),
            name: file.name,
        });
    }

    Ok(file)
}
