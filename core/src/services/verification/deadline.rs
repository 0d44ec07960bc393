//! Request deadlines and bounded retries for remote calls
//!
//! A [`Deadline`] is created once when an orchestrator starts serving a
//! request and handed to every strategy call, so the whole request (store,
//! transport and directory round trips together) stays within one budget.

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout_at, Instant};
use tracing::warn;

use crate::errors::{CollaboratorError, VerificationError, VerificationResult};

/// Upper bound for a single backoff pause
const MAX_BACKOFF: Duration = Duration::from_secs(2);

/// Absolute point in time after which no remote call is attempted
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    /// Deadline `budget` from now
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
        }
    }

    /// Time left before the deadline (zero once it has passed)
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    /// Run one remote call bounded by this deadline
    ///
    /// Collaborator failures and deadline expiry both surface as
    /// `RemoteLookupFailure` tagged with `service`.
    pub async fn run<T, F>(&self, service: &'static str, call: F) -> VerificationResult<T>
    where
        F: Future<Output = Result<T, CollaboratorError>>,
    {
        match timeout_at(self.at, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => Err(VerificationError::remote(service, source)),
            Err(_) => Err(VerificationError::remote(
                service,
                CollaboratorError::DeadlineExceeded,
            )),
        }
    }
}

/// Exponential backoff settings for idempotent calls
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Run `call` under `deadline`, retrying transient failures
    ///
    /// A retry is only scheduled when the backoff pause still fits inside the
    /// deadline; otherwise the last error is returned as is.
    pub async fn run<T, F, Fut>(
        &self,
        deadline: &Deadline,
        service: &'static str,
        mut call: F,
    ) -> VerificationResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CollaboratorError>>,
    {
        let mut attempts = 0;
        let mut delay = self.base_delay;

        loop {
            attempts += 1;
            match deadline.run(service, call()).await {
                Ok(value) => return Ok(value),
                Err(err)
                    if err.is_retryable()
                        && attempts <= self.max_retries
                        && deadline.remaining() > delay =>
                {
                    warn!(
                        service = service,
                        attempt = attempts,
                        max_retries = self.max_retries,
                        error = %err,
                        event = "remote_call_retry",
                        "Remote call failed, retrying in {:?}",
                        delay
                    );
                    sleep(delay).await;
                    delay = (delay * 2).min(MAX_BACKOFF);
                }
                Err(err) => return Err(err),
            }
        }
    }
}
