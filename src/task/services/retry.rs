//! Bounded exponential backoff around remote table calls.
//!
//! Every remote read and write goes through [`retry`]. Failures whose
//! [`RemoteTableError::transient_kind`] is set are retried after
//! `base_delay * 2^attempt` plus a random jitter; anything else is returned
//! at once. Running out of attempts yields [`RetryError::ServiceBusy`].

use crate::task::ports::{RemoteTableError, RemoteTableResult};
use rand::Rng;
use std::{future::Future, time::Duration};
use thiserror::Error;
use tracing::warn;

/// Default number of attempts, including the first call.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default base delay before the first retry.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Default upper bound for the random jitter added to each delay.
pub const DEFAULT_MAX_JITTER: Duration = Duration::from_secs(1);

/// Backoff settings for remote table calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_jitter: DEFAULT_MAX_JITTER,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with the default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a policy that retries without sleeping.
    #[must_use]
    pub const fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_jitter: Duration::ZERO,
        }
    }

    /// Sets the number of attempts, including the first call. Zero is
    /// treated as one.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the base delay.
    #[must_use]
    pub const fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Sets the jitter bound.
    #[must_use]
    pub const fn with_max_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    /// Returns the effective number of attempts.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Returns the delay without jitter before retrying after the failed
    /// attempt `attempt` (zero-based).
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2_u32.saturating_pow(attempt))
    }

    /// Returns the backoff for `attempt` plus a uniform jitter in
    /// `0..=max_jitter`.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let jitter_ms = u64::try_from(self.max_jitter.as_millis()).unwrap_or(u64::MAX);
        let jitter = if jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
        };
        self.backoff(attempt).saturating_add(jitter)
    }
}

/// Errors surfaced by [`retry`].
#[derive(Debug, Clone, Error)]
pub enum RetryError {
    /// Every attempt failed with a transient error.
    #[error("remote table service is busy after {attempts} attempts")]
    ServiceBusy {
        /// Attempts made.
        attempts: u32,
        /// Failure from the final attempt.
        #[source]
        last: RemoteTableError,
    },

    /// A failure that is not retried.
    #[error(transparent)]
    Remote(#[from] RemoteTableError),
}

impl RetryError {
    /// Returns the non-retried remote error, if that is what this is.
    #[must_use]
    pub const fn as_remote(&self) -> Option<&RemoteTableError> {
        match self {
            Self::Remote(err) => Some(err),
            Self::ServiceBusy { .. } => None,
        }
    }
}

/// Runs `operation` until it succeeds, fails permanently, or the policy's
/// attempts are used up.
///
/// `label` names the operation in log output.
///
/// # Errors
///
/// Returns [`RetryError::Remote`] for the first non-transient failure and
/// [`RetryError::ServiceBusy`] when every attempt failed transiently.
pub async fn retry<T, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut operation: F,
) -> Result<T, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = RemoteTableResult<T>>,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 0_u32;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        let Some(kind) = err.transient_kind() else {
            return Err(RetryError::Remote(err));
        };
        let attempts_made = attempt.saturating_add(1);
        if attempts_made >= max_attempts {
            warn!(
                operation = label,
                attempts = attempts_made,
                %kind,
                "giving up on remote table call"
            );
            return Err(RetryError::ServiceBusy {
                attempts: attempts_made,
                last: err,
            });
        }
        let delay = policy.delay_for_attempt(attempt);
        warn!(
            operation = label,
            attempt = attempts_made,
            %kind,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "transient remote table failure, retrying"
        );
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        attempt = attempts_made;
    }
}
