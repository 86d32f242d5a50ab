//! Bounded retry combinator for synchronous calls.

use crate::{ExponentialBackoff, Interrupted, RetryPolicy, Sleeper};
use std::fmt::Display;

/// Passed to the operation on every attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryContext {
    /// 1-based attempt number.
    pub attempt: u32,
    pub max_attempts: u32,
}

/// Terminal outcome of [`with_retry`].
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    /// Every attempt failed with a retryable error.
    #[error("gave up after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: E,
    },

    /// The operation failed with an error the predicate refused to retry.
    #[error("non-retryable failure on attempt {attempt}: {source}")]
    Aborted {
        attempt: u32,
        #[source]
        source: E,
    },

    #[error(transparent)]
    Interrupted(#[from] Interrupted),
}

impl<E> RetryError<E> {
    /// Number of times the operation was invoked.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            RetryError::Exhausted { attempts, .. } => Some(*attempts),
            RetryError::Aborted { attempt, .. } => Some(*attempt),
            RetryError::Interrupted(_) => None,
        }
    }

    /// The last error returned by the operation, if it got to run.
    pub fn into_source(self) -> Option<E> {
        match self {
            RetryError::Exhausted { source, .. } | RetryError::Aborted { source, .. } => {
                Some(source)
            }
            RetryError::Interrupted(_) => None,
        }
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// has been tried `policy.max_attempts` times.
///
/// Between attempts the calling thread sleeps according to an
/// [`ExponentialBackoff`] capped at `max_interval_ms`. No sleep happens after
/// the last attempt. An interrupted sleep ends the loop immediately.
pub fn with_retry<T, E, F, P>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    is_retryable: P,
    mut operation: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut(RetryContext) -> Result<T, E>,
    P: Fn(&E) -> bool,
    E: Display,
{
    let mut backoff = ExponentialBackoff::new(policy);
    let mut attempt = 1;

    loop {
        let context = RetryContext {
            attempt,
            max_attempts: policy.max_attempts,
        };

        match operation(context) {
            Ok(value) => {
                if attempt > 1 {
                    tracing::debug!("Succeeded on attempt {}", attempt);
                }
                return Ok(value);
            }
            Err(err) if !is_retryable(&err) => {
                return Err(RetryError::Aborted {
                    attempt,
                    source: err,
                });
            }
            Err(err) if attempt >= policy.max_attempts => {
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    source: err,
                });
            }
            Err(err) => {
                let wait = backoff.next_wait();
                tracing::warn!(
                    "Attempt {}/{} failed: {}. Retrying in {:?}",
                    attempt,
                    policy.max_attempts,
                    err,
                    wait
                );
                sleeper.sleep(wait)?;
                attempt += 1;
            }
        }
    }
}
