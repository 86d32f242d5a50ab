//! Backoff computation.

use crate::RetryPolicy;
use std::time::Duration;

/// Multiply a wait by `multiplier`, floored to whole milliseconds.
fn scale(wait: Duration, multiplier: f64) -> Duration {
    let scaled = (wait.as_millis() as f64 * multiplier).floor();
    // `as` saturates, so an absurd product pins at u64::MAX instead of wrapping.
    Duration::from_millis(scaled as u64)
}

/// State of one polling operation.
///
/// Created fresh for every topic check or health wait and dropped when the
/// loop exits. `attempt` counts checks issued so far and never exceeds
/// `max_attempts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollState {
    attempt: u32,
    current_wait: Duration,
}

impl PollState {
    pub fn new(policy: &RetryPolicy) -> Self {
        Self {
            attempt: 1,
            current_wait: policy.poll_interval(),
        }
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn current_wait(&self) -> Duration {
        self.current_wait
    }

    /// Whether the check just issued was the last one the budget allows.
    pub fn is_exhausted(&self, policy: &RetryPolicy) -> bool {
        self.attempt >= policy.max_attempts
    }

    /// Return the wait to sleep now and grow the stored wait for next time.
    ///
    /// Unclamped unless `policy.clamp_polling` is set.
    pub fn next_wait(&mut self, policy: &RetryPolicy) -> Duration {
        let wait = self.current_wait;
        let mut next = scale(wait, policy.multiplier).max(wait);
        if policy.clamp_polling && next > policy.max_interval() {
            next = policy.max_interval().max(wait);
        }
        self.current_wait = next;
        wait
    }

    /// Move to the next attempt after a failed check.
    ///
    /// Returns the wait to sleep before that attempt, or `None` when the
    /// budget is spent and the caller must give up.
    pub fn advance(&mut self, policy: &RetryPolicy) -> Option<Duration> {
        if self.is_exhausted(policy) {
            return None;
        }
        let wait = self.next_wait(policy);
        self.attempt += 1;
        Some(wait)
    }
}

/// Exponential backoff capped at `max_interval_ms`.
///
/// Used by `with_retry` for synchronous calls.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    current: Duration,
    max: Duration,
    multiplier: f64,
}

impl ExponentialBackoff {
    pub fn new(policy: &RetryPolicy) -> Self {
        Self {
            current: policy.initial_interval().min(policy.max_interval()),
            max: policy.max_interval(),
            multiplier: policy.multiplier,
        }
    }

    pub fn next_wait(&mut self) -> Duration {
        let wait = self.current;
        self.current = scale(wait, self.multiplier).min(self.max);
        wait
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_poll_state_starts_at_first_attempt() {
        let policy = RetryPolicy::new(100, 1_000, 2.0, 3);
        let state = PollState::new(&policy);
        assert_eq!(state.attempt(), 1);
        assert_eq!(state.current_wait(), ms(100));
    }

    #[test]
    fn test_poll_backoff_grows_without_cap() {
        let policy = RetryPolicy::new(100, 300, 2.0, 10);
        let mut state = PollState::new(&policy);

        let waits: Vec<_> = (0..5).map(|_| state.next_wait(&policy)).collect();
        assert_eq!(waits, vec![ms(100), ms(200), ms(400), ms(800), ms(1_600)]);
    }

    #[test]
    fn test_poll_backoff_clamped_when_requested() {
        let policy = RetryPolicy::new(100, 300, 2.0, 10).with_clamped_polling(true);
        let mut state = PollState::new(&policy);

        let waits: Vec<_> = (0..4).map(|_| state.next_wait(&policy)).collect();
        assert_eq!(waits, vec![ms(100), ms(200), ms(300), ms(300)]);
    }

    #[test]
    fn test_poll_backoff_floors_fractional_products() {
        let policy = RetryPolicy::new(100, 10_000, 1.5, 10);
        let mut state = PollState::new(&policy);
        state.next_wait(&policy);
        state.next_wait(&policy);
        // 100 -> 150 -> 225 -> 337.5 floored
        assert_eq!(state.next_wait(&policy), ms(225));
        assert_eq!(state.current_wait(), ms(337));
    }

    #[test]
    fn test_advance_stops_at_max_attempts() {
        let policy = RetryPolicy::new(100, 1_000, 2.0, 3);
        let mut state = PollState::new(&policy);

        assert_eq!(state.advance(&policy), Some(ms(100)));
        assert_eq!(state.attempt(), 2);
        assert_eq!(state.advance(&policy), Some(ms(200)));
        assert_eq!(state.attempt(), 3);
        assert_eq!(state.advance(&policy), None);
        assert_eq!(state.attempt(), 3);
    }

    #[test]
    fn test_single_attempt_budget_never_waits() {
        let policy = RetryPolicy::new(100, 1_000, 2.0, 1);
        let mut state = PollState::new(&policy);
        assert!(state.is_exhausted(&policy));
        assert_eq!(state.advance(&policy), None);
    }

    #[test]
    fn test_exponential_backoff_is_capped() {
        let policy = RetryPolicy::new(100, 300, 2.0, 10);
        let mut backoff = ExponentialBackoff::new(&policy);

        let waits: Vec<_> = (0..4).map(|_| backoff.next_wait()).collect();
        assert_eq!(waits, vec![ms(100), ms(200), ms(300), ms(300)]);
    }
}
