//! Retry primitives shared by every startup stage.
//!
//! This crate provides:
//! - `RetryPolicy`: the immutable retry configuration, built once and passed by reference
//! - `PollState`: the per-operation backoff state used by the manual polling loops
//! - `ExponentialBackoff`: the capped backoff used by `with_retry`
//! - `with_retry`: a bounded retry combinator for synchronous calls
//! - `Sleeper` / `ThreadSleeper` / `Interrupter`: blocking, interruptible waits
//!
//! # Polling vs. retrying
//!
//! Two backoff shapes coexist on purpose. `with_retry` always clamps its wait
//! to `max_interval_ms`. The polling loops built on `PollState` keep growing
//! the wait by `multiplier` without a cap unless `clamp_polling` is set on the
//! policy.
//!
//! ```rust
//! use retry_policy::{with_retry, RetryPolicy};
//! use retry_policy::testing::RecordingSleeper;
//!
//! let policy = RetryPolicy::new(100, 1_000, 2.0, 3);
//! let sleeper = RecordingSleeper::new();
//!
//! let result: Result<u32, _> = with_retry(&policy, &sleeper, |_: &std::io::Error| true, |ctx| {
//!     if ctx.attempt < 3 {
//!         Err(std::io::Error::other("not yet"))
//!     } else {
//!         Ok(ctx.attempt)
//!     }
//! });
//!
//! assert_eq!(result.unwrap(), 3);
//! assert_eq!(sleeper.waits().len(), 2);
//! ```

mod backoff;
mod policy;
mod retry;
mod sleep;

/// Test doubles for code that waits through a `Sleeper`.
pub mod testing;

pub use backoff::{ExponentialBackoff, PollState};
pub use policy::{PolicyError, RetryPolicy};
pub use retry::{with_retry, RetryContext, RetryError};
pub use sleep::{Interrupted, Interrupter, Sleeper, ThreadSleeper};
