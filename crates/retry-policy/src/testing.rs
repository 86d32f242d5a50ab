use crate::{Interrupted, Sleeper};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// A [`Sleeper`] that returns immediately and remembers every wait asked of it.
///
/// Optionally reports an interruption on the n-th call (1-based), which is
/// still recorded.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    waits: Mutex<Vec<Duration>>,
    interrupt_on: Option<usize>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interrupting_on(call: usize) -> Self {
        Self {
            waits: Mutex::new(Vec::new()),
            interrupt_on: Some(call),
        }
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.waits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn total(&self) -> Duration {
        self.waits().iter().sum()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, wait: Duration) -> Result<(), Interrupted> {
        let mut waits = self.waits.lock().unwrap_or_else(PoisonError::into_inner);
        waits.push(wait);
        if self.interrupt_on == Some(waits.len()) {
            return Err(Interrupted { requested: wait });
        }
        Ok(())
    }
}
