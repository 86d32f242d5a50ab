//! Blocking, interruptible waits.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

/// A wait that was cut short by an [`Interrupter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("wait of {requested:?} was interrupted")]
pub struct Interrupted {
    pub requested: Duration,
}

/// Something that can block the calling thread for a while.
pub trait Sleeper {
    fn sleep(&self, wait: Duration) -> Result<(), Interrupted>;
}

impl<S: Sleeper + ?Sized> Sleeper for &S {
    fn sleep(&self, wait: Duration) -> Result<(), Interrupted> {
        (**self).sleep(wait)
    }
}

/// Handle used to abort every wait of the sleepers built from it.
///
/// Once fired it stays fired: any later wait fails immediately.
#[derive(Debug, Clone, Default)]
pub struct Interrupter {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl Interrupter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interrupt(&self) {
        let (lock, cvar) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_all();
    }

    pub fn is_interrupted(&self) -> bool {
        let (lock, _) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A sleeper that wakes up early when this handle fires.
    pub fn sleeper(&self) -> ThreadSleeper {
        ThreadSleeper {
            interrupter: self.clone(),
        }
    }
}

/// Sleeps on the current thread.
#[derive(Debug, Clone, Default)]
pub struct ThreadSleeper {
    interrupter: Interrupter,
}

impl ThreadSleeper {
    /// A sleeper nobody can interrupt.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sleeper for ThreadSleeper {
    fn sleep(&self, wait: Duration) -> Result<(), Interrupted> {
        let (lock, cvar) = &*self.interrupter.inner;
        let guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = cvar
            .wait_timeout_while(guard, wait, |interrupted| !*interrupted)
            .unwrap_or_else(PoisonError::into_inner);
        if *guard {
            Err(Interrupted { requested: wait })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_thread_sleeper_waits() {
        let sleeper = ThreadSleeper::new();
        let start = Instant::now();
        sleeper.sleep(Duration::from_millis(20)).unwrap();
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_interrupt_wakes_a_sleeping_thread() {
        let interrupter = Interrupter::new();
        let sleeper = interrupter.sleeper();

        let handle = std::thread::spawn(move || {
            let start = Instant::now();
            let result = sleeper.sleep(Duration::from_secs(30));
            (result, start.elapsed())
        });

        std::thread::sleep(Duration::from_millis(50));
        interrupter.interrupt();

        let (result, elapsed) = handle.join().unwrap();
        assert_eq!(
            result,
            Err(Interrupted {
                requested: Duration::from_secs(30)
            })
        );
        assert!(elapsed < Duration::from_secs(30));
    }

    #[test]
    fn test_fired_interrupter_fails_later_waits() {
        let interrupter = Interrupter::new();
        interrupter.interrupt();
        assert!(interrupter.is_interrupted());
        assert!(interrupter.sleeper().sleep(Duration::from_secs(5)).is_err());
    }
}
