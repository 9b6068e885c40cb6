//! Injectable wall-clock time.
//!
//! Challenge windows are measured in whole seconds since the Unix epoch,
//! the same unit the ledger's time-bound field uses. Production code runs
//! on [`SystemClock`]; tests freeze and advance a [`FixedClock`].

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

/// Source of the current Unix time in seconds.
pub trait Clock: Send + Sync {
    fn unix_time(&self) -> u64;
}

/// The real wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_time(&self) -> u64 {
        // Pre-epoch system time clamps to zero rather than wrapping.
        Utc::now().timestamp().max(0) as u64
    }
}

/// A clock frozen at a settable instant.
#[derive(Debug)]
pub struct FixedClock(AtomicU64);

impl FixedClock {
    pub fn new(unix_time: u64) -> Self {
        Self(AtomicU64::new(unix_time))
    }

    pub fn set(&self, unix_time: u64) {
        self.0.store(unix_time, Ordering::Relaxed);
    }

    pub fn advance(&self, seconds: u64) {
        self.0.fetch_add(seconds, Ordering::Relaxed);
    }
}

impl Clock for FixedClock {
    fn unix_time(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_set_and_advance() {
        let clock = FixedClock::new(1_000);
        assert_eq!(clock.unix_time(), 1_000);
        clock.advance(60);
        assert_eq!(clock.unix_time(), 1_060);
        clock.set(5);
        assert_eq!(clock.unix_time(), 5);
    }

    #[test]
    fn test_system_clock_is_past_2020() {
        assert!(SystemClock.unix_time() > 1_577_836_800);
    }
}
