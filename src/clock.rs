//! Millisecond clocks for call timing.
//!
//! The interceptor only ever needs wall-clock milliseconds, so the trait is
//! deliberately narrow. `ManualClock` exists for trace replay and tests,
//! where durations come from recorded data instead of real time.

use std::cell::Cell;
use std::time::Instant;

/// Source of monotonic millisecond timestamps.
pub trait Clock {
    fn now_millis(&self) -> u64;
}

/// Real clock, measured from construction.
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Manually advanced clock for deterministic timing.
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self { now: Cell::new(0) }
    }

    /// Advance the clock by `millis`.
    pub fn advance(&self, millis: u64) {
        self.now.set(self.now.get() + millis);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now.get()
    }
}
