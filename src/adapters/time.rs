//! Host clock adapter.
//!
//! [`MonotonicClock`] wraps `std::time::Instant` and reports milliseconds
//! since construction truncated to `u32`, so it wraps after ~49.7 days
//! exactly like a board tick counter.

use std::time::Instant;

use crate::app::ports::ClockPort;

pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl ClockPort for MonotonicClock {
    fn now_ms(&self) -> u32 {
        // Truncation is the wrap.
        self.start.elapsed().as_millis() as u32
    }
}
