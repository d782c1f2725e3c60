//! Safety monitor.
//!
//! The monitor runs **every tick before the mission FSM** and produces a
//! latched hazard verdict.
//!
//! ## Hazard lifecycle
//!
//! 1. The leak sensor reports a latched leak, or the battery stays below
//!    the trip point for the full dwell time.
//! 2. The monitor latches the matching [`SafetyVerdict`].
//! 3. Every later call returns the latched verdict without looking at the
//!    snapshot again.
//! 4. Only [`SafetyMonitor::begin`] (alias [`SafetyMonitor::reset`]) clears it.
//!
//! Unlike a self-clearing fault mask, a hazard here is fatal to the
//! mission: a good reading after a leak does not make the hull dry again.

use core::fmt;

use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::SafetyConfig;
use crate::fsm::context::SensorSnapshot;

/// Outcome of one safety evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SafetyVerdict {
    /// No hazard.
    #[default]
    Clear,
    /// Water detected inside the hull.
    Leak,
    /// Battery charge stayed below the trip point for the dwell time.
    BatteryLow,
}

impl SafetyVerdict {
    pub fn is_hazard(self) -> bool {
        self != Self::Clear
    }
}

impl fmt::Display for SafetyVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clear => write!(f, "clear"),
            Self::Leak => write!(f, "leak"),
            Self::BatteryLow => write!(f, "low battery"),
        }
    }
}

/// One-way hazard latch.
///
/// Private so the only way back to `Clear` is [`SafetyMonitor::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Latch {
    Armed,
    Tripped(SafetyVerdict),
}

/// Safety monitor.
pub struct SafetyMonitor {
    config: SafetyConfig,
    latch: Latch,
    /// Timestamp (ms) at which the battery first dropped below the trip point.
    low_battery_since: Option<u32>,
}

impl SafetyMonitor {
    pub fn new(config: SafetyConfig) -> Self {
        Self {
            config,
            latch: Latch::Armed,
            low_battery_since: None,
        }
    }

    /// Clear the latch and the debounce timer.
    pub fn begin(&mut self) {
        if let Latch::Tripped(v) = self.latch {
            info!("SAFETY: latch cleared (was {v})");
        }
        self.latch = Latch::Armed;
        self.low_battery_since = None;
    }

    /// Same as [`begin`](Self::begin).
    pub fn reset(&mut self) {
        self.begin();
    }

    /// Evaluate the snapshot taken at `now_ms` and return the verdict.
    pub fn update(&mut self, snap: &SensorSnapshot, now_ms: u32) -> SafetyVerdict {
        if let Latch::Tripped(v) = self.latch {
            return v;
        }

        // ── Leak ──────────────────────────────────────────────────
        if snap.leak_latched {
            return self.trip(SafetyVerdict::Leak);
        }

        // ── Battery ───────────────────────────────────────────────
        // (0, 100] is a plausible state of charge; anything else (including
        // NaN) means the gauge is absent and the condition is not evaluable.
        let pct = snap.battery_percent;
        if !(pct > 0.0 && pct <= 100.0) {
            self.low_battery_since = None;
            return SafetyVerdict::Clear;
        }

        if pct < self.config.battery_trip_percent {
            let since = *self.low_battery_since.get_or_insert_with(|| {
                warn!(
                    "SAFETY: battery {:.1}% below {:.1}%, debouncing",
                    pct, self.config.battery_trip_percent
                );
                now_ms
            });
            if now_ms.wrapping_sub(since) >= self.config.battery_dwell_ms {
                return self.trip(SafetyVerdict::BatteryLow);
            }
        } else {
            self.low_battery_since = None;
        }

        SafetyVerdict::Clear
    }

    pub fn is_latched(&self) -> bool {
        matches!(self.latch, Latch::Tripped(_))
    }

    fn trip(&mut self, verdict: SafetyVerdict) -> SafetyVerdict {
        error!("SAFETY HAZARD LATCHED: {verdict}");
        self.latch = Latch::Tripped(verdict);
        verdict
    }
}

impl Default for SafetyMonitor {
    fn default() -> Self {
        Self::new(SafetyConfig::default())
    }
}
