//! Port traits: the hexagonal boundary between the control core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ MissionStateMachine (domain)
//! ```
//!
//! Driven adapters (sensor bus, servo/motor drivers, clocks, event sinks,
//! config storage) implement these traits.  The core consumes them via
//! generics, so it never touches hardware directly and runs unchanged
//! against the simulator and the test doubles.

use crate::config::{Steering, SystemConfig};
use crate::error::ConfigError;
use crate::fsm::context::SensorSnapshot;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the core calls this once per tick.
pub trait SensorPort {
    /// Read every sensor and return a unified snapshot.
    fn read_snapshot(&mut self) -> SensorSnapshot;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the core calls this to command actuators.
pub trait ActuatorPort {
    /// Ballast servo angle in degrees.
    fn set_buoyancy_angle(&mut self, degrees: f32);

    /// Normalised propulsion command (-1 full reverse .. 1 full ahead).
    fn set_propulsion(&mut self, command: f32);

    fn set_steering(&mut self, steering: Steering);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.  Wraps at `u32::MAX`; callers only ever
/// subtract readings with `wrapping_sub`.
pub trait ClockPort {
    fn now_ms(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`MissionEvent`](super::events::MissionEvent)s
/// through this port.  Adapters decide where they go (serial log, status
/// page, test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::MissionEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate before persisting and reject invalid
/// ranges with [`ConfigError::ValidationFailed`] rather than clamping.
pub trait ConfigPort {
    /// Load configuration.  Returns [`SystemConfig::default()`] if nothing
    /// has been stored yet.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&mut self, config: &SystemConfig) -> Result<(), ConfigError>;
}
