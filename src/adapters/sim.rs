//! Host-side simulation adapters.
//!
//! [`SimulatedVehicle`] implements both [`SensorPort`] and [`ActuatorPort`]
//! on top of a first-order depth model: the vertical rate is proportional
//! to how far the ballast servo sits from neutral.  [`SimClock`] is a
//! hand-advanced clock so a whole mission can run in microseconds.
//!
//! Faults (leak, flat battery, missing pressure sensor) are injected with
//! the setters.

use core::cell::Cell;

use log::debug;

use crate::app::ports::{ActuatorPort, ClockPort, SensorPort};
use crate::config::{BallastSense, DepthControllerConfig, Steering};
use crate::fsm::context::SensorSnapshot;

/// Default vertical rate at full ballast deflection (m/s).
const MAX_VERTICAL_RATE_M_S: f32 = 0.5;

/// Yaw rate with full propulsion and the rudder over (deg/s).
const TURN_RATE_DEG_S: f32 = 60.0;

// ───────────────────────────────────────────────────────────────
// SimClock
// ───────────────────────────────────────────────────────────────

/// Manually advanced millisecond clock.
#[derive(Debug, Default)]
pub struct SimClock {
    now: Cell<u32>,
}

impl SimClock {
    pub fn starting_at(ms: u32) -> Self {
        Self { now: Cell::new(ms) }
    }

    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }

    pub fn set(&self, ms: u32) {
        self.now.set(ms);
    }
}

impl ClockPort for SimClock {
    fn now_ms(&self) -> u32 {
        self.now.get()
    }
}

// ───────────────────────────────────────────────────────────────
// SimulatedVehicle
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SimulatedVehicle {
    // Plant
    depth_m: f32,
    yaw_deg: f32,
    battery_percent: f32,
    battery_drain_per_s: f32,
    neutral_angle_deg: f32,
    /// Vertical rate per degree off neutral, positive = sinking (m/s/deg).
    sink_rate_per_deg: f32,

    // Sensors
    depth_available: bool,
    leak_latched: bool,
    leak_instant: bool,

    // Actuators
    buoyancy_angle_deg: f32,
    propulsion: f32,
    steering: Steering,
    actuator_writes: u32,
}

impl Default for SimulatedVehicle {
    fn default() -> Self {
        Self::new(&DepthControllerConfig::default())
    }
}

impl SimulatedVehicle {
    /// Build a plant matching the regulator's servo geometry, floating at
    /// the surface with a full battery.
    pub fn new(depth: &DepthControllerConfig) -> Self {
        let half_travel = ((depth.angle_max_deg - depth.angle_min_deg) / 2.0).max(1.0);
        let sign = match depth.ballast_sense {
            BallastSense::FillIncreasesAngle => 1.0,
            BallastSense::FillDecreasesAngle => -1.0,
        };
        Self {
            depth_m: 0.0,
            yaw_deg: 0.0,
            battery_percent: 100.0,
            battery_drain_per_s: 0.0,
            neutral_angle_deg: depth.neutral_angle_deg,
            sink_rate_per_deg: sign * MAX_VERTICAL_RATE_M_S / half_travel,
            depth_available: true,
            leak_latched: false,
            leak_instant: false,
            buoyancy_angle_deg: depth.neutral_angle_deg,
            propulsion: 0.0,
            steering: Steering::Center,
            actuator_writes: 0,
        }
    }

    /// Advance the plant by `dt_ms`.
    pub fn step(&mut self, dt_ms: u32) {
        let dt = dt_ms as f32 / 1000.0;

        let rate = (self.buoyancy_angle_deg - self.neutral_angle_deg) * self.sink_rate_per_deg;
        self.depth_m = (self.depth_m + rate * dt).max(0.0);

        let turn = match self.steering {
            Steering::Left => -1.0,
            Steering::Right => 1.0,
            Steering::Center => 0.0,
        };
        self.yaw_deg = (self.yaw_deg + turn * self.propulsion.abs() * TURN_RATE_DEG_S * dt)
            .rem_euclid(360.0);

        if self.battery_drain_per_s > 0.0 {
            self.battery_percent = (self.battery_percent - self.battery_drain_per_s * dt).max(0.0);
        }

        debug!(
            "sim: depth={:.3}m rate={:+.3}m/s yaw={:.0} batt={:.1}%",
            self.depth_m, rate, self.yaw_deg, self.battery_percent
        );
    }

    // ── Fault injection ───────────────────────────────────────

    /// Water on the leak probe.  The sensor-side latch stays set.
    pub fn inject_leak(&mut self) {
        self.leak_instant = true;
        self.leak_latched = true;
    }

    /// Probe dried out.  The latched flag is not cleared.
    pub fn dry_leak_probe(&mut self) {
        self.leak_instant = false;
    }

    pub fn set_battery_percent(&mut self, percent: f32) {
        self.battery_percent = percent;
    }

    pub fn set_battery_drain(&mut self, percent_per_s: f32) {
        self.battery_drain_per_s = percent_per_s.max(0.0);
    }

    pub fn set_depth_sensor_present(&mut self, present: bool) {
        self.depth_available = present;
    }

    pub fn set_depth(&mut self, meters: f32) {
        self.depth_m = meters.max(0.0);
    }

    // ── Inspection ────────────────────────────────────────────

    pub fn depth(&self) -> f32 {
        self.depth_m
    }

    pub fn buoyancy_angle(&self) -> f32 {
        self.buoyancy_angle_deg
    }

    pub fn propulsion(&self) -> f32 {
        self.propulsion
    }

    pub fn steering(&self) -> Steering {
        self.steering
    }

    /// Number of actuator calls received so far.
    pub fn actuator_writes(&self) -> u32 {
        self.actuator_writes
    }
}

impl SensorPort for SimulatedVehicle {
    fn read_snapshot(&mut self) -> SensorSnapshot {
        SensorSnapshot {
            depth_m: if self.depth_available { self.depth_m } else { 0.0 },
            depth_available: self.depth_available,
            leak_latched: self.leak_latched,
            leak_instant: self.leak_instant,
            battery_percent: self.battery_percent,
            yaw_deg: self.yaw_deg,
            pitch_deg: 0.0,
            roll_deg: 0.0,
        }
    }
}

impl ActuatorPort for SimulatedVehicle {
    fn set_buoyancy_angle(&mut self, degrees: f32) {
        self.buoyancy_angle_deg = degrees;
        self.actuator_writes += 1;
    }

    fn set_propulsion(&mut self, command: f32) {
        self.propulsion = command;
        self.actuator_writes += 1;
    }

    fn set_steering(&mut self, steering: Steering) {
        self.steering = steering;
        self.actuator_writes += 1;
    }
}
