//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to.  It contains the latest sensor snapshot, the actuator command
//! buffer, timing, the mission profile and the depth regulator.  Think of
//! it as the "blackboard" in a blackboard architecture.

use serde::{Deserialize, Serialize};

use crate::app::ports::ActuatorPort;
use crate::config::{MissionConfig, Steering, VehicleCapabilities};
use crate::control::depth::DepthController;
use crate::safety::SafetyVerdict;

// ---------------------------------------------------------------------------
// Sensor snapshot (read-only to state handlers; written by the sensor port)
// ---------------------------------------------------------------------------

/// A point-in-time snapshot of every sensor the core looks at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    /// Depth below the surface (metres, >= 0).
    pub depth_m: f32,
    /// False when the pressure sensor was not detected at boot.
    pub depth_available: bool,

    /// Leak seen at some point since boot (sensor-side latch).
    pub leak_latched: bool,
    /// Leak sensor level right now.
    pub leak_instant: bool,

    /// Battery state of charge (%). Outside (0, 100] or NaN means no gauge.
    pub battery_percent: f32,

    // Inertial fields, telemetry only.
    pub yaw_deg: f32,
    pub pitch_deg: f32,
    pub roll_deg: f32,
}

// ---------------------------------------------------------------------------
// Actuator commands (written by state handlers; flushed once per tick)
// ---------------------------------------------------------------------------

/// The authoritative command set for one tick.  Handlers may write it any
/// number of times; the last write wins when the machine flushes it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActuatorCommands {
    /// Ballast servo angle (degrees).
    pub buoyancy_angle_deg: f32,
    /// Propulsion command (-1..1, or 0..1 on a one-way drive).
    pub propulsion: f32,
    pub steering: Steering,
}

impl Default for ActuatorCommands {
    fn default() -> Self {
        Self {
            buoyancy_angle_deg: 90.0,
            propulsion: 0.0,
            steering: Steering::Center,
        }
    }
}

impl ActuatorCommands {
    /// Push the buffered commands to a real actuator port.
    pub fn flush_to(&self, out: &mut impl ActuatorPort) {
        out.set_buoyancy_angle(self.buoyancy_angle_deg);
        out.set_propulsion(self.propulsion);
        out.set_steering(self.steering);
    }
}

impl ActuatorPort for ActuatorCommands {
    fn set_buoyancy_angle(&mut self, degrees: f32) {
        self.buoyancy_angle_deg = degrees;
    }

    fn set_propulsion(&mut self, command: f32) {
        self.propulsion = command;
    }

    fn set_steering(&mut self, steering: Steering) {
        self.steering = steering;
    }
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Timing --
    /// Milliseconds since the current state was entered.
    pub elapsed_ms: u32,
    /// Clock reading for the tick being processed.
    pub now_ms: u32,

    // -- Sensor data --
    /// Latest sensor readings.  Updated before each FSM tick.
    pub sensors: SensorSnapshot,

    // -- Actuator outputs --
    pub commands: ActuatorCommands,

    // -- Configuration --
    pub mission: MissionConfig,
    pub capabilities: VehicleCapabilities,
    pub depth: DepthController,

    // -- Mission flags --
    /// A mission is in progress.  Cleared by COMPLETED and by a stop.
    pub running: bool,
    /// Latched hazard cause, reported by the EMERGENCY handlers.
    pub emergency: SafetyVerdict,
}

impl FsmContext {
    pub fn new(
        mission: MissionConfig,
        capabilities: VehicleCapabilities,
        depth: DepthController,
    ) -> Self {
        let mut commands = ActuatorCommands::default();
        depth.neutral(&mut commands);
        Self {
            elapsed_ms: 0,
            now_ms: 0,
            sensors: SensorSnapshot::default(),
            commands,
            mission,
            capabilities,
            depth,
            running: false,
            emergency: SafetyVerdict::Clear,
        }
    }

    /// Run the depth regulator against the mission target.
    pub fn hold_depth(&mut self) {
        self.depth.set_target_depth(
            self.mission.target_depth_m,
            &self.sensors,
            &mut self.commands,
        );
    }

    /// Set propulsion and steering, limited to what the hull supports.
    pub fn drive(&mut self, propulsion: f32, steering: Steering) {
        self.commands.propulsion = self.capabilities.clamp_propulsion(propulsion);
        self.commands.steering = self.capabilities.effective_steering(steering);
    }

    /// Propulsion off, steering centred.  Ballast untouched.
    pub fn halt(&mut self) {
        self.drive(0.0, Steering::Center);
    }

    /// Depth reading, only when the sensor is present.
    pub fn measured_depth(&self) -> Option<f32> {
        self.sensors.depth_available.then_some(self.sensors.depth_m)
    }
}
