//! Outbound mission events.
//!
//! The [`MissionStateMachine`](super::service::MissionStateMachine) emits
//! these through the [`EventSink`](super::ports::EventSink) port.  Adapters
//! on the other side decide what to do with them.

use serde::Serialize;

use crate::fsm::MissionState;
use crate::safety::SafetyVerdict;

/// Structured events emitted by the control core.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MissionEvent {
    /// The machine was (re)initialised by `begin()`.
    Started(MissionState),

    /// The FSM transitioned between states.
    StateChanged {
        from: MissionState,
        to: MissionState,
        at_ms: u32,
    },

    /// The safety monitor latched a hazard.
    HazardLatched(SafetyVerdict),

    /// `stop_mission()` was honoured.
    MissionStopped,

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TelemetryData {
    pub state: MissionState,
    pub depth_m: f32,
    pub target_depth_m: f32,
    pub battery_percent: f32,
    pub leak: bool,
    pub buoyancy_angle_deg: f32,
    pub propulsion: f32,
    pub emergency: SafetyVerdict,
    pub yaw_deg: f32,
    pub pitch_deg: f32,
    pub roll_deg: f32,
}

/// One entry of the bounded transition history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransitionRecord {
    pub from: MissionState,
    pub to: MissionState,
    pub at_ms: u32,
}
