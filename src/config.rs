//! System configuration parameters
//!
//! All tunable parameters for the vehicle's control core.
//! Values can be overridden through a [`ConfigPort`](crate::app::ports::ConfigPort)
//! implementation or the per-component setters.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which way the buoyancy servo has to turn to take on water.
///
/// Depends on how the rack-and-pinion ballast is mounted, so it has to be
/// measured on the vehicle rather than assumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallastSense {
    /// Larger servo angle pulls the piston out and fills the ballast.
    FillIncreasesAngle,
    /// Larger servo angle pushes the piston in and empties the ballast.
    FillDecreasesAngle,
}

/// Depth regulator tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthControllerConfig {
    /// Deepest setpoint the regulator will accept (metres).
    pub target_depth_max_m: f32,
    /// Servo angle that holds the current buoyancy (degrees).
    pub neutral_angle_deg: f32,
    /// Proportional gain (degrees of servo travel per metre of error).
    pub proportional_gain: f32,
    /// Lower servo travel limit (degrees).
    pub angle_min_deg: f32,
    /// Upper servo travel limit (degrees).
    pub angle_max_deg: f32,
    pub ballast_sense: BallastSense,
}

impl Default for DepthControllerConfig {
    fn default() -> Self {
        Self {
            target_depth_max_m: 10.0,
            neutral_angle_deg: 90.0,
            proportional_gain: 10.0,
            angle_min_deg: 0.0,
            angle_max_deg: 180.0,
            ballast_sense: BallastSense::FillIncreasesAngle,
        }
    }
}

impl DepthControllerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.target_depth_max_m.is_finite() && self.target_depth_max_m > 0.0) {
            return Err(ConfigError::ValidationFailed(
                "target_depth_max_m must be a positive depth",
            ));
        }
        if !self.proportional_gain.is_finite() || self.proportional_gain < 0.0 {
            return Err(ConfigError::ValidationFailed(
                "proportional_gain must be finite and non-negative",
            ));
        }
        if !(self.angle_min_deg.is_finite()
            && self.neutral_angle_deg.is_finite()
            && self.angle_max_deg.is_finite())
        {
            return Err(ConfigError::ValidationFailed("servo angles must be finite"));
        }
        if !(self.angle_min_deg < self.neutral_angle_deg
            && self.neutral_angle_deg < self.angle_max_deg)
        {
            return Err(ConfigError::ValidationFailed(
                "angle_min_deg < neutral_angle_deg < angle_max_deg violated",
            ));
        }
        Ok(())
    }
}

/// Hazard thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafetyConfig {
    /// State of charge (%) below which the battery counts as low.
    pub battery_trip_percent: f32,
    /// How long the charge must stay below the trip point before latching (ms).
    pub battery_dwell_ms: u32,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            battery_trip_percent: 15.0,
            battery_dwell_ms: 4000,
        }
    }
}

impl SafetyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.battery_trip_percent > 0.0 && self.battery_trip_percent < 100.0) {
            return Err(ConfigError::ValidationFailed(
                "battery_trip_percent must lie in (0, 100)",
            ));
        }
        Ok(())
    }
}

/// Steering choice for the turning phase and manual control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Steering {
    Left,
    Right,
    #[default]
    Center,
}

/// Mission profile. Frozen while a mission is running.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MissionConfig {
    /// Depth held during DESCENDING/MOVING/TURNING (metres).
    pub target_depth_m: f32,
    /// Straight-line cruise time (ms).
    pub move_duration_ms: u32,
    /// Turn time (ms).
    pub turn_duration_ms: u32,
    /// Depth error under which the target counts as reached (metres).
    pub depth_margin_m: f32,
    /// Depth under which the vehicle counts as surfaced (metres).
    pub surface_depth_m: f32,
    /// Hard bound on DESCENDING (ms).
    pub descend_timeout_ms: u32,
    /// Hard bound on ASCENDING (ms).
    pub ascend_timeout_ms: u32,
    /// Propulsion command while cruising.
    pub cruise_propulsion: f32,
    /// Propulsion command while turning.
    pub turn_propulsion: f32,
    pub turn_direction: Steering,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            target_depth_m: 0.3,
            move_duration_ms: 10_000,
            turn_duration_ms: 3_000,
            depth_margin_m: 0.10,
            surface_depth_m: 0.20,
            descend_timeout_ms: 30_000,
            ascend_timeout_ms: 15_000,
            cruise_propulsion: 0.7,
            turn_propulsion: 0.6,
            turn_direction: Steering::Left,
        }
    }
}

impl MissionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.target_depth_m.is_finite() && self.target_depth_m >= 0.0) {
            return Err(ConfigError::ValidationFailed(
                "target_depth_m must be a non-negative depth",
            ));
        }
        if !(self.depth_margin_m > 0.0) {
            return Err(ConfigError::ValidationFailed("depth_margin_m must be positive"));
        }
        if !(self.surface_depth_m >= 0.0) {
            return Err(ConfigError::ValidationFailed(
                "surface_depth_m must be non-negative",
            ));
        }
        if self.descend_timeout_ms == 0 || self.ascend_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "depth phases need a non-zero timeout",
            ));
        }
        if !(-1.0..=1.0).contains(&self.cruise_propulsion)
            || !(-1.0..=1.0).contains(&self.turn_propulsion)
        {
            return Err(ConfigError::ValidationFailed(
                "propulsion commands must lie in [-1, 1]",
            ));
        }
        Ok(())
    }
}

/// Teleoperation speeds used by the supervisor in manual mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ManualConfig {
    pub forward_speed: f32,
    pub turn_speed: f32,
}

impl Default for ManualConfig {
    fn default() -> Self {
        Self {
            forward_speed: 0.7,
            turn_speed: 0.6,
        }
    }
}

/// Optional hardware fitted to a particular hull.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleCapabilities {
    /// A steering servo is fitted; without it steering commands are held at centre.
    pub rudder: bool,
    /// The motor driver can run in reverse (propulsion range [-1, 1] instead of [0, 1]).
    pub reversible_drive: bool,
}

impl Default for VehicleCapabilities {
    fn default() -> Self {
        Self {
            rudder: true,
            reversible_drive: true,
        }
    }
}

impl VehicleCapabilities {
    /// Clamp a propulsion command into the range the drive supports.
    pub fn clamp_propulsion(&self, command: f32) -> f32 {
        if command.is_nan() {
            return 0.0;
        }
        let min = if self.reversible_drive { -1.0 } else { 0.0 };
        command.clamp(min, 1.0)
    }

    /// Steering the hull can actually execute.
    pub fn effective_steering(&self, steering: Steering) -> Steering {
        if self.rudder { steering } else { Steering::Center }
    }
}

/// Core system configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    pub depth: DepthControllerConfig,
    pub safety: SafetyConfig,
    pub mission: MissionConfig,
    pub manual: ManualConfig,
    pub capabilities: VehicleCapabilities,
}

impl SystemConfig {
    /// Range-check every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.depth.validate()?;
        self.safety.validate()?;
        self.mission.validate()?;
        if self.mission.target_depth_m > self.depth.target_depth_max_m {
            return Err(ConfigError::ValidationFailed(
                "mission target deeper than the regulator allows",
            ));
        }
        Ok(())
    }
}
