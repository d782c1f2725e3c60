//! Proportional depth regulator
//!
//! Converts a depth setpoint and the measured depth into a buoyancy servo
//! angle. No integral or derivative term: the only state is configuration,
//! so calling it every tick, twice in a tick, or not at all never drifts.

use log::debug;

use crate::app::ports::ActuatorPort;
use crate::config::{BallastSense, DepthControllerConfig};
use crate::error::ConfigError;
use crate::fsm::context::SensorSnapshot;

/// Depth regulator driving the ballast servo.
#[derive(Debug, Clone, Default)]
pub struct DepthController {
    config: DepthControllerConfig,
}

impl DepthController {
    pub fn new(config: DepthControllerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Regulate towards `target_m` and write the resulting angle to `out`.
    ///
    /// The target is clamped to `[0, target_depth_max_m]`. Returns the
    /// angle that was commanded.
    pub fn set_target_depth(
        &self,
        target_m: f32,
        snapshot: &SensorSnapshot,
        out: &mut impl ActuatorPort,
    ) -> f32 {
        let angle = self.command_for(target_m, snapshot.depth_m);
        out.set_buoyancy_angle(angle);
        angle
    }

    /// Pure control law: servo angle for a setpoint and a measured depth.
    pub fn command_for(&self, target_m: f32, current_m: f32) -> f32 {
        let c = &self.config;
        let target = if target_m.is_nan() {
            0.0
        } else {
            target_m.clamp(0.0, c.target_depth_max_m)
        };
        let error = target - current_m;
        if error.is_nan() {
            return c.neutral_angle_deg;
        }

        let sign = match c.ballast_sense {
            BallastSense::FillIncreasesAngle => 1.0,
            BallastSense::FillDecreasesAngle => -1.0,
        };
        let raw = c.neutral_angle_deg + sign * c.proportional_gain * error;
        // Zero gain times an infinite error is NaN, which clamp passes through.
        if raw.is_nan() {
            return c.neutral_angle_deg;
        }
        let angle = raw.clamp(c.angle_min_deg, c.angle_max_deg);
        debug!(
            "depth: target={:.2}m current={:.2}m error={:+.2}m -> {:.1}deg",
            target, current_m, error, angle
        );
        angle
    }

    /// Servo angle that fully empties the ballast.
    pub fn empty_angle(&self) -> f32 {
        match self.config.ballast_sense {
            BallastSense::FillIncreasesAngle => self.config.angle_min_deg,
            BallastSense::FillDecreasesAngle => self.config.angle_max_deg,
        }
    }

    /// Servo angle that fully fills the ballast.
    pub fn full_angle(&self) -> f32 {
        match self.config.ballast_sense {
            BallastSense::FillIncreasesAngle => self.config.angle_max_deg,
            BallastSense::FillDecreasesAngle => self.config.angle_min_deg,
        }
    }

    /// Drive the ballast fully empty (maximum buoyancy).
    pub fn empty_ballast(&self, out: &mut impl ActuatorPort) {
        out.set_buoyancy_angle(self.empty_angle());
    }

    /// Drive the ballast fully flooded.
    pub fn fill_ballast(&self, out: &mut impl ActuatorPort) {
        out.set_buoyancy_angle(self.full_angle());
    }

    /// Return the servo to its neutral angle.
    pub fn neutral(&self, out: &mut impl ActuatorPort) {
        out.set_buoyancy_angle(self.config.neutral_angle_deg);
    }

    pub fn config(&self) -> &DepthControllerConfig {
        &self.config
    }

    // ── Setters (validated, all-or-nothing) ───────────────────

    pub fn set_gain(&mut self, gain: f32) -> Result<(), ConfigError> {
        self.apply(|c| c.proportional_gain = gain)
    }

    pub fn set_neutral_angle(&mut self, angle_deg: f32) -> Result<(), ConfigError> {
        self.apply(|c| c.neutral_angle_deg = angle_deg)
    }

    pub fn set_angle_limits(&mut self, min_deg: f32, max_deg: f32) -> Result<(), ConfigError> {
        self.apply(|c| {
            c.angle_min_deg = min_deg;
            c.angle_max_deg = max_deg;
        })
    }

    pub fn set_target_depth_max(&mut self, max_m: f32) -> Result<(), ConfigError> {
        self.apply(|c| c.target_depth_max_m = max_m)
    }

    pub fn set_ballast_sense(&mut self, sense: BallastSense) {
        self.config.ballast_sense = sense;
    }

    fn apply(&mut self, edit: impl FnOnce(&mut DepthControllerConfig)) -> Result<(), ConfigError> {
        let mut next = self.config;
        edit(&mut next);
        next.validate()?;
        self.config = next;
        Ok(())
    }
}
