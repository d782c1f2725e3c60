//! Top-level operator interface.
//!
//! The [`Supervisor`] sits on top of the [`MissionStateMachine`] and owns
//! the control mode.  In manual mode key-pad commands drive the vehicle
//! directly; toggling to autonomous starts the mission and locks the
//! manual controls out until it completes or is toggled off.
//!
//! Recovery from an emergency is deliberately two-step: drop back to
//! manual, then [`reset`](Supervisor::reset).

use log::{debug, info, warn};
use serde::Serialize;

use crate::config::{ManualConfig, Steering};
use crate::error::CommandError;
use crate::fsm::MissionState;
use crate::safety::SafetyVerdict;

use super::commands::{ControlMode, ManualCommand};
use super::ports::{ActuatorPort, ClockPort, EventSink, SensorPort};
use super::service::MissionStateMachine;

/// Operator-facing status summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusReport {
    pub mode: ControlMode,
    pub state: MissionState,
    pub emergency: SafetyVerdict,
    pub running: bool,
    pub depth_m: f32,
    pub battery_percent: f32,
    pub leak: bool,
}

pub struct Supervisor<H, K, E>
where
    H: SensorPort + ActuatorPort,
    K: ClockPort,
    E: EventSink,
{
    mission: MissionStateMachine<H, K, E>,
    mode: ControlMode,
    manual: ManualConfig,
}

impl<H, K, E> Supervisor<H, K, E>
where
    H: SensorPort + ActuatorPort,
    K: ClockPort,
    E: EventSink,
{
    pub fn new(mission: MissionStateMachine<H, K, E>, manual: ManualConfig) -> Self {
        Self {
            mission,
            mode: ControlMode::Manual,
            manual,
        }
    }

    /// Arm the mission core in manual mode.
    pub fn begin(&mut self) {
        self.mode = ControlMode::Manual;
        self.mission.begin();
    }

    /// Operator reset: back to manual and IDLE, hazard latch cleared.
    pub fn reset(&mut self) {
        info!("Supervisor: operator reset");
        self.mission.stop_mission();
        self.begin();
    }

    /// One control tick.
    pub fn update(&mut self) {
        self.mission.update();

        if self.mode == ControlMode::Autonomous && self.mission.is_mission_finished() {
            info!("Supervisor: mission complete, back to manual");
            self.mode = ControlMode::Manual;
        }
    }

    /// Handle a raw key.  Unmapped keys are ignored.
    pub fn on_key(&mut self, key: char) -> Result<(), CommandError> {
        match ManualCommand::from_key(key) {
            Some(cmd) => self.on_command(cmd),
            None => {
                debug!("Supervisor: ignoring key {:?}", key);
                Ok(())
            }
        }
    }

    pub fn on_command(&mut self, cmd: ManualCommand) -> Result<(), CommandError> {
        debug!("Supervisor: {:?} in {:?}", cmd, self.mode);
        match cmd {
            ManualCommand::ToggleAutonomous => self.toggle_autonomous(),
            ManualCommand::Stop => {
                if self.mode == ControlMode::Autonomous {
                    self.mode = ControlMode::Manual;
                    self.mission.stop_mission();
                }
                self.mission.manual_stop();
                Ok(())
            }
            ManualCommand::Forward => {
                self.ensure_manual()?;
                self.mission
                    .manual_drive(self.manual.forward_speed, Steering::Center)
            }
            ManualCommand::TurnLeft => {
                self.ensure_manual()?;
                self.mission.manual_drive(self.manual.turn_speed, Steering::Left)
            }
            ManualCommand::TurnRight => {
                self.ensure_manual()?;
                self.mission
                    .manual_drive(self.manual.turn_speed, Steering::Right)
            }
            ManualCommand::Descend => {
                self.ensure_manual()?;
                self.mission.manual_fill_ballast()
            }
        }
    }

    fn toggle_autonomous(&mut self) -> Result<(), CommandError> {
        match self.mode {
            ControlMode::Manual => {
                let state = self.mission.current_state();
                if state == MissionState::Emergency || self.mission.emergency().is_hazard() {
                    warn!("Supervisor: autonomous refused, emergency latched");
                    return Err(CommandError::EmergencyLatched(self.mission.emergency()));
                }
                info!("Supervisor: manual -> autonomous");
                self.mode = ControlMode::Autonomous;
                self.mission.start_mission();
            }
            ControlMode::Autonomous => {
                info!("Supervisor: autonomous -> manual");
                self.mode = ControlMode::Manual;
                self.mission.stop_mission();
            }
        }
        Ok(())
    }

    fn ensure_manual(&self) -> Result<(), CommandError> {
        match self.mode {
            ControlMode::Manual => Ok(()),
            ControlMode::Autonomous => Err(CommandError::AutonomousActive),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn mission(&self) -> &MissionStateMachine<H, K, E> {
        &self.mission
    }

    pub fn mission_mut(&mut self) -> &mut MissionStateMachine<H, K, E> {
        &mut self.mission
    }

    pub fn status(&self) -> StatusReport {
        let s = self.mission.sensors();
        StatusReport {
            mode: self.mode,
            state: self.mission.current_state(),
            emergency: self.mission.emergency(),
            running: self.mission.is_running(),
            depth_m: s.depth_m,
            battery_percent: s.battery_percent,
            leak: s.leak_latched || s.leak_instant,
        }
    }

    /// [`status`](Self::status) as a JSON object for the status page.
    pub fn status_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.status())
    }
}
