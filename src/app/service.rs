//! Mission state machine: the hexagonal core.
//!
//! [`MissionStateMachine`] owns the FSM, the safety monitor, the depth
//! regulator (inside the FSM context) and the injected ports.  One call to
//! [`update`](MissionStateMachine::update) is one control tick:
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!   ClockPort ──▶ │     MissionStateMachine      │
//! ActuatorPort ◀──│  Safety · FSM · DepthControl │
//!                 └──────────────────────────────┘
//! ```
//!
//! The safety check runs before the phase handler on every tick, whether
//! or not a mission is running, so a hazard is always acted on.

use heapless::Deque;
use log::{info, warn};

use crate::config::{MissionConfig, Steering, SystemConfig, VehicleCapabilities};
use crate::control::depth::DepthController;
use crate::error::{CommandError, ConfigError};
use crate::fsm::context::{ActuatorCommands, FsmContext, SensorSnapshot};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, MissionState};
use crate::safety::{SafetyMonitor, SafetyVerdict};

use super::events::{MissionEvent, TelemetryData, TransitionRecord};
use super::ports::{ActuatorPort, ClockPort, EventSink, SensorPort};

/// Transitions kept for diagnostics.
pub const HISTORY_LEN: usize = 16;

// ───────────────────────────────────────────────────────────────
// MissionStateMachine
// ───────────────────────────────────────────────────────────────

pub struct MissionStateMachine<H, K, E>
where
    H: SensorPort + ActuatorPort,
    K: ClockPort,
    E: EventSink,
{
    fsm: Fsm,
    ctx: FsmContext,
    safety: SafetyMonitor,
    hw: H,
    clock: K,
    sink: E,
    history: Deque<TransitionRecord, HISTORY_LEN>,
}

impl<H, K, E> MissionStateMachine<H, K, E>
where
    H: SensorPort + ActuatorPort,
    K: ClockPort,
    E: EventSink,
{
    /// Build the machine from configuration and its ports.
    ///
    /// Does **not** arm it: call [`begin`](Self::begin) next.
    pub fn new(config: SystemConfig, hw: H, clock: K, sink: E) -> Result<Self, ConfigError> {
        config.validate()?;
        let depth = DepthController::new(config.depth)?;
        let ctx = FsmContext::new(config.mission, config.capabilities, depth);
        Ok(Self {
            fsm: Fsm::new(build_state_table(), MissionState::Idle),
            ctx,
            safety: SafetyMonitor::new(config.safety),
            hw,
            clock,
            sink,
            history: Deque::new(),
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// (Re)initialise: IDLE, not running, hazard latch cleared.
    ///
    /// This is the only way out of EMERGENCY.  The transition history is
    /// kept; leaving another state is recorded as a transition to IDLE.
    pub fn begin(&mut self) {
        let now = self.clock.now_ms();
        if self.safety.is_latched() {
            warn!("MissionStateMachine: reset clears hazard ({})", self.ctx.emergency);
        }
        let prev = self.state();
        self.safety.begin();
        self.ctx.emergency = SafetyVerdict::Clear;
        self.ctx.running = false;
        self.fsm.start(MissionState::Idle, &mut self.ctx, now);
        if prev != MissionState::Idle {
            self.record(prev, MissionState::Idle, now);
        }
        self.sink.emit(&MissionEvent::Started(MissionState::Idle));
        info!("MissionStateMachine: initialised at {} ms", now);
    }

    /// One control tick: read sensors → safety → phase handler → actuators.
    pub fn update(&mut self) {
        let now = self.clock.now_ms();

        let snapshot = self.hw.read_snapshot();
        self.ctx.sensors = snapshot;

        let verdict = self.safety.update(&snapshot, now);
        if verdict.is_hazard() {
            self.set_emergency(verdict);
        }

        if self.ctx.emergency.is_hazard() && self.state() != MissionState::Emergency {
            warn!("Hazard ({}) overrides {}", self.ctx.emergency, self.state());
            self.transition_to(MissionState::Emergency, now);
        }

        // EMERGENCY keeps running even with no mission in progress.
        if !self.ctx.running && self.state() != MissionState::Emergency {
            return;
        }

        let prev = self.state();
        if let Some(next) = self.fsm.tick(&mut self.ctx, now) {
            self.record(prev, next, now);
        }

        self.ctx.commands.flush_to(&mut self.hw);
    }

    /// Start a mission from IDLE or COMPLETED.
    ///
    /// Ignored while a hazard is latched or a mission is already running.
    pub fn start_mission(&mut self) {
        if self.state() == MissionState::Emergency || self.ctx.emergency.is_hazard() {
            warn!(
                "start_mission ignored: emergency latched ({})",
                self.ctx.emergency
            );
            return;
        }
        if self.ctx.running {
            warn!("start_mission ignored: mission already in {}", self.state());
            return;
        }

        info!("=== START MISSION ===");
        let now = self.clock.now_ms();
        self.ctx.running = true;
        // Nothing from manual driving carries into the dive.
        self.ctx.halt();
        self.transition_to(MissionState::Descending, now);
        self.ctx.commands.flush_to(&mut self.hw);
    }

    /// Cut propulsion, centre the rudder and return to IDLE.  Leaves the
    /// safety latch alone, so it cannot be used to leave EMERGENCY.
    pub fn stop_mission(&mut self) {
        self.ctx.commands.propulsion = 0.0;
        self.hw.set_propulsion(0.0);

        if self.state() == MissionState::Emergency {
            warn!("stop_mission: staying in EMERGENCY until begin()");
            return;
        }

        info!("=== STOP MISSION ===");
        let now = self.clock.now_ms();
        self.ctx.running = false;
        self.transition_to(MissionState::Idle, now);
        self.ctx.halt();
        // IDLE never flushes, so push the final command set now.
        self.ctx.commands.flush_to(&mut self.hw);
        self.sink.emit(&MissionEvent::MissionStopped);
    }

    /// Latch a hazard.  The first hazard wins; later ones are ignored
    /// until [`begin`](Self::begin).  The switch to EMERGENCY happens on
    /// the next [`update`](Self::update).
    pub fn set_emergency(&mut self, verdict: SafetyVerdict) {
        if self.ctx.emergency == SafetyVerdict::Clear && verdict.is_hazard() {
            self.ctx.emergency = verdict;
            self.sink.emit(&MissionEvent::HazardLatched(verdict));
        }
    }

    // ── Manual actuation (supervisor path) ────────────────────

    /// Drive propulsion/steering directly.  Refused during a mission or
    /// while a hazard is latched.
    pub fn manual_drive(&mut self, propulsion: f32, steering: Steering) -> Result<(), CommandError> {
        self.ensure_manual_allowed()?;
        self.ctx.drive(propulsion, steering);
        self.hw.set_propulsion(self.ctx.commands.propulsion);
        self.hw.set_steering(self.ctx.commands.steering);
        Ok(())
    }

    /// Flood the ballast.  Same restrictions as [`manual_drive`](Self::manual_drive).
    pub fn manual_fill_ballast(&mut self) -> Result<(), CommandError> {
        self.ensure_manual_allowed()?;
        self.ctx.depth.fill_ballast(&mut self.ctx.commands);
        self.hw.set_buoyancy_angle(self.ctx.commands.buoyancy_angle_deg);
        Ok(())
    }

    /// Propulsion off, steering centred.  Always honoured.
    pub fn manual_stop(&mut self) {
        self.ctx.halt();
        self.hw.set_propulsion(self.ctx.commands.propulsion);
        self.hw.set_steering(self.ctx.commands.steering);
    }

    fn ensure_manual_allowed(&self) -> Result<(), CommandError> {
        if self.state() == MissionState::Emergency || self.ctx.emergency.is_hazard() {
            return Err(CommandError::EmergencyLatched(self.ctx.emergency));
        }
        if self.ctx.running {
            return Err(CommandError::AutonomousActive);
        }
        Ok(())
    }

    // ── Configuration ─────────────────────────────────────────

    pub fn set_target_depth(&mut self, meters: f32) -> Result<(), ConfigError> {
        self.edit_mission(|m| m.target_depth_m = meters)
    }

    pub fn set_move_duration(&mut self, ms: u32) -> Result<(), ConfigError> {
        self.edit_mission(|m| m.move_duration_ms = ms)
    }

    pub fn set_turn_duration(&mut self, ms: u32) -> Result<(), ConfigError> {
        self.edit_mission(|m| m.turn_duration_ms = ms)
    }

    pub fn set_mission_config(&mut self, config: MissionConfig) -> Result<(), ConfigError> {
        self.edit_mission(|m| *m = config)
    }

    /// Regulator tuning stays adjustable at any time.
    pub fn depth_controller_mut(&mut self) -> &mut DepthController {
        &mut self.ctx.depth
    }

    fn edit_mission(&mut self, edit: impl FnOnce(&mut MissionConfig)) -> Result<(), ConfigError> {
        if self.ctx.running {
            return Err(ConfigError::MissionActive);
        }
        let mut next = self.ctx.mission;
        edit(&mut next);
        next.validate()?;
        if next.target_depth_m > self.ctx.depth.config().target_depth_max_m {
            return Err(ConfigError::ValidationFailed(
                "target_depth_m exceeds the regulator's maximum",
            ));
        }
        self.ctx.mission = next;
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.ctx.running
    }

    pub fn current_state(&self) -> MissionState {
        self.fsm.current_state()
    }

    pub fn is_mission_finished(&self) -> bool {
        self.state() == MissionState::Completed
    }

    /// Latched hazard cause (`Clear` when none).
    pub fn emergency(&self) -> SafetyVerdict {
        self.ctx.emergency
    }

    pub fn mission_config(&self) -> &MissionConfig {
        &self.ctx.mission
    }

    pub fn capabilities(&self) -> &VehicleCapabilities {
        &self.ctx.capabilities
    }

    pub fn depth_controller(&self) -> &DepthController {
        &self.ctx.depth
    }

    /// Latest sensor snapshot seen by `update()`.
    pub fn sensors(&self) -> &SensorSnapshot {
        &self.ctx.sensors
    }

    /// Command set as of the last flush.
    pub fn commands(&self) -> &ActuatorCommands {
        &self.ctx.commands
    }

    /// Recent transitions, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &TransitionRecord> {
        self.history.iter()
    }

    pub fn build_telemetry(&self) -> TelemetryData {
        let s = &self.ctx.sensors;
        TelemetryData {
            state: self.state(),
            depth_m: s.depth_m,
            target_depth_m: self.ctx.mission.target_depth_m,
            battery_percent: s.battery_percent,
            leak: s.leak_latched || s.leak_instant,
            buoyancy_angle_deg: self.ctx.commands.buoyancy_angle_deg,
            propulsion: self.ctx.commands.propulsion,
            emergency: self.ctx.emergency,
            yaw_deg: s.yaw_deg,
            pitch_deg: s.pitch_deg,
            roll_deg: s.roll_deg,
        }
    }

    /// Push a telemetry snapshot through the event sink.
    pub fn emit_telemetry(&mut self) {
        let t = self.build_telemetry();
        self.sink.emit(&MissionEvent::Telemetry(t));
    }

    pub fn hardware(&self) -> &H {
        &self.hw
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hw
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    // ── Internal ──────────────────────────────────────────────

    fn state(&self) -> MissionState {
        self.fsm.current_state()
    }

    fn transition_to(&mut self, next: MissionState, now: u32) {
        let prev = self.state();
        if prev == next {
            return;
        }
        self.fsm.force_transition(next, &mut self.ctx, now);
        self.record(prev, next, now);
    }

    fn record(&mut self, from: MissionState, to: MissionState, at_ms: u32) {
        let rec = TransitionRecord { from, to, at_ms };
        if self.history.is_full() {
            self.history.pop_front();
        }
        // Cannot fail: a slot was just freed.
        let _ = self.history.push_back(rec);
        self.sink.emit(&MissionEvent::StateChanged { from, to, at_ms });
    }
}
