//! Operator-facing flows through the supervisor.

use subcore::app::commands::{ControlMode, ManualCommand};
use subcore::app::supervisor::Supervisor;
use subcore::config::{Steering, SystemConfig};
use subcore::error::CommandError;
use subcore::fsm::MissionState;
use subcore::safety::SafetyVerdict;

use crate::mock_hw::{FakeClock, MockHardware, RecordingSink, make_machine};

const TICK: u32 = 100;

type TestSupervisor = Supervisor<MockHardware, FakeClock, RecordingSink>;

fn make_supervisor(config: SystemConfig) -> TestSupervisor {
    let manual = config.manual;
    let mut sup = Supervisor::new(make_machine(config), manual);
    sup.begin();
    sup
}

fn tick(sup: &mut TestSupervisor, n: u32) {
    for _ in 0..n {
        sup.mission().clock().advance(TICK);
        sup.update();
    }
}

#[test]
fn manual_keys_drive_the_vehicle() {
    let mut sup = make_supervisor(SystemConfig::default());

    sup.on_key('q').unwrap();
    assert_eq!(sup.mission().hardware().propulsion(), Some(0.6));
    assert_eq!(sup.mission().hardware().steering(), Some(Steering::Left));

    sup.on_key('d').unwrap();
    assert_eq!(sup.mission().hardware().steering(), Some(Steering::Right));

    sup.on_key('x').unwrap();
    assert_eq!(sup.mission().hardware().buoyancy(), Some(180.0));

    sup.on_key('s').unwrap();
    assert_eq!(sup.mission().hardware().propulsion(), Some(0.0));
    assert_eq!(sup.mission().hardware().steering(), Some(Steering::Center));
}

#[test]
fn manual_turn_does_not_carry_into_the_dive() {
    let mut sup = make_supervisor(SystemConfig::default());
    sup.on_key('q').unwrap();
    sup.on_key('a').unwrap();
    tick(&mut sup, 20);

    assert_eq!(sup.mission().current_state(), MissionState::Descending);
    assert_eq!(sup.mission().hardware().propulsion(), Some(0.0));
    assert_eq!(sup.mission().hardware().steering(), Some(Steering::Center));
}

#[test]
fn autonomous_mission_hands_back_to_manual_when_done() {
    let mut config = SystemConfig::default();
    config.mission.move_duration_ms = 1_000;
    config.mission.turn_duration_ms = 500;
    let mut sup = make_supervisor(config);

    sup.on_command(ManualCommand::ToggleAutonomous).unwrap();
    assert_eq!(sup.mode(), ControlMode::Autonomous);

    sup.mission_mut().hardware_mut().snapshot.depth_m = 0.3;
    tick(&mut sup, 1);
    assert_eq!(sup.mission().current_state(), MissionState::Moving);
    tick(&mut sup, 15);
    assert_eq!(sup.mission().current_state(), MissionState::Ascending);
    assert_eq!(sup.mode(), ControlMode::Autonomous);

    sup.mission_mut().hardware_mut().snapshot.depth_m = 0.0;
    tick(&mut sup, 1);
    assert_eq!(sup.mission().current_state(), MissionState::Completed);
    assert_eq!(sup.mode(), ControlMode::Manual);

    // Manual keys work again.
    assert!(sup.on_key('z').is_ok());
}

#[test]
fn stop_key_aborts_autonomous_mission() {
    let mut sup = make_supervisor(SystemConfig::default());
    sup.on_key('a').unwrap();
    tick(&mut sup, 3);

    sup.on_key('s').unwrap();
    assert_eq!(sup.mode(), ControlMode::Manual);
    assert_eq!(sup.mission().current_state(), MissionState::Idle);
    assert_eq!(sup.mission().hardware().propulsion(), Some(0.0));
}

#[test]
fn emergency_recovery_needs_manual_and_reset() {
    let mut sup = make_supervisor(SystemConfig::default());
    sup.on_key('a').unwrap();
    sup.mission_mut().hardware_mut().snapshot.leak_latched = true;
    tick(&mut sup, 1);
    assert_eq!(sup.mission().current_state(), MissionState::Emergency);

    // Still autonomous: manual keys locked out.
    assert_eq!(sup.on_key('z'), Err(CommandError::AutonomousActive));

    // Back to manual: the hazard still blocks driving.
    sup.on_key('a').unwrap();
    assert_eq!(sup.mode(), ControlMode::Manual);
    assert_eq!(
        sup.on_key('z'),
        Err(CommandError::EmergencyLatched(SafetyVerdict::Leak))
    );
    assert_eq!(
        sup.on_key('a'),
        Err(CommandError::EmergencyLatched(SafetyVerdict::Leak))
    );
    assert_eq!(sup.mission().current_state(), MissionState::Emergency);

    sup.mission_mut().hardware_mut().snapshot.leak_latched = false;
    sup.reset();
    assert_eq!(sup.mode(), ControlMode::Manual);
    assert_eq!(sup.mission().current_state(), MissionState::Idle);
    assert!(sup.on_key('z').is_ok());
}

#[test]
fn status_reports_live_values() {
    let mut sup = make_supervisor(SystemConfig::default());
    sup.mission_mut().hardware_mut().snapshot.depth_m = 0.42;
    sup.mission_mut().hardware_mut().snapshot.battery_percent = 87.0;
    tick(&mut sup, 1);

    let s = sup.status();
    assert_eq!(s.mode, ControlMode::Manual);
    assert_eq!(s.state, MissionState::Idle);
    assert_eq!(s.depth_m, 0.42);
    assert_eq!(s.battery_percent, 87.0);
    assert!(!s.leak);

    let json: serde_json::Value = serde_json::from_str(&sup.status_json().unwrap()).unwrap();
    assert_eq!(json["emergency"], "Clear");
    assert_eq!(json["running"], false);
}
