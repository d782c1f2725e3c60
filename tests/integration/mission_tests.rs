//! End-to-end mission sequencing against mock adapters.

use subcore::config::{Steering, SystemConfig};
use subcore::fsm::MissionState;
use subcore::safety::SafetyVerdict;

use crate::mock_hw::{make_machine, make_machine_at, run_ticks};

const TICK: u32 = 100;

// ── Nominal dive ──────────────────────────────────────────────

#[test]
fn nominal_dive_runs_every_phase_in_order() {
    let mut m = make_machine(SystemConfig::default());
    m.set_target_depth(1.0).unwrap();
    m.set_move_duration(10_000).unwrap();
    m.set_turn_duration(3_000).unwrap();

    m.start_mission();
    assert_eq!(m.current_state(), MissionState::Descending);
    assert!(m.is_running());

    // Still shallow: keep descending, ballast past neutral.
    m.hardware_mut().snapshot.depth_m = 0.2;
    run_ticks(&mut m, 10, TICK);
    assert_eq!(m.current_state(), MissionState::Descending);
    assert!(m.hardware().buoyancy().unwrap() > 90.0);

    // Inside the margin.
    m.hardware_mut().snapshot.depth_m = 0.95;
    run_ticks(&mut m, 1, TICK);
    assert_eq!(m.current_state(), MissionState::Moving);
    assert_eq!(m.hardware().propulsion(), Some(0.7));
    assert_eq!(m.hardware().steering(), Some(Steering::Center));

    run_ticks(&mut m, 99, TICK);
    assert_eq!(m.current_state(), MissionState::Moving);
    run_ticks(&mut m, 1, TICK);
    assert_eq!(m.current_state(), MissionState::Turning);
    assert_eq!(m.hardware().propulsion(), Some(0.6));
    assert_eq!(m.hardware().steering(), Some(Steering::Left));

    run_ticks(&mut m, 29, TICK);
    assert_eq!(m.current_state(), MissionState::Turning);
    run_ticks(&mut m, 1, TICK);
    assert_eq!(m.current_state(), MissionState::Ascending);
    assert_eq!(m.hardware().buoyancy(), Some(0.0));
    assert_eq!(m.hardware().steering(), Some(Steering::Center));

    m.hardware_mut().snapshot.depth_m = 0.1;
    run_ticks(&mut m, 1, TICK);
    assert_eq!(m.current_state(), MissionState::Completed);
    assert!(m.is_mission_finished());
    assert!(!m.is_running());
    assert_eq!(m.hardware().propulsion(), Some(0.0));

    assert_eq!(
        m.sink().transitions(),
        vec![
            (MissionState::Idle, MissionState::Descending),
            (MissionState::Descending, MissionState::Moving),
            (MissionState::Moving, MissionState::Turning),
            (MissionState::Turning, MissionState::Ascending),
            (MissionState::Ascending, MissionState::Completed),
        ]
    );
}

#[test]
fn completed_is_inert_until_restarted() {
    let mut m = make_machine(SystemConfig::default());
    m.start_mission();
    m.hardware_mut().snapshot.depth_m = 0.3;
    run_ticks(&mut m, 1, TICK);
    m.hardware_mut().snapshot.depth_m = 0.0;
    run_ticks(&mut m, 200, TICK);
    assert_eq!(m.current_state(), MissionState::Completed);

    let writes = m.hardware().calls.len();
    run_ticks(&mut m, 10, TICK);
    assert_eq!(m.hardware().calls.len(), writes);

    m.start_mission();
    assert_eq!(m.current_state(), MissionState::Descending);
    assert!(m.is_running());
}

#[test]
fn second_start_is_ignored() {
    let mut m = make_machine(SystemConfig::default());
    m.start_mission();
    m.start_mission();
    assert_eq!(m.sink().transitions().len(), 1);
}

#[test]
fn stop_returns_to_idle_and_cuts_propulsion() {
    let mut m = make_machine(SystemConfig::default());
    m.start_mission();
    m.hardware_mut().snapshot.depth_m = 0.3;
    run_ticks(&mut m, 1, TICK);
    assert_eq!(m.current_state(), MissionState::Moving);

    m.stop_mission();
    assert_eq!(m.current_state(), MissionState::Idle);
    assert!(!m.is_running());
    assert_eq!(m.hardware().propulsion(), Some(0.0));
}

#[test]
fn stop_mid_turn_centres_the_rudder() {
    let mut config = SystemConfig::default();
    config.mission.move_duration_ms = 1_000;
    let mut m = make_machine(config);
    m.start_mission();
    m.hardware_mut().snapshot.depth_m = 0.3;
    run_ticks(&mut m, 11, TICK);
    assert_eq!(m.current_state(), MissionState::Turning);
    assert_eq!(m.hardware().steering(), Some(Steering::Left));

    m.stop_mission();
    run_ticks(&mut m, 5, TICK);
    assert_eq!(m.current_state(), MissionState::Idle);
    assert_eq!(m.hardware().propulsion(), Some(0.0));
    assert_eq!(m.hardware().steering(), Some(Steering::Center));
    assert_eq!(m.hardware().steering(), Some(m.commands().steering));
}

// ── Missing depth sensor ──────────────────────────────────────

#[test]
fn descent_without_depth_sensor_times_out() {
    let mut m = make_machine(SystemConfig::default());
    m.hardware_mut().snapshot.depth_available = false;
    m.start_mission();

    run_ticks(&mut m, 300, TICK);
    assert_eq!(m.current_state(), MissionState::Descending);
    run_ticks(&mut m, 1, TICK);
    assert_eq!(m.current_state(), MissionState::Moving);
}

#[test]
fn ascent_without_depth_sensor_times_out() {
    let mut config = SystemConfig::default();
    config.mission.move_duration_ms = 1_000;
    config.mission.turn_duration_ms = 1_000;
    let mut m = make_machine(config);
    m.start_mission();
    m.hardware_mut().snapshot.depth_m = 0.3;
    run_ticks(&mut m, 1, TICK);
    m.hardware_mut().snapshot.depth_available = false;
    run_ticks(&mut m, 20, TICK);
    assert_eq!(m.current_state(), MissionState::Ascending);

    run_ticks(&mut m, 150, TICK);
    assert_eq!(m.current_state(), MissionState::Ascending);
    run_ticks(&mut m, 1, TICK);
    assert_eq!(m.current_state(), MissionState::Completed);
}

// ── Hazards ───────────────────────────────────────────────────

#[test]
fn leak_forces_emergency_from_any_phase() {
    let mut m = make_machine(SystemConfig::default());
    m.start_mission();
    m.hardware_mut().snapshot.depth_m = 0.3;
    run_ticks(&mut m, 1, TICK);
    assert_eq!(m.current_state(), MissionState::Moving);

    m.hardware_mut().snapshot.leak_instant = true;
    m.hardware_mut().snapshot.leak_latched = true;
    run_ticks(&mut m, 1, TICK);

    assert_eq!(m.current_state(), MissionState::Emergency);
    assert_eq!(m.emergency(), SafetyVerdict::Leak);
    assert!(!m.is_running());
    assert_eq!(m.hardware().buoyancy(), Some(0.0));
    assert_eq!(m.hardware().propulsion(), Some(0.0));
}

#[test]
fn emergency_reasserts_safe_outputs_every_tick() {
    let mut m = make_machine(SystemConfig::default());
    m.hardware_mut().snapshot.leak_latched = true;
    run_ticks(&mut m, 1, TICK);
    assert_eq!(m.current_state(), MissionState::Emergency);

    let before = m.hardware().calls.len();
    run_ticks(&mut m, 5, TICK);
    assert!(m.hardware().calls.len() >= before + 15);
    assert_eq!(m.hardware().buoyancy(), Some(0.0));
    assert_eq!(m.hardware().propulsion(), Some(0.0));
}

#[test]
fn hazard_while_idle_still_latches() {
    let mut m = make_machine(SystemConfig::default());
    m.hardware_mut().snapshot.leak_latched = true;
    run_ticks(&mut m, 1, TICK);
    assert_eq!(m.current_state(), MissionState::Emergency);
}

#[test]
fn emergency_survives_stop_and_start() {
    let mut m = make_machine(SystemConfig::default());
    m.start_mission();
    m.hardware_mut().snapshot.leak_latched = true;
    run_ticks(&mut m, 1, TICK);

    m.stop_mission();
    assert_eq!(m.current_state(), MissionState::Emergency);
    m.start_mission();
    assert_eq!(m.current_state(), MissionState::Emergency);
    assert!(!m.is_running());

    // Sensor clears on its own: still latched.
    m.hardware_mut().snapshot.leak_latched = false;
    run_ticks(&mut m, 10, TICK);
    assert_eq!(m.current_state(), MissionState::Emergency);
    assert_eq!(m.emergency(), SafetyVerdict::Leak);
}

#[test]
fn begin_is_the_only_way_out() {
    let mut m = make_machine(SystemConfig::default());
    m.hardware_mut().snapshot.leak_latched = true;
    run_ticks(&mut m, 1, TICK);
    assert_eq!(m.current_state(), MissionState::Emergency);

    m.hardware_mut().snapshot.leak_latched = false;
    m.begin();
    assert_eq!(m.current_state(), MissionState::Idle);
    assert_eq!(m.emergency(), SafetyVerdict::Clear);
    run_ticks(&mut m, 5, TICK);
    assert_eq!(m.current_state(), MissionState::Idle);
}

#[test]
fn reset_keeps_the_emergency_in_history() {
    let mut m = make_machine_at(SystemConfig::default(), 5_000);
    m.hardware_mut().snapshot.leak_latched = true;
    run_ticks(&mut m, 1, TICK);
    m.hardware_mut().snapshot.leak_latched = false;
    m.clock().advance(TICK);
    m.begin();

    let tail: Vec<_> = m.history().map(|r| (r.from, r.to, r.at_ms)).collect();
    assert_eq!(
        tail,
        vec![
            (MissionState::Idle, MissionState::Emergency, 5_100),
            (MissionState::Emergency, MissionState::Idle, 5_200),
        ]
    );
}

#[test]
fn begin_with_hazard_still_present_retrips() {
    let mut m = make_machine(SystemConfig::default());
    m.hardware_mut().snapshot.leak_latched = true;
    run_ticks(&mut m, 1, TICK);
    m.begin();
    run_ticks(&mut m, 1, TICK);
    assert_eq!(m.current_state(), MissionState::Emergency);
}

#[test]
fn hazard_beats_timed_transition_on_same_tick() {
    let mut config = SystemConfig::default();
    config.mission.move_duration_ms = 1_000;
    let mut m = make_machine(config);
    m.start_mission();
    m.hardware_mut().snapshot.depth_m = 0.3;
    run_ticks(&mut m, 1, TICK);
    run_ticks(&mut m, 9, TICK);
    assert_eq!(m.current_state(), MissionState::Moving);

    m.hardware_mut().snapshot.leak_latched = true;
    run_ticks(&mut m, 1, TICK);
    assert_eq!(m.current_state(), MissionState::Emergency);
    assert_eq!(
        m.sink().transitions().last(),
        Some(&(MissionState::Moving, MissionState::Emergency))
    );
}

#[test]
fn external_emergency_applies_on_next_tick() {
    let mut m = make_machine(SystemConfig::default());
    m.start_mission();
    m.set_emergency(SafetyVerdict::BatteryLow);
    assert_eq!(m.current_state(), MissionState::Descending);
    m.start_mission();
    run_ticks(&mut m, 1, TICK);
    assert_eq!(m.current_state(), MissionState::Emergency);
    assert_eq!(m.emergency(), SafetyVerdict::BatteryLow);
}

// ── Clock wrap ────────────────────────────────────────────────

#[test]
fn phase_timing_survives_clock_wrap() {
    let mut m = make_machine_at(SystemConfig::default(), u32::MAX - 500);
    m.start_mission();
    m.hardware_mut().snapshot.depth_m = 0.3;
    run_ticks(&mut m, 1, TICK);
    assert_eq!(m.current_state(), MissionState::Moving);

    run_ticks(&mut m, 99, TICK);
    assert_eq!(m.current_state(), MissionState::Moving);
    run_ticks(&mut m, 1, TICK);
    assert_eq!(m.current_state(), MissionState::Turning);
}

// ── Diagnostics ───────────────────────────────────────────────

#[test]
fn history_records_transition_times() {
    let mut m = make_machine_at(SystemConfig::default(), 1_000);
    m.start_mission();
    m.hardware_mut().snapshot.depth_m = 0.3;
    run_ticks(&mut m, 1, TICK);

    let times: Vec<u32> = m.history().map(|r| r.at_ms).collect();
    assert_eq!(times, vec![1_000, 1_100]);
}
