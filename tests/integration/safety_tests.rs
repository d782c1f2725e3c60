//! Low-battery debounce as seen through the mission machine.

use subcore::config::SystemConfig;
use subcore::fsm::MissionState;
use subcore::safety::SafetyVerdict;

use crate::mock_hw::{make_machine, run_ticks};

const TICK: u32 = 100;

#[test]
fn low_battery_trips_after_dwell() {
    let mut m = make_machine(SystemConfig::default());
    m.start_mission();
    m.hardware_mut().snapshot.battery_percent = 10.0;

    // First low sample at t=100; dwell is 4000 ms.
    run_ticks(&mut m, 40, TICK);
    assert_eq!(m.current_state(), MissionState::Descending);
    run_ticks(&mut m, 1, TICK);
    assert_eq!(m.current_state(), MissionState::Emergency);
    assert_eq!(m.emergency(), SafetyVerdict::BatteryLow);
}

#[test]
fn recovery_restarts_the_dwell() {
    let mut m = make_machine(SystemConfig::default());
    m.start_mission();

    m.hardware_mut().snapshot.battery_percent = 10.0;
    run_ticks(&mut m, 30, TICK);
    m.hardware_mut().snapshot.battery_percent = 50.0;
    run_ticks(&mut m, 1, TICK);
    m.hardware_mut().snapshot.battery_percent = 10.0;
    run_ticks(&mut m, 30, TICK);

    assert_eq!(m.current_state(), MissionState::Descending);
    assert_eq!(m.emergency(), SafetyVerdict::Clear);
}

#[test]
fn missing_gauge_never_trips() {
    for reading in [0.0, -5.0, 150.0, f32::NAN] {
        let mut m = make_machine(SystemConfig::default());
        m.start_mission();
        m.hardware_mut().snapshot.battery_percent = reading;
        run_ticks(&mut m, 100, TICK);
        assert_eq!(m.emergency(), SafetyVerdict::Clear, "reading {reading}");
    }
}

#[test]
fn leak_outranks_low_battery() {
    let mut m = make_machine(SystemConfig::default());
    m.hardware_mut().snapshot.battery_percent = 5.0;
    m.hardware_mut().snapshot.leak_latched = true;
    run_ticks(&mut m, 50, TICK);
    assert_eq!(m.emergency(), SafetyVerdict::Leak);
}
