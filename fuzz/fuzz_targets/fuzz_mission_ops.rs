//! Fuzz target: mission machine operation sequences
//!
//! Each input byte selects an operation (tick, start, stop, fault
//! injection).  Checks:
//! - No panics
//! - EMERGENCY, once entered, is never left
//! - Every tick in EMERGENCY leaves zero thrust and an empty ballast
//!
//! cargo fuzz run fuzz_mission_ops

#![no_main]

use libfuzzer_sys::fuzz_target;
use subcore::adapters::log_sink::LogEventSink;
use subcore::adapters::sim::{SimClock, SimulatedVehicle};
use subcore::app::service::MissionStateMachine;
use subcore::config::SystemConfig;
use subcore::fsm::MissionState;

fuzz_target!(|data: &[u8]| {
    let Ok(mut m) = MissionStateMachine::new(
        SystemConfig::default(),
        SimulatedVehicle::default(),
        SimClock::default(),
        LogEventSink::new(),
    ) else {
        return;
    };
    m.begin();

    let mut latched = false;
    for &b in data {
        let mut ticked = false;
        match b % 8 {
            0..=3 => {
                let dt = u32::from(b) * 40;
                m.clock().advance(dt);
                m.hardware_mut().step(dt);
                m.update();
                ticked = true;
            }
            4 => m.start_mission(),
            5 => m.stop_mission(),
            6 => m.hardware_mut().inject_leak(),
            _ => m.hardware_mut().set_battery_percent(f32::from(b) / 2.0),
        }

        latched |= m.current_state() == MissionState::Emergency;
        if latched {
            assert_eq!(m.current_state(), MissionState::Emergency);
            assert!(!m.is_running());
            if ticked {
                assert_eq!(m.hardware().propulsion(), 0.0);
                assert_eq!(m.hardware().buoyancy_angle(), 0.0);
            }
        }
    }
});
