//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured mission events through
//! the `log` facade (serial console on a board, `env_logger` on the host).

use log::{error, info, warn};

use crate::app::events::MissionEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`MissionEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &MissionEvent) {
        match event {
            MissionEvent::Telemetry(t) => {
                info!(
                    "TELEM | state={} | depth={:.2}/{:.2}m | batt={:.0}% | leak={} | \
                     ballast={:.0}\u{00b0} prop={:.2} | ypr={:.0}/{:.0}/{:.0} | emergency={}",
                    t.state,
                    t.depth_m,
                    t.target_depth_m,
                    t.battery_percent,
                    t.leak,
                    t.buoyancy_angle_deg,
                    t.propulsion,
                    t.yaw_deg,
                    t.pitch_deg,
                    t.roll_deg,
                    t.emergency,
                );
            }
            MissionEvent::StateChanged { from, to, at_ms } => {
                info!("STATE | {} -> {} @ {} ms", from, to, at_ms);
            }
            MissionEvent::HazardLatched(cause) => {
                error!("HAZARD | latched: {}", cause);
            }
            MissionEvent::MissionStopped => {
                warn!("STOP | mission stopped by operator");
            }
            MissionEvent::Started(state) => {
                info!("START | initial_state={}", state);
            }
        }
    }
}
