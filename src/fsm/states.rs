//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers: no closures, no dynamic
//! dispatch, no heap.
//!
//! ```text
//!  IDLE ──[start]──▶ DESCENDING ──[at depth | timeout]──▶ MOVING
//!                                                            │
//!                                                   [move duration]
//!                                                            ▼
//!  COMPLETED ◀──[surfaced | timeout]── ASCENDING ◀──[turn]── TURNING
//!
//!  Any state ──[hazard]──▶ EMERGENCY   (absorbing until begin())
//! ```
//!
//! DESCENDING, MOVING and TURNING run the depth regulator every tick.

use super::context::FsmContext;
use super::{MissionState, StateDescriptor};
use crate::config::Steering;
use log::{error, info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; MissionState::COUNT] {
    [
        StateDescriptor {
            id: MissionState::Idle,
            on_enter: None,
            on_exit: None,
            on_update: idle_update,
        },
        StateDescriptor {
            id: MissionState::Descending,
            on_enter: Some(descending_enter),
            on_exit: None,
            on_update: descending_update,
        },
        StateDescriptor {
            id: MissionState::Moving,
            on_enter: Some(moving_enter),
            on_exit: None,
            on_update: moving_update,
        },
        StateDescriptor {
            id: MissionState::Turning,
            on_enter: Some(turning_enter),
            on_exit: Some(turning_exit),
            on_update: turning_update,
        },
        StateDescriptor {
            id: MissionState::Ascending,
            on_enter: Some(ascending_enter),
            on_exit: None,
            on_update: ascending_update,
        },
        StateDescriptor {
            id: MissionState::Completed,
            on_enter: Some(completed_enter),
            on_exit: None,
            on_update: completed_update,
        },
        StateDescriptor {
            id: MissionState::Emergency,
            on_enter: Some(emergency_enter),
            on_exit: None,
            on_update: emergency_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE: waiting for start_mission()
// ═══════════════════════════════════════════════════════════════════════════

fn idle_update(_ctx: &mut FsmContext) -> Option<MissionState> {
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  DESCENDING: regulate down to the target depth
// ═══════════════════════════════════════════════════════════════════════════

fn descending_enter(ctx: &mut FsmContext) {
    info!(
        "DESCENDING: target {:.2} m (margin {:.2} m, timeout {} ms)",
        ctx.mission.target_depth_m, ctx.mission.depth_margin_m, ctx.mission.descend_timeout_ms
    );
    if !ctx.sensors.depth_available {
        warn!("DESCENDING: no depth sensor, relying on timeout");
    }
}

fn descending_update(ctx: &mut FsmContext) -> Option<MissionState> {
    ctx.hold_depth();

    if let Some(depth) = ctx.measured_depth() {
        let error = (depth - ctx.mission.target_depth_m).abs();
        if error < ctx.mission.depth_margin_m {
            info!(
                "DESCENDING: reached {:.2} m after {} ms",
                depth, ctx.elapsed_ms
            );
            return Some(MissionState::Moving);
        }
    }

    if ctx.elapsed_ms > ctx.mission.descend_timeout_ms {
        warn!(
            "DESCENDING: timeout after {} ms, moving on at {:.2} m",
            ctx.elapsed_ms, ctx.sensors.depth_m
        );
        return Some(MissionState::Moving);
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  MOVING: straight cruise at depth
// ═══════════════════════════════════════════════════════════════════════════

fn moving_enter(ctx: &mut FsmContext) {
    ctx.drive(ctx.mission.cruise_propulsion, Steering::Center);
    info!(
        "MOVING: propulsion {:.2} for {} ms",
        ctx.commands.propulsion, ctx.mission.move_duration_ms
    );
}

fn moving_update(ctx: &mut FsmContext) -> Option<MissionState> {
    ctx.hold_depth();

    if ctx.elapsed_ms >= ctx.mission.move_duration_ms {
        return Some(MissionState::Turning);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  TURNING: half turn at depth
// ═══════════════════════════════════════════════════════════════════════════

fn turning_enter(ctx: &mut FsmContext) {
    ctx.drive(ctx.mission.turn_propulsion, ctx.mission.turn_direction);
    info!(
        "TURNING: propulsion {:.2}, steering {:?} for {} ms",
        ctx.commands.propulsion, ctx.commands.steering, ctx.mission.turn_duration_ms
    );
}

fn turning_exit(ctx: &mut FsmContext) {
    ctx.commands.steering = Steering::Center;
}

fn turning_update(ctx: &mut FsmContext) -> Option<MissionState> {
    ctx.hold_depth();

    if ctx.elapsed_ms >= ctx.mission.turn_duration_ms {
        return Some(MissionState::Ascending);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  ASCENDING: ballast fully empty until surfaced
// ═══════════════════════════════════════════════════════════════════════════

fn ascending_enter(ctx: &mut FsmContext) {
    // Full empty rather than a 0 m setpoint: guarantees positive buoyancy.
    ctx.depth.empty_ballast(&mut ctx.commands);
    info!(
        "ASCENDING: ballast empty ({:.0} deg), timeout {} ms",
        ctx.commands.buoyancy_angle_deg, ctx.mission.ascend_timeout_ms
    );
}

fn ascending_update(ctx: &mut FsmContext) -> Option<MissionState> {
    if let Some(depth) = ctx.measured_depth() {
        if depth < ctx.mission.surface_depth_m {
            info!("ASCENDING: surfaced at {:.2} m", depth);
            return Some(MissionState::Completed);
        }
    }

    if ctx.elapsed_ms > ctx.mission.ascend_timeout_ms {
        warn!("ASCENDING: timeout after {} ms, assuming surfaced", ctx.elapsed_ms);
        return Some(MissionState::Completed);
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  COMPLETED: mission inert
// ═══════════════════════════════════════════════════════════════════════════

fn completed_enter(ctx: &mut FsmContext) {
    ctx.halt();
    ctx.running = false;
    info!("COMPLETED: mission finished");
}

fn completed_update(ctx: &mut FsmContext) -> Option<MissionState> {
    ctx.running = false;
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  EMERGENCY: hazard latched, surface and stop
// ═══════════════════════════════════════════════════════════════════════════

fn emergency_enter(ctx: &mut FsmContext) {
    ctx.running = false;
    ctx.depth.empty_ballast(&mut ctx.commands);
    ctx.halt();
    error!("EMERGENCY: cause {}, ballast empty, propulsion off", ctx.emergency);
}

fn emergency_update(ctx: &mut FsmContext) -> Option<MissionState> {
    // Re-assert every tick; nothing may drive the vehicle from here.
    ctx.depth.empty_ballast(&mut ctx.commands);
    ctx.halt();
    None
}
