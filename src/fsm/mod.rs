//! Function-pointer finite state machine engine.
//!
//! Classic embedded FSM pattern:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  StateTable                                                  │
//! │  ┌─────────────┬───────────┬──────────┬───────────────────┐  │
//! │  │ MissionState│ on_enter  │ on_exit  │ on_update         │  │
//! │  ├─────────────┼───────────┼──────────┼───────────────────┤  │
//! │  │ Idle        │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  │ Descending  │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  │ ...         │           │          │                   │  │
//! │  │ Emergency   │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  └─────────────┴───────────┴──────────┴───────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state.
//! If it returns `Some(next_id)`, the engine runs `on_exit` for the
//! current state, then `on_enter` for the next, and records the entry
//! time.  `on_enter` therefore fires exactly once per visit, which is
//! what keeps entry actions from re-firing on every tick of a phase.
//!
//! Time is a wrapping `u32` millisecond clock; elapsed time is always
//! `now.wrapping_sub(entry)`.

pub mod context;
pub mod states;

use core::fmt;

use context::FsmContext;
use log::info;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Mission phases.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MissionState {
    Idle = 0,
    Descending = 1,
    Moving = 2,
    Turning = 3,
    Ascending = 4,
    Completed = 5,
    Emergency = 6,
}

impl MissionState {
    /// Total number of states: used to size the table array.
    pub const COUNT: usize = 7;

    /// Convert an index back to `MissionState`.  Panics on out-of-range in
    /// debug builds; returns `Emergency` in release (safe fallback).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Idle,
            1 => Self::Descending,
            2 => Self::Moving,
            3 => Self::Turning,
            4 => Self::Ascending,
            5 => Self::Completed,
            6 => Self::Emergency,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Emergency
            }
        }
    }

    /// Phases during which the depth regulator is active.
    pub fn holds_depth(self) -> bool {
        matches!(self, Self::Descending | Self::Moving | Self::Turning)
    }
}

impl fmt::Display for MissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "IDLE",
            Self::Descending => "DESCENDING",
            Self::Moving => "MOVING",
            Self::Turning => "TURNING",
            Self::Ascending => "ASCENDING",
            Self::Completed => "COMPLETED",
            Self::Emergency => "EMERGENCY",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each state transition.
pub type StateActionFn = fn(&mut FsmContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut FsmContext) -> Option<MissionState>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
/// Stored in a fixed-size array: no heap, no `dyn`.
pub struct StateDescriptor {
    pub id: MissionState,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
pub struct Fsm {
    /// Fixed-size table indexed by `MissionState as usize`.
    table: [StateDescriptor; MissionState::COUNT],
    /// Index of the currently active state.
    current: usize,
    /// Clock reading at which the current state was entered.
    state_entry_ms: u32,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor; MissionState::COUNT], initial: MissionState) -> Self {
        Self {
            table,
            current: initial as usize,
            state_entry_ms: 0,
        }
    }

    /// Put the FSM in `initial` at `now_ms` without running exit actions,
    /// then run `initial`'s `on_enter`.
    pub fn start(&mut self, initial: MissionState, ctx: &mut FsmContext, now_ms: u32) {
        info!("FSM starting in state: {}", initial);
        self.current = initial as usize;
        self.state_entry_ms = now_ms;
        ctx.now_ms = now_ms;
        ctx.elapsed_ms = 0;
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one tick at `now_ms`.
    ///
    /// 1. Refresh `elapsed_ms` in the context.
    /// 2. Call `on_update` for the current state.
    /// 3. If it returns `Some(next)`, execute the transition.
    ///
    /// Returns the new state when a transition happened.
    pub fn tick(&mut self, ctx: &mut FsmContext, now_ms: u32) -> Option<MissionState> {
        ctx.now_ms = now_ms;
        ctx.elapsed_ms = now_ms.wrapping_sub(self.state_entry_ms);

        let next = (self.table[self.current].on_update)(ctx)?;
        if next as usize == self.current {
            return None;
        }
        self.transition(next, ctx, now_ms);
        Some(next)
    }

    /// Force an immediate transition (used by the safety path to jump to
    /// `Emergency` regardless of what `on_update` would return).
    pub fn force_transition(&mut self, next: MissionState, ctx: &mut FsmContext, now_ms: u32) {
        if next as usize != self.current {
            self.transition(next, ctx, now_ms);
        }
    }

    /// The current state's identity.
    pub fn current_state(&self) -> MissionState {
        MissionState::from_index(self.current)
    }

    /// Milliseconds in the current state as of `now_ms`.
    pub fn elapsed_in_state(&self, now_ms: u32) -> u32 {
        now_ms.wrapping_sub(self.state_entry_ms)
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: MissionState, ctx: &mut FsmContext, now_ms: u32) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].id, self.table[next_idx].id
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.state_entry_ms = now_ms;
        ctx.now_ms = now_ms;
        ctx.elapsed_ms = 0;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
