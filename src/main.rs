//! Subcore host simulator.
//!
//! Runs the mission core against [`SimulatedVehicle`] on a simulated clock,
//! so a full dive can be replayed in a few milliseconds of wall time.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 Adapters (outer ring)                    │
//! │  SimulatedVehicle   SimClock   LogEventSink   MemoryStore│
//! │  (Sensor+Actuator)  (Clock)    (EventSink)    (Config)   │
//! │  ─────────────── Port Trait Boundary ──────────────────  │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │  Supervisor → MissionStateMachine                  │  │
//! │  │  FSM · SafetyMonitor · DepthController             │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```bash
//! # Nominal 1 m dive
//! RUST_LOG=info subcore-sim --target-depth 1.0
//!
//! # Leak 8 s into the mission
//! RUST_LOG=info subcore-sim --leak-at-ms 8000
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use subcore::adapters::log_sink::LogEventSink;
use subcore::adapters::memory_store::MemoryConfigStore;
use subcore::adapters::sim::{SimClock, SimulatedVehicle};
use subcore::app::commands::ManualCommand;
use subcore::app::ports::ConfigPort;
use subcore::app::service::MissionStateMachine;
use subcore::app::supervisor::Supervisor;
use subcore::config::{Steering, SystemConfig};
use subcore::fsm::MissionState;

#[derive(Parser, Debug)]
#[command(name = "subcore-sim")]
#[command(about = "Run an autonomous dive against a simulated vehicle")]
struct Args {
    /// Target cruise depth (m)
    #[arg(long, default_value_t = 0.3)]
    target_depth: f32,

    /// Straight-line leg duration (ms)
    #[arg(long, default_value_t = 10_000)]
    move_ms: u32,

    /// Turn leg duration (ms)
    #[arg(long, default_value_t = 3_000)]
    turn_ms: u32,

    /// Turn to the right instead of the left
    #[arg(long)]
    turn_right: bool,

    /// Control period (ms)
    #[arg(long, default_value_t = 50)]
    tick_ms: u32,

    /// Inject a leak this many ms after start
    #[arg(long)]
    leak_at_ms: Option<u32>,

    /// Drop the battery to 5 % this many ms after start
    #[arg(long)]
    low_battery_at_ms: Option<u32>,

    /// Battery drain (% per second of simulated time)
    #[arg(long, default_value_t = 0.0)]
    battery_drain: f32,

    /// Simulate a vehicle without a pressure sensor
    #[arg(long)]
    no_depth_sensor: bool,

    /// Log a telemetry line every N ms (0 disables)
    #[arg(long, default_value_t = 1_000)]
    telemetry_ms: u32,

    /// Give up after this much simulated time (ms)
    #[arg(long, default_value_t = 120_000)]
    max_ms: u32,
}

type SimSupervisor = Supervisor<SimulatedVehicle, SimClock, LogEventSink>;

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut supervisor = build(&args)?;
    info!(
        "subcore-sim: target {:.2} m, move {} ms, turn {} ms, tick {} ms",
        args.target_depth, args.move_ms, args.turn_ms, args.tick_ms
    );
    supervisor.on_command(ManualCommand::ToggleAutonomous)?;

    let t = run(&args, &mut supervisor);
    if t >= args.max_ms {
        warn!("subcore-sim: gave up after {} ms", t);
    }

    // ── Report ────────────────────────────────────────────────
    println!("elapsed: {} ms", t);
    for rec in supervisor.mission().history() {
        println!("{:>8} ms  {} -> {}", rec.at_ms, rec.from, rec.to);
    }
    println!("{}", supervisor.status_json()?);
    Ok(())
}

/// Round-trip the configuration through the config port and wire adapters.
fn build(args: &Args) -> Result<SimSupervisor> {
    let mut store = MemoryConfigStore::new();
    let mut config = store.load().context("loading defaults")?;
    config.mission.target_depth_m = args.target_depth;
    config.mission.move_duration_ms = args.move_ms;
    config.mission.turn_duration_ms = args.turn_ms;
    if args.turn_right {
        config.mission.turn_direction = Steering::Right;
    }
    store.save(&config).context("invalid mission parameters")?;
    let config: SystemConfig = store.load()?;

    let mut vehicle = SimulatedVehicle::new(&config.depth);
    vehicle.set_depth_sensor_present(!args.no_depth_sensor);
    vehicle.set_battery_drain(args.battery_drain);

    let mission = MissionStateMachine::new(
        config.clone(),
        vehicle,
        SimClock::default(),
        LogEventSink::new(),
    )?;
    let mut supervisor = Supervisor::new(mission, config.manual);
    supervisor.begin();
    Ok(supervisor)
}

/// Control loop in simulated time.  Returns the elapsed time (ms).
fn run(args: &Args, supervisor: &mut SimSupervisor) -> u32 {
    let tick = args.tick_ms.max(1);
    let mut t: u32 = 0;
    let mut emergency_for: u32 = 0;
    while t < args.max_ms {
        t = t.saturating_add(tick);
        {
            let m = supervisor.mission_mut();
            m.clock().advance(tick);
            let hw = m.hardware_mut();
            hw.step(tick);
            if args.leak_at_ms.is_some_and(|at| t >= at) {
                hw.inject_leak();
            }
            if args.low_battery_at_ms.is_some_and(|at| t >= at) {
                hw.set_battery_percent(5.0);
            }
        }

        supervisor.update();

        if args.telemetry_ms > 0 && t % args.telemetry_ms < tick {
            supervisor.mission_mut().emit_telemetry();
        }

        let state = supervisor.mission().current_state();
        if state == MissionState::Completed {
            break;
        }
        if state == MissionState::Emergency {
            emergency_for = emergency_for.saturating_add(tick);
            // Let the vehicle float up before reporting.
            if emergency_for >= 5_000 {
                break;
            }
        }
    }
    t
}
