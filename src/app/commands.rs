//! Inbound teleoperation commands.
//!
//! These represent actions requested by the outside world (the remote
//! key pad, a status page, a test) that the
//! [`Supervisor`](super::supervisor::Supervisor) interprets.

use serde::{Deserialize, Serialize};

/// Who is driving the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ControlMode {
    #[default]
    Manual,
    Autonomous,
}

/// Commands that external adapters can send to the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManualCommand {
    Forward,
    TurnLeft,
    TurnRight,
    Stop,
    /// Manual → autonomous starts a mission; autonomous → manual stops it.
    ToggleAutonomous,
    /// Flood the ballast.
    Descend,
}

impl ManualCommand {
    /// Key pad mapping (AZERTY layout, case-insensitive).
    ///
    /// | key | command          |
    /// |-----|------------------|
    /// | z   | Forward          |
    /// | q   | TurnLeft         |
    /// | d   | TurnRight        |
    /// | s   | Stop             |
    /// | a   | ToggleAutonomous |
    /// | x   | Descend          |
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'z' => Some(Self::Forward),
            'q' => Some(Self::TurnLeft),
            'd' => Some(Self::TurnRight),
            's' => Some(Self::Stop),
            'a' => Some(Self::ToggleAutonomous),
            'x' => Some(Self::Descend),
            _ => None,
        }
    }
}
