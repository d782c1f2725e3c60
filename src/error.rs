//! Unified error types for the control core.
//!
//! All variants are `Copy` so they can be passed through the tick loop
//! without allocation. Control operations themselves are total; only configuration
//! and supervisory commands can fail.

use core::fmt;

use crate::safety::SafetyVerdict;

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A field failed range validation. The message names the field.
    ValidationFailed(&'static str),
    /// Mission parameters are frozen while a mission runs.
    MissionActive,
    /// Stored config failed to decode.
    Corrupted,
    /// Encoding or backend failure.
    IoError,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
            Self::MissionActive => write!(f, "mission active, parameters frozen"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Supervisory command errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// Manual actuation is locked out until the hazard is reset.
    EmergencyLatched(SafetyVerdict),
    /// Manual actuation is ignored while the mission drives the vehicle.
    AutonomousActive,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmergencyLatched(v) => write!(f, "emergency latched ({v})"),
            Self::AutonomousActive => write!(f, "autonomous mode active"),
        }
    }
}

impl core::error::Error for CommandError {}
