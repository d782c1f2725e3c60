//! Closed-loop regulators.

pub mod depth;
