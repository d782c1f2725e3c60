//! Subcore: control core of a small autonomous submersible.
//!
//! Exposes the mission state machine, the depth regulator and the safety
//! monitor behind port traits, plus host adapters for simulation and
//! integration testing.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod fsm;
pub mod safety;
