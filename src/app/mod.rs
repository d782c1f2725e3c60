//! Application core: mission logic with zero I/O.
//!
//! The mission sequencer, hazard handling and the operator supervisor live
//! here.  All interaction with hardware happens through **port traits**
//! defined in [`ports`], keeping this layer fully testable without a
//! vehicle in the water.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
pub mod supervisor;
