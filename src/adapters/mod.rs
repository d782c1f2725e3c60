//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to               |
//! |----------------|--------------------|---------------------------|
//! | `log_sink`     | EventSink          | `log` facade              |
//! | `memory_store` | ConfigPort         | postcard blob in memory   |
//! | `sim`          | SensorPort         | first-order depth model   |
//! |                | ActuatorPort       |                           |
//! |                | ClockPort          | hand-advanced clock       |
//! | `time`         | ClockPort          | `std::time::Instant`      |

pub mod log_sink;
pub mod memory_store;
pub mod sim;
pub mod time;
