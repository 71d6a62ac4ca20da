//! Application core — domain logic, no direct hardware access.
//!
//! The command pipeline (parse → queue → control task → ack), the
//! connection safety policy, and the indicator / heartbeat schedules.
//! All interaction with the radio, the console and the platform happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod commands;
pub mod connection;
pub mod events;
pub mod heartbeat;
pub mod indicator;
pub mod ports;
pub mod queue;
pub mod service;
