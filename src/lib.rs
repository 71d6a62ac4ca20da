//! RelayCtl firmware library.
//!
//! Exposes the command pipeline, drivers and adapters for integration
//! testing and for the `relayctl` binary. All ESP-IDF-specific code is
//! guarded by `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod pins;

pub mod adapters;
pub mod drivers;

#[cfg(target_os = "espidf")]
mod time_driver;

// Links the std time driver into the unit-test binary.
#[cfg(all(test, not(target_os = "espidf")))]
use embassy_time as _;
