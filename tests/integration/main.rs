//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  All tests run on the host (x86_64) with no
//! real hardware required.

// Links the std time driver used by the command queue's bounded wait.
#[cfg(not(target_os = "espidf"))]
use embassy_time as _;

mod concurrency_tests;
mod controller_tests;
mod mock_hw;
