//! Output drivers, task spawning, and the task watchdog.

pub mod relay_bank;
pub mod status_led;
pub mod task_pin;
pub mod watchdog;
