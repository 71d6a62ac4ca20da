//! FreeRTOS task spawning with explicit priority and stack size.
//!
//! Wraps `esp_pthread_set_cfg()` so that `std::thread::spawn` creates a
//! FreeRTOS task with the requested priority, stack and core affinity. The
//! relay control task must outrank the LED and heartbeat tasks; this is
//! the only place that priority is applied.
//!
//! `esp_pthread_set_cfg()` is thread-local and applies to the *next*
//! `pthread_create()` from the calling thread, so the config→spawn pair
//! must not be interleaved with other thread creation on that thread.
//! On non-ESP targets, falls back to a plain named thread.

use std::io;
use std::thread::JoinHandle;

/// CPU core identifiers for the ESP32 dual-core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Core {
    /// Core 0 (PRO_CPU) — Bluedroid host and controller.
    Pro = 0,
    /// Core 1 (APP_CPU) — relay control, LED, heartbeat.
    App = 1,
}

/// What to spawn and how.
#[derive(Debug, Clone, Copy)]
pub struct TaskSpec {
    /// Null-terminated task name (e.g. `"relay-ctl\0"`).
    pub name: &'static str,
    pub core: Core,
    pub priority: u8,
    pub stack_kb: usize,
}

impl TaskSpec {
    fn display_name(&self) -> &'static str {
        self.name.trim_end_matches('\0')
    }
}

/// Spawn a FreeRTOS-backed thread according to `spec`.
#[cfg(target_os = "espidf")]
pub fn spawn_task(
    spec: TaskSpec,
    f: impl FnOnce() + Send + 'static,
) -> io::Result<JoinHandle<()>> {
    // SAFETY: the config struct is fully initialised by the IDF helper and
    // `spec.name` is a 'static null-terminated string.
    let ret = unsafe {
        let mut cfg = esp_idf_sys::esp_create_default_pthread_config();
        cfg.pin_to_core = spec.core as i32;
        cfg.prio = spec.priority as _;
        cfg.stack_size = (spec.stack_kb * 1024) as _;
        cfg.thread_name = spec.name.as_ptr().cast();
        esp_idf_sys::esp_pthread_set_cfg(&cfg)
    };
    if ret != esp_idf_sys::ESP_OK as esp_idf_sys::esp_err_t {
        return Err(io::Error::other(format!("esp_pthread_set_cfg failed: {ret}")));
    }

    log::info!(
        "Spawning '{}' on {:?} (pri={}, stack={}KB)",
        spec.display_name(),
        spec.core,
        spec.priority,
        spec.stack_kb
    );

    std::thread::Builder::new()
        .name(spec.display_name().into())
        .spawn(f)
}

/// Simulation fallback — ignores core affinity and priority.
#[cfg(not(target_os = "espidf"))]
pub fn spawn_task(
    spec: TaskSpec,
    f: impl FnOnce() + Send + 'static,
) -> io::Result<JoinHandle<()>> {
    log::info!(
        "Spawning '{}' (sim, pri={} ignored, stack={}KB)",
        spec.display_name(),
        spec.priority,
        spec.stack_kb
    );

    std::thread::Builder::new()
        .name(spec.display_name().into())
        .stack_size(spec.stack_kb * 1024)
        .spawn(f)
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    #[test]
    fn spawned_task_carries_trimmed_name() {
        let spec = TaskSpec {
            name: "relay-ctl\0",
            core: Core::App,
            priority: 3,
            stack_kb: 64,
        };
        let handle = spawn_task(spec, || {
            assert_eq!(std::thread::current().name(), Some("relay-ctl"));
        })
        .unwrap();
        handle.join().unwrap();
    }
}
