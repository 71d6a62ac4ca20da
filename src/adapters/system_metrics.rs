//! Memory headroom adapter.
//!
//! Implements [`SystemMetricsPort`] from the ESP-IDF heap allocator and
//! the FreeRTOS stack high-water mark of the calling task. On host the
//! figures are synthetic constants so heartbeat output stays stable.

use crate::app::ports::SystemMetricsPort;

#[derive(Debug, Default, Clone, Copy)]
pub struct EspSystemMetrics;

impl EspSystemMetrics {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_os = "espidf")]
impl SystemMetricsPort for EspSystemMetrics {
    fn free_heap_bytes(&self) -> u32 {
        // SAFETY: allocator statistics query, no preconditions.
        unsafe { esp_idf_svc::sys::esp_get_free_heap_size() }
    }

    fn min_stack_headroom_bytes(&self) -> u32 {
        // SAFETY: a null handle queries the calling task. The result is in
        // stack words, which are bytes on ESP-IDF's FreeRTOS port.
        unsafe { esp_idf_svc::sys::uxTaskGetStackHighWaterMark(core::ptr::null_mut()) }
    }
}

#[cfg(not(target_os = "espidf"))]
impl SystemMetricsPort for EspSystemMetrics {
    fn free_heap_bytes(&self) -> u32 {
        256 * 1024
    }

    fn min_stack_headroom_bytes(&self) -> u32 {
        2 * 1024
    }
}
