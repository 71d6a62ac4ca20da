//! Task Watchdog Timer (TWDT) driver.
//!
//! Subscribes the supervisory loop to the ESP-IDF TWDT so a wedged main
//! task resets the board. A reset boots with every relay LOW, which is the
//! safe state for the outputs.
//!
//! The supervisory loop must call `feed()` on every iteration.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

/// TWDT timeout applied at subscription.
pub const WATCHDOG_TIMEOUT_MS: u32 = 5_000;

pub struct Watchdog {
    subscribed: bool,
}

impl Watchdog {
    /// Reconfigure the TWDT and subscribe the calling task.
    pub fn subscribe() -> Self {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: plain FFI calls with a fully initialised config; a null
            // task handle means "the calling task".
            let subscribed = unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms: WATCHDOG_TIMEOUT_MS,
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK as esp_err_t {
                    warn!("TWDT reconfigure returned {} (already configured?)", ret);
                }
                esp_task_wdt_add(core::ptr::null_mut()) == ESP_OK as esp_err_t
            };
            if subscribed {
                info!("Watchdog: supervisor subscribed ({}ms)", WATCHDOG_TIMEOUT_MS);
            } else {
                warn!("Watchdog: subscription failed, running unguarded");
            }
            Self { subscribed }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            info!("Watchdog(sim): no-op");
            Self { subscribed: false }
        }
    }

    /// Feed the watchdog. No-op when not subscribed.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        if self.subscribed {
            // SAFETY: resets the TWDT entry of the calling (subscribed) task.
            unsafe {
                esp_task_wdt_reset();
            }
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }
}
