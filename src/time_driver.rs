//! embassy-time driver backed by the ESP-IDF high-resolution timer.
//!
//! `async-io-mini` timers (the bounded enqueue wait) resolve `now` and
//! `schedule_wake` through this driver. Ticks are microseconds, matching
//! the default embassy tick rate and `esp_timer_get_time()`.

use core::task::Waker;
use core::time::Duration;

use embassy_time_driver::Driver;

/// Stack for the short-lived thread that fires a single wake.
const WAKE_STACK_SIZE: usize = 2048;

struct EspTimerDriver;

impl Driver for EspTimerDriver {
    fn now(&self) -> u64 {
        // SAFETY: reads the monotonic system timer; no preconditions.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    fn schedule_wake(&self, at: u64, waker: &Waker) {
        let now = self.now();
        if at <= now {
            waker.wake_by_ref();
            return;
        }

        let pending = waker.clone();
        let delay = Duration::from_micros(at - now);
        let spawned = std::thread::Builder::new()
            .stack_size(WAKE_STACK_SIZE)
            .spawn(move || {
                std::thread::sleep(delay);
                pending.wake();
            });
        if let Err(err) = spawned {
            // Wake now so the waiter re-polls and reschedules.
            log::warn!("timer wake thread unavailable: {err}");
            waker.wake_by_ref();
        }
    }
}

embassy_time_driver::time_driver_impl!(static DRIVER: EspTimerDriver = EspTimerDriver);
