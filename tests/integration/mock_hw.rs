//! Mock hardware and port adapters for integration tests.
//!
//! Every relay pin write lands in one shared, ordered log so tests can
//! assert on the full actuation history without touching real GPIO.

use std::convert::Infallible;
use std::sync::{Arc, Mutex};

use embedded_hal::digital::{ErrorType, OutputPin};
use relayctl::app::events::AppEvent;
use relayctl::app::ports::{ClockPort, EventSink, SystemMetricsPort, TransportError, TransportPort};
use relayctl::app::service::RelayController;
use relayctl::config::SystemConfig;
use relayctl::drivers::relay_bank::RelayBank;

// ── Pin write record ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinWrite {
    pub channel: u8,
    pub high: bool,
}

pub type PinLog = Arc<Mutex<Vec<PinWrite>>>;

// ── MockPin ───────────────────────────────────────────────────

pub struct MockPin {
    channel: u8,
    log: PinLog,
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.log.lock().unwrap().push(PinWrite {
            channel: self.channel,
            high: false,
        });
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.log.lock().unwrap().push(PinWrite {
            channel: self.channel,
            high: true,
        });
        Ok(())
    }
}

/// Final level of every channel according to the write log.
#[allow(dead_code)]
pub fn pin_levels(log: &PinLog) -> [bool; 4] {
    let mut levels = [false; 4];
    for w in log.lock().unwrap().iter() {
        levels[usize::from(w.channel) - 1] = w.high;
    }
    levels
}

// ── MockTransport ─────────────────────────────────────────────

#[derive(Default)]
pub struct MockTransport {
    pub notified: Mutex<Vec<Vec<u8>>>,
    pub adverts: Mutex<u32>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn notifications(&self) -> Vec<Vec<u8>> {
        self.notified.lock().unwrap().clone()
    }

    pub fn advert_count(&self) -> u32 {
        *self.adverts.lock().unwrap()
    }
}

impl TransportPort for MockTransport {
    fn notify(&self, data: &[u8]) -> Result<(), TransportError> {
        self.notified.lock().unwrap().push(data.to_vec());
        Ok(())
    }

    fn restart_advertising(&self) -> Result<(), TransportError> {
        *self.adverts.lock().unwrap() += 1;
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<AppEvent>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn snapshot(&self) -> Vec<AppEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &AppEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ── Clock / metrics ───────────────────────────────────────────

pub struct ManualClock(pub Mutex<u64>);

impl ClockPort for ManualClock {
    fn uptime_ms(&self) -> u64 {
        *self.0.lock().unwrap()
    }
}

pub struct StubMetrics;

impl SystemMetricsPort for StubMetrics {
    fn free_heap_bytes(&self) -> u32 {
        180_000
    }

    fn min_stack_headroom_bytes(&self) -> u32 {
        1_536
    }
}

// ── Fixture ───────────────────────────────────────────────────

pub type TestController = RelayController<MockPin, MockTransport, RecordingSink>;

/// Controller wired to mocks, with the settle delay removed. The pin log
/// is cleared after the power-on LOW writes.
pub fn make_controller() -> (Arc<TestController>, PinLog) {
    let log: PinLog = Arc::default();
    let pins = core::array::from_fn(|idx| MockPin {
        channel: idx as u8 + 1,
        log: Arc::clone(&log),
    });
    let bank = RelayBank::new(pins);
    log.lock().unwrap().clear();

    let mut config = SystemConfig::default();
    config.advertise_settle_ms = 0;
    let ctl = RelayController::new(
        bank,
        MockTransport::default(),
        RecordingSink::default(),
        config,
    );
    (Arc::new(ctl), log)
}
