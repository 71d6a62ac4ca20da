//! RelayCtl Firmware — Main Entry Point
//!
//! Hexagonal architecture with one shared controller and three FreeRTOS
//! worker tasks.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  BleTransport      LogEventSink   Esp32Clock   EspSystemMetrics│
//! │  (TransportPort)   (EventSink)    (ClockPort)  (MetricsPort)   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              RelayController (domain)                  │    │
//! │  │  Parser · Queue · RelayBank · ConnectionTracker        │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  relay-ctl (p3) · status-led (p2) · heartbeat (p1) · console   │
//! │  main: supervisory loop (re-advertise) + watchdog              │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use std::io::BufRead;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use esp_idf_svc::hal::gpio::{AnyOutputPin, Output, OutputPin as _, PinDriver};
use esp_idf_svc::bt::{Ble, BtDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{info, warn};

use relayctl::adapters::ble::{BleTransport, GattHandler, SERVICE_UUID};
use relayctl::adapters::log_sink::LogEventSink;
use relayctl::adapters::system_metrics::EspSystemMetrics;
use relayctl::adapters::time::Esp32Clock;
use relayctl::app::commands::parse_console_line;
use relayctl::app::service::{ConsoleOutcome, RelayController};
use relayctl::config::SystemConfig;
use relayctl::drivers::relay_bank::RelayBank;
use relayctl::drivers::status_led::StatusLed;
use relayctl::drivers::task_pin::{Core, TaskSpec, spawn_task};
use relayctl::drivers::watchdog::Watchdog;
use relayctl::pins;

type RelayPin = PinDriver<'static, AnyOutputPin, Output>;
type Controller = RelayController<RelayPin, BleTransport, LogEventSink>;

/// Poll interval of the console reader when the UART has no data.
const CONSOLE_IDLE: Duration = Duration::from_millis(100);
/// Lets the last log lines drain before `esp_restart`.
const RESTART_GRACE: Duration = Duration::from_millis(100);

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  RelayCtl v{}                     ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = SystemConfig::default();
    config
        .validate()
        .map_err(|e| anyhow!("invalid configuration: {e}"))?;

    // ── 2. GPIO: relays LOW first, then the LED ───────────────
    let peripherals = Peripherals::take()?;
    let p = peripherals.pins;
    let relays: [RelayPin; 4] = [
        PinDriver::output(p.gpio23.downgrade_output())?,
        PinDriver::output(p.gpio5.downgrade_output())?,
        PinDriver::output(p.gpio4.downgrade_output())?,
        PinDriver::output(p.gpio13.downgrade_output())?,
    ];
    let bank = RelayBank::new(relays);
    for (idx, gpio) in pins::RELAY_GPIOS.iter().enumerate() {
        info!("Relay {}: GPIO {}", idx + 1, gpio);
    }

    let mut led = StatusLed::new(PinDriver::output(p.gpio15.downgrade_output())?);
    info!("Status LED: GPIO {}", pins::STATUS_LED_GPIO);
    led.startup_sequence();

    // ── 3. Controller + BLE transport ─────────────────────────
    let ctl: Arc<Controller> = Arc::new(RelayController::new(
        bank,
        BleTransport::new(config.device_name.clone()),
        LogEventSink::new(),
        config.clone(),
    ));
    ctl.start();

    // Controller + Bluedroid bring-up; the driver must outlive the transport.
    let nvs = EspDefaultNvsPartition::take()?;
    let _bt: BtDriver<'static, Ble> = BtDriver::new(peripherals.modem, Some(nvs))?;

    let handler: Arc<dyn GattHandler> = ctl.clone();
    ctl.transport()
        .start(handler)
        .map_err(|e| anyhow!("BLE start failed: {e}"))?;
    info!("Device name: {}", config.device_name);
    info!("Service UUID: {:032x}", SERVICE_UUID);

    // ── 4. Worker tasks ───────────────────────────────────────
    let relay_ctl = Arc::clone(&ctl);
    spawn_task(
        TaskSpec {
            name: "relay-ctl\0",
            core: Core::App,
            priority: config.relay_task_priority,
            stack_kb: config.relay_task_stack_kb,
        },
        move || {
            relay_ctl.run_control_task();
        },
    )
    .context("spawning relay-ctl")?;

    let status_ctl = Arc::clone(&ctl);
    spawn_task(
        TaskSpec {
            name: "status-led\0",
            core: Core::App,
            priority: config.status_task_priority,
            stack_kb: config.status_task_stack_kb,
        },
        move || {
            status_ctl.run_status_task(&mut led);
        },
    )
    .context("spawning status-led")?;

    let heartbeat_ctl = Arc::clone(&ctl);
    spawn_task(
        TaskSpec {
            name: "heartbeat\0",
            core: Core::App,
            priority: config.heartbeat_task_priority,
            stack_kb: config.heartbeat_task_stack_kb,
        },
        move || {
            heartbeat_ctl.run_heartbeat_task(&Esp32Clock::new(), &EspSystemMetrics::new());
        },
    )
    .context("spawning heartbeat")?;

    let console_ctl = Arc::clone(&ctl);
    spawn_task(
        TaskSpec {
            name: "console\0",
            core: Core::App,
            priority: config.heartbeat_task_priority,
            stack_kb: config.heartbeat_task_stack_kb,
        },
        move || run_console(&console_ctl),
    )
    .context("spawning console")?;

    info!("System ready, waiting for a client");

    // ── 5. Supervisory loop ───────────────────────────────────
    let watchdog = Watchdog::subscribe();
    let tick = Duration::from_millis(u64::from(config.supervisor_interval_ms));
    loop {
        ctl.supervise();
        watchdog.feed();
        thread::sleep(tick);
    }
}

/// Read operator commands from the UART console.
fn run_console(ctl: &Controller) {
    let clock = Esp32Clock::new();
    let metrics = EspSystemMetrics::new();
    let stdin = std::io::stdin();
    let mut line = String::new();

    loop {
        match stdin.lock().read_line(&mut line) {
            Ok(_) if line.ends_with('\n') => {}
            Ok(_) => {
                thread::sleep(CONSOLE_IDLE);
                continue;
            }
            Err(e) => {
                // The IDF UART VFS reports EAGAIN when no byte is pending;
                // a partial line stays in `line` for the next read.
                if e.kind() != std::io::ErrorKind::WouldBlock {
                    warn!("Console read failed: {}", e);
                }
                thread::sleep(CONSOLE_IDLE);
                continue;
            }
        }

        let parsed = parse_console_line(&line);
        let typed = line.trim().to_owned();
        line.clear();

        let Some(cmd) = parsed else {
            if !typed.is_empty() {
                info!("Console: unknown command '{}' (stop | status | reset)", typed);
            }
            continue;
        };

        if ctl.handle_console(cmd, &clock, &metrics) == ConsoleOutcome::RestartRequested {
            warn!("Restarting on operator request");
            thread::sleep(RESTART_GRACE);
            // SAFETY: terminal call; every relay has already been driven LOW.
            unsafe { esp_idf_svc::sys::esp_restart() };
        }
    }
}
