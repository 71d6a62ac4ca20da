//! Integration tests for the BLE write → queue → control task → relay → ack
//! pipeline and the connection safety policy.

use relayctl::app::events::{AppEvent, ShutdownReason};
use relayctl::app::heartbeat::HeartbeatTimer;
use relayctl::app::queue::QUEUE_CAPACITY;
use relayctl::app::service::CommandOutcome;
use relayctl::error::Error;

use super::mock_hw::{ManualClock, PinWrite, StubMetrics, make_controller, pin_levels};

// ── Parser rejections leave everything untouched ─────────────

#[test]
fn malformed_writes_do_not_reach_the_queue() {
    let (ctl, log) = make_controller();
    ctl.on_connect();

    let cases: [&[u8]; 7] = [b"", b"R1", b"X11", b"R01", b"R51", b"R13", b"r11"];
    for raw in cases {
        assert!(matches!(ctl.on_write(raw), Err(Error::Parse(_))), "{raw:?}");
    }

    assert_eq!(ctl.pending_commands(), 0);
    assert!(log.lock().unwrap().is_empty());
    let rejected = ctl
        .sink()
        .snapshot()
        .iter()
        .filter(|e| matches!(e, AppEvent::CommandRejected(_)))
        .count();
    assert_eq!(rejected, 7);
}

// ── A valid command touches exactly one channel ──────────────

#[test]
fn valid_command_changes_only_its_channel() {
    let (ctl, log) = make_controller();
    ctl.on_connect();

    ctl.on_write(b"R31").unwrap();
    ctl.process_next().unwrap();

    assert_eq!(ctl.relay_states(), [false, false, true, false]);
    assert_eq!(
        *log.lock().unwrap(),
        vec![PinWrite {
            channel: 3,
            high: true
        }]
    );
}

// ── FIFO through the whole pipeline ──────────────────────────

#[test]
fn commands_apply_in_arrival_order() {
    let (ctl, log) = make_controller();
    ctl.on_connect();

    ctl.on_write(b"R21").unwrap();
    ctl.on_write(b"R41").unwrap();
    ctl.on_write(b"R20").unwrap();
    for _ in 0..3 {
        ctl.process_next().unwrap();
    }

    let writes: Vec<(u8, bool)> = log
        .lock()
        .unwrap()
        .iter()
        .map(|w| (w.channel, w.high))
        .collect();
    assert_eq!(writes, [(2, true), (4, true), (2, false)]);
    assert_eq!(
        ctl.transport().notifications(),
        vec![b"ACK_R21".to_vec(), b"ACK_R41".to_vec(), b"ACK_R20".to_vec()]
    );
}

// ── Back-pressure ────────────────────────────────────────────

#[test]
fn eleventh_write_is_dropped_and_first_ten_survive() {
    let (ctl, log) = make_controller();
    ctl.on_connect();

    for i in 0..QUEUE_CAPACITY {
        let raw = [b'R', b'1' + (i % 4) as u8, b'1'];
        ctl.on_write(&raw).unwrap();
    }
    assert!(matches!(ctl.on_write(b"R40"), Err(Error::Queue(_))));
    assert_eq!(ctl.pending_commands(), QUEUE_CAPACITY);

    for _ in 0..QUEUE_CAPACITY {
        ctl.process_next().unwrap();
    }
    assert_eq!(log.lock().unwrap().len(), QUEUE_CAPACITY);
    assert!(log.lock().unwrap().iter().all(|w| w.high));
}

// ── Safety shutdown ──────────────────────────────────────────

#[test]
fn disconnect_turns_every_relay_off() {
    let (ctl, log) = make_controller();
    ctl.on_connect();
    for raw in [b"R11", b"R21", b"R41"] {
        ctl.on_write(raw).unwrap();
        ctl.process_next().unwrap();
    }
    assert_eq!(ctl.active_relays(), 3);

    ctl.on_disconnect();

    assert_eq!(ctl.relay_states(), [false; 4]);
    assert_eq!(pin_levels(&log), [false; 4]);
    assert!(ctl.sink().snapshot().iter().any(|e| matches!(
        e,
        AppEvent::AllOff {
            reason: ShutdownReason::PeerDisconnected,
            switched: 3,
            ..
        }
    )));
}

#[test]
fn reconnect_keeps_relays_off() {
    let (ctl, _) = make_controller();
    ctl.on_connect();
    ctl.on_write(b"R11").unwrap();
    ctl.process_next().unwrap();

    ctl.on_disconnect();
    ctl.on_connect();

    assert_eq!(ctl.relay_states(), [false; 4]);
    assert_eq!(ctl.pending_commands(), 0);
}

#[test]
fn pending_commands_are_not_applied_after_disconnect() {
    let (ctl, log) = make_controller();
    ctl.on_connect();
    ctl.on_write(b"R11").unwrap();
    ctl.on_write(b"R21").unwrap();

    let shutdown = ctl.on_disconnect();
    assert_eq!(shutdown.dropped, 2);
    assert!(log.lock().unwrap().is_empty());
    assert!(ctl.transport().notifications().is_empty());
}

#[test]
fn repeated_disconnect_causes_no_extra_actuation() {
    let (ctl, log) = make_controller();
    ctl.on_connect();
    ctl.on_write(b"R21").unwrap();
    ctl.process_next().unwrap();

    ctl.on_disconnect();
    let after_first = log.lock().unwrap().len();
    let second = ctl.on_disconnect();

    assert_eq!(second.switched, 0);
    assert_eq!(log.lock().unwrap().len(), after_first);
}

#[test]
fn command_processed_while_disconnected_is_discarded_without_ack() {
    let (ctl, log) = make_controller();
    ctl.on_write(b"R31").unwrap();

    assert_eq!(ctl.process_next(), Ok(CommandOutcome::Discarded));
    assert!(log.lock().unwrap().is_empty());
    assert!(ctl.transport().notifications().is_empty());
}

// ── Supervisory loop ─────────────────────────────────────────

#[test]
fn advertising_restarts_once_per_disconnect() {
    let (ctl, _) = make_controller();
    ctl.on_connect();
    ctl.supervise();
    ctl.on_disconnect();

    ctl.supervise();
    ctl.supervise();
    assert_eq!(ctl.transport().advert_count(), 1);
    assert!(
        ctl.sink()
            .snapshot()
            .iter()
            .any(|e| matches!(e, AppEvent::AdvertisingRestarted))
    );
}

// ── Heartbeat ────────────────────────────────────────────────

#[test]
fn heartbeat_reports_live_relay_count() {
    let (ctl, _) = make_controller();
    ctl.on_connect();
    ctl.on_write(b"R11").unwrap();
    ctl.on_write(b"R31").unwrap();
    ctl.process_next().unwrap();
    ctl.process_next().unwrap();

    let clock = ManualClock(std::sync::Mutex::new(0));
    let mut timer = HeartbeatTimer::new(ctl.config().heartbeat_interval_ms());
    assert!(!ctl.heartbeat_tick(&mut timer, &clock, &StubMetrics));

    *clock.0.lock().unwrap() = 10_500;
    assert!(ctl.heartbeat_tick(&mut timer, &clock, &StubMetrics));

    let events = ctl.sink().snapshot();
    let Some(AppEvent::Heartbeat(s)) = events.last() else {
        panic!("expected a heartbeat, got {:?}", events.last());
    };
    assert_eq!(s.active_relays, 2);
    assert!(s.connected);
    assert_eq!(s.uptime_ms, 10_500);
    assert_eq!(s.free_heap_bytes, 180_000);
}
