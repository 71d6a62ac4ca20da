//! Multi-threaded tests: a real control task thread racing BLE callbacks.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use relayctl::app::events::AppEvent;

use super::mock_hw::{TestController, make_controller, pin_levels};

/// Run the control task on its own thread for the rest of the test binary.
fn spawn_control_task(ctl: &Arc<TestController>) {
    let ctl = Arc::clone(ctl);
    thread::spawn(move || {
        ctl.run_control_task();
    });
}

fn wait_until(deadline: Duration, mut done: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    done()
}

#[test]
fn control_task_applies_writes_from_another_thread() {
    let (ctl, _) = make_controller();
    spawn_control_task(&ctl);
    ctl.on_connect();

    ctl.on_write(b"R11").unwrap();
    ctl.on_write(b"R41").unwrap();

    assert!(wait_until(Duration::from_secs(2), || ctl.active_relays() == 2));
    assert!(wait_until(Duration::from_secs(2), || {
        ctl.transport().notifications().len() == 2
    }));
}

#[test]
fn disconnect_during_burst_leaves_everything_off() {
    let (ctl, log) = make_controller();
    spawn_control_task(&ctl);
    ctl.on_connect();

    let writer = {
        let ctl = Arc::clone(&ctl);
        thread::spawn(move || {
            for i in 0..200u32 {
                let raw = [b'R', b'1' + (i % 4) as u8, b'1'];
                // Full-queue rejections are expected under this load.
                let _ = ctl.on_write(&raw);
            }
        })
    };

    thread::sleep(Duration::from_millis(5));
    ctl.on_disconnect();
    writer.join().unwrap();

    // Let the control task drain whatever the writer queued after the
    // disconnect; every one of those must be discarded.
    assert!(wait_until(Duration::from_secs(2), || ctl.pending_commands() == 0));
    thread::sleep(Duration::from_millis(20));

    assert_eq!(ctl.relay_states(), [false; 4]);
    assert_eq!(pin_levels(&log), [false; 4]);

    let events = ctl.sink().snapshot();
    let shutdown_at = events
        .iter()
        .position(|e| matches!(e, AppEvent::AllOff { .. }))
        .expect("shutdown event");
    assert!(
        !events[shutdown_at..]
            .iter()
            .any(|e| matches!(e, AppEvent::RelaySwitched { on: true, .. })),
        "a relay was switched ON after the safety shutdown"
    );
}
