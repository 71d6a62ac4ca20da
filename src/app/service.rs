//! Relay controller — the hexagonal core.
//!
//! [`RelayController`] owns the relay bank, the command queue and the
//! connection tracker, and is shared (via `Arc`) between the BLE callback
//! context, the three worker tasks and the supervisory loop. All I/O
//! leaves through port traits, so the whole controller runs against mock
//! adapters on the host.
//!
//! ```text
//!  BLE write ───on_write───────▶ ┌──────────────────────┐ ──notify──▶ TransportPort
//!  BLE link  ───on_(dis)connect▶ │   RelayController    │ ──emit────▶ EventSink
//!  console   ───emergency_stop─▶ │ Queue · Bank · Link  │
//!                                └──────────────────────┘
//! ```
//!
//! ## Shutdown ordering
//!
//! Every relay mutation happens under the bank mutex. Each queued command
//! carries the link session it arrived in. A new session starts when a
//! peer connects and on every forced all-off, the latter under the bank
//! lock. The control task applies a command only if, under that same
//! lock, the link is up and the session still matches. A command dequeued
//! around a shutdown is therefore either applied before it (and then
//! forced off) or discarded, even if a new peer has connected meanwhile.

use core::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use embedded_hal::digital::OutputPin;
use log::{debug, info, warn};

use crate::config::SystemConfig;
use crate::drivers::relay_bank::{RelayBank, RelayStates};
use crate::drivers::status_led::StatusLed;
use crate::error::{Error, Result};

use super::commands::{self, ConsoleCommand, RelayCommand};
use super::connection::{ConnectionEdge, ConnectionTracker};
use super::events::{AppEvent, ShutdownReason};
use super::heartbeat::{HeartbeatSnapshot, HeartbeatTimer};
use super::indicator::StatusIndicator;
use super::ports::{ClockPort, EventSink, SystemMetricsPort, TransportPort};
use super::queue::CommandQueue;

/// A queued command together with the link session it arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingCommand {
    command: RelayCommand,
    session: u32,
}

impl PendingCommand {
    pub fn command(&self) -> RelayCommand {
        self.command
    }

    pub fn session(&self) -> u32 {
        self.session
    }
}

/// What the control task did with a dequeued command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The relay was driven; `acked` is whether the peer was notified.
    Applied { acked: bool },
    /// The session the command arrived in had ended by the time it came
    /// up; nothing changed.
    Discarded,
}

/// What the caller must do after a console command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleOutcome {
    Done,
    /// Outputs are safe; the device should restart now.
    RestartRequested,
}

/// Result of a forced all-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shutdown {
    /// Channels that went from ON to OFF.
    pub switched: usize,
    /// Pending commands dropped from the queue.
    pub dropped: usize,
}

// ───────────────────────────────────────────────────────────────
// RelayController
// ───────────────────────────────────────────────────────────────

pub struct RelayController<P, T, S>
where
    P: OutputPin + Send,
    T: TransportPort,
    S: EventSink,
{
    bank: Mutex<RelayBank<P>>,
    queue: CommandQueue<PendingCommand>,
    link: ConnectionTracker,
    session: AtomicU32,
    transport: T,
    sink: S,
    config: SystemConfig,
}

impl<P, T, S> RelayController<P, T, S>
where
    P: OutputPin + Send,
    T: TransportPort,
    S: EventSink,
{
    /// Wire the controller. The bank is expected to be all-OFF already
    /// (see [`RelayBank::new`]); the link starts Disconnected.
    pub fn new(bank: RelayBank<P>, transport: T, sink: S, config: SystemConfig) -> Self {
        Self {
            bank: Mutex::new(bank),
            queue: CommandQueue::new(),
            link: ConnectionTracker::new(),
            session: AtomicU32::new(0),
            transport,
            sink,
            config,
        }
    }

    /// Announce that the controller is ready to accept commands.
    pub fn start(&self) {
        info!("Relay controller ready as '{}'", self.config.device_name);
        self.sink.emit(&AppEvent::Started(self.config.device_name.clone()));
    }

    // ── Transport ingress (BLE callback context) ──────────────

    /// Handle a write to the relay characteristic.
    ///
    /// Parses the buffer and queues the command, waiting at most
    /// `enqueue_timeout_ms` for space. Must stay short: it runs on the
    /// BLE stack's callback task. Rejected writes are logged and dropped;
    /// the peer gets no response.
    pub fn on_write(&self, raw: &[u8]) -> Result<RelayCommand> {
        let cmd = match commands::parse_command(raw) {
            Ok(cmd) => cmd,
            Err(e) => return Err(self.reject(e.into())),
        };

        let pending = PendingCommand {
            command: cmd,
            session: self.session(),
        };
        if let Err(e) = self.queue.enqueue(pending, self.config.enqueue_timeout()) {
            return Err(self.reject(e.into()));
        }

        debug!("Queued: {}", cmd);
        self.sink.emit(&AppEvent::CommandQueued(cmd));
        Ok(cmd)
    }

    fn reject(&self, e: Error) -> Error {
        warn!("Write rejected: {}", e);
        self.sink.emit(&AppEvent::CommandRejected(e));
        e
    }

    /// A peer connected. Relay states are left exactly as they are.
    pub fn on_connect(&self) {
        // The new session must exist before the link reads as up.
        if !self.link.is_connected() {
            self.session.fetch_add(1, Ordering::SeqCst);
        }
        if self.link.set_connected(true) {
            info!("Peer connected");
            self.sink.emit(&AppEvent::Connected);
        }
    }

    /// The peer disconnected: force every relay off and drop pending commands.
    ///
    /// Runs synchronously in the caller's context so the outputs are safe
    /// before this returns. Repeated calls are harmless.
    pub fn on_disconnect(&self) -> Shutdown {
        if self.link.set_connected(false) {
            info!("Peer disconnected");
            self.sink.emit(&AppEvent::Disconnected);
        }
        self.force_all_off(ShutdownReason::PeerDisconnected)
    }

    // ── Operator controls ─────────────────────────────────────

    /// Force every relay off now and discard pending commands.
    ///
    /// The link is left alone: a connected peer may switch relays again.
    pub fn emergency_stop(&self) -> Shutdown {
        warn!("EMERGENCY STOP");
        self.force_all_off(ShutdownReason::EmergencyStop)
    }

    /// Bring the outputs to a safe state ahead of a device restart.
    pub fn prepare_reset(&self) -> Shutdown {
        info!("Preparing for restart");
        self.force_all_off(ShutdownReason::Reset)
    }

    fn force_all_off(&self, reason: ShutdownReason) -> Shutdown {
        let mut bank = self.lock_bank();
        // Commands already taken off the queue belong to the old session.
        self.session.fetch_add(1, Ordering::SeqCst);
        let switched = match bank.all_off() {
            Ok(n) => n,
            Err(e) => {
                warn!("All-off incomplete: {}", e);
                self.sink.emit(&AppEvent::RelayFault(e.into()));
                0
            }
        };
        // Drained under the bank lock so nothing queued before the
        // shutdown can be applied after it.
        let dropped = self.queue.drain();
        drop(bank);

        info!(
            "All relays OFF ({:?}): {} switched, {} pending dropped",
            reason, switched, dropped
        );
        self.sink.emit(&AppEvent::AllOff {
            reason,
            switched,
            dropped,
        });
        Shutdown { switched, dropped }
    }

    /// Execute an operator command from the serial console.
    pub fn handle_console(
        &self,
        cmd: ConsoleCommand,
        clock: &impl ClockPort,
        metrics: &impl SystemMetricsPort,
    ) -> ConsoleOutcome {
        match cmd {
            ConsoleCommand::EmergencyStop => {
                self.emergency_stop();
                ConsoleOutcome::Done
            }
            ConsoleCommand::Status => {
                self.publish_heartbeat(clock, metrics);
                ConsoleOutcome::Done
            }
            ConsoleCommand::Reset => {
                self.prepare_reset();
                ConsoleOutcome::RestartRequested
            }
        }
    }

    // ── Relay control task ────────────────────────────────────

    /// Apply one command: drive the relay, then acknowledge it.
    ///
    /// A command whose session has ended, or that comes up while no peer
    /// is connected, is discarded rather than applied: the peer that sent
    /// it no longer has authority over the outputs.
    pub fn process_command(&self, pending: PendingCommand) -> Result<CommandOutcome> {
        // Commands only come from the parser, but the bank indexes by
        // channel so the range is checked again at the point of use.
        let raw = pending.command;
        let Some(cmd) = RelayCommand::new(raw.channel(), raw.is_on()) else {
            warn!("Dropping command for invalid channel {}", raw.channel());
            self.sink.emit(&AppEvent::CommandDiscarded(raw));
            return Ok(CommandOutcome::Discarded);
        };

        {
            let mut bank = self.lock_bank();
            if !self.link.is_connected() || pending.session != self.session() {
                drop(bank);
                debug!("Discarded, session ended: {}", cmd);
                self.sink.emit(&AppEvent::CommandDiscarded(cmd));
                return Ok(CommandOutcome::Discarded);
            }
            if let Err(e) = bank.set_channel(cmd.channel(), cmd.is_on()) {
                drop(bank);
                let e = Error::from(e);
                warn!("{}: {}", cmd, e);
                self.sink.emit(&AppEvent::RelayFault(e));
                return Err(e);
            }

            // Emitted under the lock so events follow actuation order.
            let gpio = crate::pins::RELAY_GPIOS[usize::from(cmd.channel()) - 1];
            info!("{} (GPIO{})", cmd, gpio);
            self.sink.emit(&AppEvent::RelaySwitched {
                channel: cmd.channel(),
                on: cmd.is_on(),
                gpio,
            });
        }

        // The transport refuses the ack if the link dropped after the
        // relay moved.
        let ack = commands::encode_ack(&cmd);
        match self.transport.notify(&ack) {
            Ok(()) => Ok(CommandOutcome::Applied { acked: true }),
            Err(e) => {
                // Best effort; the relay already moved.
                warn!("Ack for {} not delivered: {}", cmd, e);
                Ok(CommandOutcome::Applied { acked: false })
            }
        }
    }

    /// Block until the next command is queued and take it.
    pub fn take_next(&self) -> PendingCommand {
        self.queue.dequeue()
    }

    /// Block for the next queued command and apply it.
    pub fn process_next(&self) -> Result<CommandOutcome> {
        self.process_command(self.take_next())
    }

    /// Body of the relay control task. Never returns.
    pub fn run_control_task(&self) -> ! {
        info!("Relay control task running");
        loop {
            // Failures are already logged and emitted; keep serving.
            let _ = self.process_next();
        }
    }

    // ── Status indicator task ─────────────────────────────────

    /// Body of the status LED task. Never returns.
    pub fn run_status_task<L: OutputPin>(&self, led: &mut StatusLed<L>) -> ! {
        let mut indicator = StatusIndicator::new(&self.config);
        loop {
            let hold = led.apply(indicator.step(self.link.is_connected()));
            thread::sleep(hold);
        }
    }

    // ── Heartbeat task ────────────────────────────────────────

    /// Build a snapshot of the current state.
    pub fn snapshot(
        &self,
        clock: &impl ClockPort,
        metrics: &impl SystemMetricsPort,
    ) -> HeartbeatSnapshot {
        HeartbeatSnapshot::new(
            clock.uptime_ms(),
            self.link.is_connected(),
            self.relay_states(),
            metrics.free_heap_bytes(),
            metrics.min_stack_headroom_bytes(),
        )
    }

    /// Emit a snapshot through the event sink right now.
    pub fn publish_heartbeat(&self, clock: &impl ClockPort, metrics: &impl SystemMetricsPort) {
        let snapshot = self.snapshot(clock, metrics);
        self.sink.emit(&AppEvent::Heartbeat(snapshot));
    }

    /// Emit a snapshot if `timer` says one is due. Returns whether it fired.
    pub fn heartbeat_tick(
        &self,
        timer: &mut HeartbeatTimer,
        clock: &impl ClockPort,
        metrics: &impl SystemMetricsPort,
    ) -> bool {
        if !timer.poll(clock.uptime_ms()) {
            return false;
        }
        self.publish_heartbeat(clock, metrics);
        true
    }

    /// Body of the heartbeat task. Never returns.
    pub fn run_heartbeat_task(
        &self,
        clock: &impl ClockPort,
        metrics: &impl SystemMetricsPort,
    ) -> ! {
        let mut timer = HeartbeatTimer::new(self.config.heartbeat_interval_ms());
        let poll = Duration::from_millis(u64::from(self.config.heartbeat_poll_ms));
        loop {
            self.heartbeat_tick(&mut timer, clock, metrics);
            thread::sleep(poll);
        }
    }

    // ── Supervisory loop ──────────────────────────────────────

    /// One pass of the supervisory loop: turn the link level into an edge
    /// and, after a disconnect, let the stack settle and advertise again.
    pub fn supervise(&self) -> Option<ConnectionEdge> {
        let edge = self.link.take_edge()?;
        match edge {
            ConnectionEdge::Connected => debug!("Supervisor: connect edge"),
            ConnectionEdge::Disconnected => {
                thread::sleep(self.config.advertise_settle());
                match self.transport.restart_advertising() {
                    Ok(()) => {
                        info!("Advertising restarted");
                        self.sink.emit(&AppEvent::AdvertisingRestarted);
                    }
                    Err(e) => warn!("Advertising restart failed: {}", e),
                }
            }
        }
        Some(edge)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn is_connected(&self) -> bool {
        self.link.is_connected()
    }

    /// Current link session. Changes on connect and on every forced all-off.
    pub fn session(&self) -> u32 {
        self.session.load(Ordering::SeqCst)
    }

    pub fn relay_states(&self) -> RelayStates {
        self.lock_bank().states()
    }

    pub fn active_relays(&self) -> usize {
        self.lock_bank().active_count()
    }

    pub fn pending_commands(&self) -> usize {
        self.queue.len()
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// A panic while holding the bank must not prevent the safety
    /// shutdown from reaching the pins, so poisoning is ignored.
    fn lock_bank(&self) -> MutexGuard<'_, RelayBank<P>> {
        self.bank.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
