//! Bounded relay command queue.
//!
//! Decouples the BLE write callback (which must return quickly) from the
//! relay control task. Built on an `embassy-sync` bounded channel so the
//! consumer sleeps on a waker instead of polling, and the producer's
//! bounded wait races the channel's send future against an
//! `async-io-mini` reactor timer.
//!
//! ```text
//!  BLE write cb ──enqueue(≤100ms)──▶ ┌──────────────┐ ──dequeue()──▶ relay-ctl
//!  console      ──────────────────▶  │  FIFO, cap 10 │   (blocks)
//!                                    └──────────────┘
//! ```

use core::fmt;
use core::time::Duration;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use futures_lite::future;

use super::commands::RelayCommand;

/// Maximum number of outstanding commands.
pub const QUEUE_CAPACITY: usize = 10;

/// Errors from [`CommandQueue::enqueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// The queue stayed full for the whole bounded wait; the command was dropped.
    Full,
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "command queue full"),
        }
    }
}

/// Fixed-capacity FIFO of commands, multi-producer / single-consumer.
///
/// Items are usually [`RelayCommand`]s; the controller queues them
/// together with the link session they arrived in.
pub struct CommandQueue<T = RelayCommand> {
    channel: Channel<CriticalSectionRawMutex, T, QUEUE_CAPACITY>,
}

impl<T> CommandQueue<T> {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Append `cmd`, waiting at most `timeout` for space if the queue is full.
    ///
    /// Never blocks longer than `timeout`; on expiry the command is dropped
    /// and [`QueueError::Full`] is returned. Queue contents are untouched
    /// by a failed enqueue.
    pub fn enqueue(&self, cmd: T, timeout: Duration) -> Result<(), QueueError> {
        let cmd = match self.channel.try_send(cmd) {
            Ok(()) => return Ok(()),
            Err(TrySendError::Full(cmd)) => cmd,
        };

        let sent = future::block_on(future::or(
            async {
                self.channel.send(cmd).await;
                true
            },
            async {
                async_io_mini::Timer::after(timeout).await;
                false
            },
        ));

        if sent { Ok(()) } else { Err(QueueError::Full) }
    }

    /// Block until a command is available and return it.
    ///
    /// The calling thread parks on the channel's waker; there is no
    /// polling interval.
    pub fn dequeue(&self) -> T {
        future::block_on(self.channel.receive())
    }

    /// Non-blocking receive.
    pub fn try_dequeue(&self) -> Option<T> {
        self.channel.try_receive().ok()
    }

    /// Discard every pending command. Returns how many were dropped.
    pub fn drain(&self) -> usize {
        let mut dropped = 0;
        while self.channel.try_receive().is_ok() {
            dropped += 1;
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.channel.is_full()
    }
}

impl<T> Default for CommandQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
