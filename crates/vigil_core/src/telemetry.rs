//! # Telemetry Events
//!
//! Optional observability stream for the hosting process.
//!
//! Telemetry is strictly best-effort: events are pushed with `try_send` and
//! dropped when the channel is full or disconnected. Losing telemetry must
//! never block or fail a detection path.

use crossbeam_channel::{Receiver, Sender};

use crate::client::ClientId;

/// An observability event emitted by the detection core.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TelemetryEvent {
    /// A signal matched at least one restricted name and was recorded.
    ListenerFlagged {
        /// The flagged client.
        client: ClientId,
        /// How many restricted names matched in this signal.
        matched: usize,
        /// The client's violation count after recording.
        count: u32,
    },
    /// A sweep tick finished.
    SweepCompleted {
        /// Entries in the snapshot the sweep walked.
        examined: usize,
        /// Entries discarded because the client left or is a bot.
        pruned: usize,
        /// Decisions issued this tick.
        decisions: usize,
    },
    /// A reset tick cleared all accumulated evidence.
    TrackerReset {
        /// Entries that were dropped.
        cleared: usize,
    },
}

/// Bounded channel for [`TelemetryEvent`]s.
///
/// The core holds sender clones; the hosting process drains the receiver at
/// its leisure.
pub struct TelemetryChannel {
    sender: Sender<TelemetryEvent>,
    receiver: Receiver<TelemetryEvent>,
}

impl TelemetryChannel {
    /// Creates a channel that buffers up to `capacity` events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = crossbeam_channel::bounded(capacity);
        Self { sender, receiver }
    }

    /// Gets a sender clone for a core component.
    #[must_use]
    pub fn sender(&self) -> Sender<TelemetryEvent> {
        self.sender.clone()
    }

    /// Gets a receiver clone for the hosting process.
    #[must_use]
    pub fn receiver(&self) -> Receiver<TelemetryEvent> {
        self.receiver.clone()
    }
}

impl Default for TelemetryChannel {
    fn default() -> Self {
        Self::new(1024)
    }
}

/// Emits an event if a sink is attached, dropping it on a full channel.
pub(crate) fn emit(sink: Option<&Sender<TelemetryEvent>>, event: TelemetryEvent) {
    if let Some(sender) = sink {
        let _ = sender.try_send(event);
    }
}
