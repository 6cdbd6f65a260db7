//! # Threshold Sweep
//!
//! Periodic evaluation of accumulated evidence against the detection
//! threshold.
//!
//! ## Algorithm (one tick)
//!
//! 1. Snapshot the tracker.
//! 2. For each `(client, count)`:
//!    - client gone or a bot → discard the entry, no penalty
//!    - `count >= DETECTION_THRESHOLD` → issue exactly one decision
//!      (registered handler, else default kick), then discard the entry
//!    - otherwise → leave the entry; evidence persists toward future ticks
//!
//! A failure acting on one client never stops the walk; a client that
//! vanishes between snapshot and action is a no-op. Ticks are driven by a
//! single timer thread and therefore never overlap.

use std::sync::Arc;

use crossbeam_channel::Sender;
use parking_lot::Mutex;

use crate::client::ClientId;
use crate::host::{DisconnectReason, Enforcer, PlayerDirectory};
use crate::telemetry::{self, TelemetryEvent};
use crate::tracker::ViolationTracker;
use crate::DETECTION_THRESHOLD;

/// Reason string passed to a registered detection handler.
pub const DETECTION_REASON: &str = "Multiple detections";

/// Callback that replaces the default kick for threshold decisions.
///
/// Single-subscriber: registering a handler replaces any previous one. While
/// registered it fully owns the decision; VIGIL removes the entry and takes
/// no further action.
pub type DetectionHandler = Arc<dyn Fn(ClientId, &str) + Send + Sync>;

/// Outcome counters for one sweep tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepSummary {
    /// Entries in the snapshot the sweep walked.
    pub examined: usize,
    /// Entries discarded because the client left or is a bot.
    pub pruned: usize,
    /// Decisions issued this tick.
    pub decisions: usize,
}

/// The sweep pass.
pub struct Sweeper {
    /// Shared violation store.
    tracker: Arc<ViolationTracker>,
    /// Liveness source consulted per entry.
    directory: Arc<dyn PlayerDirectory>,
    /// Default punitive action.
    enforcer: Arc<dyn Enforcer>,
    /// Optional decision handler replacing the default action.
    handler: Mutex<Option<DetectionHandler>>,
    /// Optional telemetry sink.
    telemetry: Option<Sender<TelemetryEvent>>,
}

impl Sweeper {
    /// Creates a sweep pass over `tracker`.
    #[must_use]
    pub fn new(
        tracker: Arc<ViolationTracker>,
        directory: Arc<dyn PlayerDirectory>,
        enforcer: Arc<dyn Enforcer>,
    ) -> Self {
        Self {
            tracker,
            directory,
            enforcer,
            handler: Mutex::new(None),
            telemetry: None,
        }
    }

    /// Attaches a telemetry sink.
    #[must_use]
    pub fn with_telemetry(mut self, sink: Sender<TelemetryEvent>) -> Self {
        self.telemetry = Some(sink);
        self
    }

    /// Registers the decision handler, replacing any previous one.
    pub fn set_detection_handler(&self, handler: DetectionHandler) {
        *self.handler.lock() = Some(handler);
    }

    /// Removes the decision handler, restoring the default kick.
    pub fn clear_detection_handler(&self) {
        *self.handler.lock() = None;
    }

    /// Returns true if a decision handler is registered.
    #[must_use]
    pub fn has_detection_handler(&self) -> bool {
        self.handler.lock().is_some()
    }

    /// Runs one sweep tick.
    pub fn run(&self) -> SweepSummary {
        let snapshot = self.tracker.snapshot();
        let mut summary = SweepSummary {
            examined: snapshot.len(),
            ..SweepSummary::default()
        };

        for (client, count) in snapshot {
            if !self.directory.is_connected(client) || self.directory.is_bot(client) {
                // Stale or irrelevant evidence; discard without penalty.
                self.tracker.remove(client);
                summary.pruned += 1;
                continue;
            }

            if count >= DETECTION_THRESHOLD {
                self.issue_decision(client, count);
                // Removing the entry makes the decision fire at most once
                // per accumulation cycle.
                self.tracker.remove(client);
                summary.decisions += 1;
            }
        }

        if summary.examined > 0 {
            tracing::debug!(
                "sweep examined {} client(s): {} pruned, {} decision(s)",
                summary.examined,
                summary.pruned,
                summary.decisions
            );
        }
        telemetry::emit(
            self.telemetry.as_ref(),
            TelemetryEvent::SweepCompleted {
                examined: summary.examined,
                pruned: summary.pruned,
                decisions: summary.decisions,
            },
        );

        summary
    }

    /// Issues the decision for a client at or above the threshold.
    fn issue_decision(&self, client: ClientId, count: u32) {
        // Clone the handler out of the lock so a callback may re-register
        // without deadlocking.
        let handler = self.handler.lock().clone();
        if let Some(handler) = handler {
            handler(client, DETECTION_REASON);
            return;
        }

        let name = self
            .directory
            .display_name(client)
            .unwrap_or_else(|| client.to_string());
        tracing::info!("kicking {name} for restricted event listeners after {count} detection(s)");
        if let Err(err) = self.enforcer.kick(client, DisconnectReason::UntrustedAccount) {
            // Likely disconnected between snapshot and action; the entry is
            // still consumed so the decision cannot double-fire.
            tracing::warn!("kick for {name} failed: {err}");
        }
    }
}
