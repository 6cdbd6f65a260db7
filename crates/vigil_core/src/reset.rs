//! # Evidence Reset
//!
//! Unconditional clearing of all accumulated evidence on a fixed interval.
//!
//! The reset bounds worst-case memory (no entry outlives one interval) and
//! forgives clients whose isolated detections never reached the threshold.
//! It runs on its own timer and never coordinates with the sweep; both
//! converge on the tracker's atomic operations.

use std::sync::Arc;

use crossbeam_channel::Sender;

use crate::telemetry::{self, TelemetryEvent};
use crate::tracker::ViolationTracker;

/// The reset pass.
pub struct ResetPass {
    /// Shared violation store.
    tracker: Arc<ViolationTracker>,
    /// Optional telemetry sink.
    telemetry: Option<Sender<TelemetryEvent>>,
}

impl ResetPass {
    /// Creates a reset pass over `tracker`.
    #[must_use]
    pub fn new(tracker: Arc<ViolationTracker>) -> Self {
        Self {
            tracker,
            telemetry: None,
        }
    }

    /// Attaches a telemetry sink.
    #[must_use]
    pub fn with_telemetry(mut self, sink: Sender<TelemetryEvent>) -> Self {
        self.telemetry = Some(sink);
        self
    }

    /// Runs one reset tick. Returns how many entries were dropped.
    pub fn run(&self) -> usize {
        let cleared = self.tracker.clear();
        tracing::info!("resetting detection counters for all clients ({cleared} dropped)");
        telemetry::emit(
            self.telemetry.as_ref(),
            TelemetryEvent::TrackerReset { cleared },
        );
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientId;
    use crate::telemetry::TelemetryChannel;

    #[test]
    fn test_reset_empties_the_tracker() {
        let tracker = Arc::new(ViolationTracker::new());
        tracker.record(ClientId::new(1));
        tracker.record(ClientId::new(2));
        tracker.record(ClientId::new(2));

        let reset = ResetPass::new(Arc::clone(&tracker));
        assert_eq!(reset.run(), 2);
        assert!(tracker.snapshot().is_empty());

        // Idle reset is a harmless no-op.
        assert_eq!(reset.run(), 0);
    }

    #[test]
    fn test_evidence_restarts_from_zero() {
        // Scenario D: partial evidence wiped by a reset does not carry over;
        // the client needs a full threshold of fresh detections.
        let tracker = Arc::new(ViolationTracker::new());
        let client = ClientId::new(3);
        tracker.record(client);
        tracker.record(client);

        ResetPass::new(Arc::clone(&tracker)).run();
        assert_eq!(tracker.count(client), None);

        assert_eq!(tracker.record(client), 1);
    }

    #[test]
    fn test_reset_reports_cleared_count() {
        let channel = TelemetryChannel::new(4);
        let tracker = Arc::new(ViolationTracker::new());
        tracker.record(ClientId::new(4));

        let reset = ResetPass::new(Arc::clone(&tracker)).with_telemetry(channel.sender());
        reset.run();

        assert_eq!(
            channel.receiver().try_recv(),
            Ok(TelemetryEvent::TrackerReset { cleared: 1 })
        );
    }
}
