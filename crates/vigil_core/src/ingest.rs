//! # Signal Ingestion
//!
//! The boundary where listener-registration signals become evidence.
//!
//! The host fires a signal whenever a client (re)registers its event
//! listeners. The probe intersects the client's active registrations with
//! the restricted-name set; a non-empty intersection on a connected,
//! non-bot client records exactly ONE violation, however many names
//! matched. The count measures flagged signals, not flagged names.

use std::collections::HashSet;
use std::sync::Arc;

use crossbeam_channel::Sender;

use crate::client::ClientId;
use crate::host::{ListenHook, ListenerInspector, PlayerDirectory};
use crate::telemetry::{self, TelemetryEvent};
use crate::tracker::ViolationTracker;

/// The ingestion boundary for listener-registration signals.
pub struct ListenerProbe {
    /// Restricted event names.
    blacklist: Arc<HashSet<String>>,
    /// Shared violation store.
    tracker: Arc<ViolationTracker>,
    /// Liveness filter.
    directory: Arc<dyn PlayerDirectory>,
    /// Host-side registration lookup.
    inspector: Arc<dyn ListenerInspector>,
    /// Optional telemetry sink.
    telemetry: Option<Sender<TelemetryEvent>>,
}

impl ListenerProbe {
    /// Creates a probe over `tracker` with the given restricted-name set.
    #[must_use]
    pub fn new(
        blacklist: Arc<HashSet<String>>,
        tracker: Arc<ViolationTracker>,
        directory: Arc<dyn PlayerDirectory>,
        inspector: Arc<dyn ListenerInspector>,
    ) -> Self {
        Self {
            blacklist,
            tracker,
            directory,
            inspector,
            telemetry: None,
        }
    }

    /// Attaches a telemetry sink.
    #[must_use]
    pub fn with_telemetry(mut self, sink: Sender<TelemetryEvent>) -> Self {
        self.telemetry = Some(sink);
        self
    }

    /// Processes one listener-registration signal for `client`.
    ///
    /// Returns the number of restricted names that matched. Disconnected
    /// clients and bots are ignored entirely; their registrations are not
    /// even inspected.
    pub fn inspect(&self, client: ClientId) -> usize {
        if !self.directory.is_connected(client) || self.directory.is_bot(client) {
            return 0;
        }

        let matched: Vec<&str> = self
            .blacklist
            .iter()
            .filter(|name| self.inspector.has_listener(client, name.as_str()))
            .map(String::as_str)
            .collect();
        if matched.is_empty() {
            return 0;
        }

        // One flagged signal is one violation, no matter how many names hit.
        let count = self.tracker.record(client);
        let name = self
            .directory
            .display_name(client)
            .unwrap_or_else(|| client.to_string());
        tracing::info!(
            "{name} has restricted event listener(s): {} (violation #{count})",
            matched.join(", ")
        );
        telemetry::emit(
            self.telemetry.as_ref(),
            TelemetryEvent::ListenerFlagged {
                client,
                matched: matched.len(),
                count,
            },
        );

        matched.len()
    }

    /// Wraps the probe in a hook closure for [`EventHost`] registration.
    ///
    /// [`EventHost`]: crate::host::EventHost
    #[must_use]
    pub fn into_hook(self: Arc<Self>) -> ListenHook {
        Arc::new(move |client| {
            self.inspect(client);
        })
    }
}
