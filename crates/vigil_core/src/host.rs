//! # Host Boundary
//!
//! Traits the hosting server implements for VIGIL.
//!
//! The core never talks to the server directly: liveness queries, listener
//! inspection, punitive removal, and hook registration all cross these
//! seams. Every implementation must be cheap and non-blocking; they are
//! called from the signal path and from timer threads.

use std::fmt;
use std::sync::Arc;

use crate::client::ClientId;
use crate::error::HostError;

/// Liveness and classification queries about connected clients.
pub trait PlayerDirectory: Send + Sync {
    /// Returns true while the client is connected to the server.
    fn is_connected(&self, client: ClientId) -> bool;

    /// Returns true if the client is an automated participant (bot).
    ///
    /// Bots register listeners through server-side code paths and are never
    /// penalized; their evidence is discarded on sight.
    fn is_bot(&self, client: ClientId) -> bool;

    /// Returns the client's display name, if the server still knows it.
    ///
    /// Used for log lines only; detection logic never depends on it.
    fn display_name(&self, client: ClientId) -> Option<String> {
        let _ = client;
        None
    }
}

/// Punitive removal of a client from the server.
pub trait Enforcer: Send + Sync {
    /// Removes the client from the server with the given reason code.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::UnknownClient`] when the client vanished before
    /// the request, or [`HostError::Rejected`] when the host declined it.
    fn kick(&self, client: ClientId, reason: DisconnectReason) -> Result<(), HostError>;
}

/// Inspection of a client's active listener registrations.
pub trait ListenerInspector: Send + Sync {
    /// Returns true if the client currently holds an active listener
    /// registration for `event_name`.
    fn has_listener(&self, client: ClientId, event_name: &str) -> bool;
}

/// Callback invoked by the host whenever a client (re)registers its event
/// listeners.
pub type ListenHook = Arc<dyn Fn(ClientId) + Send + Sync>;

/// Handle for a registered [`ListenHook`], used to unregister it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HookId(pub u64);

/// Registration lifecycle for the listener-registration signal.
///
/// The host owns event dispatch; VIGIL only registers and unregisters. The
/// plugin guarantees both timers are stopped before it unregisters, so a
/// hook never fires against torn-down state.
pub trait EventHost: Send + Sync {
    /// Registers a hook to be invoked on every listener-registration signal.
    fn register_listen_hook(&self, hook: ListenHook) -> HookId;

    /// Unregisters a previously registered hook. Unknown ids are a no-op.
    fn unregister_listen_hook(&self, hook: HookId);
}

/// Reason code handed to [`Enforcer::kick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DisconnectReason {
    /// The client crossed the detection threshold and is no longer trusted.
    UntrustedAccount,
}

impl DisconnectReason {
    /// Stable string form of the reason code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UntrustedAccount => "kicked - untrusted account",
        }
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
