//! # Client Identity
//!
//! Opaque per-connection identity handed out by the host server.

use std::fmt;

/// Unique identifier for a connected client.
///
/// Issued by the host per connection and stable for that connection's
/// lifetime. The host must not reuse an identity for a different connection
/// while evidence against it may still be tracked; a client that disconnects
/// and reconnects arrives under a fresh identity and starts with zero
/// accumulated evidence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(pub u64);

impl ClientId {
    /// Creates an identity from the host's raw connection number.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw connection number.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client#{}", self.0)
    }
}
