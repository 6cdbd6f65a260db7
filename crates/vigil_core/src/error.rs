//! # VIGIL Error Types
//!
//! All errors that can occur in the detection core and the plugin shim.

use crate::client::ClientId;
use thiserror::Error;

/// Errors that can occur in the VIGIL plugin.
///
/// None of these are fatal to the hosting process: configuration errors
/// degrade to previous/default values with a warning, and lifecycle errors
/// are reported to the caller that drove the lifecycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VigilError {
    /// Configuration parsed but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file contents could not be parsed.
    #[error("malformed configuration: {0}")]
    ConfigParse(String),

    /// Configuration file could not be read.
    #[error("configuration file unreadable: {0}")]
    ConfigIo(String),

    /// `load` was called while the plugin is already loaded.
    #[error("plugin is already loaded")]
    AlreadyLoaded,

    /// An operation that requires a loaded plugin was called before `load`.
    #[error("plugin is not loaded")]
    NotLoaded,
}

/// Result type for VIGIL operations.
pub type VigilResult<T> = Result<T, VigilError>;

/// Errors reported by the hosting server across the boundary traits.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The client is no longer known to the server.
    ///
    /// Expected during a sweep when a client disconnects between the
    /// snapshot and the action; treated as a no-op, not a failure.
    #[error("{0} not found on the server")]
    UnknownClient(ClientId),

    /// The host refused the request for its own reasons.
    #[error("host rejected the request: {0}")]
    Rejected(String),
}
