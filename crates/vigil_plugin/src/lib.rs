//! # VIGIL Plugin - The Doorman
//!
//! Host-facing shim around the detection core.
//!
//! The hosting server constructs a [`VigilPlugin`] with its boundary
//! implementations, feeds it configuration, and drives its lifecycle:
//!
//! ```text
//! host startup ──► on_config_parsed ──► load ──► ... session ... ──► unload
//!                                        │                             │
//!                                        │ register listen hook        │ stop timers
//!                                        │ start sweep timer (60s)     │ THEN unhook
//!                                        │ start reset timer (900s)    │
//! ```
//!
//! Everything with detection semantics lives in `vigil_core`; this crate
//! only wires it to the host and keeps the lifecycle honest.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod manifest;
pub mod plugin;

pub use config::{load_config, load_config_or_default};
pub use manifest::{PluginManifest, MIN_HOST_API_VERSION, PLUGIN_AUTHOR, PLUGIN_NAME};
pub use plugin::VigilPlugin;

// Re-exports so hosts can depend on this crate alone.
pub use vigil_core::{
    ClientId, DetectionHandler, DisconnectReason, Enforcer, EventHost, HookId, HostError,
    ListenHook, ListenerInspector, PlayerDirectory, SweepSummary, TelemetryEvent, VigilConfig,
    VigilError, VigilResult, CONFIG_VERSION, DEFAULT_CHECK_INTERVAL_SECS, DETECTION_REASON,
    DETECTION_THRESHOLD, RESET_INTERVAL_SECS,
};
