//! # VIGIL Core - The Watchtower
//!
//! Violation tracking and decision core for server-side listener auditing.
//!
//! ## The Problem
//!
//! Certain third-party tooling announces itself by registering listeners for
//! internal event names no legitimate client ever subscribes to. The host
//! server can inspect a client's listener registrations; VIGIL turns those
//! inspections into evidence, and evidence into decisions.
//!
//! ## Architecture
//!
//! ```text
//! HOST SERVER                          VIGIL CORE
//!     │                                    │
//!     │── listen-registration signal ─────►│ ListenerProbe::inspect
//!     │                                    │       │ record(client)
//!     │                                    │       ▼
//!     │                              ┌───────────────────┐
//!     │   check timer (60s) ────────►│ ViolationTracker  │◄──── reset timer
//!     │       Sweeper::run           │ (client → count)  │      (900s)
//!     │            │                 └───────────────────┘      ResetPass::run
//!     │            ▼
//!     │◄── kick(client, untrusted)  ── or ──  detection handler
//! ```
//!
//! ## Guarantees
//!
//! - `record` never loses an increment under concurrent writers
//! - Sweep ticks never overlap; reset ticks never overlap
//! - A decision fires at most once per accumulation cycle
//! - No entry survives longer than one reset interval
//! - Nothing in a tick propagates a failure past the tick boundary

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod client;
pub mod config;
pub mod error;
pub mod host;
pub mod ingest;
pub mod reset;
pub mod schedule;
pub mod sweep;
pub mod telemetry;
pub mod tracker;

pub use client::ClientId;
pub use config::{VigilConfig, CONFIG_VERSION};
pub use error::{HostError, VigilError, VigilResult};
pub use host::{
    DisconnectReason, Enforcer, EventHost, HookId, ListenHook, ListenerInspector, PlayerDirectory,
};
pub use ingest::ListenerProbe;
pub use reset::ResetPass;
pub use schedule::PeriodicTimer;
pub use sweep::{DetectionHandler, SweepSummary, Sweeper, DETECTION_REASON};
pub use telemetry::{TelemetryChannel, TelemetryEvent};
pub use tracker::ViolationTracker;

/// Number of flagged signals a client must accumulate before a decision
/// fires.
///
/// Fixed by design: the threshold is part of the detection heuristic, not a
/// tuning knob for server operators.
pub const DETECTION_THRESHOLD: u32 = 3;

/// Interval between unconditional evidence resets, in seconds (15 minutes).
///
/// Bounds worst-case memory and forgives clients whose isolated detections
/// never reach the threshold. Fixed by design, like the threshold.
pub const RESET_INTERVAL_SECS: u64 = 900;

/// Default interval between sweep ticks, in seconds.
///
/// Operators may override this through [`VigilConfig::check_interval_secs`].
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 60;
