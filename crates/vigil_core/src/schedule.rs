//! # Periodic Timers
//!
//! Dedicated-thread timers driving the sweep and reset passes.
//!
//! ## Design
//!
//! - One thread per timer; ticks on the same timer can never overlap
//! - The interval wait is the only blocking point, so a stop request is
//!   observed between ticks, never inside one
//! - [`PeriodicTimer::stop`] signals, wakes, and joins: when it returns the
//!   thread is gone, so stop-then-start never yields two tick sources

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

/// Shutdown signal shared between a timer and its thread.
struct StopSignal {
    stop: AtomicBool,
    mutex: Mutex<()>,
    condvar: Condvar,
}

impl StopSignal {
    fn new() -> Self {
        Self {
            stop: AtomicBool::new(false),
            mutex: Mutex::new(()),
            condvar: Condvar::new(),
        }
    }

    fn signal(&self) {
        self.stop.store(true, Ordering::Release);
        let guard = self.mutex.lock();
        self.condvar.notify_all();
        drop(guard);
    }

    /// Waits up to `interval`. Returns true when stop was requested.
    fn wait(&self, interval: Duration) -> bool {
        if self.stop.load(Ordering::Acquire) {
            return true;
        }
        let mut guard = self.mutex.lock();
        if self.stop.load(Ordering::Acquire) {
            return true;
        }
        self.condvar.wait_for(&mut guard, interval);
        self.stop.load(Ordering::Acquire)
    }
}

/// A repeating timer on its own thread.
///
/// The first tick fires one full interval after [`spawn`](Self::spawn);
/// there is no immediate tick on start. Dropping the timer performs the
/// same teardown as [`stop`](Self::stop).
pub struct PeriodicTimer {
    /// Label used in log lines.
    name: &'static str,
    /// Shutdown signal.
    signal: Arc<StopSignal>,
    /// Ticks executed so far.
    ticks: Arc<AtomicU64>,
    /// Timer thread handle; taken on teardown.
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTimer {
    /// Spawns a timer that runs `tick` every `interval`.
    #[must_use]
    pub fn spawn(name: &'static str, interval: Duration, mut tick: impl FnMut() + Send + 'static) -> Self {
        let signal = Arc::new(StopSignal::new());
        let ticks = Arc::new(AtomicU64::new(0));

        let thread_signal = Arc::clone(&signal);
        let thread_ticks = Arc::clone(&ticks);
        let handle = thread::spawn(move || {
            tracing::debug!("timer {name} started, interval {interval:?}");
            loop {
                if thread_signal.wait(interval) {
                    break;
                }
                tick();
                thread_ticks.fetch_add(1, Ordering::Relaxed);
            }
            tracing::debug!("timer {name} stopped");
        });

        Self {
            name,
            signal,
            ticks,
            handle: Some(handle),
        }
    }

    /// Returns how many ticks have completed.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Returns the timer's label.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Stops the timer and waits for its thread to finish.
    ///
    /// A tick already in progress completes first; no tick starts after
    /// this returns.
    pub fn stop(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        self.signal.signal();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for PeriodicTimer {
    fn drop(&mut self) {
        self.teardown();
    }
}
