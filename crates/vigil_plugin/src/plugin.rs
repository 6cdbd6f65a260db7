//! # Plugin Lifecycle
//!
//! Wires the detection core to the hosting server and keeps the lifecycle
//! ordering honest.
//!
//! ## Teardown ordering
//!
//! `unload` stops and joins BOTH timers before the listen hook is
//! unregistered, so no tick or signal callback ever executes against
//! torn-down state. The reverse order on load: the hook registers first,
//! then the timers start — a signal arriving between the two simply waits
//! in the tracker for the first sweep.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

use vigil_core::{
    ClientId, DetectionHandler, Enforcer, EventHost, HookId, ListenerInspector, ListenerProbe,
    PeriodicTimer, PlayerDirectory, ResetPass, SweepSummary, Sweeper, TelemetryChannel,
    TelemetryEvent, VigilConfig, VigilError, VigilResult, ViolationTracker, CONFIG_VERSION,
    RESET_INTERVAL_SECS,
};

use crate::manifest::PluginManifest;

/// Everything that exists only while the plugin is loaded.
struct LoadedState {
    /// Shared violation store.
    tracker: Arc<ViolationTracker>,
    /// Threshold sweep pass.
    sweeper: Arc<Sweeper>,
    /// Evidence reset pass.
    reset: Arc<ResetPass>,
    /// Sweep timer; `None` only transiently during a restart.
    check_timer: Option<PeriodicTimer>,
    /// Reset timer.
    reset_timer: Option<PeriodicTimer>,
    /// Registered listen hook.
    hook: HookId,
}

/// The VIGIL plugin.
///
/// Construct once with the host's boundary implementations, apply
/// configuration, then drive `load`/`unload` from the host's plugin
/// lifecycle.
pub struct VigilPlugin {
    /// Liveness source.
    directory: Arc<dyn PlayerDirectory>,
    /// Punitive removal.
    enforcer: Arc<dyn Enforcer>,
    /// Listener registration lookup.
    inspector: Arc<dyn ListenerInspector>,
    /// Hook registration lifecycle.
    event_host: Arc<dyn EventHost>,
    /// Active configuration.
    config: VigilConfig,
    /// Observability stream handed to every core component.
    telemetry: TelemetryChannel,
    /// Loaded-state; `None` while unloaded.
    state: Option<LoadedState>,
}

impl VigilPlugin {
    /// Creates an unloaded plugin with default configuration.
    #[must_use]
    pub fn new(
        directory: Arc<dyn PlayerDirectory>,
        enforcer: Arc<dyn Enforcer>,
        inspector: Arc<dyn ListenerInspector>,
        event_host: Arc<dyn EventHost>,
    ) -> Self {
        Self {
            directory,
            enforcer,
            inspector,
            event_host,
            config: VigilConfig::default(),
            telemetry: TelemetryChannel::default(),
            state: None,
        }
    }

    /// Returns the manifest for this build.
    #[must_use]
    pub fn manifest(&self) -> PluginManifest {
        PluginManifest::current()
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &VigilConfig {
        &self.config
    }

    /// Returns true while the plugin is loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.state.is_some()
    }

    /// Applies a newly parsed configuration.
    ///
    /// Outdated or invalid configurations degrade gracefully: a version
    /// behind the current schema logs a warning and is applied anyway; a
    /// configuration that fails validation is rejected and the previous
    /// values stay in force. When the plugin is loaded, an interval change
    /// restarts the sweep timer (the old timer is fully disposed first) and
    /// a blacklist change re-registers the listen hook.
    pub fn on_config_parsed(&mut self, config: VigilConfig) {
        if config.is_outdated() {
            tracing::warn!(
                "configuration is out of date (version {} < {CONFIG_VERSION}); consider updating the plugin",
                config.version
            );
        }
        if let Err(err) = config.validate() {
            tracing::warn!("rejecting configuration ({err}); keeping previous values");
            return;
        }

        let interval_changed = config.check_interval_secs != self.config.check_interval_secs;
        let blacklist_changed = config.blacklist != self.config.blacklist;
        self.config = config;

        if interval_changed {
            if let Some(state) = &mut self.state {
                if let Some(timer) = state.check_timer.take() {
                    // The previous tick source must be gone before the
                    // replacement starts.
                    timer.stop();
                }
                state.check_timer = Some(start_sweep_timer(
                    &state.sweeper,
                    self.config.check_interval(),
                ));
                tracing::debug!(
                    "sweep interval changed to {}s",
                    self.config.check_interval_secs
                );
            }
        }

        if blacklist_changed {
            if let Some(state) = &mut self.state {
                self.event_host.unregister_listen_hook(state.hook);
                state.hook = register_probe(
                    &self.event_host,
                    &self.directory,
                    &self.inspector,
                    &state.tracker,
                    &self.config.blacklist,
                    self.telemetry.sender(),
                );
                tracing::debug!(
                    "blacklist changed ({} name(s)); listen hook re-registered",
                    self.config.blacklist.len()
                );
            }
        }
    }

    /// Loads the plugin: registers the listen hook and starts both timers.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::AlreadyLoaded`] on a duplicate load and
    /// [`VigilError::InvalidConfig`] when the active configuration does not
    /// validate.
    pub fn load(&mut self, hot_reload: bool) -> VigilResult<()> {
        if self.state.is_some() {
            return Err(VigilError::AlreadyLoaded);
        }
        self.config.validate()?;

        let tracker = Arc::new(ViolationTracker::new());
        let sweeper = Arc::new(
            Sweeper::new(
                Arc::clone(&tracker),
                Arc::clone(&self.directory),
                Arc::clone(&self.enforcer),
            )
            .with_telemetry(self.telemetry.sender()),
        );
        let reset =
            Arc::new(ResetPass::new(Arc::clone(&tracker)).with_telemetry(self.telemetry.sender()));

        let hook = register_probe(
            &self.event_host,
            &self.directory,
            &self.inspector,
            &tracker,
            &self.config.blacklist,
            self.telemetry.sender(),
        );
        let check_timer = start_sweep_timer(&sweeper, self.config.check_interval());
        let reset_timer = start_reset_timer(&reset);

        self.state = Some(LoadedState {
            tracker,
            sweeper,
            reset,
            check_timer: Some(check_timer),
            reset_timer: Some(reset_timer),
            hook,
        });

        let manifest = PluginManifest::current();
        tracing::info!(
            "{} {} loaded{} ({} restricted name(s), {}s sweep interval)",
            manifest.name,
            manifest.version,
            if hot_reload { " (hot reload)" } else { "" },
            self.config.blacklist.len(),
            self.config.check_interval_secs
        );
        Ok(())
    }

    /// Unloads the plugin. A no-op when not loaded.
    ///
    /// Stops and joins both timers, THEN unregisters the listen hook, then
    /// drops all detection state.
    pub fn unload(&mut self) {
        let Some(mut state) = self.state.take() else {
            return;
        };

        if let Some(timer) = state.check_timer.take() {
            timer.stop();
        }
        if let Some(timer) = state.reset_timer.take() {
            timer.stop();
        }
        self.event_host.unregister_listen_hook(state.hook);

        tracing::info!("{} unloaded", PluginManifest::current().name);
    }

    /// Registers the detection handler, replacing the default kick.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::NotLoaded`] before `load`.
    pub fn set_detection_handler(&self, handler: DetectionHandler) -> VigilResult<()> {
        let state = self.state.as_ref().ok_or(VigilError::NotLoaded)?;
        state.sweeper.set_detection_handler(handler);
        Ok(())
    }

    /// Removes the detection handler, restoring the default kick.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::NotLoaded`] before `load`.
    pub fn clear_detection_handler(&self) -> VigilResult<()> {
        let state = self.state.as_ref().ok_or(VigilError::NotLoaded)?;
        state.sweeper.clear_detection_handler();
        Ok(())
    }

    /// Runs a sweep tick immediately, outside the timer cadence.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::NotLoaded`] before `load`.
    pub fn sweep_now(&self) -> VigilResult<SweepSummary> {
        let state = self.state.as_ref().ok_or(VigilError::NotLoaded)?;
        Ok(state.sweeper.run())
    }

    /// Runs a reset tick immediately, outside the timer cadence.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::NotLoaded`] before `load`.
    pub fn reset_now(&self) -> VigilResult<usize> {
        let state = self.state.as_ref().ok_or(VigilError::NotLoaded)?;
        Ok(state.reset.run())
    }

    /// Returns the tracked violation count for `client`, if any.
    #[must_use]
    pub fn violation_count(&self, client: ClientId) -> Option<u32> {
        self.state.as_ref()?.tracker.count(client)
    }

    /// Returns a receiver for the plugin's telemetry stream.
    #[must_use]
    pub fn telemetry_receiver(&self) -> Receiver<TelemetryEvent> {
        self.telemetry.receiver()
    }
}

impl Drop for VigilPlugin {
    fn drop(&mut self) {
        self.unload();
    }
}

/// Builds a probe over the current blacklist and registers its hook.
fn register_probe(
    event_host: &Arc<dyn EventHost>,
    directory: &Arc<dyn PlayerDirectory>,
    inspector: &Arc<dyn ListenerInspector>,
    tracker: &Arc<ViolationTracker>,
    blacklist: &HashSet<String>,
    telemetry: Sender<TelemetryEvent>,
) -> HookId {
    let probe = Arc::new(
        ListenerProbe::new(
            Arc::new(blacklist.clone()),
            Arc::clone(tracker),
            Arc::clone(directory),
            Arc::clone(inspector),
        )
        .with_telemetry(telemetry),
    );
    event_host.register_listen_hook(probe.into_hook())
}

/// Starts the sweep timer.
fn start_sweep_timer(sweeper: &Arc<Sweeper>, interval: Duration) -> PeriodicTimer {
    let sweeper = Arc::clone(sweeper);
    PeriodicTimer::spawn("vigil-sweep", interval, move || {
        sweeper.run();
    })
}

/// Starts the reset timer on the fixed interval.
fn start_reset_timer(reset: &Arc<ResetPass>) -> PeriodicTimer {
    let reset = Arc::clone(reset);
    PeriodicTimer::spawn(
        "vigil-reset",
        Duration::from_secs(RESET_INTERVAL_SECS),
        move || {
            reset.run();
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use vigil_core::{DisconnectReason, HostError, ListenHook};

    #[derive(Default)]
    struct MockHost {
        connected: Mutex<HashSet<ClientId>>,
        bots: Mutex<HashSet<ClientId>>,
        listeners: Mutex<HashSet<(ClientId, String)>>,
        kicked: Mutex<Vec<(ClientId, DisconnectReason)>>,
        hooks: Mutex<HashMap<u64, ListenHook>>,
        next_hook: AtomicU64,
        register_calls: AtomicUsize,
        unregister_calls: AtomicUsize,
    }

    impl MockHost {
        fn connect(&self, client: ClientId) {
            self.connected.lock().insert(client);
        }

        fn add_listener(&self, client: ClientId, event_name: &str) {
            self.listeners.lock().insert((client, event_name.to_string()));
        }

        fn fire_listen_signal(&self, client: ClientId) {
            let hooks: Vec<ListenHook> = self.hooks.lock().values().cloned().collect();
            for hook in hooks {
                hook(client);
            }
        }

        fn hook_count(&self) -> usize {
            self.hooks.lock().len()
        }
    }

    impl PlayerDirectory for MockHost {
        fn is_connected(&self, client: ClientId) -> bool {
            self.connected.lock().contains(&client)
        }

        fn is_bot(&self, client: ClientId) -> bool {
            self.bots.lock().contains(&client)
        }
    }

    impl Enforcer for MockHost {
        fn kick(&self, client: ClientId, reason: DisconnectReason) -> Result<(), HostError> {
            self.kicked.lock().push((client, reason));
            self.connected.lock().remove(&client);
            Ok(())
        }
    }

    impl ListenerInspector for MockHost {
        fn has_listener(&self, client: ClientId, event_name: &str) -> bool {
            self.listeners
                .lock()
                .contains(&(client, event_name.to_string()))
        }
    }

    impl EventHost for MockHost {
        fn register_listen_hook(&self, hook: ListenHook) -> HookId {
            self.register_calls.fetch_add(1, Ordering::Relaxed);
            let id = self.next_hook.fetch_add(1, Ordering::Relaxed);
            self.hooks.lock().insert(id, hook);
            HookId(id)
        }

        fn unregister_listen_hook(&self, hook: HookId) {
            self.unregister_calls.fetch_add(1, Ordering::Relaxed);
            self.hooks.lock().remove(&hook.0);
        }
    }

    fn plugin_with(host: &Arc<MockHost>, blacklist: &[&str]) -> VigilPlugin {
        let mut plugin = VigilPlugin::new(
            Arc::clone(host) as Arc<dyn PlayerDirectory>,
            Arc::clone(host) as Arc<dyn Enforcer>,
            Arc::clone(host) as Arc<dyn ListenerInspector>,
            Arc::clone(host) as Arc<dyn EventHost>,
        );
        plugin.on_config_parsed(VigilConfig {
            blacklist: blacklist.iter().map(|s| (*s).to_string()).collect(),
            ..VigilConfig::default()
        });
        plugin
    }

    #[test]
    fn test_load_unload_lifecycle() {
        let host = Arc::new(MockHost::default());
        let mut plugin = plugin_with(&host, &["evt_a"]);

        assert!(!plugin.is_loaded());
        plugin.load(false).unwrap();
        assert!(plugin.is_loaded());
        assert_eq!(host.hook_count(), 1);

        assert_eq!(plugin.load(false), Err(VigilError::AlreadyLoaded));

        plugin.unload();
        assert!(!plugin.is_loaded());
        assert_eq!(host.hook_count(), 0);

        // Unload is idempotent and reload works.
        plugin.unload();
        plugin.load(true).unwrap();
        assert!(plugin.is_loaded());
    }

    #[test]
    fn test_operations_require_load() {
        let host = Arc::new(MockHost::default());
        let plugin = plugin_with(&host, &[]);

        assert_eq!(plugin.sweep_now(), Err(VigilError::NotLoaded));
        assert_eq!(plugin.reset_now(), Err(VigilError::NotLoaded));
        assert_eq!(
            plugin.set_detection_handler(Arc::new(|_, _| {})),
            Err(VigilError::NotLoaded)
        );
        assert_eq!(plugin.clear_detection_handler(), Err(VigilError::NotLoaded));
        assert_eq!(plugin.violation_count(ClientId::new(1)), None);
    }

    #[test]
    fn test_signal_to_decision_flow() {
        let host = Arc::new(MockHost::default());
        let mut plugin = plugin_with(&host, &["evt_secret"]);
        plugin.load(false).unwrap();

        let client = ClientId::new(1);
        host.connect(client);
        host.add_listener(client, "evt_secret");

        for _ in 0..3 {
            host.fire_listen_signal(client);
        }
        assert_eq!(plugin.violation_count(client), Some(3));

        let summary = plugin.sweep_now().unwrap();
        assert_eq!(summary.decisions, 1);
        assert_eq!(
            host.kicked.lock().as_slice(),
            &[(client, DisconnectReason::UntrustedAccount)]
        );
        assert_eq!(plugin.violation_count(client), None);
    }

    #[test]
    fn test_invalid_config_keeps_previous_values() {
        let host = Arc::new(MockHost::default());
        let mut plugin = plugin_with(&host, &["evt_a"]);

        plugin.on_config_parsed(VigilConfig {
            check_interval_secs: 0,
            ..VigilConfig::default()
        });

        assert!(plugin.config().blacklist.contains("evt_a"));
        assert_ne!(plugin.config().check_interval_secs, 0);
    }

    #[test]
    fn test_blacklist_change_reregisters_hook() {
        let host = Arc::new(MockHost::default());
        let mut plugin = plugin_with(&host, &["evt_a"]);
        plugin.load(false).unwrap();
        assert_eq!(host.register_calls.load(Ordering::Relaxed), 1);

        plugin.on_config_parsed(VigilConfig {
            blacklist: ["evt_b".to_string()].into_iter().collect(),
            ..VigilConfig::default()
        });

        assert_eq!(host.register_calls.load(Ordering::Relaxed), 2);
        assert_eq!(host.unregister_calls.load(Ordering::Relaxed), 1);
        assert_eq!(host.hook_count(), 1);

        // The new hook watches the new name.
        let client = ClientId::new(2);
        host.connect(client);
        host.add_listener(client, "evt_b");
        host.fire_listen_signal(client);
        assert_eq!(plugin.violation_count(client), Some(1));
    }

    #[test]
    fn test_interval_change_restarts_timer() {
        let host = Arc::new(MockHost::default());
        let mut plugin = plugin_with(&host, &["evt_a"]);
        plugin.load(false).unwrap();

        plugin.on_config_parsed(VigilConfig {
            blacklist: ["evt_a".to_string()].into_iter().collect(),
            check_interval_secs: 30,
            ..VigilConfig::default()
        });

        assert_eq!(plugin.config().check_interval_secs, 30);
        assert!(plugin.is_loaded());
        // Still exactly one hook and a working pipeline after the restart.
        assert_eq!(host.hook_count(), 1);
        assert!(plugin.sweep_now().is_ok());
    }

    #[test]
    fn test_unloaded_config_change_applies_cold() {
        let host = Arc::new(MockHost::default());
        let mut plugin = plugin_with(&host, &["evt_a"]);

        plugin.on_config_parsed(VigilConfig {
            blacklist: ["evt_b".to_string()].into_iter().collect(),
            check_interval_secs: 10,
            ..VigilConfig::default()
        });
        // No hooks touched while unloaded.
        assert_eq!(host.register_calls.load(Ordering::Relaxed), 0);

        plugin.load(false).unwrap();
        let client = ClientId::new(3);
        host.connect(client);
        host.add_listener(client, "evt_b");
        host.fire_listen_signal(client);
        assert_eq!(plugin.violation_count(client), Some(1));
    }

    #[test]
    fn test_drop_unloads() {
        let host = Arc::new(MockHost::default());
        let mut plugin = plugin_with(&host, &["evt_a"]);
        plugin.load(false).unwrap();
        assert_eq!(host.hook_count(), 1);

        drop(plugin);
        assert_eq!(host.hook_count(), 0);
    }
}
