//! Diagnostic harness orchestration
//!
//! `run_diagnostics` takes the synchronous snapshot (environment probe +
//! storage scan), installs both monitors as standing hooks, and returns the
//! initial report. Matched events are appended to the same report as they
//! occur until the hooks are uninstalled.

use std::sync::{Arc, Mutex};

use crate::common::{lock, Error, Result};
use crate::host::{HostEnvironment, LogSink, Transport};
use crate::inspect::StorageInspector;
use crate::monitor::{console, network, Ambient, HookHandle};
use crate::probe::{flutter_markers, EnvironmentProbe, Marker};
use crate::report::{DiagnosticReport, ErrorEvent, NetworkEvent};

/// What one diagnostic session looks for.
#[derive(Debug, Clone)]
pub struct DiagnosticConfig {
    /// Substring matched against request URLs and text bodies
    pub network_pattern: String,
    /// Case-sensitive substrings matched against error-log arguments
    pub error_keywords: Vec<String>,
    /// Case-insensitive substrings matched against storage keys
    pub storage_keywords: Vec<String>,
    /// Runtime/framework markers to probe
    pub markers: Vec<Marker>,
}

impl Default for DiagnosticConfig {
    /// Defaults for the challenge-send flow on a Flutter/Supabase host
    fn default() -> Self {
        Self {
            network_pattern: "challenges".to_string(),
            error_keywords: vec![
                "challenge".to_string(),
                "SimpleChallengeService".to_string(),
            ],
            storage_keywords: vec![
                "supabase".to_string(),
                "auth".to_string(),
                "token".to_string(),
            ],
            markers: flutter_markers(),
        }
    }
}

/// Harness lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessState {
    /// Constructed, no hooks installed
    Idle,
    /// Both monitors active, no events yet
    Installed,
    /// Steady state: events keep appending
    Observing,
    /// Hooks restored; terminal for this session
    Uninstalled,
}

impl std::fmt::Display for HarnessState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Installed => write!(f, "installed"),
            Self::Observing => write!(f, "observing"),
            Self::Uninstalled => write!(f, "uninstalled"),
        }
    }
}

struct SessionHooks {
    network: HookHandle<dyn Transport>,
    error: HookHandle<dyn LogSink>,
}

/// One harness instance over a host environment.
///
/// The ambient slots ([`DiagnosticHarness::transport`],
/// [`DiagnosticHarness::log`]) are the primitives the host should dispatch
/// through; monitors chain onto them on install and unwind on uninstall.
pub struct DiagnosticHarness {
    config: DiagnosticConfig,
    host: HostEnvironment,
    transport: Ambient<dyn Transport>,
    log: Ambient<dyn LogSink>,
    state: Arc<Mutex<HarnessState>>,
    report: Arc<Mutex<DiagnosticReport>>,
    hooks: Option<SessionHooks>,
}

impl DiagnosticHarness {
    pub fn new(host: HostEnvironment, config: DiagnosticConfig) -> Self {
        let transport = Ambient::new(Arc::clone(&host.transport));
        let log = Ambient::new(Arc::clone(&host.log));

        Self {
            config,
            host,
            transport,
            log,
            state: Arc::new(Mutex::new(HarnessState::Idle)),
            report: Arc::new(Mutex::new(DiagnosticReport::new(
                Default::default(),
                Default::default(),
            ))),
            hooks: None,
        }
    }

    /// The ambient request slot; host calls dispatch through
    /// `harness.transport().current()`
    pub fn transport(&self) -> &Ambient<dyn Transport> {
        &self.transport
    }

    /// The ambient error-log slot
    pub fn log(&self) -> &Ambient<dyn LogSink> {
        &self.log
    }

    /// Current lifecycle state
    pub fn state(&self) -> HarnessState {
        *lock(&self.state)
    }

    /// Snapshot of the report as observed so far
    pub fn report(&self) -> DiagnosticReport {
        lock(&self.report).clone()
    }

    /// Take the snapshot, install both monitors, and return the initial
    /// report.
    ///
    /// Fails if a session is already installed; call
    /// [`DiagnosticHarness::uninstall`] first. After uninstalling, calling
    /// this again starts a fresh session with a fresh report.
    pub fn run_diagnostics(&mut self) -> Result<DiagnosticReport> {
        let state = self.state();
        if matches!(state, HarnessState::Installed | HarnessState::Observing) {
            return Err(Error::invalid_state("run diagnostics", &state.to_string()));
        }

        // Snapshot phase: environment probe and storage scan, synchronous
        let probe = EnvironmentProbe::new(self.host.page.clone(), self.config.markers.clone());
        let environment = probe.detect();

        let inspector = StorageInspector::new(
            self.host.local.clone(),
            self.host.session.clone(),
            self.host.cookies.clone(),
        );
        let findings = inspector.scan(&self.config.storage_keywords);

        tracing::info!(
            "snapshot complete: {} markers probed, {} storage findings",
            environment.len(),
            findings.len()
        );

        let report = DiagnosticReport::new(environment, findings);
        let initial = report.clone();
        self.report = Arc::new(Mutex::new(report));

        // Standing hooks: continuous observation until uninstall
        let network_hook = {
            let report = Arc::clone(&self.report);
            let state = Arc::clone(&self.state);
            network::install(
                &self.transport,
                &self.config.network_pattern,
                Arc::new(move |event: NetworkEvent| {
                    lock(&report).push_network(event);
                    *lock(&state) = HarnessState::Observing;
                }),
            )
        };

        let error_hook = {
            let report = Arc::clone(&self.report);
            let state = Arc::clone(&self.state);
            console::install(
                &self.log,
                &self.config.error_keywords,
                Arc::new(move |event: ErrorEvent| {
                    lock(&report).push_error(event);
                    *lock(&state) = HarnessState::Observing;
                }),
            )
        };

        self.hooks = Some(SessionHooks {
            network: network_hook,
            error: error_hook,
        });
        *lock(&self.state) = HarnessState::Installed;

        Ok(initial)
    }

    /// Restore both hooks and stop recording.
    ///
    /// Fails if no session is installed, or if a later hook installed on
    /// top of the monitors has not been unwound yet (strict stack
    /// discipline); the session stays active in that case.
    pub fn uninstall(&mut self) -> Result<()> {
        let state = self.state();
        let mut hooks = match self.hooks.take() {
            Some(hooks) => hooks,
            None => {
                return Err(Error::invalid_state("uninstall", &state.to_string()));
            }
        };

        // Reverse install order; skip hooks already unwound by an earlier
        // partially-failed attempt
        if hooks.error.is_active() {
            if let Err(e) = hooks.error.uninstall() {
                self.hooks = Some(hooks);
                return Err(e);
            }
        }
        if hooks.network.is_active() {
            if let Err(e) = hooks.network.uninstall() {
                self.hooks = Some(hooks);
                return Err(e);
            }
        }

        *lock(&self.state) = HarnessState::Uninstalled;
        tracing::info!("hooks restored; observation stopped");
        Ok(())
    }
}
