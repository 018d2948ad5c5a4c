//! Diagnostic report types and aggregation
//!
//! A [`DiagnosticReport`] holds the one-time snapshot (environment markers,
//! storage findings) plus two event sequences that grow as the monitors
//! observe matching calls. Events are appended in observation order, never
//! reordered or deduplicated. Rendering is a pure formatting step with no
//! effect on the report.

use std::collections::{BTreeMap, BTreeSet};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::common::Result;

/// Which store a finding came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    Local,
    Session,
    Cookie,
}

impl std::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Session => write!(f, "session"),
            Self::Cookie => write!(f, "cookie"),
        }
    }
}

/// One storage key retained by the inspector.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StorageFinding {
    pub store: StoreKind,
    pub key: String,
}

impl StorageFinding {
    pub fn new(store: StoreKind, key: &str) -> Self {
        Self {
            store,
            key: key.to_string(),
        }
    }
}

/// One intercepted network call that matched the configured pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkEvent {
    pub url: String,
    pub method: String,
    pub body_excerpt: Option<String>,
    pub observed_at: SystemTime,
}

/// One intercepted error-log entry that matched the keyword filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub message_excerpt: String,
    pub observed_at: SystemTime,
}

/// Structured result of one diagnostic session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticReport {
    /// When the snapshot was taken
    pub created_at: SystemTime,
    /// Marker name to presence, from the environment probe
    pub environment: BTreeMap<String, bool>,
    /// Matched network calls, in call order
    pub network_events: Vec<NetworkEvent>,
    /// Matched error-log entries, in log order
    pub error_events: Vec<ErrorEvent>,
    /// Auth-related storage keys found during the snapshot
    pub storage_findings: BTreeSet<StorageFinding>,
}

impl DiagnosticReport {
    /// Build the immutable snapshot fields; event sequences start empty
    pub fn new(
        environment: BTreeMap<String, bool>,
        storage_findings: BTreeSet<StorageFinding>,
    ) -> Self {
        Self {
            created_at: SystemTime::now(),
            environment,
            network_events: Vec::new(),
            error_events: Vec::new(),
            storage_findings,
        }
    }

    /// Append a network event (append order == observation order)
    pub fn push_network(&mut self, event: NetworkEvent) {
        self.network_events.push(event);
    }

    /// Append an error event (append order == observation order)
    pub fn push_error(&mut self, event: ErrorEvent) {
        self.error_events.push(event);
    }

    /// Serialize the report as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Render the report as human-readable text.
    ///
    /// Pure formatting; does not modify the report.
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str("=== Diagnostic Report ===\n");
        out.push_str(&format!("created: {}\n", format_time(self.created_at)));

        out.push_str("\nEnvironment:\n");
        if self.environment.is_empty() {
            out.push_str("  (no markers configured)\n");
        }
        for (marker, present) in &self.environment {
            let tag = if *present { "present" } else { "absent" };
            out.push_str(&format!("  {:<24} {}\n", marker, tag));
        }

        out.push_str(&format!(
            "\nStorage findings ({}):\n",
            self.storage_findings.len()
        ));
        for finding in &self.storage_findings {
            out.push_str(&format!("  [{}] {}\n", finding.store, finding.key));
        }

        out.push_str(&format!(
            "\nNetwork events ({}):\n",
            self.network_events.len()
        ));
        for (i, ev) in self.network_events.iter().enumerate() {
            out.push_str(&format!(
                "  {}. {} {} at {}\n",
                i + 1,
                ev.method,
                ev.url,
                format_time(ev.observed_at)
            ));
            if let Some(body) = &ev.body_excerpt {
                out.push_str(&format!("     body: {}\n", body));
            }
        }

        out.push_str(&format!(
            "\nError events ({}):\n",
            self.error_events.len()
        ));
        for (i, ev) in self.error_events.iter().enumerate() {
            out.push_str(&format!(
                "  {}. {} at {}\n",
                i + 1,
                ev.message_excerpt,
                format_time(ev.observed_at)
            ));
        }

        out
    }
}

fn format_time(time: SystemTime) -> String {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => format!("{}.{:03}s since epoch", d.as_secs(), d.subsec_millis()),
        Err(_) => "before epoch".to_string(),
    }
}
