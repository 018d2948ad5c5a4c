//! End-to-end tests for the diagnostic harness
//!
//! These tests drive a complete diagnostic session against an in-memory
//! host environment: snapshot, continuous observation through the hook
//! chain, and uninstall.

use std::sync::Arc;

use serde_json::json;

use webprobe::host::memory::{
    MemoryStore, RecordingSink, ScriptedTransport, StaticCookies, StaticPage,
};
use webprobe::host::{HostEnvironment, Request, Response};
use webprobe::{DiagnosticConfig, DiagnosticHarness, HarnessState, StoreKind};

/// Test context bundling the harness with handles to the host fakes
struct TestContext {
    harness: DiagnosticHarness,
    transport: Arc<ScriptedTransport>,
    sink: Arc<RecordingSink>,
}

impl TestContext {
    /// Harness over a Flutter-like host with auth artifacts in storage
    fn new() -> Self {
        webprobe::common::logging::init_test();

        let transport = Arc::new(ScriptedTransport::new(Response::ok("created")));
        let sink = Arc::new(RecordingSink::new());

        let host = HostEnvironment::new(transport.clone(), sink.clone())
            .with_local(Arc::new(MemoryStore::from_pairs(&[
                ("supabase.auth.token", "eyJhbGciOi"),
                ("theme", "dark"),
            ])))
            .with_session(Arc::new(MemoryStore::from_pairs(&[(
                "supabase.auth.refresh_token",
                "r1",
            )])))
            .with_cookies(Arc::new(StaticCookies(
                "sb-access-token=abc; locale=vi".to_string(),
            )))
            .with_page(Arc::new(
                StaticPage::new()
                    .with_global("_flutter")
                    .with_global("flutterCanvasKit")
                    .with_selector("flt-glass-pane"),
            ));

        Self {
            harness: DiagnosticHarness::new(host, DiagnosticConfig::default()),
            transport,
            sink,
        }
    }

    async fn send(&self, method: &str, url: &str) {
        self.harness
            .transport()
            .current()
            .send(Request::new(method, url))
            .await
            .expect("scripted transport never fails");
    }
}

#[tokio::test]
async fn challenge_request_is_observed_exactly_once() {
    let mut ctx = TestContext::new();
    ctx.harness.run_diagnostics().unwrap();

    ctx.send("POST", "https://api.example.com/challenges").await;
    let report = ctx.harness.report();
    assert_eq!(report.network_events.len(), 1);
    assert_eq!(report.network_events[0].url, "https://api.example.com/challenges");

    // An unmatched call leaves the report unchanged
    ctx.send("GET", "https://api.example.com/players").await;
    let report = ctx.harness.report();
    assert_eq!(report.network_events.len(), 1);

    // Both calls reached the host transport untouched
    assert_eq!(ctx.transport.call_count(), 2);
    ctx.harness.uninstall().unwrap();
}

#[tokio::test]
async fn event_order_matches_call_order() {
    let mut ctx = TestContext::new();
    ctx.harness.run_diagnostics().unwrap();

    for i in 0..5 {
        ctx.send("POST", &format!("https://api.example.com/challenges/{}", i))
            .await;
    }

    let report = ctx.harness.report();
    let urls: Vec<_> = report.network_events.iter().map(|e| e.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://api.example.com/challenges/0",
            "https://api.example.com/challenges/1",
            "https://api.example.com/challenges/2",
            "https://api.example.com/challenges/3",
            "https://api.example.com/challenges/4",
        ]
    );
    assert_eq!(
        ctx.transport.seen_urls(),
        urls.iter().map(|u| u.to_string()).collect::<Vec<_>>()
    );
}

#[test]
fn snapshot_covers_environment_and_storage() {
    let mut ctx = TestContext::new();
    let report = ctx.harness.run_diagnostics().unwrap();

    assert_eq!(report.environment["flutter-runtime"], true);
    assert_eq!(report.environment["flutter-canvaskit"], true);
    assert_eq!(report.environment["flutter-glass-pane"], true);
    assert_eq!(report.environment["dart-loader"], false);

    let stores: Vec<_> = report
        .storage_findings
        .iter()
        .map(|f| (f.store, f.key.as_str()))
        .collect();
    assert_eq!(
        stores,
        vec![
            (StoreKind::Local, "supabase.auth.token"),
            (StoreKind::Session, "supabase.auth.refresh_token"),
            (StoreKind::Cookie, "sb-access-token"),
        ]
    );
}

#[tokio::test]
async fn error_entries_are_filtered_and_forwarded() {
    let mut ctx = TestContext::new();
    ctx.harness.run_diagnostics().unwrap();

    let log = ctx.harness.log().current();
    log.error(&[json!("SimpleChallengeService: insert failed"), json!(42501)]);
    log.error(&[json!("unrelated layout warning")]);

    let report = ctx.harness.report();
    assert_eq!(report.error_events.len(), 1);
    assert!(report.error_events[0]
        .message_excerpt
        .contains("SimpleChallengeService"));

    // The original sink saw both entries
    assert_eq!(ctx.sink.len(), 2);
}

#[tokio::test]
async fn full_session_lifecycle() {
    let mut ctx = TestContext::new();
    assert_eq!(ctx.harness.state(), HarnessState::Idle);

    ctx.harness.run_diagnostics().unwrap();
    assert_eq!(ctx.harness.state(), HarnessState::Installed);

    ctx.send("POST", "https://api.example.com/challenges").await;
    assert_eq!(ctx.harness.state(), HarnessState::Observing);

    ctx.harness.uninstall().unwrap();
    assert_eq!(ctx.harness.state(), HarnessState::Uninstalled);

    // Calls after uninstall produce zero new events
    ctx.send("POST", "https://api.example.com/challenges").await;
    assert_eq!(ctx.harness.report().network_events.len(), 1);
    assert_eq!(ctx.transport.call_count(), 2);

    // Re-entrant: a fresh session starts with a fresh report
    ctx.harness.run_diagnostics().unwrap();
    assert_eq!(ctx.harness.state(), HarnessState::Installed);
    assert!(ctx.harness.report().network_events.is_empty());
    ctx.harness.uninstall().unwrap();
}

#[tokio::test]
async fn bare_host_degrades_to_empty_snapshot() {
    let transport = Arc::new(ScriptedTransport::new(Response::ok("ok")));
    let sink = Arc::new(RecordingSink::new());
    let host = HostEnvironment::new(transport, sink);

    let mut harness = DiagnosticHarness::new(host, DiagnosticConfig::default());
    let report = harness.run_diagnostics().unwrap();

    assert!(report.storage_findings.is_empty());
    assert!(report.environment.values().all(|present| !present));

    // Observation still works without stores or page
    harness
        .transport()
        .current()
        .send(Request::new("POST", "https://api.example.com/challenges"))
        .await
        .unwrap();
    assert_eq!(harness.report().network_events.len(), 1);
}

#[tokio::test]
async fn rendered_report_reflects_observations() {
    let mut ctx = TestContext::new();
    ctx.harness.run_diagnostics().unwrap();

    ctx.harness
        .transport()
        .current()
        .send(
            Request::new("POST", "https://api.example.com/rest/v1/challenges")
                .with_text_body(r#"{"challenger_id":"u1","status":"pending"}"#),
        )
        .await
        .unwrap();

    let report = ctx.harness.report();
    let text = report.render();
    assert!(text.contains("POST https://api.example.com/rest/v1/challenges"));
    assert!(text.contains("challenger_id"));
    assert!(text.contains("supabase.auth.token"));
    assert!(text.contains("flutter-runtime"));

    let json = report.to_json().unwrap();
    assert!(json.contains("\"network_events\""));
}
