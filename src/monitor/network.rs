//! Network monitor
//!
//! Wraps the ambient transport with a transparent observer: every call is
//! forwarded to the previous chain head with identical arguments and its
//! result returned unchanged. Before forwarding, the request is tested
//! against the configured pattern; a match records one [`NetworkEvent`] at
//! call time, so the event sequence reflects call order even when the
//! underlying sends complete out of order.

use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;

use crate::common::{excerpt, Result};
use crate::host::{Body, Request, Response, Transport};
use crate::report::NetworkEvent;

use super::hook::{Ambient, HookHandle};

/// Callback invoked synchronously for each matched call
pub type OnNetworkEvent = Arc<dyn Fn(NetworkEvent) + Send + Sync>;

/// Longest body excerpt carried on an event
const BODY_EXCERPT_MAX: usize = 120;

/// Install a network monitor on `ambient`.
///
/// `pattern` is matched as a substring of the request URL, or of the body
/// when the body is text; a binary body never raises and falls back to
/// URL-only matching. The returned handle restores the previous transport
/// on uninstall.
pub fn install(
    ambient: &Ambient<dyn Transport>,
    pattern: &str,
    on_match: OnNetworkEvent,
) -> HookHandle<dyn Transport> {
    let pattern = pattern.to_string();
    ambient.install("network-monitor", move |inner| {
        Arc::new(MonitorTransport {
            inner,
            pattern,
            on_match,
        }) as Arc<dyn Transport>
    })
}

struct MonitorTransport {
    inner: Arc<dyn Transport>,
    pattern: String,
    on_match: OnNetworkEvent,
}

impl MonitorTransport {
    fn matches(&self, request: &Request) -> bool {
        if request.url.contains(&self.pattern) {
            return true;
        }
        match &request.body {
            Some(Body::Text(text)) => text.contains(&self.pattern),
            // Non-text bodies are matched on the URL alone
            Some(Body::Binary(_)) | None => false,
        }
    }

    fn record(&self, request: &Request) {
        let body_excerpt = match &request.body {
            Some(Body::Text(text)) => Some(excerpt(text, BODY_EXCERPT_MAX)),
            Some(Body::Binary(_)) | None => None,
        };

        let event = NetworkEvent {
            url: request.url.clone(),
            method: request.method.clone(),
            body_excerpt,
            observed_at: SystemTime::now(),
        };

        tracing::info!("network event: {} {}", event.method, event.url);
        (self.on_match)(event);
    }
}

#[async_trait]
impl Transport for MonitorTransport {
    async fn send(&self, request: Request) -> Result<Response> {
        // Observe at call time, then forward untouched
        if self.matches(&request) {
            self.record(&request);
        }
        self.inner.send(request).await
    }
}
