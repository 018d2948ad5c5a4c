//! In-memory host implementations for testing
//!
//! These fakes stand in for a real browser embedding so the harness can be
//! exercised without one: a scripted transport that returns canned
//! responses, a sink that records every forwarded entry, map-backed stores,
//! and a static page description.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::common::{lock, Error, Result};

use super::{CookieSource, KeyValueStore, LogSink, Page, Request, Response, Transport};

/// Transport that answers every request with the same canned response and
/// counts how many calls reached it.
pub struct ScriptedTransport {
    response: Response,
    calls: AtomicUsize,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedTransport {
    /// Answer every request with `response`
    pub fn new(response: Response) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of requests that reached this transport
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// URLs of the requests that reached this transport, in call order
    pub fn seen_urls(&self) -> Vec<String> {
        lock(&self.requests).iter().map(|r| r.url.clone()).collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: Request) -> Result<Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.requests).push(request);
        Ok(self.response.clone())
    }
}

/// Transport that fails every request, for hosts with no network primitive.
pub struct UnavailableTransport;

#[async_trait]
impl Transport for UnavailableTransport {
    async fn send(&self, _request: Request) -> Result<Response> {
        Err(Error::HostUnavailable("transport"))
    }
}

/// Transport that fails every request with a fixed transport error.
pub struct FailingTransport(pub String);

#[async_trait]
impl Transport for FailingTransport {
    async fn send(&self, _request: Request) -> Result<Response> {
        Err(Error::Transport(self.0.clone()))
    }
}

/// Log sink that records every entry forwarded to it.
#[derive(Default)]
pub struct RecordingSink {
    entries: Mutex<Vec<Vec<Value>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries forwarded so far, in log order
    pub fn entries(&self) -> Vec<Vec<Value>> {
        lock(&self.entries).clone()
    }

    /// Number of entries forwarded so far
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LogSink for RecordingSink {
    fn error(&self, args: &[Value]) {
        lock(&self.entries).push(args.to_vec());
    }
}

/// Map-backed key-value store.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from `(key, value)` pairs
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let entries = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            entries: Mutex::new(entries),
        }
    }

    /// Insert or replace an entry
    pub fn set(&self, key: &str, value: &str) {
        lock(&self.entries).insert(key.to_string(), value.to_string());
    }
}

impl KeyValueStore for MemoryStore {
    fn keys(&self) -> Vec<String> {
        lock(&self.entries).keys().cloned().collect()
    }

    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }
}

/// Fixed cookie string.
pub struct StaticCookies(pub String);

impl CookieSource for StaticCookies {
    fn cookie_string(&self) -> String {
        self.0.clone()
    }
}

/// Page with a fixed set of defined globals and matchable selectors.
#[derive(Default)]
pub struct StaticPage {
    globals: Vec<String>,
    selectors: Vec<String>,
}

impl StaticPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a global symbol as defined
    pub fn with_global(mut self, symbol: &str) -> Self {
        self.globals.push(symbol.to_string());
        self
    }

    /// Declare a selector as matching at least one element
    pub fn with_selector(mut self, selector: &str) -> Self {
        self.selectors.push(selector.to_string());
        self
    }
}

impl Page for StaticPage {
    fn has_global(&self, symbol: &str) -> bool {
        self.globals.iter().any(|g| g == symbol)
    }

    fn query_selector(&self, selector: &str) -> bool {
        self.selectors.iter().any(|s| s == selector)
    }
}
