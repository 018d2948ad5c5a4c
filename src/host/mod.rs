//! Host environment abstraction
//!
//! The harness observes a host frontend through a small set of primitives:
//! a request-issuing transport, an error-logging sink, two key-value stores,
//! a cookie string, and a page surface for capability probes. Each is a
//! trait seam so the harness can be exercised against in-memory fakes.
//!
//! Store-like collaborators are optional on [`HostEnvironment`]; a missing
//! one degrades the consuming component to an empty result rather than
//! failing the run.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::Result;

/// An outgoing request as seen by the transport primitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Target URL
    pub url: String,
    /// HTTP method (e.g. "POST")
    pub method: String,
    /// Request body, if any
    pub body: Option<Body>,
}

/// Request body payload.
///
/// Bodies are not always literal text (form data, blobs); monitors must
/// fall back to URL-only matching for binary payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Body {
    Text(String),
    Binary(Vec<u8>),
}

impl Request {
    /// Convenience constructor for a body-less request
    pub fn new(method: &str, url: &str) -> Self {
        Self {
            url: url.to_string(),
            method: method.to_string(),
            body: None,
        }
    }

    /// Attach a text body
    pub fn with_text_body(mut self, body: &str) -> Self {
        self.body = Some(Body::Text(body.to_string()));
        self
    }

    /// Attach a binary body
    pub fn with_binary_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(Body::Binary(body));
        self
    }
}

/// Response returned by the transport primitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Response body, if any
    pub body: Option<String>,
}

impl Response {
    /// A 200 response with a body
    pub fn ok(body: &str) -> Self {
        Self {
            status: 200,
            body: Some(body.to_string()),
        }
    }
}

/// The ambient request-issuing primitive.
///
/// Dispatch is asynchronous in the host; harness wrappers around this trait
/// observe synchronously at call time before awaiting the inner send.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a request and return the host's response
    async fn send(&self, request: Request) -> Result<Response>;
}

/// The ambient error-logging primitive.
///
/// Arguments are opaque host values; `serde_json::Value` carries whatever
/// the host logged without committing to a shape.
pub trait LogSink: Send + Sync {
    /// Log an error entry consisting of zero or more arguments
    fn error(&self, args: &[Value]);
}

/// An enumerable persistent key-value store (local or session scoped).
pub trait KeyValueStore: Send + Sync {
    /// All keys currently present in the store
    fn keys(&self) -> Vec<String>;
    /// Look up a value by key
    fn get(&self, key: &str) -> Option<String>;
}

/// Provider of the raw cookie string (semicolon-delimited name=value pairs).
pub trait CookieSource: Send + Sync {
    /// The current cookie string, e.g. `"sb-access=x; theme=dark"`
    fn cookie_string(&self) -> String;
}

/// Page surface used for capability probes.
pub trait Page: Send + Sync {
    /// Whether a named global symbol is defined
    fn has_global(&self, symbol: &str) -> bool;
    /// Whether any element matches the given selector
    fn query_selector(&self, selector: &str) -> bool;
}

/// Bundle of host primitives the harness observes through.
///
/// `transport` and `log` are the hook targets and are always present;
/// the store-like collaborators are optional and degrade to empty.
#[derive(Clone)]
pub struct HostEnvironment {
    pub transport: Arc<dyn Transport>,
    pub log: Arc<dyn LogSink>,
    pub local: Option<Arc<dyn KeyValueStore>>,
    pub session: Option<Arc<dyn KeyValueStore>>,
    pub cookies: Option<Arc<dyn CookieSource>>,
    pub page: Option<Arc<dyn Page>>,
}

impl HostEnvironment {
    /// Create an environment from the two hookable primitives, with no
    /// stores or page attached
    pub fn new(transport: Arc<dyn Transport>, log: Arc<dyn LogSink>) -> Self {
        Self {
            transport,
            log,
            local: None,
            session: None,
            cookies: None,
            page: None,
        }
    }

    /// Attach the local (persistent) key-value store
    pub fn with_local(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.local = Some(store);
        self
    }

    /// Attach the session-scoped key-value store
    pub fn with_session(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.session = Some(store);
        self
    }

    /// Attach the cookie source
    pub fn with_cookies(mut self, cookies: Arc<dyn CookieSource>) -> Self {
        self.cookies = Some(cookies);
        self
    }

    /// Attach the page surface
    pub fn with_page(mut self, page: Arc<dyn Page>) -> Self {
        self.page = Some(page);
        self
    }
}
