//! Storage inspector
//!
//! Scans the host's persistent key-value stores (local, session) and the
//! cookie string for keys matching authentication-related substrings.
//! Read-only: the scan never mutates a store, and an unavailable store
//! contributes nothing instead of failing.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::host::{CookieSource, KeyValueStore};
use crate::report::{StorageFinding, StoreKind};

/// Scans host stores for keys of interest.
pub struct StorageInspector {
    local: Option<Arc<dyn KeyValueStore>>,
    session: Option<Arc<dyn KeyValueStore>>,
    cookies: Option<Arc<dyn CookieSource>>,
}

impl StorageInspector {
    pub fn new(
        local: Option<Arc<dyn KeyValueStore>>,
        session: Option<Arc<dyn KeyValueStore>>,
        cookies: Option<Arc<dyn CookieSource>>,
    ) -> Self {
        Self {
            local,
            session,
            cookies,
        }
    }

    /// Keys across all available stores matching any keyword
    /// (case-insensitive substring). An empty keyword set matches nothing.
    pub fn scan(&self, keywords: &[String]) -> BTreeSet<StorageFinding> {
        if keywords.is_empty() {
            return BTreeSet::new();
        }
        let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

        let mut findings = BTreeSet::new();

        for (store, kind) in [
            (self.local.as_ref(), StoreKind::Local),
            (self.session.as_ref(), StoreKind::Session),
        ] {
            if let Some(store) = store {
                for key in store.keys() {
                    if key_matches(&key, &keywords) {
                        findings.insert(StorageFinding::new(kind, &key));
                    }
                }
            }
        }

        if let Some(cookies) = &self.cookies {
            for name in cookie_names(&cookies.cookie_string()) {
                if key_matches(&name, &keywords) {
                    findings.insert(StorageFinding::new(StoreKind::Cookie, &name));
                }
            }
        }

        findings
    }
}

fn key_matches(key: &str, lowercase_keywords: &[String]) -> bool {
    let key = key.to_lowercase();
    lowercase_keywords.iter().any(|kw| key.contains(kw.as_str()))
}

/// Parse cookie names out of a semicolon-delimited cookie string.
///
/// Each pair is `name=value`; a fragment without `=` is treated as a bare
/// name, matching how browsers render such cookies.
fn cookie_names(cookie_string: &str) -> Vec<String> {
    cookie_string
        .split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((name, _)) => name.trim().to_string(),
            None => pair.to_string(),
        })
        .collect()
}
