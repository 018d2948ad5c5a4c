//! Error-log monitor
//!
//! Wraps the ambient error-logging primitive. Every entry is forwarded to
//! the previous sink so original logging behavior is preserved; entries
//! whose stringified arguments contain one of the configured keywords
//! (case-sensitive) additionally record an [`ErrorEvent`].

use std::sync::Arc;
use std::time::SystemTime;

use serde_json::Value;

use crate::common::excerpt;
use crate::host::LogSink;
use crate::report::ErrorEvent;

use super::hook::{Ambient, HookHandle};

/// Callback invoked synchronously for each matched entry
pub type OnErrorEvent = Arc<dyn Fn(ErrorEvent) + Send + Sync>;

/// Longest message excerpt carried on an event
const MESSAGE_EXCERPT_MAX: usize = 200;

/// Install an error monitor on `ambient`.
///
/// The returned handle restores the previous sink on uninstall.
pub fn install(
    ambient: &Ambient<dyn LogSink>,
    keywords: &[String],
    on_match: OnErrorEvent,
) -> HookHandle<dyn LogSink> {
    let keywords = keywords.to_vec();
    ambient.install("error-monitor", move |inner| {
        Arc::new(MonitorSink {
            inner,
            keywords,
            on_match,
        }) as Arc<dyn LogSink>
    })
}

struct MonitorSink {
    inner: Arc<dyn LogSink>,
    keywords: Vec<String>,
    on_match: OnErrorEvent,
}

impl MonitorSink {
    fn matches(&self, args: &[Value]) -> bool {
        args.iter().any(|arg| {
            let text = stringify(arg);
            self.keywords.iter().any(|kw| text.contains(kw.as_str()))
        })
    }

    fn record(&self, args: &[Value]) {
        let message = args
            .iter()
            .map(|a| stringify(a))
            .collect::<Vec<_>>()
            .join(" ");

        let event = ErrorEvent {
            message_excerpt: excerpt(&message, MESSAGE_EXCERPT_MAX),
            observed_at: SystemTime::now(),
        };

        tracing::info!("error event: {}", event.message_excerpt);
        (self.on_match)(event);
    }
}

impl LogSink for MonitorSink {
    fn error(&self, args: &[Value]) {
        if self.matches(args) {
            self.record(args);
        }
        // Never suppress the original logging behavior
        self.inner.error(args);
    }
}

/// Stringify a log argument the way a console would: bare strings stay
/// unquoted, everything else renders as compact JSON.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::RecordingSink;
    use serde_json::json;
    use std::sync::Mutex;

    fn collector() -> (OnErrorEvent, Arc<Mutex<Vec<ErrorEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let on_match: OnErrorEvent = Arc::new(move |ev| {
            sink.lock().unwrap().push(ev);
        });
        (on_match, events)
    }

    fn keywords(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn matching_entry_recorded_and_forwarded() {
        let base = Arc::new(RecordingSink::new());
        let ambient: Ambient<dyn LogSink> = Ambient::new(base.clone());
        let (on_match, events) = collector();
        let _hook = install(&ambient, &keywords(&["challenge"]), on_match);

        ambient
            .current()
            .error(&[json!("Failed to create challenge: row violates RLS policy")]);

        // Forwarded to the original sink regardless of the match
        assert_eq!(base.len(), 1);
        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert!(events[0].message_excerpt.contains("challenge"));
    }

    #[test]
    fn unmatched_entry_only_forwarded() {
        let base = Arc::new(RecordingSink::new());
        let ambient: Ambient<dyn LogSink> = Ambient::new(base.clone());
        let (on_match, events) = collector();
        let _hook = install(&ambient, &keywords(&["challenge"]), on_match);

        ambient.current().error(&[json!("layout overflow in column")]);

        assert_eq!(base.len(), 1);
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn keyword_match_is_case_sensitive() {
        let base = Arc::new(RecordingSink::new());
        let ambient: Ambient<dyn LogSink> = Ambient::new(base);
        let (on_match, events) = collector();
        let _hook = install(&ambient, &keywords(&["SimpleChallengeService"]), on_match);

        ambient
            .current()
            .error(&[json!("simplechallengeservice threw")]);
        assert!(events.lock().unwrap().is_empty());

        ambient
            .current()
            .error(&[json!("SimpleChallengeService threw")]);
        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[test]
    fn non_string_arguments_are_stringified() {
        let base = Arc::new(RecordingSink::new());
        let ambient: Ambient<dyn LogSink> = Ambient::new(base);
        let (on_match, events) = collector();
        let _hook = install(&ambient, &keywords(&["challenge"]), on_match);

        ambient
            .current()
            .error(&[json!({"op": "insert", "table": "challenges", "code": 42501})]);

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert!(events[0].message_excerpt.contains("challenges"));
    }

    #[test]
    fn uninstall_restores_prior_sink() {
        let base = Arc::new(RecordingSink::new());
        let ambient: Ambient<dyn LogSink> = Ambient::new(base.clone());
        let (on_match, events) = collector();
        let mut hook = install(&ambient, &keywords(&["challenge"]), on_match);
        hook.uninstall().unwrap();

        ambient.current().error(&[json!("challenge failed")]);

        assert_eq!(base.len(), 1);
        assert!(events.lock().unwrap().is_empty());
    }
}
