//! Common utilities shared across the harness

use std::sync::{Mutex, MutexGuard};

pub mod error;
pub mod logging;

pub use error::{Error, Result};

/// Lock a mutex, recovering the inner value if a panicking caller poisoned
/// it. Harness state and report data stay usable after such a panic.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Truncate a string to at most `max` characters for event excerpts.
///
/// Appends an ellipsis marker when truncation happened so rendered reports
/// make the cut visible.
pub fn excerpt(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_short_string_untouched() {
        assert_eq!(excerpt("hello", 10), "hello");
    }

    #[test]
    fn excerpt_truncates_and_marks() {
        assert_eq!(excerpt("hello world", 5), "hello…");
    }

    #[test]
    fn excerpt_counts_chars_not_bytes() {
        // Multi-byte characters must not be split mid-codepoint
        assert_eq!(excerpt("thách đấu", 20), "thách đấu");
        assert_eq!(excerpt("thách đấu", 5), "thách…");
    }
}
