//! Error types for the diagnostic harness
//!
//! Component-level failures degrade to safe defaults inside each component;
//! only the snapshot phase of `run_diagnostics` surfaces an `Error` to the
//! caller. Error messages include hints on how to recover.

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the diagnostic harness
#[derive(Error, Debug)]
pub enum Error {
    // === Host Errors ===
    #[error("Host primitive '{0}' is unavailable. Provide it on the HostEnvironment before issuing calls")]
    HostUnavailable(&'static str),

    #[error("Transport error: {0}")]
    Transport(String),

    // === Hook Errors ===
    #[error("Hook '{hook}' uninstalled out of order. Uninstall later-installed hooks first (last-installed, first-uninstalled)")]
    HookOrder { hook: String },

    #[error("Hook '{hook}' is already uninstalled")]
    HookGone { hook: String },

    // === Harness Errors ===
    #[error("Cannot {action} while harness is {state}")]
    InvalidState { action: String, state: String },

    #[error("Snapshot phase failed: {0}")]
    Snapshot(String),

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a hook-order error for a named hook
    pub fn hook_order(hook: &str) -> Self {
        Self::HookOrder {
            hook: hook.to_string(),
        }
    }

    /// Create an invalid state error
    pub fn invalid_state(action: &str, state: &str) -> Self {
        Self::InvalidState {
            action: action.to_string(),
            state: state.to_string(),
        }
    }
}
