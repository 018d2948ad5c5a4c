//! webprobe - Runtime diagnostic harness for opaque web frontends
//!
//! Verifies from a live session that a specific application action (such as
//! sending a challenge request) actually reaches the network layer and
//! completes without silent failure. The harness probes the environment,
//! scans storage for auth artifacts, and installs transparent monitors on
//! the host's request and error-log primitives, assembling everything into
//! one [`report::DiagnosticReport`].

pub mod common;
pub mod harness;
pub mod host;
pub mod inspect;
pub mod monitor;
pub mod probe;
pub mod report;

// Re-export the surface most embeddings need
pub use common::{Error, Result};
pub use harness::{DiagnosticConfig, DiagnosticHarness, HarnessState};
pub use report::{DiagnosticReport, ErrorEvent, NetworkEvent, StorageFinding, StoreKind};
