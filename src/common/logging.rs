//! Logging and tracing configuration
//!
//! The live event stream (one line per observed network/error event) is
//! emitted through `tracing`; this module wires up a subscriber for
//! embeddings that do not bring their own.

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Initialize tracing for an embedding (stdout logging)
///
/// Logs are controlled by the `RUST_LOG` environment variable.
/// Default level is INFO for this crate, WARN for dependencies.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("webprobe=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// Initialize tracing for tests
///
/// Safe to call from multiple tests; later calls are no-ops.
pub fn init_test() {
    let filter = EnvFilter::new("webprobe=trace");

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_test_writer().compact())
        .try_init();
}
