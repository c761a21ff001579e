//! Telemetry initialization
//!
//! Installs the global tracing subscriber, filtered through `RUST_LOG`.
//! Embedders that bring their own subscriber simply never call this.

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

static INIT: OnceLock<()> = OnceLock::new();

/// Install the env-filter tracing subscriber.
///
/// Calling this more than once is a no-op.
pub fn init_tracing() {
    INIT.get_or_init(|| {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    });
}
