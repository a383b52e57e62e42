//! Logging initialization
//!
//! The gateway logs through `tracing`; the host process decides when and
//! how the subscriber is installed. This helper covers the common case of
//! an env-filtered fmt subscriber.

use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber filtered by `RUST_LOG`
/// (default `info`). Safe to call once per process; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
