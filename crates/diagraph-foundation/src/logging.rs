//! Tracing setup for host applications that embed diagraph directly (the
//! host usually owns its own subscriber; this is a convenience for the
//! examples and for `diagraph-engine`'s own test harness).

#[cfg(feature = "logging-init")]
use tracing_subscriber::EnvFilter;

/// Install a `tracing_subscriber::fmt` subscriber honoring `RUST_LOG`,
/// falling back to `info` for diagraph crates. Idempotent: repeated calls
/// after the first are no-ops (tracing only allows one global subscriber).
#[cfg(feature = "logging-init")]
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(not(feature = "logging-init"))]
pub fn init_tracing() {
    // The `logging-init` feature pulls in tracing-subscriber; without it,
    // host applications are expected to install their own subscriber.
}
