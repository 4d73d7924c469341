//! Firepower combat engine library.
//!
//! Exposes the unit model, support allocation, combat resolution, JSON
//! scenarios and Monte Carlo simulation for the binaries and integration
//! tests.

pub mod combat;
pub mod scenario;
pub mod simulate;
pub mod support;
pub mod unit;

/// Installs the stderr log subscriber used by the binaries. `RUST_LOG`
/// overrides the default `warn` level.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
