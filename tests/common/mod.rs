//! Shared test helpers.

/// Install a tracing subscriber once per test binary so `RUST_LOG=debug`
/// surfaces engine logs when a test fails.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
