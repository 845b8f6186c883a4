// src/logging.rs
// Diagnostic logging via tracing. Human-facing output goes through
// Console instead; these events are for debugging a run.

use tracing_subscriber::EnvFilter;

/// Used when neither --log-level nor RUST_LOG says otherwise
const DEFAULT_FILTER: &str = "warn";

/// Installs the global subscriber, writing to stderr
///
/// `level` takes an EnvFilter directive ("debug", "listing_guardian=trace").
/// An unparsable directive falls back to the default rather than failing.
pub fn setup_logging(level: Option<&str>) {
    let filter = match level {
        Some(directive) => EnvFilter::try_new(directive).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    }
    .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER));

    // Keep an already-installed subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
