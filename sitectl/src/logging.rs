//! Diagnostic tracing for `sitectl`.
//!
//! External tools write straight to the inherited stdout/stderr; this only
//! covers what `sitectl` itself reports about sequencing.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Step announcements from `sitectl`, warnings from its dependencies.
pub const DEFAULT_FILTER: &str = "warn,sitectl=info";

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`, falling back to [`DEFAULT_FILTER`].
/// Output: stderr, compact format, no timestamps.
///
/// # Example
/// ```bash
/// RUST_LOG=sitectl=debug sitectl build --release
/// ```
pub fn init() {
    tracing_subscriber::registry()
        .with(filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .with_target(false)
                .compact(),
        )
        .init();
}

/// Filter for a `RUST_LOG` value; unset, blank or unparsable means the default.
fn filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}
