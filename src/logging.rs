// Logging setup
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Project-specific filter variable, checked before `RUST_LOG`.
pub const LOG_ENV: &str = "WALKUP_LOG";

/// Install the global subscriber, writing to stderr.
///
/// `default_filter` applies when neither `WALKUP_LOG` nor `RUST_LOG` holds a usable filter.
/// A second call leaves the first subscriber in place.
pub fn init(default_filter: &str) {
    let filter = build_env_filter(
        std::env::var(LOG_ENV).ok(),
        std::env::var("RUST_LOG").ok(),
        default_filter,
    );

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

fn build_env_filter(
    project: Option<String>,
    rust_log: Option<String>,
    default_filter: &str,
) -> EnvFilter {
    // Unparseable values fall through to the next source.
    for directives in [project, rust_log].into_iter().flatten() {
        if let Ok(filter) = EnvFilter::try_new(&directives) {
            return filter;
        }
    }
    EnvFilter::try_new(default_filter).unwrap_or_else(|_| EnvFilter::new("info"))
}
