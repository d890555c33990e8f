//! Logging initialization.
//!
//! Human-readable `tracing` output on stderr so stdout stays free for
//! results. `RUST_LOG` takes precedence over the configured level.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const DEFAULT_LEVEL: &str = "warn";

/// Filter from `RUST_LOG`, else `default_level`, else `DEFAULT_LEVEL`.
pub fn env_filter(default_level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(default_level.unwrap_or(DEFAULT_LEVEL))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
    })
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init_logging(default_level: Option<&str>) {
    let _ = tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}
