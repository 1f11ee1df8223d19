//! Tracing subscriber setup for applications embedding MEmu Kit.
//!
//! `RUST_LOG` takes precedence over the configured level.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::MemucConfig;

/// Build the filter used by [`init`]
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install a global fmt subscriber writing to stderr.
///
/// Returns `false` when a global subscriber was already set.
pub fn init(default_level: &str) -> bool {
    tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(
            fmt::layer()
                .with_target(false)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .is_ok()
}

/// Install the subscriber using the level stored in the configuration
pub fn init_from_config(config: &MemucConfig) -> bool {
    init(&config.log_level)
}
