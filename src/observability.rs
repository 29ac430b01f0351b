//! Observability utilities.

use std::sync::OnceLock;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::types::{ObservabilityConfig, ENV_LOG_FORMAT};

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Initialize tracing subscriber once for the process.
///
/// Log format defaults to plain text and can be switched to JSON via
/// `LISTENER_LOG_FORMAT=json`. Filter defaults to `info` if `RUST_LOG` is unset.
pub fn init_tracing() {
    let json = std::env::var(ENV_LOG_FORMAT)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    install(EnvFilter::try_from_default_env().ok(), "info", json);
}

/// Initialize tracing from an [`ObservabilityConfig`].
///
/// `RUST_LOG` still wins over the configured level when set.
pub fn init_tracing_with(config: &ObservabilityConfig) {
    install(
        EnvFilter::try_from_default_env().ok(),
        &config.log_level,
        config.json_logs,
    );
}

fn install(env_filter: Option<EnvFilter>, fallback_level: &str, json: bool) {
    TRACING_INIT.get_or_init(|| {
        let env_filter = env_filter.unwrap_or_else(|| EnvFilter::new(fallback_level));

        let result = if json {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().compact())
                .try_init()
        };

        if let Err(err) = result {
            eprintln!("tracing init skipped: {err}");
        }
    });
}
