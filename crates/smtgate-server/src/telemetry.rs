//! Tracing subscriber setup

use crate::config::{LogFormat, ServerConfig};
use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when neither `RUST_LOG` nor `log_level` parse
pub const DEFAULT_FILTER: &str = "smtgate_server=info,smtgate_core=info,tower_http=debug";

/// Filter directives for a configured log level
///
/// A bare level such as `debug` applies to this server's crates and the HTTP
/// trace layer; anything else is taken as a full directive string.
pub fn filter_directives(log_level: &str) -> String {
    let level = log_level.trim();
    match level.to_ascii_lowercase().as_str() {
        "" => DEFAULT_FILTER.to_string(),
        "trace" | "debug" | "info" | "warn" | "error" | "off" => format!(
            "smtgate_server={0},smtgate_core={0},tower_http=debug",
            level.to_ascii_lowercase()
        ),
        _ => level.to_string(),
    }
}

/// Initialize the global tracing subscriber
///
/// `RUST_LOG` wins over the configured `log_level`.
pub fn init_tracing(config: &ServerConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directives(&config.log_level)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(filter);
    let initialized = match config.log_format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
    };

    initialized.map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))
}
