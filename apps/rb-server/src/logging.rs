//! Structured logging on stderr; stdout carries command output only.

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Directives in effect: `RUST_LOG` when set, the configured level otherwise.
fn env_filter(cfg: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.level))
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(cfg: &LoggingConfig) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(cfg))
        .with_writer(std::io::stderr)
        .with_target(true);

    let installed = match cfg.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if installed.is_err() {
        tracing::debug!("global subscriber already installed");
    }
}
