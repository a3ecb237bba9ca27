use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogFormat, LoggingConfig};

/// Installs the global subscriber.
///
/// Precedence: `-v` flags, then `RUST_LOG`, then the configured filter.
///
/// # Errors
/// Fails on malformed filter directives or a second initialization.
pub fn init(config: &LoggingConfig, verbose_flag: bool) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(from_env) if !verbose_flag => from_env,
        _ => EnvFilter::try_new(&config.filter)
            .with_context(|| format!("invalid log filter '{}'", config.filter))?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().flatten_event(true).with_current_span(false))
            .try_init(),
        LogFormat::Text => registry.with(fmt::layer()).try_init(),
    }
    .context("logging already initialized")
}
