//! Logging bootstrap for the process.
//!
//! Installs the global `tracing` subscriber: an [`EnvFilter`] (the `RUST_LOG`
//! environment variable overrides the configured level) and either a JSON or
//! a human-readable format layer. Called once at startup; everything else in
//! the crate only emits events.

use anyhow::Context as _;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Configuration for the logging subsystem.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default level directive when `RUST_LOG` is not set (e.g. `"info"`).
    pub level: String,
    /// Emit JSON records instead of the human-readable format.
    pub json: bool,
    /// ANSI colors in the human-readable format.
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            ansi: true,
        }
    }
}

/// Installs the global subscriber from the given configuration.
///
/// # Errors
///
/// Returns an error if the level directive cannot be parsed or if a global
/// subscriber is already installed.
pub fn init(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = build_env_filter(&config.level)?;
    let registry = tracing_subscriber::registry().with(filter);

    if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_ansi(config.ansi))
            .try_init()?;
    }

    Ok(())
}

/// Builds the event filter: `RUST_LOG` when present, the configured level
/// directive otherwise.
fn build_env_filter(level: &str) -> anyhow::Result<EnvFilter> {
    if std::env::var(EnvFilter::DEFAULT_ENV).is_ok() {
        EnvFilter::try_from_default_env().context("invalid RUST_LOG filter")
    } else {
        EnvFilter::try_new(level).with_context(|| format!("invalid log level {level:?}"))
    }
}
