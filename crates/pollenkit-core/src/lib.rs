pub mod config;
pub mod error;

pub use config::{Config, LoggingConfig, RetrySettings, SourcesConfig, ValidationResult};
pub use error::{AppError, ConfigError, NetworkError, ReqwestErrorExt};

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Initialize logging from `RUST_LOG`, falling back to `info`.
pub fn init() -> Result<()> {
    init_with_level("info")
}

/// Initialize logging from `RUST_LOG`, falling back to the given level.
///
/// Installing a second subscriber is a no-op, so hosts and tests may call this
/// more than once.
pub fn init_with_level(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if tracing_subscriber::fmt().with_env_filter(filter).try_init().is_err() {
        tracing::debug!("Tracing subscriber already installed");
        return Ok(());
    }

    tracing::info!("pollenkit core initialized");
    Ok(())
}

/// Initialize logging using the `logging.level` setting of a loaded config.
pub fn init_from_config(config: &Config) -> Result<()> {
    init_with_level(&config.logging.level)
}
