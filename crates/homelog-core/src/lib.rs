pub mod config;
pub mod error;
pub mod units;

pub use config::{
    Config, HttpConfig, LoggingConfig, NestConfig, Units, ValidationResult, WeatherConfig,
};
pub use error::{
    ConfigError, DatabaseError, NetworkError, ReqwestErrorExt, RusqliteErrorExt,
};

use anyhow::Result;

/// Initialize tracing.
///
/// Diagnostics go to stderr so the reports printed on stdout stay clean.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("homelog core initialized");
    Ok(())
}
