mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use homelog_auth::AuthError;
use homelog_core::{Config, ConfigError};
use homelog_nest::NestError;
use homelog_weather::WeatherError;

use crate::cli::{Cli, Command};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    homelog_core::init()?;
    let cli = Cli::parse();

    let result = run(cli).await;
    if let Err(e) = &result {
        if let Some(hint) = user_hint(e) {
            eprintln!("{}", hint);
        }
    }
    result
}

async fn run(cli: Cli) -> Result<()> {
    let (config, _) = Config::load_validated(cli.config.as_deref())?;
    tracing::debug!("Configuration loaded");

    match cli.command {
        Command::Auth { no_browser } => commands::cmd_auth(&config, no_browser).await,
        Command::Nest => commands::cmd_nest(&config).await,
        Command::Structures => commands::cmd_structures(&config).await,
        Command::Log { interval, once } => commands::cmd_log(&config, interval, once).await,
        Command::History { limit } => commands::cmd_history(&config, limit),
        Command::Weather(args) => commands::cmd_weather(&config, args).await,
    }
}

/// Friendly one-liner for the typed error at the root of `err`, if any.
fn user_hint(err: &anyhow::Error) -> Option<String> {
    err.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<NestError>() {
            Some(e.user_message())
        } else if let Some(e) = cause.downcast_ref::<AuthError>() {
            Some(e.user_message().to_string())
        } else if let Some(e) = cause.downcast_ref::<WeatherError>() {
            Some(e.user_message().to_string())
        } else {
            cause
                .downcast_ref::<ConfigError>()
                .map(|e| e.user_message().to_string())
        }
    })
}
