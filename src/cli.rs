//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use homelog_core::Units;

#[derive(Debug, Parser)]
#[command(name = "homelog")]
#[command(author, version, about = "Log Nest thermostat readings and print weather reports", long_about = None)]
pub struct Cli {
    /// Path to config.toml (default: the user config directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Authorize access to the Device Access project
    Auth {
        /// Print the consent URL instead of opening a browser
        #[arg(long)]
        no_browser: bool,
    },

    /// Print each thermostat's current readings
    Nest,

    /// List the homes in the Device Access project
    Structures,

    /// Poll every thermostat and append readings to the log
    Log {
        /// Seconds between polls (overrides logging.poll_interval_secs)
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,

        /// Poll once and exit
        #[arg(long)]
        once: bool,
    },

    /// Show the most recently logged readings
    History {
        /// Number of readings to show
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },

    /// Print current conditions and the forecast
    Weather(WeatherArgs),
}

#[derive(Debug, Clone, Args)]
pub struct WeatherArgs {
    /// Latitude (overrides LATITUDE)
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude (overrides LONGITUDE)
    #[arg(long, allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// standard, metric or imperial
    #[arg(short, long)]
    pub units: Option<Units>,

    /// Also write the raw API response to this file
    #[arg(long)]
    pub dump: Option<PathBuf>,
}
