use anyhow::{Context, Result};
use chrono::Local;
use homelog_core::Config;
use homelog_weather::{write_raw, OneCallResponse, WeatherClient, WeatherReport};

use crate::cli::WeatherArgs;

pub async fn cmd_weather(config: &Config, args: WeatherArgs) -> Result<()> {
    let weather = &config.weather;
    let api_key = weather.require_api_key()?;
    let (lat, lon) = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => (lat, lon),
        (lat, lon) => {
            let (config_lat, config_lon) = weather.require_location()?;
            (lat.unwrap_or(config_lat), lon.unwrap_or(config_lon))
        }
    };
    let units = args.units.unwrap_or(weather.units);

    let client = WeatherClient::new(weather, &config.http)?;
    let response: OneCallResponse = match &args.dump {
        Some(path) => {
            let raw = client.fetch_raw(lat, lon, units, api_key).await?;
            write_raw(&raw, path)?;
            serde_json::from_value(raw).context("Unexpected One Call response")?
        }
        None => client.fetch(lat, lon, units, api_key).await?,
    };

    print!("{}", WeatherReport::from_response(&response, units, &Local));
    Ok(())
}
