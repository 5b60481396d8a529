//! Weather report for homelog.
//!
//! Fetches the One Call document and projects it into the current
//! conditions, hourly table and daily list printed by `homelog weather`.

pub mod classify;
pub mod client;
pub mod error;
pub mod report;
pub mod types;

pub use classify::{classify_direction, classify_moon_phase, classify_visibility};
pub use client::{write_raw, WeatherClient};
pub use error::WeatherError;
pub use report::{map_current, map_daily, map_hourly, nice_time, WeatherReport};
pub use types::{CurrentConditions, DailyForecastEntry, HourlyForecastEntry, OneCallResponse};
