//! Projection of the One Call document into the printed report.

use std::fmt;

use chrono::{DateTime, TimeZone};
use homelog_core::units::round_to_i64;
use homelog_core::Units;

use crate::classify::{classify_direction, classify_moon_phase, classify_visibility};
use crate::types::{
    CurrentConditions, DailyForecastEntry, HourlyForecastEntry, OneCallResponse, WeatherDesc,
};

const FEET_PER_METRE: f64 = 3.28084;

/// Printed in place of a time the API reports as 0 or leaves out.
const NO_TIME: &str = "--";

fn local<Tz: TimeZone>(unix: i64, tz: &Tz) -> Option<DateTime<Tz>> {
    DateTime::from_timestamp(unix, 0).map(|t| t.with_timezone(tz))
}

fn format_local<Tz>(unix: i64, tz: &Tz, fmt: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    local(unix, tz).map_or_else(|| unix.to_string(), |t| t.format(fmt).to_string())
}

/// Clock time such as `"6:05 AM"`.
pub fn nice_time<Tz>(unix: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    format_local(unix, tz, "%_I:%M %p").trim().to_string()
}

fn optional_time<Tz>(unix: Option<i64>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    match unix {
        Some(t) if t != 0 => nice_time(t, tz),
        _ => NO_TIME.to_string(),
    }
}

fn description(weather: &[WeatherDesc]) -> String {
    weather
        .first()
        .map(|w| w.description.clone())
        .unwrap_or_default()
}

// The API reports probability of precipitation as 0..1; shown as a percentage
fn percent(fraction: f64) -> i64 {
    round_to_i64(fraction * 100.0)
}

pub fn map_current<Tz>(response: &OneCallResponse, tz: &Tz) -> CurrentConditions
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let current = &response.current;
    // The API reports metres; the visibility buckets are in feet.
    // Missing visibility falls through every bucket
    let visibility_ft = current.visibility.map_or(f64::NAN, |m| m * FEET_PER_METRE);

    CurrentConditions {
        dt: current.dt,
        observed_at: format_local(current.dt, tz, "%A %B %-d at %-I:%M %p"),
        weather_desc: description(&current.weather),
        cloud_cover: round_to_i64(current.clouds),
        visibility: classify_visibility(visibility_ft),
        temperature: round_to_i64(current.temp),
        feels_like: round_to_i64(current.feels_like),
        humidity: round_to_i64(current.humidity),
        dew_point: round_to_i64(current.dew_point),
        wind_speed: round_to_i64(current.wind_speed),
        wind_direction: classify_direction(current.wind_deg, false).to_string(),
        uv_index: current.uvi,
        sunrise: optional_time(current.sunrise, tz),
        sunset: optional_time(current.sunset, tz),
    }
}

pub fn map_hourly<Tz>(response: &OneCallResponse, tz: &Tz) -> Vec<HourlyForecastEntry>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    response
        .hourly
        .iter()
        .map(|hour| HourlyForecastEntry {
            dt: hour.dt,
            weekday: format_local(hour.dt, tz, "%a"),
            hour: format_local(hour.dt, tz, "%_I %p").to_lowercase(),
            temperature: round_to_i64(hour.temp),
            humidity: round_to_i64(hour.humidity),
            dew_point: round_to_i64(hour.dew_point),
            wind_speed: round_to_i64(hour.wind_speed),
            wind_direction: classify_direction(hour.wind_deg, false).to_string(),
            pop_pct: percent(hour.pop),
            weather: description(&hour.weather),
        })
        .collect()
}

pub fn map_daily<Tz>(response: &OneCallResponse, tz: &Tz) -> Vec<DailyForecastEntry>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    response
        .daily
        .iter()
        .enumerate()
        .map(|(i, day)| DailyForecastEntry {
            dt: day.dt,
            label: if i == 0 {
                "TODAY".to_string()
            } else {
                format_local(day.dt, tz, "%A").to_uppercase()
            },
            summary: day.summary.clone(),
            high: round_to_i64(day.temp.max),
            low: round_to_i64(day.temp.min),
            humidity: round_to_i64(day.humidity),
            dew_point: round_to_i64(day.dew_point),
            pop_pct: percent(day.pop),
            sunrise: optional_time(Some(day.sunrise), tz),
            sunset: optional_time(Some(day.sunset), tz),
            moonrise: optional_time(Some(day.moonrise), tz),
            moonset: optional_time(Some(day.moonset), tz),
            moon_phase: classify_moon_phase(day.moon_phase).to_string(),
        })
        .collect()
}

/// The full printed report.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub units: Units,
    pub current: CurrentConditions,
    pub hourly: Vec<HourlyForecastEntry>,
    pub daily: Vec<DailyForecastEntry>,
}

impl WeatherReport {
    pub fn from_response<Tz>(response: &OneCallResponse, units: Units, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        Self {
            units,
            current: map_current(response, tz),
            hourly: map_hourly(response, tz),
            daily: map_daily(response, tz),
        }
    }
}

impl fmt::Display for WeatherReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let deg = self.units.temperature_label();
        let speed = self.units.speed_label();
        let c = &self.current;

        writeln!(f, "\n\n{}\n", c.observed_at)?;
        writeln!(
            f,
            "Currently:   {} with {}% cloud cover and {} visibility",
            c.weather_desc, c.cloud_cover, c.visibility
        )?;
        writeln!(f, "Temperature: {} {}", c.temperature, deg)?;
        writeln!(f, "Feels like:  {} {}", c.feels_like, deg)?;
        writeln!(f, "Humidity:    {}%", c.humidity)?;
        writeln!(f, "Dew point:   {}{}", c.dew_point, deg)?;
        writeln!(f, "Wind:        {} @ {} {}", c.wind_direction, c.wind_speed, speed)?;
        writeln!(f, "UV index:    {}", c.uv_index)?;
        writeln!(f, "Sunrise:     {}", c.sunrise)?;
        writeln!(f, "Sunset:      {}", c.sunset)?;

        writeln!(f, "\nFORECAST")?;
        writeln!(f, "\n            TEMP\tRH    DEW\tWIND\tDIR\tPOP\tWEATHER")?;
        for h in &self.hourly {
            writeln!(
                f,
                "{}  {}  {}{}\t{}%   {}{}\t{} {}\t{}\t{}%\t{}",
                h.weekday,
                h.hour,
                h.temperature,
                deg,
                h.humidity,
                h.dew_point,
                deg,
                h.wind_speed,
                speed,
                h.wind_direction,
                h.pop_pct,
                h.weather
            )?;
        }

        for d in &self.daily {
            writeln!(f, "\n{}", d.label)?;
            if !d.summary.is_empty() {
                writeln!(f, "{}", d.summary)?;
            }
            writeln!(
                f,
                "High {}{} Low {}{} RH {}% Dew Point {}{} POP {}%",
                d.high, deg, d.low, deg, d.humidity, d.dew_point, deg, d.pop_pct
            )?;
            writeln!(
                f,
                "Sun: {} {} Moon: {} {} {}",
                d.sunrise, d.sunset, d.moonrise, d.moonset, d.moon_phase
            )?;
        }
        Ok(())
    }
}
