use serde::{Deserialize, Serialize};

/// One Call 3.0 response (the fields the report uses)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneCallResponse {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub timezone: Option<String>,
    pub current: Current,
    #[serde(default)]
    pub hourly: Vec<Hourly>,
    #[serde(default)]
    pub daily: Vec<Daily>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherDesc {
    #[serde(default)]
    pub main: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Current {
    pub dt: i64,
    #[serde(default)]
    pub sunrise: Option<i64>,
    #[serde(default)]
    pub sunset: Option<i64>,
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub dew_point: f64,
    #[serde(default)]
    pub uvi: f64,
    #[serde(default)]
    pub clouds: f64,
    /// Metres
    #[serde(default)]
    pub visibility: Option<f64>,
    pub wind_speed: f64,
    pub wind_deg: f64,
    #[serde(default)]
    pub weather: Vec<WeatherDesc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hourly {
    pub dt: i64,
    pub temp: f64,
    pub humidity: f64,
    pub dew_point: f64,
    pub wind_speed: f64,
    pub wind_deg: f64,
    /// Probability of precipitation, 0..1
    #[serde(default)]
    pub pop: f64,
    #[serde(default)]
    pub weather: Vec<WeatherDesc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyTemp {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Daily {
    pub dt: i64,
    pub sunrise: i64,
    pub sunset: i64,
    /// 0 when the moon does not rise that day
    #[serde(default)]
    pub moonrise: i64,
    #[serde(default)]
    pub moonset: i64,
    pub moon_phase: f64,
    #[serde(default)]
    pub summary: String,
    pub temp: DailyTemp,
    pub humidity: f64,
    pub dew_point: f64,
    #[serde(default)]
    pub pop: f64,
}

/// Current conditions, rounded and labelled for printing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub dt: i64,
    /// e.g. "Tuesday May 2 at 3:04 PM"
    pub observed_at: String,
    pub weather_desc: String,
    pub cloud_cover: i64,
    pub visibility: String,
    pub temperature: i64,
    pub feels_like: i64,
    pub humidity: i64,
    pub dew_point: i64,
    pub wind_speed: i64,
    pub wind_direction: String,
    pub uv_index: f64,
    pub sunrise: String,
    pub sunset: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyForecastEntry {
    pub dt: i64,
    /// Short weekday, e.g. "Tue"
    pub weekday: String,
    /// e.g. " 3 pm"
    pub hour: String,
    pub temperature: i64,
    pub humidity: i64,
    pub dew_point: i64,
    pub wind_speed: i64,
    pub wind_direction: String,
    pub pop_pct: i64,
    pub weather: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyForecastEntry {
    pub dt: i64,
    /// "TODAY" for the first day, else the upper-case weekday
    pub label: String,
    pub summary: String,
    pub high: i64,
    pub low: i64,
    pub humidity: i64,
    pub dew_point: i64,
    pub pop_pct: i64,
    pub sunrise: String,
    pub sunset: String,
    pub moonrise: String,
    pub moonset: String,
    pub moon_phase: String,
}
