use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Environment variable holding the OpenWeather API key
pub const ENV_WEATHER_API_KEY: &str = "OPENWEATHER_API_KEY";
/// Environment variable holding the report latitude
pub const ENV_LATITUDE: &str = "LATITUDE";
/// Environment variable holding the report longitude
pub const ENV_LONGITUDE: &str = "LONGITUDE";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Thermostat (Smart Device Management) settings
    #[serde(default)]
    pub nest: NestConfig,

    /// Reading log settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Weather report settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NestConfig {
    /// JSON file holding the OAuth client and token state
    #[serde(default = "default_credential_file")]
    pub credential_file: PathBuf,

    /// Smart Device Management API base URL
    #[serde(default = "default_nest_api_url")]
    pub api_base_url: String,

    /// OAuth token endpoint
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Partner connections consent page base URL
    #[serde(default = "default_consent_base_url")]
    pub consent_base_url: String,
}

fn default_credential_file() -> PathBuf {
    default_data_dir().join("nest_api_config.json")
}

fn default_nest_api_url() -> String {
    "https://smartdevicemanagement.googleapis.com/v1".to_string()
}

fn default_token_url() -> String {
    "https://www.googleapis.com/oauth2/v4/token".to_string()
}

fn default_consent_base_url() -> String {
    "https://nestservices.google.com/partnerconnections".to_string()
}

impl Default for NestConfig {
    fn default() -> Self {
        Self {
            credential_file: default_credential_file(),
            api_base_url: default_nest_api_url(),
            token_url: default_token_url(),
            consent_base_url: default_consent_base_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// SQLite file that readings are appended to
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// Seconds to sleep between poll cycles (default: 300)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

fn default_database() -> PathBuf {
    default_data_dir().join("homelog.db")
}

fn default_poll_interval() -> u64 {
    300
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            poll_interval_secs: default_poll_interval(),
        }
    }
}

/// Units system understood by the One Call API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Kelvin, metres per second
    Standard,
    /// Celsius, metres per second
    Metric,
    /// Fahrenheit, miles per hour
    #[default]
    Imperial,
}

impl Units {
    /// Value of the `units` query parameter
    pub fn as_query(&self) -> &'static str {
        match self {
            Units::Standard => "standard",
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    /// Label printed after temperatures
    pub fn temperature_label(&self) -> &'static str {
        match self {
            Units::Standard => "K",
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }

    /// Label printed after wind speeds
    pub fn speed_label(&self) -> &'static str {
        match self {
            Units::Standard | Units::Metric => "m/s",
            Units::Imperial => "MPH",
        }
    }
}

impl std::str::FromStr for Units {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(Units::Standard),
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            other => Err(ConfigError::Invalid(format!("unknown units system: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// One Call endpoint
    #[serde(default = "default_weather_api_url")]
    pub api_url: String,

    /// Units system for the report
    #[serde(default)]
    pub units: Units,

    /// API key (overridden by OPENWEATHER_API_KEY)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Report latitude (overridden by LATITUDE)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    /// Report longitude (overridden by LONGITUDE)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

fn default_weather_api_url() -> String {
    "https://api.openweathermap.org/data/3.0/onecall".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_url: default_weather_api_url(),
            units: Units::default(),
            api_key: None,
            latitude: None,
            longitude: None,
        }
    }
}

impl WeatherConfig {
    /// Apply OPENWEATHER_API_KEY / LATITUDE / LONGITUDE overrides.
    ///
    /// `lookup` abstracts the environment so the precedence can be tested.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_WEATHER_API_KEY).filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key.trim().to_string());
        }
        if let Some(lat) = lookup(ENV_LATITUDE).filter(|v| !v.trim().is_empty()) {
            self.latitude = Some(parse_coordinate(ENV_LATITUDE, &lat)?);
        }
        if let Some(lon) = lookup(ENV_LONGITUDE).filter(|v| !v.trim().is_empty()) {
            self.longitude = Some(parse_coordinate(ENV_LONGITUDE, &lon)?);
        }
        Ok(())
    }

    /// API key, or a MissingSetting error naming where to set it
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingSetting(ENV_WEATHER_API_KEY.to_string()))
    }

    /// (latitude, longitude), or a MissingSetting error
    pub fn require_location(&self) -> Result<(f64, f64), ConfigError> {
        let lat = self
            .latitude
            .ok_or_else(|| ConfigError::MissingSetting(ENV_LATITUDE.to_string()))?;
        let lon = self
            .longitude
            .ok_or_else(|| ConfigError::MissingSetting(ENV_LONGITUDE.to_string()))?;
        Ok((lat, lon))
    }
}

fn parse_coordinate(name: &str, value: &str) -> Result<f64, ConfigError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|e| ConfigError::Invalid(format!("{} must be a number: {}", name, e)))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}

/// Directory holding homelog's config, credentials and reading log
/// (e.g. ~/.config/homelog on Linux).
pub fn default_data_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("homelog")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nest: NestConfig::default(),
            logging: LoggingConfig::default(),
            weather: WeatherConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing defaults there if it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            tracing::info!("Wrote default configuration to {}", path.display());
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration, apply environment overrides (including a `.env`
    /// file in the working directory) and validate it.
    ///
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated(path: Option<&Path>) -> Result<(Self, ValidationResult)> {
        dotenvy::dotenv().ok();

        let mut config = match path {
            Some(p) => Self::load_from(p)?,
            None => Self::load()?,
        };
        config
            .weather
            .apply_env(|name| std::env::var(name).ok())?;

        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.nest.api_base_url, "nest.api_base_url", &mut result);
        self.validate_url(&self.nest.token_url, "nest.token_url", &mut result);
        self.validate_url(
            &self.nest.consent_base_url,
            "nest.consent_base_url",
            &mut result,
        );
        self.validate_url(&self.weather.api_url, "weather.api_url", &mut result);

        if self.logging.poll_interval_secs == 0 {
            result.add_error(
                "logging.poll_interval_secs",
                "Poll interval must be greater than 0",
            );
        } else if self.logging.poll_interval_secs < 60 {
            result.add_warning(
                "logging.poll_interval_secs",
                "Polling more than once a minute may hit API rate limits",
            );
        }

        if self.http.timeout_secs == 0 {
            result.add_error("http.timeout_secs", "Timeout must be greater than 0");
        }

        if let Some(lat) = self.weather.latitude {
            if !(-90.0..=90.0).contains(&lat) {
                result.add_error("weather.latitude", "Latitude must be within -90..=90");
            }
        }
        if let Some(lon) = self.weather.longitude {
            if !(-180.0..=180.0).contains(&lon) {
                result.add_error("weather.longitude", "Longitude must be within -180..=180");
            }
        }

        // Only the weather command needs these
        if self.weather.api_key.is_none() {
            result.add_warning(
                "weather.api_key",
                format!("Not set - export {} to print weather reports", ENV_WEATHER_API_KEY),
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the default configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("homelog");

        Ok(config_dir.join("config.toml"))
    }
}
