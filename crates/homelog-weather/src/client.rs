//! One Call API client.

use std::path::Path;

use homelog_core::{HttpConfig, NetworkError, ReqwestErrorExt, Units, WeatherConfig};
use tracing::instrument;

use crate::error::WeatherError;
use crate::types::OneCallResponse;

#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    api_url: String,
}

impl WeatherClient {
    pub fn new(weather: &WeatherConfig, http: &HttpConfig) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder()
            .timeout(http.timeout())
            .build()
            .map_err(|e| WeatherError::Network(e.into_network_error()))?;

        Ok(Self::with_client(client, &weather.api_url))
    }

    pub fn with_client(http: reqwest::Client, api_url: &str) -> Self {
        Self {
            http,
            api_url: api_url.to_string(),
        }
    }

    /// Fetch and parse the One Call document.
    #[instrument(skip(self, api_key), level = "info")]
    pub async fn fetch(
        &self,
        lat: f64,
        lon: f64,
        units: Units,
        api_key: &str,
    ) -> Result<OneCallResponse, WeatherError> {
        let response = self.send(lat, lon, units, api_key).await?;
        response
            .json()
            .await
            .map_err(|e| WeatherError::Network(NetworkError::InvalidResponse(e.to_string())))
    }

    /// Fetch the One Call document without interpreting it.
    #[instrument(skip(self, api_key), level = "info")]
    pub async fn fetch_raw(
        &self,
        lat: f64,
        lon: f64,
        units: Units,
        api_key: &str,
    ) -> Result<serde_json::Value, WeatherError> {
        let response = self.send(lat, lon, units, api_key).await?;
        response
            .json()
            .await
            .map_err(|e| WeatherError::Network(NetworkError::InvalidResponse(e.to_string())))
    }

    async fn send(
        &self,
        lat: f64,
        lon: f64,
        units: Units,
        api_key: &str,
    ) -> Result<reqwest::Response, WeatherError> {
        let response = self
            .http
            .get(&self.api_url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("units", units.as_query().to_string()),
                ("appid", api_key.to_string()),
            ])
            .send()
            .await
            .map_err(|e| e.into_network_error())?;

        let status = response.status();
        if status.as_u16() == 401 {
            return Err(WeatherError::InvalidApiKey);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(WeatherError::Api(format!("{}: {}", status, text)));
        }

        tracing::debug!("One Call response {}", status);
        Ok(response)
    }
}

/// Write a raw response to `path` as JSON.
pub fn write_raw(value: &serde_json::Value, path: &Path) -> Result<(), WeatherError> {
    let json = serde_json::to_vec_pretty(value).map_err(std::io::Error::other)?;
    std::fs::write(path, json)?;
    tracing::info!("Raw weather response written to {}", path.display());
    Ok(())
}
