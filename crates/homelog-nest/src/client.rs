//! Smart Device Management API client.

use std::sync::Arc;

use homelog_auth::NestSession;
use homelog_core::{HttpConfig, NestConfig, NetworkError, ReqwestErrorExt};
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::error::NestError;
use crate::types::{Device, DeviceListResponse, DeviceStats, Structure, StructureListResponse};

/// Read-only client for the device-access project.
///
/// Every request takes its headers from the shared [`NestSession`], so a
/// token refreshed by one call is seen by the next.
pub struct NestClient {
    http: reqwest::Client,
    session: Arc<NestSession>,
    base_url: String,
}

impl NestClient {
    pub fn new(session: Arc<NestSession>, nest: &NestConfig, http: &HttpConfig) -> Result<Self, NestError> {
        let client = reqwest::Client::builder()
            .timeout(http.timeout())
            .build()
            .map_err(|e| NestError::Network(e.into_network_error()))?;

        Ok(Self::with_client(client, session, &nest.api_base_url))
    }

    pub fn with_client(http: reqwest::Client, session: Arc<NestSession>, base_url: &str) -> Self {
        Self {
            http,
            session,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn session(&self) -> &NestSession {
        &self.session
    }

    /// List the project's devices.
    ///
    /// A response without a `devices` field or an unauthorized status means
    /// the token went stale. The token is refreshed once and the listing
    /// retried once; if that also fails the result is [`NestError::AuthExpired`].
    #[instrument(skip(self), level = "info")]
    pub async fn list_devices(&self) -> Result<Vec<Device>, NestError> {
        let url = format!("{}/enterprises/{}/devices", self.base_url, self.session.project_id().await);

        match self.get_json::<DeviceListResponse>(&url).await {
            Ok(DeviceListResponse { devices: Some(devices) }) => return Ok(devices),
            Ok(DeviceListResponse { devices: None }) => {
                tracing::warn!("Device list came back empty, refreshing token");
            }
            Err(e) if e.should_refresh_token() => {
                tracing::warn!("Device list rejected ({}), refreshing token", e);
            }
            Err(e) => return Err(e),
        }

        self.session.refresh().await?;

        match self.get_json::<DeviceListResponse>(&url).await {
            Ok(DeviceListResponse { devices: Some(devices) }) => Ok(devices),
            Ok(DeviceListResponse { devices: None }) => Err(NestError::AuthExpired),
            Err(e) if e.should_refresh_token() => Err(NestError::AuthExpired),
            Err(e) => Err(e),
        }
    }

    /// Fetch one device's current traits.
    #[instrument(skip(self, device), fields(device = %device.device_id()), level = "debug")]
    pub async fn get_device_stats(&self, device: &Device) -> Result<DeviceStats, NestError> {
        let url = format!("{}/{}", self.base_url, device.name);
        self.get_json(&url).await
    }

    /// List the homes in the project.
    #[instrument(skip(self), level = "info")]
    pub async fn list_structures(&self) -> Result<Vec<Structure>, NestError> {
        let url = format!("{}/enterprises/{}/structures", self.base_url, self.session.project_id().await);
        let response: StructureListResponse = self.get_json(&url).await?;
        Ok(response.structures)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, NestError> {
        let headers = self.session.auth_headers().await?;
        let response = self
            .http
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| e.into_network_error())?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NestError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| NestError::Network(NetworkError::InvalidResponse(e.to_string())))
    }
}
