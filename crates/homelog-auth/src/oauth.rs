//! Google OAuth2 token endpoint for the Smart Device Management API.

use homelog_core::{HttpConfig, NestConfig, ReqwestErrorExt};
use serde::{Deserialize, Serialize};

use crate::credentials::Credentials;
use crate::error::AuthError;

/// Scope granting access to Smart Device Management
pub const SDM_SCOPE: &str = "https://www.googleapis.com/auth/sdm.service";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Client for the token endpoint and the partner-connections consent page.
#[derive(Debug, Clone)]
pub struct NestOAuth {
    http: reqwest::Client,
    token_url: String,
    consent_base_url: String,
}

impl NestOAuth {
    pub fn new(nest: &NestConfig, http: &HttpConfig) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(http.timeout())
            .build()
            .map_err(|e| AuthError::Network(e.into_network_error()))?;

        Ok(Self::with_client(
            client,
            &nest.token_url,
            &nest.consent_base_url,
        ))
    }

    pub fn with_client(http: reqwest::Client, token_url: &str, consent_base_url: &str) -> Self {
        Self {
            http,
            token_url: token_url.to_string(),
            consent_base_url: consent_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn consent_base_url(&self) -> &str {
        &self.consent_base_url
    }

    /// Exchange the stored authorization code for an access/refresh token pair.
    #[tracing::instrument(skip_all, fields(project = %credentials.project_id), level = "info")]
    pub async fn exchange_code(&self, credentials: &Credentials) -> Result<TokenResponse, AuthError> {
        self.request_token(&[
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("code", credentials.authorization_code.as_str()),
            ("grant_type", "authorization_code"),
            ("redirect_uri", credentials.redirect_uri.as_str()),
        ])
        .await
    }

    /// Use the stored refresh token to obtain a new access token.
    #[tracing::instrument(skip_all, fields(project = %credentials.project_id), level = "info")]
    pub async fn refresh_token(&self, credentials: &Credentials) -> Result<TokenResponse, AuthError> {
        let refresh_token = credentials
            .refresh_token
            .as_deref()
            .ok_or(AuthError::NotAuthorized)?;

        self.request_token(&[
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ])
        .await
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse, AuthError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(form)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.into_network_error()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AuthError::OAuthFailed(format!("{}: {}", status, error_text)));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| AuthError::OAuthFailed(format!("Failed to parse token response: {}", e)))
    }
}
