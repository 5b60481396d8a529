//! Authenticated session: the one place an access token is handed out.

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tokio::sync::Mutex;

use crate::credentials::{CredentialStore, Credentials};
use crate::error::AuthError;
use crate::oauth::NestOAuth;

/// Owns the credential record and keeps its access token fresh.
///
/// Every token mutation is persisted before the lock is released, and
/// [`NestSession::auth_headers`] checks and refreshes under that same lock, so
/// callers never see a token between "checked" and "used".
pub struct NestSession {
    oauth: NestOAuth,
    store: CredentialStore,
    credentials: Mutex<Credentials>,
}

impl NestSession {
    pub fn new(oauth: NestOAuth, store: CredentialStore, credentials: Credentials) -> Self {
        Self {
            oauth,
            store,
            credentials: Mutex::new(credentials),
        }
    }

    /// Load stored credentials and bring them to the authorized state.
    ///
    /// Exchanges the authorization code on first use and refreshes an expired
    /// token.
    ///
    /// # Errors
    /// [`AuthError::ConfigMissing`] when nothing is stored yet.
    pub async fn open(oauth: NestOAuth, store: CredentialStore) -> Result<Self, AuthError> {
        let credentials = store.load()?;
        let session = Self::new(oauth, store, credentials);
        session.ensure_authorized().await?;
        Ok(session)
    }

    async fn ensure_authorized(&self) -> Result<(), AuthError> {
        let mut credentials = self.credentials.lock().await;
        self.ensure_fresh_locked(&mut credentials).await
    }

    /// Exchange the authorization code for the first token pair and persist.
    pub async fn exchange_code(&self) -> Result<(), AuthError> {
        let mut credentials = self.credentials.lock().await;
        self.exchange_locked(&mut credentials).await
    }

    /// Obtain a new access token with the stored refresh token and persist.
    ///
    /// Returns the new expiration. The refresh token itself is kept.
    pub async fn refresh(&self) -> Result<DateTime<Utc>, AuthError> {
        let mut credentials = self.credentials.lock().await;
        self.refresh_locked(&mut credentials).await
    }

    /// Headers for an authenticated call, refreshing the token first when due.
    pub async fn auth_headers(&self) -> Result<HeaderMap, AuthError> {
        let mut credentials = self.credentials.lock().await;
        self.ensure_fresh_locked(&mut credentials).await?;

        let token = credentials
            .access_token
            .as_deref()
            .ok_or(AuthError::NotAuthorized)?;
        let mut authorization = HeaderValue::from_str(token)
            .map_err(|_| AuthError::Storage("access token is not a valid header value".into()))?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, authorization);
        Ok(headers)
    }

    pub async fn project_id(&self) -> String {
        self.credentials.lock().await.project_id.clone()
    }

    /// Snapshot of the current record.
    pub async fn credentials(&self) -> Credentials {
        self.credentials.lock().await.clone()
    }

    async fn ensure_fresh_locked(&self, credentials: &mut Credentials) -> Result<(), AuthError> {
        if credentials.access_token.is_none() {
            self.exchange_locked(credentials).await?;
        } else if credentials.needs_refresh_at(Utc::now()) {
            tracing::debug!("Access token due for refresh");
            self.refresh_locked(credentials).await?;
        }
        Ok(())
    }

    async fn exchange_locked(&self, credentials: &mut Credentials) -> Result<(), AuthError> {
        let token = self.oauth.exchange_code(credentials).await?;
        credentials.apply_exchange(&token, Utc::now())?;
        self.store.save(credentials)?;
        tracing::info!("Authorization code exchanged for project {}", credentials.project_id);
        Ok(())
    }

    async fn refresh_locked(&self, credentials: &mut Credentials) -> Result<DateTime<Utc>, AuthError> {
        let token = self.oauth.refresh_token(credentials).await?;
        credentials.apply_refresh(&token, Utc::now())?;
        self.store.save(credentials)?;

        let expires = credentials
            .access_token_expiration
            .ok_or_else(|| AuthError::Storage("refresh produced no expiration".into()))?;
        tracing::info!("Access token refreshed, valid until {}", expires);
        Ok(expires)
    }
}
