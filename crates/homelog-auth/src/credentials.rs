use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::AuthError;
use crate::oauth::TokenResponse;

/// Refresh this long before the recorded expiry.
pub const REFRESH_BUFFER_SECS: i64 = 300;

/// OAuth client configuration and token state for one device-access project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    /// Device Access project ID
    pub project_id: String,

    /// OAuth 2.0 client ID from the Google Cloud project
    pub client_id: String,

    /// OAuth 2.0 client secret
    pub client_secret: String,

    /// Redirect URI registered for the client
    pub redirect_uri: String,

    /// Code returned by the consent page, exchanged once for tokens
    pub authorization_code: String,

    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Token type and token, e.g. `Bearer ya29...`
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default, with = "expiration")]
    pub access_token_expiration: Option<DateTime<Utc>>,
}

/// Where a stored credential record is in its lifecycle.
///
/// `Unconfigured` has no record at all and shows up as
/// [`AuthError::ConfigMissing`] from [`CredentialStore::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialState {
    /// Client configured, code not yet exchanged
    Configured,
    /// Access token valid
    Authorized,
    /// Access token past its expiration
    Expired,
}

impl Credentials {
    pub fn state_at(&self, now: DateTime<Utc>) -> CredentialState {
        if self.access_token.is_none() {
            CredentialState::Configured
        } else if self.is_expired_at(now) {
            CredentialState::Expired
        } else {
            CredentialState::Authorized
        }
    }

    /// A token without a recorded expiration counts as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.access_token_expiration
            .map(|expires| now >= expires)
            .unwrap_or(true)
    }

    /// True within [`REFRESH_BUFFER_SECS`] of expiry.
    pub fn needs_refresh_at(&self, now: DateTime<Utc>) -> bool {
        self.access_token_expiration
            .map(|expires| now >= expires - Duration::seconds(REFRESH_BUFFER_SECS))
            .unwrap_or(true)
    }

    /// Record the response to the authorization-code exchange received at `now`.
    ///
    /// A response without a refresh token keeps the stored one.
    pub fn apply_exchange(&mut self, token: &TokenResponse, now: DateTime<Utc>) -> Result<(), AuthError> {
        self.apply_access_token(token, now)?;
        if let Some(refresh) = &token.refresh_token {
            self.refresh_token = Some(refresh.clone());
        }
        Ok(())
    }

    /// Record the response to a refresh grant received at `now`.
    ///
    /// The stored refresh token is never rotated, even if the response carries one.
    pub fn apply_refresh(&mut self, token: &TokenResponse, now: DateTime<Utc>) -> Result<(), AuthError> {
        self.apply_access_token(token, now)
    }

    fn apply_access_token(&mut self, token: &TokenResponse, now: DateTime<Utc>) -> Result<(), AuthError> {
        let expires_in = i64::try_from(token.expires_in).unwrap_or(i64::MAX / 1000).min(i64::MAX / 1000);
        let expires = now
            .checked_add_signed(Duration::seconds(expires_in))
            .ok_or_else(|| AuthError::OAuthFailed(format!("expires_in out of range: {}", token.expires_in)))?;

        self.access_token = Some(format!("{} {}", token.token_type, token.access_token));
        self.access_token_expiration = Some(expires);
        Ok(())
    }
}

/// Accepts RFC 3339 and the naive local ISO-8601 form older files use
/// (`2023-05-01T12:34:56.123456`). Always writes RFC 3339 UTC.
mod expiration {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| super::parse_timestamp(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

/// Parse an ISO-8601 timestamp; naive values are taken as local time.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| format!("invalid timestamp {:?}: {}", value, e))?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| format!("timestamp {:?} does not exist in the local time zone", value))
}

/// JSON file holding one [`Credentials`] record.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the stored record.
    ///
    /// # Errors
    /// [`AuthError::ConfigMissing`] when no file exists yet, in which case the
    /// caller runs the bootstrap instead.
    pub fn load(&self) -> Result<Credentials, AuthError> {
        if !self.path.exists() {
            return Err(AuthError::ConfigMissing(self.path.clone()));
        }

        let json = fs::read_to_string(&self.path)?;
        let credentials: Credentials = serde_json::from_str(&json)
            .map_err(|e| AuthError::Storage(format!("{}: {}", self.path.display(), e)))?;

        tracing::debug!("Loaded credentials from {:?}", self.path);
        Ok(credentials)
    }

    /// Replace the stored record.
    ///
    /// Writes a temporary file beside the target and renames it into place,
    /// so a crash leaves either the old or the new record.
    pub fn save(&self, credentials: &Credentials) -> Result<(), AuthError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;

        let json = serde_json::to_string_pretty(credentials)
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        // NamedTempFile is created owner-only (0600 on unix)
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| AuthError::Io(e.error))?;

        tracing::info!("Saved credentials to {:?}", self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn configured() -> Credentials {
        Credentials {
            project_id: "project-1".to_string(),
            client_id: "client.apps.googleusercontent.com".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: "https://www.google.com".to_string(),
            authorization_code: "4/0Abc".to_string(),
            refresh_token: None,
            access_token: None,
            access_token_expiration: None,
        }
    }

    fn token(expires_in: u64, refresh: Option<&str>) -> TokenResponse {
        TokenResponse {
            access_token: "ya29.token".to_string(),
            token_type: "Bearer".to_string(),
            expires_in,
            refresh_token: refresh.map(str::to_string),
            scope: None,
        }
    }

    #[test]
    fn test_state_machine() {
        let now = Utc::now();
        let mut creds = configured();
        assert_eq!(creds.state_at(now), CredentialState::Configured);

        creds.apply_exchange(&token(3599, Some("1//refresh")), now).unwrap();
        assert_eq!(creds.state_at(now), CredentialState::Authorized);
        assert_eq!(
            creds.state_at(now + Duration::seconds(3600)),
            CredentialState::Expired
        );
    }

    #[test]
    fn test_apply_exchange_prefixes_type_and_stores_refresh_token() {
        let now = Utc::now();
        let mut creds = configured();
        creds.apply_exchange(&token(3599, Some("1//refresh")), now).unwrap();
        assert_eq!(creds.access_token.as_deref(), Some("Bearer ya29.token"));
        assert_eq!(creds.refresh_token.as_deref(), Some("1//refresh"));
        assert_eq!(
            creds.access_token_expiration,
            Some(now + Duration::seconds(3599))
        );
    }

    #[test]
    fn test_apply_refresh_never_rotates_refresh_token() {
        let now = Utc::now();
        let mut creds = configured();
        creds.apply_exchange(&token(3599, Some("1//refresh")), now).unwrap();

        creds.apply_refresh(&token(3599, None), now).unwrap();
        assert_eq!(creds.refresh_token.as_deref(), Some("1//refresh"));

        creds.apply_refresh(&token(3599, Some("1//rotated")), now).unwrap();
        assert_eq!(creds.refresh_token.as_deref(), Some("1//refresh"));
    }

    #[test]
    fn test_out_of_range_expires_in_is_an_error() {
        let now = Utc::now();
        let mut creds = configured();
        creds.apply_exchange(&token(3599, Some("1//refresh")), now).unwrap();
        let before = creds.clone();

        assert!(matches!(
            creds.apply_refresh(&token(u64::MAX, None), now),
            Err(AuthError::OAuthFailed(_))
        ));
        assert!(matches!(
            creds.apply_exchange(&token(i64::MAX as u64 / 1000, None), now),
            Err(AuthError::OAuthFailed(_))
        ));
        assert_eq!(creds, before);
    }

    #[test]
    fn test_needs_refresh_buffer() {
        let now = Utc::now();
        let mut creds = configured();
        creds.apply_refresh(&token(200, None), now).unwrap();
        assert!(!creds.is_expired_at(now));
        assert!(creds.needs_refresh_at(now));

        creds.apply_refresh(&token(3600, None), now).unwrap();
        assert!(!creds.needs_refresh_at(now));
    }

    #[test]
    fn test_missing_expiration_counts_as_expired() {
        let creds = configured();
        assert!(creds.is_expired_at(Utc::now()));
        assert!(creds.needs_refresh_at(Utc::now()));
    }

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse_timestamp("2024-01-15T10:30:00+00:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-01-15T10:30:00+00:00");
    }

    #[test]
    fn test_parse_naive_local_timestamp() {
        let dt = parse_timestamp("2023-05-01T12:34:56.123456").unwrap();
        let naive = dt.with_timezone(&Local).naive_local();
        assert_eq!(naive.format("%Y-%m-%d %H:%M:%S").to_string(), "2023-05-01 12:34:56");

        assert!(parse_timestamp("2023-05-01T12:34:56").is_ok());
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("nest_api_config.json"));
        assert!(!store.exists());
        assert!(matches!(store.load(), Err(AuthError::ConfigMissing(_))));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("sub").join("creds.json"));

        let mut creds = configured();
        creds.apply_exchange(&token(3599, Some("1//refresh")), Utc::now()).unwrap();
        store.save(&creds).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, creds);

        // No stray temp files are left behind
        let entries = fs::read_dir(dir.path().join("sub")).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_load_file_written_by_older_versions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nest_api_config.json");
        fs::write(
            &path,
            r#"{"project_id": "p", "client_id": "c", "client_secret": "s",
                "redirect_uri": "https://www.google.com", "authorization_code": "code",
                "refresh_token": "r", "access_token": "Bearer a",
                "access_token_expiration": "2023-05-01T12:34:56.123456"}"#,
        )
        .unwrap();

        let creds = CredentialStore::new(&path).load().unwrap();
        assert_eq!(creds.refresh_token.as_deref(), Some("r"));
        assert_eq!(creds.state_at(Utc::now()), CredentialState::Expired);
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            CredentialStore::new(&path).load(),
            Err(AuthError::Storage(_))
        ));
    }
}
