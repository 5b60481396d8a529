use std::path::PathBuf;

use homelog_core::NetworkError;
use thiserror::Error;

/// Authentication errors (credential file, consent flow, token endpoint).
#[derive(Debug, Error)]
pub enum AuthError {
    /// No credential file yet; run the bootstrap.
    #[error("No stored credentials at {}", .0.display())]
    ConfigMissing(PathBuf),

    #[error("Not authorized yet: no refresh token stored")]
    NotAuthorized,

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Redirect URL has no authorization code: {0}")]
    InvalidRedirect(String),

    #[error("OAuth request failed: {0}")]
    OAuthFailed(String),

    #[error("Credential storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
}

impl AuthError {
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::ConfigMissing(_) => "Not set up yet. Run `homelog auth` to authorize.",
            AuthError::NotAuthorized => "Authorization incomplete. Run `homelog auth` again.",
            AuthError::MissingField(_) => "A required value was left blank.",
            AuthError::InvalidRedirect(_) => {
                "That URL has no authorization code. Paste the full address after consenting."
            }
            AuthError::OAuthFailed(_) => {
                "Google rejected the request. The authorization may have been revoked."
            }
            AuthError::Storage(_) => "The credential file is unreadable. Run `homelog auth`.",
            AuthError::Io(_) => "A credential file operation failed.",
            AuthError::Network(e) => e.user_message(),
        }
    }

    pub fn is_config_missing(&self) -> bool {
        matches!(self, Self::ConfigMissing(_))
    }
}
