//! Thermostat-specific error types.

use homelog_auth::AuthError;
use homelog_core::{DatabaseError, NetworkError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NestError {
    /// Still unauthorized after one refresh and one retry.
    #[error("Access token rejected after refresh")]
    AuthExpired,

    #[error("Device is missing required trait {0}")]
    MissingTrait(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Reading log error: {0}")]
    Database(#[from] DatabaseError),
}

impl NestError {
    /// User-friendly error message for the command line.
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthExpired => {
                "Google rejected the access token. Run `homelog auth` to authorize again.".to_string()
            }
            Self::MissingTrait(name) => format!("The device did not report {}", name),
            Self::Api { status, .. } if *status >= 500 => {
                "The Device Access API is having problems. Will try again.".to_string()
            }
            Self::Api { status, .. } => format!("The Device Access API refused the request ({})", status),
            Self::Network(e) => e.user_message().to_string(),
            Self::Auth(e) => e.user_message().to_string(),
            Self::Database(e) => e.user_message().to_string(),
        }
    }

    /// Whether this error should trigger a token refresh.
    pub fn should_refresh_token(&self) -> bool {
        matches!(self, Self::Api { status: 401 | 403, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_user_messages() {
        let err = NestError::MissingTrait("sdm.devices.traits.Humidity".into());
        assert!(err.user_message().contains("Humidity"));

        let err = NestError::AuthExpired;
        assert!(err.user_message().contains("homelog auth"));
    }

    #[test]
    fn test_should_refresh_token() {
        let unauthorized = NestError::Api {
            status: 401,
            message: String::new(),
        };
        let forbidden = NestError::Api {
            status: 403,
            message: String::new(),
        };
        let missing = NestError::Api {
            status: 404,
            message: String::new(),
        };
        assert!(unauthorized.should_refresh_token());
        assert!(forbidden.should_refresh_token());
        assert!(!missing.should_refresh_token());
        assert!(!NestError::MissingTrait("x".into()).should_refresh_token());
    }
}
