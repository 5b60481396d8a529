use homelog_core::NetworkError;

/// Weather report errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("OpenWeather rejected the API key")]
    InvalidApiKey,
    #[error("OpenWeather API error: {0}")]
    Api(String),
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
    #[error("Failed to write response: {0}")]
    Io(#[from] std::io::Error),
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidApiKey => "The OpenWeather API key was rejected. Check OPENWEATHER_API_KEY.",
            Self::Api(_) => "OpenWeather could not produce a report.",
            Self::Network(e) => e.user_message(),
            Self::Io(_) => "Could not write the raw weather response.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_api_key_message_names_variable() {
        assert!(WeatherError::InvalidApiKey.user_message().contains("OPENWEATHER_API_KEY"));
    }

    #[test]
    fn test_network_message_is_forwarded() {
        let err = WeatherError::from(NetworkError::Timeout);
        assert_eq!(err.user_message(), NetworkError::Timeout.user_message());
    }
}
