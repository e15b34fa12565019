use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            return ProviderError::NetworkError(
                "Request timed out, check your network connection and try again".to_string(),
            );
        }
        if error.is_connect() {
            return ProviderError::NetworkError(format!(
                "Could not connect to the backend: {}",
                error
            ));
        }
        ProviderError::RequestFailed(error.to_string())
    }
}
