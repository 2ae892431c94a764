//! Error types for socratic-ai

use thiserror::Error;

/// Result type alias using socratic-ai Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when asking the generative service for a reply
#[derive(Error, Debug)]
pub enum Error {
    /// No access credential was configured
    #[error("API key is missing")]
    MissingApiKey,

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Success body was not a decodable reply
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Service answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request was never sent because configuration is incomplete
    Configuration,
    /// The request was sent (or attempted) and failed
    Transport,
}

impl Error {
    /// Create an API error from a status code and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingApiKey => ErrorKind::Configuration,
            Error::Http(_) | Error::Json(_) | Error::Api { .. } => ErrorKind::Transport,
        }
    }

    /// Whether the service rejected the credential
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Error::MissingApiKey => true,
            Error::Api { status, message } => {
                *status == 401
                    || *status == 403
                    || message.to_lowercase().contains("api key not valid")
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_configuration() {
        assert_eq!(Error::MissingApiKey.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_api_error_is_transport() {
        assert_eq!(Error::api(500, "boom").kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_json_error_is_transport() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(Error::from(err).kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_auth_failure_status() {
        assert!(Error::api(403, "forbidden").is_auth_failure());
        assert!(Error::api(400, "API key not valid. Please pass a valid API key.").is_auth_failure());
        assert!(!Error::api(500, "internal").is_auth_failure());
    }

    #[test]
    fn test_display_includes_status() {
        let e = Error::api(429, "Resource has been exhausted");
        assert_eq!(e.to_string(), "API error (429): Resource has been exhausted");
    }
}
