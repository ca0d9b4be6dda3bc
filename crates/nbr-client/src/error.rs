//! Error types for the nbr API client.

use nbr_traits::NbrError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when talking to the remote services.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Required environment variables are missing.
    #[error(
        "Missing required environment variables: {0}. Create a .env file in the project root with these variables."
    )]
    MissingEnv(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Request timeout for {0}")]
    Timeout(String),

    /// JSON parsing failed.
    #[error("Failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// Service answered with an error status.
    #[error("HTTP {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// A file to upload does not exist.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Local file system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid client or backtest configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Strategy lookup or validation failed.
    #[error(transparent)]
    Strategy(#[from] NbrError),

    /// Environment file error.
    #[error("Environment error: {0}")]
    Env(#[from] dotenvy::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::Api {
            status: 503,
            body: "unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 503: unavailable");

        let err = ClientError::MissingEnv("USER_KEY, DATA_API_KEY".to_string());
        assert!(err.to_string().contains("USER_KEY, DATA_API_KEY"));

        let err = ClientError::FileNotFound(PathBuf::from("strategy/x.py"));
        assert_eq!(err.to_string(), "File not found: strategy/x.py");
    }

    #[test]
    fn test_strategy_error_is_transparent() {
        let err: ClientError = NbrError::StrategyNotFound("x".to_string()).into();
        assert_eq!(err.to_string(), "Strategy not found: x");
    }
}
