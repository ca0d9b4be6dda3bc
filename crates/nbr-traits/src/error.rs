//! Error types for the nbr framework.
//!
//! This module defines the error type shared by strategies, price matrices
//! and strategy configuration parsing.

use thiserror::Error;

/// The main error type for nbr operations.
///
/// Scoring only ever produces [`NbrError::InvalidInput`] and
/// [`NbrError::InsufficientData`]; the remaining variants come from
/// configuration handling, strategy lookup and the underlying DataFrame
/// library.
#[derive(Debug, Error)]
pub enum NbrError {
    /// Malformed shape, types or parameters.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Not enough history for the requested horizons.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Error when a strategy name is not registered.
    #[error("Strategy not found: {0}")]
    StrategyNotFound(String),

    /// Error while reading or parsing a strategy configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),
}

impl NbrError {
    /// Shorthand for an [`NbrError::InvalidInput`] error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Shorthand for an [`NbrError::InsufficientData`] error.
    pub fn insufficient_data(msg: impl Into<String>) -> Self {
        Self::InsufficientData(msg.into())
    }
}

impl From<String> for NbrError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for NbrError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

/// A specialized Result type for nbr operations.
pub type Result<T> = std::result::Result<T, NbrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NbrError::InvalidInput("horizons must not be empty".to_string());
        assert_eq!(err.to_string(), "Invalid input: horizons must not be empty");

        let err = NbrError::insufficient_data("need 61 rows, got 60");
        assert_eq!(err.to_string(), "Insufficient data: need 61 rows, got 60");
    }

    #[test]
    fn test_error_from_string() {
        let err: NbrError = "boom".into();
        assert!(matches!(err, NbrError::Other(_)));

        let err: NbrError = String::from("boom").into();
        assert_eq!(err.to_string(), "Error: boom");
    }

    #[test]
    fn test_result_type() {
        let ok_result: Result<i32> = Ok(42);
        assert!(ok_result.is_ok());

        let err_result: Result<i32> = Err(NbrError::StrategyNotFound("x".to_string()));
        assert!(err_result.is_err());
    }
}
