#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and the strategy trait for the nbr momentum runner.
//!
//! This crate provides the price matrix that strategies consume, the
//! candidate lists they produce and the error type shared by the workspace.

/// The version of the nbr-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod error;
pub mod strategy;
pub mod types;

// Re-exports
pub use error::{NbrError, Result};
pub use strategy::{Strategy, StrategyInfo};
pub use types::{DEFAULT_TIME_COLUMN, PriceMatrix, RankedCandidates, Symbol};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }
}
