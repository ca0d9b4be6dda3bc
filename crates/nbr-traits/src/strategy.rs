//! Strategy trait for selecting long and short candidates.
//!
//! This module defines the `Strategy` trait. A strategy turns a
//! [`PriceMatrix`] into [`RankedCandidates`]; everything around the selection
//! step (configuration checks, data preparation, result cleanup) is exposed as
//! hooks with sensible defaults so simple strategies only implement the
//! selection itself.

use crate::{NbrError, PriceMatrix, RankedCandidates, Result};
use serde::Serialize;

/// Metadata describing a strategy instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyInfo {
    /// Strategy name.
    pub name: String,
    /// Number of rows of history the strategy needs.
    pub required_lookback: usize,
    /// Human-readable description.
    pub description: String,
}

/// A trading strategy that selects long and short candidates.
///
/// Implementations should be thread-safe (`Send + Sync`) so a strategy can be
/// shared between tasks.
///
/// # Lifecycle
///
/// [`Strategy::run`] drives the hooks in order:
///
/// 1. [`Strategy::preprocess`] validates and prepares the price matrix
/// 2. [`Strategy::select`] computes the raw candidates
/// 3. [`Strategy::postprocess`] cleans up the result
///
/// [`Strategy::validate_config`] is called by constructors that accept
/// user-supplied configuration.
///
/// # Example
///
/// ```no_run
/// use nbr_traits::{PriceMatrix, RankedCandidates, Result, Strategy};
///
/// struct HoldFirst;
///
/// impl Strategy for HoldFirst {
///     fn name(&self) -> &str {
///         "hold_first"
///     }
///
///     fn validate_config(&self) -> Result<()> {
///         Ok(())
///     }
///
///     fn select(&self, prices: &PriceMatrix) -> Result<RankedCandidates> {
///         Ok(RankedCandidates::new(
///             prices.symbols().into_iter().take(1).collect(),
///             Vec::new(),
///         ))
///     }
/// }
/// ```
pub trait Strategy: Send + Sync {
    /// Returns the name of this strategy.
    fn name(&self) -> &str;

    /// Checks the strategy parameters.
    ///
    /// # Errors
    ///
    /// Returns [`NbrError::InvalidInput`] when a parameter is out of range.
    fn validate_config(&self) -> Result<()>;

    /// Computes the raw long and short candidates from preprocessed prices.
    ///
    /// # Errors
    ///
    /// Returns an error if the candidates cannot be computed from `prices`.
    fn select(&self, prices: &PriceMatrix) -> Result<RankedCandidates>;

    /// Minimum number of rows of history this strategy needs.
    fn required_lookback(&self) -> usize {
        0
    }

    /// Prepares the price matrix before selection.
    ///
    /// The default rejects empty matrices and passes everything else through.
    ///
    /// # Errors
    ///
    /// Returns [`NbrError::InvalidInput`] for an empty matrix.
    fn preprocess(&self, prices: PriceMatrix) -> Result<PriceMatrix> {
        if prices.is_empty() || prices.n_assets() == 0 {
            return Err(NbrError::invalid_input("price matrix is empty"));
        }
        Ok(prices)
    }

    /// Adjusts the raw candidates after selection. Identity by default.
    fn postprocess(&self, candidates: RankedCandidates) -> RankedCandidates {
        candidates
    }

    /// Runs preprocess, select and postprocess in order.
    ///
    /// # Errors
    ///
    /// Propagates the first error from any stage; no partial result is
    /// returned.
    fn run(&self, prices: PriceMatrix) -> Result<RankedCandidates> {
        let prices = self.preprocess(prices)?;
        let candidates = self.select(&prices)?;
        Ok(self.postprocess(candidates))
    }

    /// Short description shown in listings.
    fn description(&self) -> &str {
        "No description available"
    }

    /// Metadata for this strategy instance.
    fn info(&self) -> StrategyInfo {
        StrategyInfo {
            name: self.name().to_string(),
            required_lookback: self.required_lookback(),
            description: self.description().to_string(),
        }
    }
}
