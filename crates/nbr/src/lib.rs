#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! ## Quick Start
//!
//! ```no_run
//! use nbr::momentum::{HorizonSet, score_and_rank};
//! use nbr::{PriceMatrix, Result};
//!
//! # fn main() -> Result<()> {
//! let prices = PriceMatrix::from_columns(
//!     vec![0, 1, 2],
//!     vec![
//!         ("BTCUSDT".to_string(), vec![100.0, 101.0, 103.0]),
//!         ("ETHUSDT".to_string(), vec![100.0, 99.0, 98.0]),
//!     ],
//! )?;
//!
//! let horizons = HorizonSet::new(&[1, 2])?;
//! let candidates = score_and_rank(&prices, &horizons, 1, 1)?;
//! println!("long: {:?}, short: {:?}", candidates.long, candidates.short);
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`traits`] - Core types and the [`Strategy`] trait
//! - [`momentum`] - Multi-period momentum scoring and ranking
//! - [`strategies`] - All strategies and the registry
//! - [`client`] - Remote service client and backtest runner

/// Version information for the nbr crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Core Types
// ============================================================================

/// Core types and the strategy interface.
pub mod traits {
    pub use nbr_traits::*;
}

pub use nbr_traits::{NbrError, PriceMatrix, RankedCandidates, Result, Strategy, Symbol};

// ============================================================================
// Strategies
// ============================================================================

/// Strategy implementations and the strategy registry.
pub mod strategies {
    pub use nbr_strategies::*;
}

/// Multi-period momentum scoring and ranking.
///
/// The score of an asset at time `t` is the mean of the rate-adjusted
/// returns over the configured horizons:
///
/// ```text
/// r_h   = p[t] / p[t-h] - 1
/// adj_h = (1 + r_h)^(1/h) - 1
/// score = mean_h(adj_h)
/// ```
pub mod momentum {
    pub use nbr_strategies::momentum::*;
}

pub use nbr_strategies::{StrategyKind, create_strategy};

// ============================================================================
// Remote Services
// ============================================================================

/// Client for the backtest, trading and position services.
///
/// Credentials are read from `USER_KEY` and `DATA_API_KEY`, either from the
/// environment or a `.env` file.
pub mod client {
    pub use nbr_client::*;
}

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```ignore
/// use nbr::prelude::*;
/// ```
pub mod prelude {
    pub use crate::momentum::{HorizonSet, MomentumConfig, MultiPeriodMomentum};
    pub use crate::{NbrError, PriceMatrix, RankedCandidates, Result, Strategy, StrategyKind};
}
