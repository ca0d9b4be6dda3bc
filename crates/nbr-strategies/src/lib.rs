//! Strategy implementations for nbr.
//!
//! This crate provides:
//! - Momentum: multi-period momentum scoring, ranking and the
//!   [`momentum::MultiPeriodMomentum`] strategy
//! - [`index::IndexWeightStrategy`]: fixed-weight spot index baskets
//! - [`simple::FirstLastStrategy`]: a template strategy
//! - A registry for looking strategies up by name
//!
//! # Example
//!
//! ```ignore
//! use nbr_strategies::momentum::{HorizonSet, score_and_rank};
//! use nbr_strategies::registry::available_strategies;
//!
//! let horizons = HorizonSet::new(&[60, 180, 360])?;
//! let candidates = score_and_rank(&prices, &horizons, 2, 1)?;
//!
//! // Discover available strategies
//! let strategies = available_strategies();
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod index;
pub mod momentum;
pub mod registry;
pub mod simple;

// Re-export key types
pub use registry::{StrategyKind, StrategyMeta, create_strategy};
