//! Multi-period momentum scoring.
//!
//! This module scores assets by their composite momentum over several
//! lookback horizons and ranks them into long and short candidates:
//! - [`HorizonSet`]: validated lookback lengths
//! - [`momentum_scores`] / [`momentum_history`]: composite scores at the final
//!   row or at every row
//! - [`rank_candidates`] / [`score_and_rank`]: head/tail selection with long
//!   priority
//! - [`MultiPeriodMomentum`]: the strategy wrapping all of the above
//!
//! Scoring is pure: no I/O, no logging, no shared state.

mod horizon;
mod multi_period;
mod rank;
mod score;

pub use horizon::HorizonSet;
pub use multi_period::{MomentumConfig, MultiPeriodMomentum};
pub use rank::{rank_candidates, score_and_rank};
pub use score::{MomentumHistory, MomentumScores, momentum_history, momentum_scores};
