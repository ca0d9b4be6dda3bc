//! Template strategy picking the first and last assets.

use nbr_traits::{PriceMatrix, RankedCandidates, Result, Strategy, Symbol};

/// Longs the first asset column and shorts the last one.
///
/// Useful as a starting point for new strategies and for exercising the
/// submission pipeline without depending on real prices. Universes with fewer
/// than two assets yield no candidates.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstLastStrategy;

impl FirstLastStrategy {
    /// Create a new first/last strategy.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Strategy for FirstLastStrategy {
    fn name(&self) -> &str {
        "first_last"
    }

    fn validate_config(&self) -> Result<()> {
        Ok(())
    }

    fn select(&self, prices: &PriceMatrix) -> Result<RankedCandidates> {
        let symbols: Vec<Symbol> = prices.symbols();
        match (symbols.first(), symbols.last()) {
            (Some(first), Some(last)) if symbols.len() >= 2 => Ok(RankedCandidates::new(
                vec![first.clone()],
                vec![last.clone()],
            )),
            _ => Ok(RankedCandidates::empty()),
        }
    }

    fn description(&self) -> &str {
        "Longs the first asset column and shorts the last"
    }
}
