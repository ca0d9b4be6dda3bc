//! Fixed-weight index strategies for spot markets.
//!
//! An index strategy holds a published basket with constant weights. It never
//! shorts, and the backtest service allocates by the weights themselves
//! (`weight_method = custom`).

use nbr_traits::{NbrError, PriceMatrix, RankedCandidates, Result, Strategy, Symbol};
use std::collections::BTreeMap;

/// Tolerance when checking that index weights sum to one.
const WEIGHT_TOLERANCE: f64 = 0.001;

/// Coinbase 50 constituents tradable through the data API, announced
/// 2025-08-26. Weights of unsupported constituents are folded into BTCUSDT.
const COINBASE_50: [(&str, f64); 20] = [
    ("BTCUSDT", 0.5461),
    ("ETHUSDT", 0.2274),
    ("XRPUSDT", 0.0951),
    ("SOLUSDT", 0.0562),
    ("DOGEUSDT", 0.0190),
    ("ADAUSDT", 0.0158),
    ("BCHUSDT", 0.0073),
    ("XLMUSDT", 0.0058),
    ("AVAXUSDT", 0.0056),
    ("LTCUSDT", 0.0048),
    ("DOTUSDT", 0.0042),
    ("APTUSDT", 0.0021),
    ("ICPUSDT", 0.0020),
    ("NEARUSDT", 0.0020),
    ("ETCUSDT", 0.0019),
    ("FETUSDT", 0.0013),
    ("ATOMUSDT", 0.0012),
    ("ALGOUSDT", 0.0011),
    ("STXUSDT", 0.0007),
    ("XTZUSDT", 0.0004),
];

/// A long-only basket with constant per-symbol weights.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexWeightStrategy {
    name: String,
    weights: BTreeMap<Symbol, f64>,
}

impl IndexWeightStrategy {
    /// Create an index strategy from its weight table.
    #[must_use]
    pub fn new(name: impl Into<String>, weights: BTreeMap<Symbol, f64>) -> Self {
        Self {
            name: name.into(),
            weights,
        }
    }

    /// The Coinbase 50 index basket.
    #[must_use]
    pub fn coinbase50() -> Self {
        Self::new(
            "coinbase50index",
            COINBASE_50
                .iter()
                .map(|(symbol, weight)| ((*symbol).to_string(), *weight))
                .collect(),
        )
    }

    /// Per-symbol weights.
    pub const fn weights(&self) -> &BTreeMap<Symbol, f64> {
        &self.weights
    }

    /// Symbols of the basket, heaviest first.
    pub fn symbols(&self) -> Vec<Symbol> {
        let mut ranked: Vec<(&Symbol, f64)> = self.weights.iter().map(|(s, w)| (s, *w)).collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.into_iter().map(|(s, _)| s.clone()).collect()
    }
}

impl Strategy for IndexWeightStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate_config(&self) -> Result<()> {
        if self.weights.is_empty() {
            return Err(NbrError::invalid_input("index has no constituents"));
        }
        if let Some((symbol, weight)) = self
            .weights
            .iter()
            .find(|(_, w)| !w.is_finite() || **w <= 0.0)
        {
            return Err(NbrError::invalid_input(format!(
                "weight of {symbol} must be positive, got {weight}"
            )));
        }
        let total: f64 = self.weights.values().sum();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(NbrError::invalid_input(format!(
                "index weights must sum to 1.0, got {total}"
            )));
        }
        Ok(())
    }

    /// Longs every constituent present in `prices`, heaviest first.
    fn select(&self, prices: &PriceMatrix) -> Result<RankedCandidates> {
        let available = prices.symbols();
        let long = self
            .symbols()
            .into_iter()
            .filter(|symbol| available.contains(symbol))
            .collect();
        Ok(RankedCandidates::new(long, Vec::new()))
    }

    fn description(&self) -> &str {
        "Holds a fixed-weight index basket"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_coinbase50_weights() {
        let index = IndexWeightStrategy::coinbase50();
        assert_eq!(index.weights().len(), 20);
        assert_relative_eq!(index.weights().values().sum::<f64>(), 1.0, epsilon = 1e-9);
        assert!(index.validate_config().is_ok());
        assert_eq!(index.symbols()[..3], ["BTCUSDT", "ETHUSDT", "XRPUSDT"]);
    }

    #[test]
    fn test_selects_available_constituents() {
        let prices = PriceMatrix::from_columns(
            vec![0, 1],
            vec![
                ("DOGEUSDT".to_string(), vec![1.0, 1.0]),
                ("PEPEUSDT".to_string(), vec![1.0, 1.0]),
                ("ETHUSDT".to_string(), vec![1.0, 1.0]),
            ],
        )
        .unwrap();

        let candidates = IndexWeightStrategy::coinbase50().run(prices).unwrap();
        assert_eq!(candidates.long, vec!["ETHUSDT", "DOGEUSDT"]);
        assert!(candidates.short.is_empty());
    }

    #[test]
    fn test_invalid_weights() {
        let skewed = IndexWeightStrategy::new(
            "skewed",
            BTreeMap::from([("A".to_string(), 0.7), ("B".to_string(), 0.7)]),
        );
        assert!(matches!(skewed.validate_config(), Err(NbrError::InvalidInput(_))));

        let negative = IndexWeightStrategy::new(
            "negative",
            BTreeMap::from([("A".to_string(), 1.5), ("B".to_string(), -0.5)]),
        );
        assert!(negative.validate_config().is_err());

        let empty = IndexWeightStrategy::new("empty", BTreeMap::new());
        assert!(empty.validate_config().is_err());
    }
}
