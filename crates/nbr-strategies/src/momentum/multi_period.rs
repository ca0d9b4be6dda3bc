//! Multi-period momentum strategy.

use super::{
    HorizonSet, MomentumHistory, MomentumScores, momentum_history, momentum_scores,
    score_and_rank,
};
use nbr_traits::{NbrError, PriceMatrix, RankedCandidates, Result, Strategy};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const fn default_candidates() -> i64 {
    1
}

/// Configuration for the multi-period momentum strategy.
///
/// Mirrors the `strategy_config` object sent to the backtest service:
///
/// ```json
/// {
///     "minutes": [60, 180, 360],
///     "long_maximum_candidates": 2,
///     "short_maximum_candidates": 1
/// }
/// ```
///
/// Counts are signed so that negative values from configuration files can be
/// reported instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MomentumConfig {
    /// Lookback horizons in rows (minutes for minute bars).
    pub minutes: Vec<i64>,
    /// Number of long candidates (default: 1).
    #[serde(default = "default_candidates")]
    pub long_maximum_candidates: i64,
    /// Number of short candidates (default: 1).
    #[serde(default = "default_candidates")]
    pub short_maximum_candidates: i64,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            minutes: vec![60, 180, 360],
            long_maximum_candidates: default_candidates(),
            short_maximum_candidates: default_candidates(),
        }
    }
}

impl MomentumConfig {
    /// Parses a configuration from JSON.
    ///
    /// Accepts either the bare parameter object or a document holding it
    /// under `strategy_config`.
    ///
    /// # Errors
    ///
    /// Returns [`NbrError::Config`] if the JSON does not match the expected
    /// shape.
    pub fn from_json(value: &Value) -> Result<Self> {
        let params = value.get("strategy_config").unwrap_or(value);
        serde_json::from_value(params.clone())
            .map_err(|e| NbrError::Config(format!("invalid momentum configuration: {e}")))
    }

    /// Parses a configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`NbrError::Config`] on malformed JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| NbrError::Config(format!("malformed JSON: {e}")))?;
        Self::from_json(&value)
    }

    /// Validated horizon set built from `minutes`.
    ///
    /// # Errors
    ///
    /// Returns [`NbrError::InvalidInput`] if `minutes` is empty or holds a
    /// non-positive value.
    pub fn horizons(&self) -> Result<HorizonSet> {
        HorizonSet::new(&self.minutes)
    }

    /// Long candidate count.
    ///
    /// # Errors
    ///
    /// Returns [`NbrError::InvalidInput`] if the count is negative.
    pub fn long_k(&self) -> Result<usize> {
        candidate_count("long_maximum_candidates", self.long_maximum_candidates)
    }

    /// Short candidate count.
    ///
    /// # Errors
    ///
    /// Returns [`NbrError::InvalidInput`] if the count is negative.
    pub fn short_k(&self) -> Result<usize> {
        candidate_count("short_maximum_candidates", self.short_maximum_candidates)
    }

    /// Checks every parameter.
    ///
    /// # Errors
    ///
    /// Returns the first [`NbrError::InvalidInput`] found.
    pub fn validate(&self) -> Result<()> {
        self.horizons()?;
        self.long_k()?;
        self.short_k()?;
        Ok(())
    }
}

fn candidate_count(name: &str, value: i64) -> Result<usize> {
    usize::try_from(value).map_err(|_| {
        NbrError::invalid_input(format!("'{name}' must be a non-negative integer, got {value}"))
    })
}

/// Ranks assets by their average rate-adjusted return over several horizons
/// and picks the strongest as long and the weakest as short candidates.
///
/// # Example
///
/// ```ignore
/// use nbr_strategies::momentum::{MomentumConfig, MultiPeriodMomentum};
///
/// let strategy = MultiPeriodMomentum::new(MomentumConfig::default())?;
/// let candidates = strategy.run(prices)?;
/// ```
#[derive(Debug, Clone)]
pub struct MultiPeriodMomentum {
    config: MomentumConfig,
    horizons: HorizonSet,
    long_k: usize,
    short_k: usize,
}

impl MultiPeriodMomentum {
    /// Creates the strategy, validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`NbrError::InvalidInput`] for invalid parameters.
    pub fn new(config: MomentumConfig) -> Result<Self> {
        let horizons = config.horizons()?;
        let long_k = config.long_k()?;
        let short_k = config.short_k()?;
        Ok(Self {
            config,
            horizons,
            long_k,
            short_k,
        })
    }

    /// Creates the strategy from JSON; see [`MomentumConfig::from_json`].
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a parameter is invalid.
    pub fn from_json(value: &Value) -> Result<Self> {
        Self::new(MomentumConfig::from_json(value)?)
    }

    /// The configuration this strategy was built from.
    pub const fn config(&self) -> &MomentumConfig {
        &self.config
    }

    /// The lookback horizons.
    pub const fn horizons(&self) -> &HorizonSet {
        &self.horizons
    }

    /// Scores at the final timestamp.
    ///
    /// # Errors
    ///
    /// See [`momentum_scores`].
    pub fn scores(&self, prices: &PriceMatrix) -> Result<MomentumScores> {
        momentum_scores(prices, &self.horizons)
    }

    /// Scores for every row.
    ///
    /// # Errors
    ///
    /// See [`momentum_history`].
    pub fn history(&self, prices: &PriceMatrix) -> Result<MomentumHistory> {
        momentum_history(prices, &self.horizons)
    }
}

impl Strategy for MultiPeriodMomentum {
    fn name(&self) -> &str {
        "multi_period_momentum"
    }

    fn validate_config(&self) -> Result<()> {
        self.config.validate()
    }

    fn select(&self, prices: &PriceMatrix) -> Result<RankedCandidates> {
        score_and_rank(prices, &self.horizons, self.long_k, self.short_k)
    }

    fn required_lookback(&self) -> usize {
        self.horizons.max()
    }

    fn preprocess(&self, prices: PriceMatrix) -> Result<PriceMatrix> {
        if prices.is_empty() || prices.n_assets() == 0 {
            return Err(NbrError::invalid_input("price matrix is empty"));
        }

        let lookback = self.required_lookback();
        if prices.len() <= lookback {
            return Err(NbrError::insufficient_data(format!(
                "need more than {lookback} periods, but got {}",
                prices.len()
            )));
        }

        prices.drop_empty_assets()
    }

    fn postprocess(&self, candidates: RankedCandidates) -> RankedCandidates {
        candidates.prioritize_long()
    }

    fn description(&self) -> &str {
        "Average rate-adjusted return over several horizons; longs the top, shorts the bottom"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn prices() -> PriceMatrix {
        PriceMatrix::from_columns(
            vec![0, 1, 2, 3],
            vec![
                ("UP".to_string(), vec![1.0, 1.1, 1.2, 1.3]),
                ("FLAT".to_string(), vec![1.0, 1.0, 1.0, 1.0]),
                ("DOWN".to_string(), vec![1.3, 1.2, 1.1, 1.0]),
                ("GONE".to_string(), vec![f64::NAN; 4]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = MomentumConfig::default();
        assert_eq!(config.minutes, vec![60, 180, 360]);
        assert_eq!(config.long_maximum_candidates, 1);
        assert_eq!(config.short_maximum_candidates, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_defaults_counts() {
        let config = MomentumConfig::from_json(&json!({ "minutes": [1, 2] })).unwrap();
        assert_eq!(config.long_k().unwrap(), 1);
        assert_eq!(config.short_k().unwrap(), 1);
    }

    #[test]
    fn test_from_json_wrapped() {
        let value = json!({
            "strategy_config": {
                "minutes": [60, 180],
                "long_maximum_candidates": 2,
                "short_maximum_candidates": 0
            },
            "rebalancing_config": { "rebalancing_interval_hours": 3 }
        });
        let config = MomentumConfig::from_json(&value).unwrap();
        assert_eq!(config.minutes, vec![60, 180]);
        assert_eq!(config.long_k().unwrap(), 2);
        assert_eq!(config.short_k().unwrap(), 0);
    }

    #[test]
    fn test_from_json_missing_minutes() {
        let result = MomentumConfig::from_json_str(r#"{"long_maximum_candidates": 1}"#);
        assert!(matches!(result, Err(NbrError::Config(_))));
    }

    #[test]
    fn test_negative_counts_rejected() {
        let config = MomentumConfig {
            minutes: vec![1],
            long_maximum_candidates: -1,
            short_maximum_candidates: 1,
        };
        assert!(matches!(config.validate(), Err(NbrError::InvalidInput(_))));
        assert!(matches!(
            MultiPeriodMomentum::new(config),
            Err(NbrError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_invalid_minutes_rejected() {
        let empty = MomentumConfig {
            minutes: vec![],
            ..MomentumConfig::default()
        };
        assert!(matches!(
            MultiPeriodMomentum::new(empty),
            Err(NbrError::InvalidInput(_))
        ));

        let zero = MomentumConfig {
            minutes: vec![5, 0],
            ..MomentumConfig::default()
        };
        assert!(matches!(zero.validate(), Err(NbrError::InvalidInput(_))));
    }

    #[test]
    fn test_required_lookback() {
        let strategy = MultiPeriodMomentum::new(MomentumConfig::default()).unwrap();
        assert_eq!(strategy.required_lookback(), 360);
        assert_eq!(strategy.info().required_lookback, 360);
        assert_eq!(strategy.name(), "multi_period_momentum");
    }

    #[test]
    fn test_run() {
        let strategy = MultiPeriodMomentum::from_json(&json!({
            "minutes": [1, 3],
            "long_maximum_candidates": 1,
            "short_maximum_candidates": 1
        }))
        .unwrap();
        let candidates = strategy.run(prices()).unwrap();
        assert_eq!(candidates.long, vec!["UP"]);
        assert_eq!(candidates.short, vec!["DOWN"]);
    }

    #[test]
    fn test_run_drops_empty_assets() {
        let strategy = MultiPeriodMomentum::from_json(&json!({
            "minutes": [1],
            "long_maximum_candidates": 0,
            "short_maximum_candidates": 4
        }))
        .unwrap();
        let candidates = strategy.run(prices()).unwrap();
        assert!(candidates.long.is_empty());
        assert_eq!(candidates.short, vec!["UP", "FLAT", "DOWN"]);
    }

    #[test]
    fn test_run_insufficient_data() {
        let strategy = MultiPeriodMomentum::from_json(&json!({ "minutes": [4] })).unwrap();
        assert!(matches!(
            strategy.run(prices()),
            Err(NbrError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_run_empty_selection() {
        let strategy = MultiPeriodMomentum::from_json(&json!({
            "minutes": [2],
            "long_maximum_candidates": 0,
            "short_maximum_candidates": 0
        }))
        .unwrap();
        let candidates = strategy.run(prices()).unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_run_single_asset_overlap() {
        let prices = PriceMatrix::from_columns(
            vec![0, 1],
            vec![("X".to_string(), vec![1.0, 2.0])],
        )
        .unwrap();
        let strategy = MultiPeriodMomentum::from_json(&json!({ "minutes": [1] })).unwrap();
        let candidates = strategy.run(prices).unwrap();
        assert_eq!(candidates.long, vec!["X"]);
        assert!(candidates.short.is_empty());
    }
}
