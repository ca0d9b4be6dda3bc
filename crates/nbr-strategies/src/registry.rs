//! Strategy registry for discovering and constructing strategies by name.
//!
//! This module provides metadata for every strategy in the nbr-strategies
//! library and builds strategy instances from their JSON configuration.

use crate::{index::IndexWeightStrategy, momentum::MultiPeriodMomentum, simple::FirstLastStrategy};
use nbr_traits::{NbrError, Result, Strategy};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{collections::BTreeMap, fmt};

/// Market a strategy trades in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Perpetual futures
    Future,
    /// Spot markets
    Spot,
}

impl StrategyKind {
    /// Name used in directory layouts and API parameters.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Future => "future",
            Self::Spot => "spot",
        }
    }

    /// Get a human-readable description of the kind.
    #[must_use]
    pub const fn description(&self) -> &str {
        match self {
            Self::Future => "Long/short strategies on perpetual futures",
            Self::Spot => "Long-only strategies on spot markets",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = NbrError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "future" | "futures" => Ok(Self::Future),
            "spot" => Ok(Self::Spot),
            other => Err(NbrError::invalid_input(format!(
                "unknown strategy kind '{other}', expected 'future' or 'spot'"
            ))),
        }
    }
}

/// Metadata about a strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyMeta {
    /// Unique identifier for the strategy
    pub name: &'static str,

    /// Market the strategy trades in
    pub kind: StrategyKind,

    /// Human-readable description
    pub description: &'static str,

    /// Whether the strategy reads parameters from `strategy_config`
    pub configurable: bool,
}

/// Get information about all available strategies.
#[must_use]
pub fn available_strategies() -> Vec<StrategyMeta> {
    vec![
        StrategyMeta {
            name: "multi_period_momentum",
            kind: StrategyKind::Future,
            description: "Average rate-adjusted return over several minute horizons",
            configurable: true,
        },
        StrategyMeta {
            name: "first_last",
            kind: StrategyKind::Future,
            description: "Template: long the first asset, short the last",
            configurable: false,
        },
        StrategyMeta {
            name: "coinbase50index",
            kind: StrategyKind::Spot,
            description: "Coinbase 50 index basket with fixed weights",
            configurable: false,
        },
    ]
}

/// Get all strategies of a specific kind.
#[must_use]
pub fn strategies_by_kind(kind: StrategyKind) -> Vec<StrategyMeta> {
    available_strategies()
        .into_iter()
        .filter(|meta| meta.kind == kind)
        .collect()
}

/// Get information about a specific strategy by name.
#[must_use]
pub fn get_strategy_meta(name: &str) -> Option<StrategyMeta> {
    available_strategies()
        .into_iter()
        .find(|meta| meta.name == name)
}

/// Fixed allocation weights of an index strategy, `None` for strategies
/// that size positions themselves.
#[must_use]
pub fn index_weights(name: &str) -> Option<BTreeMap<String, f64>> {
    match name {
        "coinbase50index" | "coinbase50" => {
            Some(IndexWeightStrategy::coinbase50().weights().clone())
        }
        _ => None,
    }
}

/// Create a strategy instance by name from its JSON configuration.
///
/// `config` is either the `strategy_config` object itself or a document
/// holding it under `strategy_config`.
///
/// # Errors
///
/// Returns [`NbrError::StrategyNotFound`] for unknown names, or the
/// strategy's own error for invalid configuration.
pub fn create_strategy(name: &str, config: &Value) -> Result<Box<dyn Strategy>> {
    match name {
        "multi_period_momentum" | "momentum" | "mpm" => {
            let strategy = MultiPeriodMomentum::from_json(config)?;
            strategy.validate_config()?;
            Ok(Box::new(strategy))
        }
        "first_last" | "simple" => Ok(Box::new(FirstLastStrategy::new())),
        "coinbase50index" | "coinbase50" => {
            let strategy = IndexWeightStrategy::coinbase50();
            strategy.validate_config()?;
            Ok(Box::new(strategy))
        }
        _ => Err(NbrError::StrategyNotFound(format!(
            "Unknown strategy: '{name}'. Use 'nbr strategies' to list available strategies."
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_available_strategies() {
        let strategies = available_strategies();
        assert!(!strategies.is_empty());
        assert!(strategies.iter().any(|s| s.name == "multi_period_momentum"));
    }

    #[test]
    fn test_strategies_by_kind() {
        assert_eq!(strategies_by_kind(StrategyKind::Future).len(), 2);

        let spot = strategies_by_kind(StrategyKind::Spot);
        assert_eq!(spot.len(), 1);
        assert_eq!(spot[0].name, "coinbase50index");
    }

    #[test]
    fn test_index_weights() {
        let weights = index_weights("coinbase50index").unwrap();
        assert_eq!(weights.len(), 20);
        assert_eq!(weights["BTCUSDT"], 0.5461);
        assert!(index_weights("multi_period_momentum").is_none());

        let strategy = create_strategy("coinbase50", &Value::Null).unwrap();
        assert_eq!(strategy.name(), "coinbase50index");
    }

    #[test]
    fn test_get_strategy_meta() {
        let meta = get_strategy_meta("multi_period_momentum").unwrap();
        assert_eq!(meta.kind, StrategyKind::Future);
        assert!(meta.configurable);

        assert!(get_strategy_meta("nonexistent_strategy").is_none());
    }

    #[test]
    fn test_create_strategy() {
        let config = json!({ "strategy_config": { "minutes": [60, 180] } });
        let strategy = create_strategy("multi_period_momentum", &config).unwrap();
        assert_eq!(strategy.name(), "multi_period_momentum");
        assert_eq!(strategy.required_lookback(), 180);

        // Aliases
        assert!(create_strategy("mpm", &config).is_ok());
        assert!(create_strategy("simple", &Value::Null).is_ok());
    }

    #[test]
    fn test_create_strategy_errors() {
        let result = create_strategy("nonexistent_strategy", &Value::Null);
        assert!(matches!(result, Err(NbrError::StrategyNotFound(_))));

        let result = create_strategy("momentum", &json!({ "minutes": [] }));
        assert!(matches!(result, Err(NbrError::InvalidInput(_))));
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("future".parse::<StrategyKind>().unwrap(), StrategyKind::Future);
        assert_eq!("SPOT".parse::<StrategyKind>().unwrap(), StrategyKind::Spot);
        assert!("swap".parse::<StrategyKind>().is_err());
        assert_eq!(StrategyKind::Spot.to_string(), "spot");
        assert!(!StrategyKind::Future.description().is_empty());
    }
}
