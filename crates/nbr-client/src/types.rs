//! Request and response types for the remote services.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{collections::BTreeMap, fmt, str::FromStr};

use crate::error::ClientError;

/// Remote service to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Service {
    /// Backtest execution.
    #[default]
    Backtest,
    /// Live trading sessions.
    Trading,
    /// Position queries.
    Position,
}

impl Service {
    /// Get the service name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Backtest => "backtest",
            Self::Trading => "trading",
            Self::Position => "position",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "backtest" => Ok(Self::Backtest),
            "trading" => Ok(Self::Trading),
            "position" => Ok(Self::Position),
            other => Err(ClientError::Config(format!(
                "Unknown service: {other}. Available: backtest, trading, position"
            ))),
        }
    }
}

/// How the backtest service allocates capital across candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightMethod {
    /// Equal weight per position.
    #[default]
    Equal,
    /// Half the capital long, half short.
    Split,
    /// Fixed per-symbol weights.
    Custom,
}

impl FromStr for WeightMethod {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "equal" => Ok(Self::Equal),
            "split" => Ok(Self::Split),
            "custom" => Ok(Self::Custom),
            other => Err(ClientError::Config(format!(
                "unknown weight method '{other}', expected equal, split or custom"
            ))),
        }
    }
}

/// Body of a backtest submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestRequest {
    /// Market data API key.
    pub data_apikey: String,
    /// Uploaded strategy file name, e.g. `multi_period_momentum.py`.
    pub strategy: String,
    /// Strategy parameters, usually `{"strategy_config": {...}, "rebalancing_config": {...}}`.
    pub strategy_config: Value,
    /// First day of the backtest.
    pub start_date: NaiveDate,
    /// Last day of the backtest.
    pub end_date: NaiveDate,
    /// History made available before each decision, in minutes.
    pub lookback_minutes: u32,
    /// Starting capital.
    pub capital: f64,
    /// Leverage.
    pub leverage: u32,
    /// Tradable universe.
    pub symbols: Vec<String>,
    /// Trading calendar, e.g. `24/7`.
    pub calendar: String,
    /// Bar frequency, e.g. `minute`.
    pub frequency: String,
    /// Allocation method.
    pub weight_method: WeightMethod,
    /// Whether to render an HTML tear sheet.
    pub generate_pyfolio_report: bool,
    /// Per-symbol weights for [`WeightMethod::Custom`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_weights: Option<BTreeMap<String, f64>>,
}

impl BacktestRequest {
    /// A copy with the data API key hidden, safe to log.
    pub fn redacted(&self) -> Self {
        Self {
            data_apikey: "***".to_string(),
            ..self.clone()
        }
    }
}

/// Body returned by a backtest run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacktestResponse {
    /// `html` when a report was rendered, `logs_only` otherwise.
    #[serde(default = "unknown_report_type")]
    pub report_type: String,
    /// Service-side logs.
    #[serde(default)]
    pub logs: String,
    /// Captured standard output of the strategy.
    #[serde(default)]
    pub stdout: String,
    /// Rendered HTML report.
    #[serde(default)]
    pub html_content: Option<String>,
}

fn unknown_report_type() -> String {
    "unknown".to_string()
}

impl BacktestResponse {
    /// Whether the response carries a non-empty HTML report.
    pub fn has_html_report(&self) -> bool {
        self.report_type == "html" && self.html_content.as_deref().is_some_and(|h| !h.is_empty())
    }
}

/// Body of a position query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionsRequest {
    /// The user key.
    pub user_key: String,
    /// Filter for the positions to list.
    pub all_positions: PositionFilter,
}

/// Product and margin coin filter for a position query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionFilter {
    /// Product type, e.g. `susdt-futures`.
    pub product_type: String,
    /// Margin coin, upper case.
    pub margin_coin: String,
}

/// Body of a trading start command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartTradingRequest {
    /// Uploaded strategy name.
    pub strategy_name: String,
    /// Trading method, e.g. `rebalancing`.
    pub method: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_service_parsing() {
        assert_eq!("backtest".parse::<Service>().unwrap(), Service::Backtest);
        assert_eq!("Trading".parse::<Service>().unwrap(), Service::Trading);
        assert!(matches!(
            "dashboard".parse::<Service>(),
            Err(ClientError::Config(_))
        ));
        assert_eq!(Service::Position.to_string(), "position");
    }

    #[test]
    fn test_weight_method_serde() {
        assert_eq!(serde_json::to_value(WeightMethod::Split).unwrap(), json!("split"));
        assert_eq!("CUSTOM".parse::<WeightMethod>().unwrap(), WeightMethod::Custom);
    }

    #[test]
    fn test_backtest_request_wire_format() {
        let request = BacktestRequest {
            data_apikey: "data".to_string(),
            strategy: "multi_period_momentum.py".to_string(),
            strategy_config: json!({ "strategy_config": { "minutes": [60] } }),
            start_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 20).unwrap(),
            lookback_minutes: 360,
            capital: 200_000.0,
            leverage: 10,
            symbols: vec!["BTCUSDT".to_string()],
            calendar: "24/7".to_string(),
            frequency: "minute".to_string(),
            weight_method: WeightMethod::Equal,
            generate_pyfolio_report: true,
            custom_weights: None,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["start_date"], json!("2025-03-10"));
        assert_eq!(value["weight_method"], json!("equal"));
        assert_eq!(value["generate_pyfolio_report"], json!(true));
        assert_eq!(value["strategy_config"]["strategy_config"]["minutes"], json!([60]));
        assert!(value.get("custom_weights").is_none());

        let logged = serde_json::to_string(&request.redacted()).unwrap();
        assert!(!logged.contains("\"data\""));
        assert!(logged.contains("\"data_apikey\":\"***\""));
        assert_eq!(request.redacted().symbols, request.symbols);
    }

    #[test]
    fn test_backtest_response_defaults() {
        let response: BacktestResponse = serde_json::from_value(json!({ "logs": "ok" })).unwrap();
        assert_eq!(response.report_type, "unknown");
        assert_eq!(response.logs, "ok");
        assert!(!response.has_html_report());

        let response: BacktestResponse = serde_json::from_value(json!({
            "report_type": "html",
            "html_content": "<html></html>"
        }))
        .unwrap();
        assert!(response.has_html_report());
    }

    #[test]
    fn test_positions_request_wire_format() {
        let request = PositionsRequest {
            user_key: "u".to_string(),
            all_positions: PositionFilter {
                product_type: "susdt-futures".to_string(),
                margin_coin: "SUSDT".to_string(),
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["all_positions"]["productType"], json!("susdt-futures"));
        assert_eq!(value["all_positions"]["marginCoin"], json!("SUSDT"));
    }
}
