//! Client for the remote nb-runner services.
//!
//! This crate talks to the backtest, trading and position services and
//! drives the upload → backtest → report workflow.
//!
//! # Usage
//!
//! ```rust,ignore
//! use nbr_client::{ApiClient, BacktestConfig, BacktestRunner};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::from_env()?;
//!     let mut runner = BacktestRunner::new(client, "strategy", "reports")?;
//!
//!     let config = BacktestConfig::new("multi_period_momentum");
//!     let params = json!({
//!         "strategy_config": { "minutes": [60, 180, 360], "long_maximum_candidates": 5 }
//!     });
//!
//!     let outcome = runner.run_complete_backtest(&config, &params).await?;
//!     println!("{outcome}");
//!     Ok(())
//! }
//! ```
//!
//! # Environment Variables
//!
//! Set `USER_KEY` and `DATA_API_KEY` in your environment or `.env` file:
//!
//! ```bash
//! USER_KEY=your_user_key
//! DATA_API_KEY=your_data_api_key
//! ```

mod client;
mod config;
mod error;
mod runner;
mod types;

pub use client::ApiClient;
pub use config::{
    ApiConfig, BACKTEST_BASE_URL, BACKTEST_TIMEOUT, DEFAULT_TIMEOUT, POSITION_BASE_URL,
    TRADING_BASE_URL,
};
pub use error::ClientError;
pub use runner::{
    BacktestConfig, BacktestOutcome, BacktestRunner, DEFAULT_SYMBOLS, DiscoveredStrategy,
    config_file, discover_strategies, report_file_name, strategy_file,
};
pub use types::*;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
