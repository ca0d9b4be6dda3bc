//! Backtest workflow: upload a strategy, submit a run, save the report.

use crate::{
    Result,
    client::ApiClient,
    error::ClientError,
    types::{BacktestRequest, BacktestResponse, Service, WeightMethod},
};
use chrono::{DateTime, Local, NaiveDate};
use nbr_strategies::{
    StrategyKind, create_strategy,
    registry::{get_strategy_meta, index_weights},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt, fs,
    path::{Path, PathBuf},
};

/// Tolerance when checking that custom weights sum to one.
const WEIGHT_TOLERANCE: f64 = 0.001;

/// Symbols traded when none are given.
pub const DEFAULT_SYMBOLS: [&str; 10] = [
    "BTCUSDT", "ETHUSDT", "XRPUSDT", "BCHUSDT", "LTCUSDT", "ADAUSDT", "ETCUSDT", "TRXUSDT",
    "DOTUSDT", "DOGEUSDT",
];

/// Parameters of a backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Strategy name, matching the uploaded file.
    pub strategy_name: String,
    /// Market the strategy trades in.
    pub trade_type: StrategyKind,
    /// First day of the backtest.
    pub start_date: NaiveDate,
    /// Last day of the backtest.
    pub end_date: NaiveDate,
    /// History available before each decision, in minutes.
    pub lookback_minutes: u32,
    /// Starting capital.
    pub initial_capital: f64,
    /// Leverage.
    pub leverage: u32,
    /// Tradable universe.
    pub symbols: Vec<String>,
    /// Trading calendar.
    pub calendar: String,
    /// Bar frequency.
    pub frequency: String,
    /// Allocation method.
    pub weight_method: WeightMethod,
    /// Per-symbol weights, required for [`WeightMethod::Custom`].
    pub custom_weights: Option<BTreeMap<String, f64>>,
    /// Whether to render an HTML report.
    pub generate_report: bool,
}

impl BacktestConfig {
    /// Default parameters for a strategy.
    pub fn new(strategy_name: impl Into<String>) -> Self {
        Self {
            strategy_name: strategy_name.into(),
            trade_type: StrategyKind::Future,
            start_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 20).unwrap_or_default(),
            lookback_minutes: 360,
            initial_capital: 200_000.0,
            leverage: 10,
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            calendar: "24/7".to_string(),
            frequency: "minute".to_string(),
            weight_method: WeightMethod::Equal,
            custom_weights: None,
            generate_report: true,
        }
    }

    /// Default parameters adjusted to what the local registry knows about a
    /// strategy: its trade type, and for index strategies the fixed weights
    /// with [`WeightMethod::Custom`] over the index constituents.
    pub fn for_strategy(strategy_name: impl Into<String>) -> Self {
        let mut config = Self::new(strategy_name);
        if let Some(meta) = get_strategy_meta(&config.strategy_name) {
            config.trade_type = meta.kind;
        }
        if let Some(weights) = index_weights(&config.strategy_name) {
            config.symbols = weights.keys().cloned().collect();
            config.weight_method = WeightMethod::Custom;
            config.custom_weights = Some(weights);
        }
        config
    }

    /// Check the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if custom weights are missing or do
    /// not sum to one, or if the date range is reversed.
    pub fn validate(&self) -> Result<()> {
        if self.weight_method == WeightMethod::Custom
            && self.custom_weights.as_ref().is_none_or(BTreeMap::is_empty)
        {
            return Err(ClientError::Config(
                "custom_weights is required when weight_method is 'custom'".to_string(),
            ));
        }

        if let Some(weights) = &self.custom_weights {
            let total: f64 = weights.values().sum();
            if (total - 1.0).abs() > WEIGHT_TOLERANCE {
                return Err(ClientError::Config(format!(
                    "Custom weights must sum to 1.0, got {total}"
                )));
            }
        }

        if self.start_date > self.end_date {
            return Err(ClientError::Config(format!(
                "start date {} is after end date {}",
                self.start_date, self.end_date
            )));
        }

        Ok(())
    }

    fn strategy_key(&self) -> String {
        strategy_key(&self.strategy_name, self.trade_type)
    }
}

/// Result of a successful backtest run.
#[derive(Debug, Clone)]
pub struct BacktestOutcome {
    /// Strategy that was run.
    pub strategy_name: String,
    /// When the run was submitted.
    pub executed_at: DateTime<Local>,
    /// Report type reported by the service.
    pub report_type: String,
    /// Service-side logs.
    pub logs: String,
    /// Strategy standard output.
    pub stdout: String,
    /// Where the HTML report was saved, if one was returned.
    pub report_path: Option<PathBuf>,
}

impl fmt::Display for BacktestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Strategy:       {}", self.strategy_name)?;
        writeln!(f, "Report type:    {}", self.report_type)?;
        writeln!(
            f,
            "Executed at:    {}",
            self.executed_at.format("%Y-%m-%d %H:%M:%S")
        )?;
        if let Some(path) = &self.report_path {
            writeln!(f, "Report:         {}", path.display())?;
        }
        if !self.logs.is_empty() {
            writeln!(f, "\nLogs:\n{}", self.logs.trim_end())?;
        }
        if !self.stdout.is_empty() {
            writeln!(f, "\nOutput:\n{}", self.stdout.trim_end())?;
        }
        Ok(())
    }
}

/// Drives backtests against the remote backtest service.
///
/// Keeps track of the strategies it has uploaded so repeated runs of the same
/// strategy skip the upload.
#[derive(Debug)]
pub struct BacktestRunner {
    client: ApiClient,
    strategy_dir: PathBuf,
    output_dir: PathBuf,
    uploaded: BTreeSet<String>,
}

impl BacktestRunner {
    /// Create a runner, creating `output_dir` if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the output directory cannot be created.
    pub fn new(
        client: ApiClient,
        strategy_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;
        Ok(Self {
            client,
            strategy_dir: strategy_dir.into(),
            output_dir,
            uploaded: BTreeSet::new(),
        })
    }

    /// The underlying client.
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Directory where reports are written.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Check that the backtest service is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the service is unreachable or unhealthy.
    pub async fn health_check(&self) -> Result<Value> {
        self.client.health_check(Service::Backtest).await
    }

    /// Locate a strategy file below this runner's strategy directory; see
    /// [`strategy_file`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::FileNotFound`] if no strategy file exists.
    pub fn strategy_file(&self, strategy_name: &str, trade_type: StrategyKind) -> Result<PathBuf> {
        strategy_file(&self.strategy_dir, strategy_name, trade_type)
    }

    /// Locate a strategy's configuration file; see [`config_file`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::FileNotFound`] if no configuration file exists.
    pub fn config_file(&self, strategy_name: &str, trade_type: StrategyKind) -> Result<PathBuf> {
        config_file(&self.strategy_dir, strategy_name, trade_type)
    }

    /// Strategies found below this runner's strategy directory.
    pub fn available_strategies(&self) -> Vec<DiscoveredStrategy> {
        discover_strategies(&self.strategy_dir)
    }

    /// Upload a strategy file and remember it as uploaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or the upload fails.
    pub async fn upload_strategy(
        &mut self,
        strategy_name: &str,
        trade_type: StrategyKind,
    ) -> Result<Value> {
        let file = self.strategy_file(strategy_name, trade_type)?;
        let key = strategy_key(strategy_name, trade_type);

        match self
            .client
            .upload_strategy(&file, trade_type, Service::Backtest)
            .await
        {
            Ok(response) => {
                tracing::info!(strategy = %key, "strategy uploaded");
                self.uploaded.insert(key);
                Ok(response)
            }
            Err(e) => {
                tracing::error!(strategy = %key, error = %e, "failed to upload strategy");
                Err(e)
            }
        }
    }

    /// Ask the backtest service whether a strategy is uploaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn check_strategy_upload(
        &self,
        strategy_name: &str,
        trade_type: StrategyKind,
    ) -> Result<Value> {
        self.client
            .check_uploaded_strategy(strategy_name, trade_type, Service::Backtest)
            .await
    }

    /// Build the request body for a run.
    ///
    /// Strategies known to the local registry have their `strategy_config`
    /// validated before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backtest or strategy parameters are invalid.
    pub fn build_request(
        &self,
        config: &BacktestConfig,
        strategy_config: &Value,
    ) -> Result<BacktestRequest> {
        config.validate()?;
        if get_strategy_meta(&config.strategy_name).is_some() {
            create_strategy(&config.strategy_name, strategy_config)?;
        }

        Ok(BacktestRequest {
            data_apikey: self.client.config().data_api_key().to_string(),
            strategy: format!("{}.py", config.strategy_name),
            strategy_config: strategy_config.clone(),
            start_date: config.start_date,
            end_date: config.end_date,
            lookback_minutes: config.lookback_minutes,
            capital: config.initial_capital,
            leverage: config.leverage,
            symbols: config.symbols.clone(),
            calendar: config.calendar.clone(),
            frequency: config.frequency.clone(),
            weight_method: config.weight_method,
            generate_pyfolio_report: config.generate_report,
            custom_weights: config.custom_weights.clone(),
        })
    }

    /// Submit a backtest and save its HTML report if one is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are invalid, the run fails, or the
    /// report cannot be written.
    pub async fn run_backtest(
        &self,
        config: &BacktestConfig,
        strategy_config: &Value,
    ) -> Result<BacktestOutcome> {
        let executed_at = Local::now();
        let request = self.build_request(config, strategy_config)?;

        tracing::info!(strategy = %config.strategy_name, "starting backtest");
        if let Ok(payload) = serde_json::to_string(&request.redacted()) {
            tracing::debug!(%payload, "backtest request");
        }

        let response = self.client.run_backtest(&request).await.inspect_err(|e| {
            tracing::error!(strategy = %config.strategy_name, error = %e, "backtest execution failed");
        })?;

        let outcome = self.outcome(&config.strategy_name, executed_at, response)?;
        tracing::info!(strategy = %config.strategy_name, "backtest completed");
        Ok(outcome)
    }

    /// Upload the strategy unless this runner already did, then run it.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload or the run fails.
    pub async fn run_complete_backtest(
        &mut self,
        config: &BacktestConfig,
        strategy_config: &Value,
    ) -> Result<BacktestOutcome> {
        if !self.uploaded.contains(&config.strategy_key()) {
            tracing::info!(strategy = %config.strategy_name, "uploading strategy");
            self.upload_strategy(&config.strategy_name, config.trade_type)
                .await?;
        }
        self.run_backtest(config, strategy_config).await
    }

    /// Strategies uploaded by this runner, as `{trade_type}.{name}`.
    pub fn uploaded_strategies(&self) -> Vec<String> {
        self.uploaded.iter().cloned().collect()
    }

    /// Forget which strategies were uploaded.
    pub fn clear_uploaded_strategies(&mut self) {
        self.uploaded.clear();
    }

    fn outcome(
        &self,
        strategy_name: &str,
        executed_at: DateTime<Local>,
        response: BacktestResponse,
    ) -> Result<BacktestOutcome> {
        let report_path = match response.html_content.as_deref() {
            Some(html) if response.has_html_report() => {
                Some(self.save_html_report(html, strategy_name, executed_at)?)
            }
            _ => None,
        };

        Ok(BacktestOutcome {
            strategy_name: strategy_name.to_string(),
            executed_at,
            report_type: response.report_type,
            logs: response.logs,
            stdout: response.stdout,
            report_path,
        })
    }

    fn save_html_report(
        &self,
        html: &str,
        strategy_name: &str,
        timestamp: DateTime<Local>,
    ) -> Result<PathBuf> {
        let path = self
            .output_dir
            .join(report_file_name(strategy_name, timestamp));
        fs::write(&path, html)?;
        tracing::info!(path = %path.display(), "HTML report saved");
        Ok(path)
    }
}

/// Locate a strategy file:
/// `{strategy_dir}/{trade_type}/{name}/strategy.py`, falling back to
/// `{strategy_dir}/{trade_type}/{name}/{name}.py`.
///
/// # Errors
///
/// Returns [`ClientError::FileNotFound`] if neither file exists.
pub fn strategy_file(
    strategy_dir: &Path,
    strategy_name: &str,
    trade_type: StrategyKind,
) -> Result<PathBuf> {
    let dir = strategy_dir.join(trade_type.as_str()).join(strategy_name);
    let primary = dir.join("strategy.py");
    if primary.is_file() {
        return Ok(primary);
    }
    let fallback = dir.join(format!("{strategy_name}.py"));
    if fallback.is_file() {
        return Ok(fallback);
    }
    Err(ClientError::FileNotFound(fallback))
}

/// Locate a strategy's configuration file:
/// `{strategy_dir}/{trade_type}/{name}/config.py`, falling back to
/// `{strategy_dir}/{trade_type}/{name}/{name}_config.py`.
///
/// # Errors
///
/// Returns [`ClientError::FileNotFound`] if neither file exists.
pub fn config_file(
    strategy_dir: &Path,
    strategy_name: &str,
    trade_type: StrategyKind,
) -> Result<PathBuf> {
    let dir = strategy_dir.join(trade_type.as_str()).join(strategy_name);
    let primary = dir.join("config.py");
    if primary.is_file() {
        return Ok(primary);
    }
    let fallback = dir.join(format!("{strategy_name}_config.py"));
    if fallback.is_file() {
        return Ok(fallback);
    }
    Err(ClientError::FileNotFound(fallback))
}

/// A strategy folder holding both a strategy file and a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredStrategy {
    /// Registry key, `{trade_type}.{name}`.
    pub key: String,
    /// Folder name.
    pub name: String,
    /// Market, from the parent folder.
    pub trade_type: StrategyKind,
    /// File uploaded to the services.
    pub strategy_file: PathBuf,
    /// Configuration uploaded to the trading service.
    pub config_file: PathBuf,
}

/// Scan `{strategy_dir}/{future,spot}/*/` for strategy folders.
///
/// Hidden folders are ignored, and folders missing either file are skipped
/// with a warning. Results are ordered by trade type, then name. A missing
/// `strategy_dir` yields no strategies.
pub fn discover_strategies(strategy_dir: &Path) -> Vec<DiscoveredStrategy> {
    if !strategy_dir.is_dir() {
        tracing::warn!(dir = %strategy_dir.display(), "strategy directory does not exist");
        return Vec::new();
    }

    let mut found = Vec::new();
    for trade_type in [StrategyKind::Future, StrategyKind::Spot] {
        let Ok(entries) = fs::read_dir(strategy_dir.join(trade_type.as_str())) else {
            continue;
        };

        let mut names: Vec<String> = entries
            .flatten()
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| !name.starts_with('.'))
            .collect();
        names.sort();

        for name in names {
            let files = strategy_file(strategy_dir, &name, trade_type).and_then(|strategy| {
                config_file(strategy_dir, &name, trade_type).map(|config| (strategy, config))
            });
            match files {
                Ok((strategy_file, config_file)) => {
                    let key = strategy_key(&name, trade_type);
                    tracing::debug!(strategy = %key, "discovered strategy");
                    found.push(DiscoveredStrategy {
                        key,
                        name,
                        trade_type,
                        strategy_file,
                        config_file,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        strategy = %name,
                        %trade_type,
                        error = %e,
                        "skipping strategy folder"
                    );
                }
            }
        }
    }
    found
}

fn strategy_key(strategy_name: &str, trade_type: StrategyKind) -> String {
    format!("{trade_type}.{strategy_name}")
}

/// File name of a saved report: `{YYYY-mm-dd_HH-MM}_{strategy}_backtest_report.html`.
pub fn report_file_name(strategy_name: &str, timestamp: DateTime<Local>) -> String {
    format!(
        "{}_{strategy_name}_backtest_report.html",
        timestamp.format("%Y-%m-%d_%H-%M")
    )
}
