//! Backtest command implementation.

use crate::data;
use anyhow::{Context, Result};
use nbr_client::{ApiClient, BacktestConfig, BacktestRunner, WeightMethod};
use std::{collections::BTreeMap, path::PathBuf};

/// Arguments of the backtest command.
#[derive(Debug)]
pub(crate) struct BacktestArgs {
    pub(crate) name: String,
    pub(crate) config: PathBuf,
    pub(crate) start: Option<String>,
    pub(crate) end: Option<String>,
    pub(crate) symbols: Vec<String>,
    pub(crate) capital: Option<f64>,
    pub(crate) leverage: Option<u32>,
    pub(crate) lookback: Option<u32>,
    pub(crate) weight_method: Option<WeightMethod>,
    pub(crate) weights: Option<PathBuf>,
    pub(crate) generate_report: bool,
    pub(crate) strategy_dir: PathBuf,
    pub(crate) output_dir: PathBuf,
}

/// Upload the strategy if needed, run the backtest and print the outcome.
pub(crate) async fn run_backtest(client: ApiClient, args: &BacktestArgs) -> Result<()> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                        Backtest                              ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let config = backtest_config(args)?;
    let strategy_config = data::load_json(&args.config)?;

    println!("Strategy: {}", config.strategy_name);
    println!("Period:   {} to {}", config.start_date, config.end_date);
    println!("Symbols:  {}", config.symbols.join(", "));
    println!(
        "Capital:  {:.2} (leverage {}x)",
        config.initial_capital, config.leverage
    );
    println!();

    let mut runner = BacktestRunner::new(client, &args.strategy_dir, &args.output_dir)?;
    runner
        .health_check()
        .await
        .context("backtest service is not reachable")?;

    let outcome = runner
        .run_complete_backtest(&config, &strategy_config)
        .await?;

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("RESULT");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    println!("{outcome}");
    Ok(())
}

fn backtest_config(args: &BacktestArgs) -> Result<BacktestConfig> {
    let mut config = BacktestConfig::for_strategy(&args.name);

    if let Some(start) = &args.start {
        config.start_date = data::parse_date(start)?;
    }
    if let Some(end) = &args.end {
        config.end_date = data::parse_date(end)?;
    }
    if !args.symbols.is_empty() {
        config.symbols = args.symbols.iter().map(|s| s.to_uppercase()).collect();
    }
    if let Some(capital) = args.capital {
        config.initial_capital = capital;
    }
    if let Some(leverage) = args.leverage {
        config.leverage = leverage;
    }
    if let Some(lookback) = args.lookback {
        config.lookback_minutes = lookback;
    }
    if let Some(weight_method) = args.weight_method {
        config.weight_method = weight_method;
    }
    if let Some(path) = &args.weights {
        let weights: BTreeMap<String, f64> = serde_json::from_value(data::load_json(path)?)
            .with_context(|| format!("{} must map symbols to weights", path.display()))?;
        config.custom_weights = Some(weights);
    }
    config.generate_report = args.generate_report;

    config.validate()?;
    Ok(config)
}
