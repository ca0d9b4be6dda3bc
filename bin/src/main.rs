//! nbr CLI binary.
//!
//! Ranks assets with the multi-period momentum strategy and drives the
//! remote backtest, trading and position services.

mod cmd;
mod data;
mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};
use nbr_client::{ApiClient, ApiConfig, Service, WeightMethod};
use nbr_strategies::StrategyKind;
use std::{
    path::{Path, PathBuf},
    process,
};

#[derive(Parser)]
#[command(name = "nbr")]
#[command(about = "Multi-period momentum strategies and nb-runner backtests", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Load credentials from this file instead of `.env`
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available strategies
    Strategies {
        /// Filter by trade type (future or spot)
        #[arg(short, long)]
        kind: Option<StrategyKind>,

        /// Also list strategy folders found in this directory
        #[arg(long)]
        strategy_dir: Option<PathBuf>,
    },

    /// Rank assets from a CSV of prices
    Rank {
        /// Wide CSV: one time column plus one price column per asset
        #[arg(short, long)]
        prices: PathBuf,

        /// Strategy configuration (JSON); strategy defaults if omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Name of the time column
        #[arg(long, default_value = "timestamp")]
        time_column: String,

        /// Strategy name
        #[arg(short, long, default_value = "multi_period_momentum")]
        strategy: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: cmd::OutputFormat,

        /// Also show the score of every row
        #[arg(long)]
        history: bool,
    },

    /// Check that a remote service is reachable
    Health {
        /// Service (backtest, trading or position)
        #[arg(short, long, default_value = "backtest")]
        service: Service,
    },

    /// Upload a strategy file
    Upload {
        /// Strategy name
        name: String,

        /// Trade type (future or spot)
        #[arg(short, long, default_value = "future")]
        trade_type: StrategyKind,

        /// Target service (backtest or trading)
        #[arg(short, long, default_value = "backtest")]
        service: Service,

        /// Directory holding `{trade_type}/{name}/` strategy folders
        #[arg(long, default_value = "strategy")]
        strategy_dir: PathBuf,

        /// Configuration file for the trading service; found next to the
        /// strategy file if omitted
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check whether a strategy has been uploaded
    Check {
        /// Strategy name
        name: String,

        /// Trade type (future or spot)
        #[arg(short, long, default_value = "future")]
        trade_type: StrategyKind,

        /// Service to ask (backtest or trading)
        #[arg(short, long, default_value = "backtest")]
        service: Service,
    },

    /// Upload a strategy if needed and run a backtest
    Backtest {
        /// Strategy name
        name: String,

        /// Strategy configuration (JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,

        /// Symbols to trade
        #[arg(short, long, value_delimiter = ',')]
        symbols: Vec<String>,

        /// Initial capital
        #[arg(long)]
        capital: Option<f64>,

        /// Leverage
        #[arg(long)]
        leverage: Option<u32>,

        /// Lookback window in minutes
        #[arg(long)]
        lookback: Option<u32>,

        /// Weight method (equal, split or custom); index strategies default
        /// to custom, everything else to equal
        #[arg(long)]
        weight_method: Option<WeightMethod>,

        /// Custom weights (JSON object of symbol to weight)
        #[arg(long)]
        weights: Option<PathBuf>,

        /// Skip the HTML report
        #[arg(long)]
        no_report: bool,

        /// Directory holding `{trade_type}/{name}/` strategy folders
        #[arg(long, default_value = "strategy")]
        strategy_dir: PathBuf,

        /// Directory for HTML reports
        #[arg(short, long, default_value = "backtest_reports")]
        output_dir: PathBuf,
    },

    /// Start live trading for an uploaded strategy
    Trade {
        /// Strategy name
        name: String,

        /// Trading method
        #[arg(short, long, default_value = "rebalancing")]
        method: String,
    },

    /// Terminate a live trading session
    Terminate {
        /// Session id returned when trading started
        session_id: String,
    },

    /// List open positions
    Positions {
        /// Product type
        #[arg(long, default_value = "susdt-futures")]
        product_type: String,

        /// Margin coin
        #[arg(long, default_value = "susdt")]
        margin_coin: String,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(logging::default_level(cli.verbose))?;

    match cli.command {
        Commands::Strategies { kind, strategy_dir } => {
            cmd::strategies::list_strategies(kind, strategy_dir.as_deref(), cli.verbose);
        }
        Commands::Rank {
            prices,
            config,
            time_column,
            strategy,
            format,
            history,
        } => {
            cmd::rank::rank(&cmd::rank::RankArgs {
                prices,
                config,
                time_column,
                strategy,
                format,
                history,
            })?;
        }
        Commands::Health { service } => {
            let client = client(cli.env_file.as_deref())?;
            cmd::service::health(&client, service).await?;
        }
        Commands::Upload {
            name,
            trade_type,
            service,
            strategy_dir,
            config,
        } => {
            let client = client(cli.env_file.as_deref())?;
            cmd::service::upload(
                &client,
                &name,
                trade_type,
                service,
                &strategy_dir,
                config.as_deref(),
            )
            .await?;
        }
        Commands::Check {
            name,
            trade_type,
            service,
        } => {
            let client = client(cli.env_file.as_deref())?;
            cmd::service::check(&client, &name, trade_type, service).await?;
        }
        Commands::Backtest {
            name,
            config,
            start,
            end,
            symbols,
            capital,
            leverage,
            lookback,
            weight_method,
            weights,
            no_report,
            strategy_dir,
            output_dir,
        } => {
            let client = client(cli.env_file.as_deref())?;
            let args = cmd::backtest::BacktestArgs {
                name,
                config,
                start,
                end,
                symbols,
                capital,
                leverage,
                lookback,
                weight_method,
                weights,
                generate_report: !no_report,
                strategy_dir,
                output_dir,
            };
            cmd::backtest::run_backtest(client, &args).await?;
        }
        Commands::Trade { name, method } => {
            let client = client(cli.env_file.as_deref())?;
            cmd::service::trade(&client, &name, &method).await?;
        }
        Commands::Terminate { session_id } => {
            let client = client(cli.env_file.as_deref())?;
            cmd::service::terminate(&client, &session_id).await?;
        }
        Commands::Positions {
            product_type,
            margin_coin,
        } => {
            let client = client(cli.env_file.as_deref())?;
            cmd::service::positions(&client, &product_type, &margin_coin).await?;
        }
    }

    Ok(())
}

fn client(env_file: Option<&Path>) -> Result<ApiClient> {
    let config = match env_file {
        Some(path) => ApiConfig::from_env_file(path)?,
        None => ApiConfig::from_env()?,
    };
    Ok(ApiClient::new(config)?)
}
