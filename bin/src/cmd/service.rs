//! Commands that call the remote services directly.

use crate::cmd::print_response;
use anyhow::{Result, bail};
use nbr_client::{ApiClient, Service, config_file, strategy_file};
use nbr_strategies::StrategyKind;
use std::path::{Path, PathBuf};

/// Check that a service is reachable.
pub(crate) async fn health(client: &ApiClient, service: Service) -> Result<()> {
    let response = client.health_check(service).await?;
    println!("{service} service is healthy");
    print_response(&response);
    Ok(())
}

/// Upload a strategy file. Uploads to the trading service also send the
/// configuration file, `config` or the one found next to the strategy.
pub(crate) async fn upload(
    client: &ApiClient,
    name: &str,
    trade_type: StrategyKind,
    service: Service,
    strategy_dir: &Path,
    config: Option<&Path>,
) -> Result<()> {
    if service == Service::Position {
        bail!("strategies can only be uploaded to the backtest or trading service");
    }

    let file = strategy_file(strategy_dir, name, trade_type)?;
    tracing::info!(file = %file.display(), %service, "uploading strategy");

    let response = client.upload_strategy(&file, trade_type, service).await?;
    println!("Uploaded {} to the {service} service", file.display());
    print_response(&response);

    if let Some(config) = trading_config(strategy_dir, name, trade_type, service, config)? {
        let response = client.upload_config(&config).await?;
        println!("Uploaded {} to the trading service", config.display());
        print_response(&response);
    }
    Ok(())
}

fn trading_config(
    strategy_dir: &Path,
    name: &str,
    trade_type: StrategyKind,
    service: Service,
    config: Option<&Path>,
) -> Result<Option<PathBuf>> {
    match (config, service) {
        (Some(config), _) => Ok(Some(config.to_path_buf())),
        (None, Service::Trading) => Ok(Some(config_file(strategy_dir, name, trade_type)?)),
        (None, _) => Ok(None),
    }
}

/// Ask a service whether a strategy has been uploaded.
pub(crate) async fn check(
    client: &ApiClient,
    name: &str,
    trade_type: StrategyKind,
    service: Service,
) -> Result<()> {
    let response = client
        .check_uploaded_strategy(name, trade_type, service)
        .await?;
    print_response(&response);
    Ok(())
}

/// Start live trading.
pub(crate) async fn trade(client: &ApiClient, name: &str, method: &str) -> Result<()> {
    let response = client.start_trading(name, method).await?;
    println!("Started trading {name} ({method})");
    print_response(&response);
    Ok(())
}

/// Terminate a live trading session.
pub(crate) async fn terminate(client: &ApiClient, session_id: &str) -> Result<()> {
    let response = client.terminate_trading(session_id).await?;
    println!("Terminated session {session_id}");
    print_response(&response);
    Ok(())
}

/// List open positions.
pub(crate) async fn positions(
    client: &ApiClient,
    product_type: &str,
    margin_coin: &str,
) -> Result<()> {
    let response = client.get_positions(product_type, margin_coin).await?;
    print_response(&response);
    Ok(())
}
