//! Strategies command implementation.

use nbr_client::{DiscoveredStrategy, discover_strategies};
use nbr_strategies::{
    StrategyKind,
    registry::{StrategyMeta, available_strategies, strategies_by_kind},
};
use std::path::Path;

/// List registered strategies, optionally filtered by trade type, and the
/// strategy folders found below `strategy_dir` when one is given.
pub(crate) fn list_strategies(
    kind: Option<StrategyKind>,
    strategy_dir: Option<&Path>,
    verbose: bool,
) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                    Available Strategies                      ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let kinds = match kind {
        Some(kind) => vec![kind],
        None => vec![StrategyKind::Future, StrategyKind::Spot],
    };

    for kind in kinds.iter().copied() {
        let strategies = strategies_by_kind(kind);
        if strategies.is_empty() {
            continue;
        }

        println!("{} ({}):", kind, kind.description());
        println!("{}", "-".repeat(60));
        for meta in &strategies {
            println!("  {}", format_entry(meta, verbose));
        }
        println!();
    }

    if !verbose {
        println!("Use --verbose for strategy descriptions.\n");
    }

    println!("Strategy aliases:");
    println!("  momentum, mpm  -> multi_period_momentum");
    println!("  simple         -> first_last");
    println!("  coinbase50     -> coinbase50index");
    println!();

    if let Some(dir) = strategy_dir {
        let discovered: Vec<DiscoveredStrategy> = discover_strategies(dir)
            .into_iter()
            .filter(|found| kinds.contains(&found.trade_type))
            .collect();

        println!("Strategy files in {}:", dir.display());
        println!("{}", "-".repeat(60));
        if discovered.is_empty() {
            println!("  (none)");
        }
        for found in &discovered {
            println!("  {}", format_discovered(found, verbose));
        }
        println!();
    }

    tracing::debug!(count = available_strategies().len(), "listed strategies");
}

fn format_discovered(found: &DiscoveredStrategy, verbose: bool) -> String {
    if verbose {
        format!(
            "{:25} - {} + {}",
            found.key,
            found.strategy_file.display(),
            found.config_file.display()
        )
    } else {
        found.key.clone()
    }
}

fn format_entry(meta: &StrategyMeta, verbose: bool) -> String {
    if verbose {
        let configurable = if meta.configurable {
            "configurable"
        } else {
            "no parameters"
        };
        format!("{:25} - {} ({configurable})", meta.name, meta.description)
    } else {
        meta.name.to_string()
    }
}
