//! Rank command implementation.

use crate::{cmd::OutputFormat, data};
use anyhow::Result;
use nbr_strategies::{
    create_strategy,
    momentum::{MomentumConfig, MomentumHistory, MomentumScores, MultiPeriodMomentum},
};
use nbr_traits::{PriceMatrix, RankedCandidates, Strategy};
use serde_json::{Map, Value, json};
use std::{fmt, fmt::Write as _, path::PathBuf};

/// Arguments of the rank command.
#[derive(Debug)]
pub(crate) struct RankArgs {
    pub(crate) prices: PathBuf,
    pub(crate) config: Option<PathBuf>,
    pub(crate) time_column: String,
    pub(crate) strategy: String,
    pub(crate) format: OutputFormat,
    pub(crate) history: bool,
}

/// Everything the rank command prints.
#[derive(Debug)]
struct RankReport {
    strategy: String,
    candidates: RankedCandidates,
    scores: Option<MomentumScores>,
    history: Option<MomentumHistory>,
}

/// Rank the assets of a CSV price table.
pub(crate) fn rank(args: &RankArgs) -> Result<()> {
    let prices = data::load_prices(&args.prices, &args.time_column)?;
    tracing::debug!(
        rows = prices.len(),
        assets = prices.n_assets(),
        path = %args.prices.display(),
        "loaded prices"
    );

    let config = match &args.config {
        Some(path) => data::load_json(path)?,
        None => serde_json::to_value(MomentumConfig::default())?,
    };

    let report = build_report(&args.strategy, &config, prices, args.history)?;
    match args.format {
        OutputFormat::Text => print!("{}", render_text(&report)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&to_json(&report))?),
    }
    Ok(())
}

fn build_report(
    strategy_name: &str,
    config: &Value,
    prices: PriceMatrix,
    with_history: bool,
) -> Result<RankReport> {
    let strategy = create_strategy(strategy_name, config)?;

    let (scores, history) = if strategy.name() == "multi_period_momentum" {
        let momentum = MultiPeriodMomentum::from_json(config)?;
        let prices = momentum.preprocess(prices.clone())?;
        let scores = momentum.scores(&prices)?;
        let history = with_history
            .then(|| momentum.history(&prices))
            .transpose()?;
        (Some(scores), history)
    } else {
        (None, None)
    };

    let candidates = strategy.run(prices)?;
    tracing::info!(
        strategy = strategy.name(),
        long = candidates.long.len(),
        short = candidates.short.len(),
        "ranked candidates"
    );

    Ok(RankReport {
        strategy: strategy.name().to_string(),
        candidates,
        scores,
        history,
    })
}

fn render_text(report: &RankReport) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_text(&mut out, report)?;
    Ok(out)
}

fn write_text(out: &mut String, report: &RankReport) -> fmt::Result {
    writeln!(out, "\n╔══════════════════════════════════════════════════════════════╗")?;
    writeln!(out, "║                      Ranked Candidates                       ║")?;
    writeln!(out, "╚══════════════════════════════════════════════════════════════╝\n")?;
    writeln!(out, "Strategy: {}\n", report.strategy)?;
    writeln!(out, "Long:  {}", join_or_none(&report.candidates.long))?;
    writeln!(out, "Short: {}", join_or_none(&report.candidates.short))?;

    if let Some(scores) = &report.scores {
        let mut ranked: Vec<(&str, f64)> = scores.iter().collect();
        // undefined scores last
        ranked.sort_by(|a, b| {
            b.1.is_finite()
                .cmp(&a.1.is_finite())
                .then(b.1.total_cmp(&a.1))
        });

        writeln!(out, "\n{:<12} {:>12}", "Symbol", "Score")?;
        writeln!(out, "{}", "─".repeat(25))?;
        for (symbol, score) in ranked {
            if score.is_finite() {
                writeln!(out, "{symbol:<12} {score:>12.6}")?;
            } else {
                writeln!(out, "{symbol:<12} {:>12}", "n/a")?;
            }
        }
    }

    if let Some(history) = &report.history {
        match history.to_dataframe() {
            Ok(df) => writeln!(out, "\nScore history:\n{df}")?,
            Err(e) => writeln!(out, "\nScore history unavailable: {e}")?,
        }
    }

    writeln!(out)
}

fn to_json(report: &RankReport) -> Value {
    let mut value = json!({
        "strategy": report.strategy,
        "long": report.candidates.long,
        "short": report.candidates.short,
    });

    if let Some(scores) = &report.scores {
        let map: Map<String, Value> = scores
            .iter()
            .map(|(symbol, score)| (symbol.to_string(), Value::from(score)))
            .collect();
        value["scores"] = Value::Object(map);
    }

    if let Some(history) = &report.history {
        let series: Map<String, Value> = history
            .symbols()
            .iter()
            .zip(history.scores().columns())
            .map(|(symbol, column)| {
                let values = column.iter().map(|&s| Value::from(s)).collect();
                (symbol.clone(), Value::Array(values))
            })
            .collect();
        value["history"] = json!({
            "timestamps": history.timestamps(),
            "scores": series,
        });
    }

    value
}

fn join_or_none(symbols: &[String]) -> String {
    if symbols.is_empty() {
        "(none)".to_string()
    } else {
        symbols.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prices() -> PriceMatrix {
        PriceMatrix::from_columns(
            vec![0, 60, 120, 180],
            vec![
                ("A".to_string(), vec![100.0, 101.0, 102.0, 110.0]),
                ("B".to_string(), vec![100.0, 100.0, 100.0, 100.0]),
                ("C".to_string(), vec![100.0, 99.0, 98.0, 90.0]),
            ],
        )
        .unwrap()
    }

    fn config() -> Value {
        json!({
            "strategy_config": {
                "minutes": [1, 3],
                "long_maximum_candidates": 1,
                "short_maximum_candidates": 1
            }
        })
    }

    #[test]
    fn test_build_report_momentum() {
        let report = build_report("mpm", &config(), prices(), true).unwrap();
        assert_eq!(report.strategy, "multi_period_momentum");
        assert_eq!(report.candidates.long, vec!["A"]);
        assert_eq!(report.candidates.short, vec!["C"]);
        assert_eq!(report.scores.as_ref().unwrap().len(), 3);
        assert_eq!(report.history.as_ref().unwrap().timestamps().len(), 4);
    }

    #[test]
    fn test_build_report_template_strategy() {
        let report = build_report("first_last", &Value::Null, prices(), false).unwrap();
        assert_eq!(report.candidates.long, vec!["A"]);
        assert_eq!(report.candidates.short, vec!["C"]);
        assert!(report.scores.is_none());
    }

    #[test]
    fn test_build_report_insufficient_data() {
        let config = json!({ "minutes": [10] });
        assert!(build_report("multi_period_momentum", &config, prices(), false).is_err());
    }

    #[test]
    fn test_json_output() {
        let report = build_report("multi_period_momentum", &config(), prices(), true).unwrap();
        let value = to_json(&report);
        assert_eq!(value["long"], json!(["A"]));
        assert_eq!(value["short"], json!(["C"]));
        assert_eq!(value["scores"]["B"], json!(0.0));
        // rows before the longest horizon have no score
        assert_eq!(value["history"]["scores"]["A"][0], Value::Null);
        assert_eq!(value["history"]["timestamps"], json!([0, 60, 120, 180]));
    }

    #[test]
    fn test_text_output() {
        let report = build_report("multi_period_momentum", &config(), prices(), false).unwrap();
        let text = render_text(&report).unwrap();
        assert!(text.contains("Long:  A"));
        assert!(text.contains("Short: C"));

        let empty = RankReport {
            strategy: "x".to_string(),
            candidates: RankedCandidates::empty(),
            scores: None,
            history: None,
        };
        assert!(render_text(&empty).unwrap().contains("Long:  (none)"));
    }
}
