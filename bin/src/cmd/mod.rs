//! CLI subcommand modules.
//!
//! This module contains the implementations for all nbr CLI subcommands.

pub(crate) mod backtest;
pub(crate) mod rank;
pub(crate) mod service;
pub(crate) mod strategies;

use clap::ValueEnum;

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable tables
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Print a service response.
pub(crate) fn print_response(value: &serde_json::Value) {
    match value {
        serde_json::Value::String(text) => println!("{text}"),
        other => println!(
            "{}",
            serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string())
        ),
    }
}
