//! Input loading for the nbr CLI.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use nbr_traits::PriceMatrix;
use polars::prelude::*;
use serde_json::Value;
use std::{fs, path::Path};

/// Load a wide price table from CSV.
///
/// The time column may hold integer epochs or date/datetime strings; asset
/// columns with no values at all are read as `f64` so they can be dropped
/// during preprocessing.
pub(crate) fn load_prices(path: &Path, time_column: &str) -> Result<PriceMatrix> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .map_parse_options(|options| options.with_try_parse_dates(true))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("failed to open {}", path.display()))?
        .finish()
        .with_context(|| format!("failed to parse {}", path.display()))?;

    if let Ok(column) = df.column(time_column)
        && column.dtype() == &DataType::String
    {
        bail!(
            "could not parse time column '{time_column}' as integers or datetimes in {}",
            path.display()
        );
    }

    let columns = df
        .get_columns()
        .iter()
        .map(|column| {
            if column.name().as_str() != time_column
                && !column.is_empty()
                && column.null_count() == column.len()
            {
                column.cast(&DataType::Float64)
            } else {
                Ok(column.clone())
            }
        })
        .collect::<PolarsResult<Vec<Column>>>()?;

    Ok(PriceMatrix::with_time_column(
        DataFrame::new(columns)?,
        time_column,
    )?)
}

/// Load a JSON document such as a strategy configuration.
pub(crate) fn load_json(path: &Path) -> Result<Value> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

/// Parse a date string in YYYY-MM-DD format.
pub(crate) fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{date_str}', expected YYYY-MM-DD"))
}
