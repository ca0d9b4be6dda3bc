//! Common types used throughout the nbr framework.
//!
//! This module defines the price matrix consumed by strategies and the
//! candidate lists they produce.

use crate::{NbrError, Result};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An asset identifier such as `"BTCUSDT"`.
pub type Symbol = String;

/// Name of the time column when none is given explicitly.
pub const DEFAULT_TIME_COLUMN: &str = "timestamp";

/// A time-indexed matrix of asset prices.
///
/// `PriceMatrix` wraps a wide Polars DataFrame: one time column plus one
/// numeric column per asset. Rows are ordered by strictly increasing time.
///
/// # Expected Schema
///
/// - a time column (`timestamp` by default) of dtype `Datetime`, `Date` or an
///   integer epoch, without nulls
/// - one numeric column per asset, named after the asset; missing cells are
///   read as `NaN`
///
/// # Example
///
/// ```no_run
/// use nbr_traits::PriceMatrix;
/// use polars::prelude::*;
///
/// let df = df! {
///     "timestamp" => &[1_i64, 2, 3],
///     "BTCUSDT" => &[100.0, 101.0, 102.0],
///     "ETHUSDT" => &[10.0, 9.5, 9.0],
/// }.unwrap();
///
/// let prices = PriceMatrix::new(df).unwrap();
/// assert_eq!(prices.symbols(), vec!["BTCUSDT", "ETHUSDT"]);
/// ```
#[derive(Debug, Clone)]
pub struct PriceMatrix {
    data: DataFrame,
    time_column: String,
}

impl PriceMatrix {
    /// Creates a price matrix whose time column is named `timestamp`.
    ///
    /// # Errors
    ///
    /// Returns [`NbrError::InvalidInput`] if the DataFrame is not a
    /// time-indexed table of numeric asset columns with at least one row and
    /// one asset.
    pub fn new(data: DataFrame) -> Result<Self> {
        Self::with_time_column(data, DEFAULT_TIME_COLUMN)
    }

    /// Creates a price matrix using `time_column` as the time index.
    ///
    /// # Errors
    ///
    /// See [`PriceMatrix::new`].
    pub fn with_time_column(data: DataFrame, time_column: impl Into<String>) -> Result<Self> {
        let time_column = time_column.into();

        let time = data.column(&time_column).map_err(|_| {
            NbrError::invalid_input(format!("missing time column '{time_column}'"))
        })?;
        let time_dtype = time.dtype();
        if !(matches!(time_dtype, DataType::Date | DataType::Datetime(_, _))
            || time_dtype.is_integer())
        {
            return Err(NbrError::invalid_input(format!(
                "time column '{time_column}' has dtype {time_dtype}, expected a date, datetime or integer epoch"
            )));
        }

        if data.height() == 0 {
            return Err(NbrError::invalid_input("price matrix has no rows"));
        }
        if data.width() < 2 {
            return Err(NbrError::invalid_input("price matrix has no asset columns"));
        }

        for column in data.get_columns() {
            if column.name().as_str() == time_column {
                continue;
            }
            let dtype = column.dtype();
            if !(dtype.is_float() || dtype.is_integer()) {
                return Err(NbrError::invalid_input(format!(
                    "asset column '{}' has non-numeric dtype {dtype}",
                    column.name()
                )));
            }
        }

        let matrix = Self { data, time_column };

        let timestamps = matrix.timestamps()?;
        if timestamps.windows(2).any(|w| w[1] <= w[0]) {
            return Err(NbrError::invalid_input(
                "timestamps must be strictly increasing",
            ));
        }

        Ok(matrix)
    }

    /// Builds a price matrix from integer timestamps and per-asset price
    /// vectors. Column order follows `columns`.
    ///
    /// # Errors
    ///
    /// Returns an error if the vectors have different lengths, symbols repeat,
    /// or the resulting table fails the checks of [`PriceMatrix::new`].
    pub fn from_columns(timestamps: Vec<i64>, columns: Vec<(Symbol, Vec<f64>)>) -> Result<Self> {
        let mut frame_columns = Vec::with_capacity(columns.len() + 1);
        let mut seen = HashSet::with_capacity(columns.len());
        frame_columns.push(Column::new(DEFAULT_TIME_COLUMN.into(), timestamps));
        for (symbol, prices) in columns {
            if symbol == DEFAULT_TIME_COLUMN {
                return Err(NbrError::invalid_input(format!(
                    "asset name '{symbol}' collides with the time column"
                )));
            }
            if !seen.insert(symbol.clone()) {
                return Err(NbrError::invalid_input(format!(
                    "duplicate asset column '{symbol}'"
                )));
            }
            frame_columns.push(Column::new(symbol.as_str().into(), prices));
        }

        let data = DataFrame::new(frame_columns)
            .map_err(|e| NbrError::invalid_input(format!("malformed price table: {e}")))?;
        Self::new(data)
    }

    /// Returns a reference to the underlying DataFrame.
    pub const fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Consumes self and returns the underlying DataFrame.
    pub fn into_inner(self) -> DataFrame {
        self.data
    }

    /// Name of the time column.
    pub fn time_column(&self) -> &str {
        &self.time_column
    }

    /// Number of timestamps (rows).
    pub fn len(&self) -> usize {
        self.data.height()
    }

    /// Whether the matrix has no rows.
    pub fn is_empty(&self) -> bool {
        self.data.height() == 0
    }

    /// Number of asset columns.
    pub fn n_assets(&self) -> usize {
        self.data.width().saturating_sub(1)
    }

    /// Asset identifiers in column order.
    pub fn symbols(&self) -> Vec<Symbol> {
        self.data
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .filter(|s| *s != self.time_column)
            .collect()
    }

    /// Timestamps as their physical integer representation.
    ///
    /// # Errors
    ///
    /// Returns [`NbrError::InvalidInput`] if the time column contains nulls.
    pub fn timestamps(&self) -> Result<Vec<i64>> {
        let series = self.data.column(&self.time_column)?.as_materialized_series();
        let physical = series.to_physical_repr().cast(&DataType::Int64)?;
        physical
            .i64()?
            .into_iter()
            .map(|t| {
                t.ok_or_else(|| {
                    NbrError::invalid_input(format!(
                        "time column '{}' contains nulls",
                        self.time_column
                    ))
                })
            })
            .collect()
    }

    /// Price series for one asset, with missing cells as `NaN`.
    ///
    /// # Errors
    ///
    /// Returns [`NbrError::InvalidInput`] if the asset is unknown.
    pub fn prices(&self, symbol: &str) -> Result<Vec<f64>> {
        if symbol == self.time_column {
            return Err(NbrError::invalid_input(format!("'{symbol}' is not an asset")));
        }
        let column = self
            .data
            .column(symbol)
            .map_err(|_| NbrError::invalid_input(format!("unknown asset '{symbol}'")))?;
        let values = column.as_materialized_series().cast(&DataType::Float64)?;
        Ok(values
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect())
    }

    /// Dense `rows × assets` price array in column order.
    ///
    /// # Errors
    ///
    /// Returns an error if a column cannot be read as `f64`.
    pub fn to_array(&self) -> Result<Array2<f64>> {
        let symbols = self.symbols();
        let mut array = Array2::from_elem((self.len(), symbols.len()), f64::NAN);
        for (j, symbol) in symbols.iter().enumerate() {
            let prices = self.prices(symbol)?;
            for (i, price) in prices.into_iter().enumerate() {
                array[[i, j]] = price;
            }
        }
        Ok(array)
    }

    /// Drops asset columns with no finite price at all.
    ///
    /// # Errors
    ///
    /// Returns [`NbrError::InvalidInput`] if no asset column remains.
    pub fn drop_empty_assets(self) -> Result<Self> {
        let mut keep = vec![self.time_column.clone()];
        for symbol in self.symbols() {
            if self.prices(&symbol)?.iter().any(|p| p.is_finite()) {
                keep.push(symbol);
            }
        }

        if keep.len() < 2 {
            return Err(NbrError::invalid_input("no valid data after preprocessing"));
        }
        if keep.len() == self.data.width() {
            return Ok(self);
        }

        let data = self.data.select(keep)?;
        Ok(Self {
            data,
            time_column: self.time_column,
        })
    }
}

impl AsRef<DataFrame> for PriceMatrix {
    fn as_ref(&self) -> &DataFrame {
        &self.data
    }
}

/// Long and short candidates selected by a strategy.
///
/// `long` is ordered from the highest score down; `short` keeps the order of
/// the tail of the same descending ranking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedCandidates {
    /// Assets to buy.
    pub long: Vec<Symbol>,
    /// Assets to sell.
    pub short: Vec<Symbol>,
}

impl RankedCandidates {
    /// Creates candidates from raw long and short lists.
    pub const fn new(long: Vec<Symbol>, short: Vec<Symbol>) -> Self {
        Self { long, short }
    }

    /// No candidates on either side.
    pub const fn empty() -> Self {
        Self {
            long: Vec::new(),
            short: Vec::new(),
        }
    }

    /// Removes from `short` every asset that is also a long candidate.
    #[must_use]
    pub fn prioritize_long(mut self) -> Self {
        let long = &self.long;
        self.short.retain(|s| !long.contains(s));
        self
    }

    /// Whether no asset is both long and short.
    pub fn is_disjoint(&self) -> bool {
        !self.short.iter().any(|s| self.long.contains(s))
    }

    /// Whether both sides are empty.
    pub fn is_empty(&self) -> bool {
        self.long.is_empty() && self.short.is_empty()
    }

    /// Splits into `(long, short)`.
    pub fn into_parts(self) -> (Vec<Symbol>, Vec<Symbol>) {
        (self.long, self.short)
    }
}
