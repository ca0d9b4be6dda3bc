//! Composite multi-horizon momentum scores.
//!
//! For an asset with prices `p` and a final row `t`, each horizon `h`
//! contributes the per-row rate
//!
//! ```text
//! adj_h = (p[t] / p[t - h]) ^ (1 / h) - 1
//! ```
//!
//! and the score is the mean of `adj_h` over all horizons. Taking the `h`-th
//! root puts returns of different lengths on the same per-row scale before
//! they are averaged.

use super::HorizonSet;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use nbr_traits::{NbrError, PriceMatrix, Result, Symbol};
use polars::prelude::*;

/// Momentum scores at the final timestamp, one per asset in column order.
#[derive(Debug, Clone)]
pub struct MomentumScores {
    symbols: Vec<Symbol>,
    scores: Array1<f64>,
}

impl MomentumScores {
    /// Pairs symbols with scores.
    ///
    /// # Errors
    ///
    /// Returns [`NbrError::InvalidInput`] if the lengths differ.
    pub fn new(symbols: Vec<Symbol>, scores: Array1<f64>) -> Result<Self> {
        if symbols.len() != scores.len() {
            return Err(NbrError::invalid_input(format!(
                "{} symbols but {} scores",
                symbols.len(),
                scores.len()
            )));
        }
        Ok(Self { symbols, scores })
    }

    /// Asset identifiers in input column order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Scores aligned with [`MomentumScores::symbols`].
    pub const fn scores(&self) -> &Array1<f64> {
        &self.scores
    }

    /// Score for one asset.
    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.symbols
            .iter()
            .position(|s| s == symbol)
            .map(|i| self.scores[i])
    }

    /// Iterates `(symbol, score)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.symbols
            .iter()
            .map(String::as_str)
            .zip(self.scores.iter().copied())
    }

    /// Number of assets.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether there are no assets.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Momentum scores for every row of a price matrix.
///
/// Rows before the longest horizon hold `NaN`.
#[derive(Debug, Clone)]
pub struct MomentumHistory {
    timestamps: Vec<i64>,
    symbols: Vec<Symbol>,
    scores: Array2<f64>,
}

impl MomentumHistory {
    /// Timestamps in physical integer form, one per row.
    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps
    }

    /// Asset identifiers, one per column.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// `rows × assets` score matrix.
    pub const fn scores(&self) -> &Array2<f64> {
        &self.scores
    }

    /// Scores of the final row, the ones used for ranking.
    pub fn latest(&self) -> MomentumScores {
        let last = self.scores.nrows().saturating_sub(1);
        MomentumScores {
            symbols: self.symbols.clone(),
            scores: self.scores.row(last).to_owned(),
        }
    }

    /// The history as a DataFrame with a `timestamp` column and one score
    /// column per asset; undefined scores become nulls.
    ///
    /// # Errors
    ///
    /// Returns an error if the DataFrame cannot be assembled.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(self.symbols.len() + 1);
        columns.push(Column::new("timestamp".into(), self.timestamps.clone()));
        for (symbol, scores) in self.symbols.iter().zip(self.scores.axis_iter(Axis(1))) {
            let values: Vec<Option<f64>> = scores
                .iter()
                .map(|&s| s.is_finite().then_some(s))
                .collect();
            columns.push(Column::new(symbol.as_str().into(), values));
        }
        Ok(DataFrame::new(columns)?)
    }
}

/// Composite score at row `t` of one price series.
///
/// Horizons reaching before the first row contribute nothing, but the mean is
/// still taken over the full horizon count.
fn composite_at(prices: ArrayView1<'_, f64>, t: usize, horizons: &HorizonSet) -> f64 {
    let current = prices[t];
    let sum: f64 = horizons
        .iter()
        .filter(|&h| h <= t)
        .map(|h| {
            let raw_return = current / prices[t - h] - 1.0;
            (1.0 + raw_return).powf(1.0 / h as f64) - 1.0
        })
        .sum();
    sum / horizons.len() as f64
}

fn ensure_history(rows: usize, horizons: &HorizonSet) -> Result<()> {
    let needed = horizons.max() + 1;
    if rows < needed {
        return Err(NbrError::insufficient_data(format!(
            "longest horizon is {} rows, need at least {needed} rows of prices, got {rows}",
            horizons.max()
        )));
    }
    Ok(())
}

/// Computes the momentum score of every asset at the final timestamp.
///
/// # Errors
///
/// Returns [`NbrError::InsufficientData`] if the matrix has `max(horizons)`
/// rows or fewer.
pub fn momentum_scores(prices: &PriceMatrix, horizons: &HorizonSet) -> Result<MomentumScores> {
    ensure_history(prices.len(), horizons)?;

    let matrix = prices.to_array()?;
    let t = matrix.nrows() - 1;
    let scores = matrix
        .axis_iter(Axis(1))
        .map(|column| composite_at(column, t, horizons))
        .collect::<Array1<f64>>();

    MomentumScores::new(prices.symbols(), scores)
}

/// Computes momentum scores for every row from `max(horizons)` onwards.
///
/// Useful for plotting and debugging; ranking only needs the final row.
///
/// # Errors
///
/// Returns [`NbrError::InsufficientData`] under the same condition as
/// [`momentum_scores`].
pub fn momentum_history(prices: &PriceMatrix, horizons: &HorizonSet) -> Result<MomentumHistory> {
    ensure_history(prices.len(), horizons)?;

    let matrix = prices.to_array()?;
    let start = horizons.max();
    let mut scores = Array2::from_elem(matrix.dim(), f64::NAN);
    for (j, column) in matrix.axis_iter(Axis(1)).enumerate() {
        for t in start..matrix.nrows() {
            scores[[t, j]] = composite_at(column, t, horizons);
        }
    }

    Ok(MomentumHistory {
        timestamps: prices.timestamps()?,
        symbols: prices.symbols(),
        scores,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn matrix(columns: Vec<(&str, Vec<f64>)>) -> PriceMatrix {
        let rows = columns[0].1.len();
        PriceMatrix::from_columns(
            (0..rows as i64).collect(),
            columns
                .into_iter()
                .map(|(s, p)| (s.to_string(), p))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_single_horizon_is_return() {
        let prices = matrix(vec![("A", vec![100.0, 110.0])]);
        let horizons = HorizonSet::new(&[1]).unwrap();
        let scores = momentum_scores(&prices, &horizons).unwrap();
        assert_relative_eq!(scores.get("A").unwrap(), 0.10, epsilon = 1e-12);
    }

    #[test]
    fn test_rate_adjustment() {
        // 21% over two rows is 10% per row
        let prices = matrix(vec![("A", vec![100.0, 105.0, 121.0])]);
        let horizons = HorizonSet::new(&[2]).unwrap();
        let scores = momentum_scores(&prices, &horizons).unwrap();
        assert_relative_eq!(scores.get("A").unwrap(), 0.10, epsilon = 1e-12);
    }

    #[test]
    fn test_mean_over_horizons() {
        let prices = matrix(vec![("A", vec![100.0, 100.0, 121.0])]);
        let horizons = HorizonSet::new(&[1, 2]).unwrap();
        let scores = momentum_scores(&prices, &horizons).unwrap();
        // h=1: 0.21, h=2: 0.10
        assert_relative_eq!(scores.get("A").unwrap(), 0.155, epsilon = 1e-12);
    }

    #[test]
    fn test_duplicate_horizons_do_not_reweight() {
        let prices = matrix(vec![("A", vec![100.0, 100.0, 121.0])]);
        let once = momentum_scores(&prices, &HorizonSet::new(&[1, 2]).unwrap()).unwrap();
        let twice = momentum_scores(&prices, &HorizonSet::new(&[1, 2, 1]).unwrap()).unwrap();
        assert_relative_eq!(once.get("A").unwrap(), twice.get("A").unwrap());
    }

    #[test]
    fn test_insufficient_data() {
        let prices = matrix(vec![("A", vec![1.0, 2.0, 3.0])]);
        for h in [3, 4, 10] {
            let horizons = HorizonSet::new(&[1, h]).unwrap();
            assert!(matches!(
                momentum_scores(&prices, &horizons),
                Err(NbrError::InsufficientData(_))
            ));
            assert!(matches!(
                momentum_history(&prices, &horizons),
                Err(NbrError::InsufficientData(_))
            ));
        }
        assert!(momentum_scores(&prices, &HorizonSet::new(&[2]).unwrap()).is_ok());
    }

    #[test]
    fn test_missing_price_gives_nan() {
        let prices = matrix(vec![
            ("A", vec![1.0, f64::NAN, 2.0]),
            ("B", vec![f64::NAN, 1.0, 2.0]),
        ]);
        let scores = momentum_scores(&prices, &HorizonSet::new(&[2]).unwrap()).unwrap();
        assert!(scores.get("A").unwrap().is_finite());
        assert!(scores.get("B").unwrap().is_nan());
    }

    #[test]
    fn test_history_matches_latest() {
        let prices = matrix(vec![
            ("A", vec![1.0, 1.1, 1.2, 1.25, 1.3]),
            ("B", vec![2.0, 1.9, 1.95, 1.8, 1.7]),
        ]);
        let horizons = HorizonSet::new(&[1, 3]).unwrap();
        let history = momentum_history(&prices, &horizons).unwrap();
        let latest = momentum_scores(&prices, &horizons).unwrap();

        assert_eq!(history.scores().dim(), (5, 2));
        assert!(history.scores()[[2, 0]].is_nan());
        assert!(history.scores()[[3, 0]].is_finite());
        for (symbol, score) in latest.iter() {
            assert_relative_eq!(history.latest().get(symbol).unwrap(), score);
        }
    }

    #[test]
    fn test_history_to_dataframe() {
        let prices = matrix(vec![("A", vec![1.0, 2.0, 4.0])]);
        let history = momentum_history(&prices, &HorizonSet::new(&[1]).unwrap()).unwrap();
        let df = history.to_dataframe().unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(df.column("A").unwrap().null_count(), 1);
    }

    #[test]
    fn test_composite_skips_short_history() {
        let prices = ndarray::array![1.0, 2.0];
        // h=5 reaches before row 0 and is skipped, the divisor stays 2
        let horizons = HorizonSet::new(&[1, 5]).unwrap();
        assert_relative_eq!(composite_at(prices.view(), 1, &horizons), 0.5);
    }

    #[test]
    fn test_scores_length_mismatch() {
        let result = MomentumScores::new(vec!["A".to_string()], Array1::zeros(2));
        assert!(matches!(result, Err(NbrError::InvalidInput(_))));
    }
}
