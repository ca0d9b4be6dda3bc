//! Ranking momentum scores into long and short candidates.

use super::{HorizonSet, MomentumScores, momentum_scores};
use nbr_traits::{PriceMatrix, RankedCandidates, Result};
use std::cmp::Ordering;

/// Ranks assets by score and picks the head and tail.
///
/// Assets are sorted by descending score; ties keep input column order.
/// `long` is the first `long_k` entries, `short` the last `short_k` entries in
/// the same descending order. Any asset on both sides is removed from
/// `short`. Assets without a finite score are left out of the ranking.
pub fn rank_candidates(scores: &MomentumScores, long_k: usize, short_k: usize) -> RankedCandidates {
    let mut ranked: Vec<(&str, f64)> = scores.iter().filter(|(_, s)| s.is_finite()).collect();
    // stable sort, so equal scores stay in column order
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let long = ranked
        .iter()
        .take(long_k)
        .map(|(symbol, _)| symbol.to_string())
        .collect();
    let short = ranked[ranked.len().saturating_sub(short_k)..]
        .iter()
        .map(|(symbol, _)| symbol.to_string())
        .collect();

    RankedCandidates::new(long, short).prioritize_long()
}

/// Scores every asset at the final timestamp and ranks them.
///
/// # Errors
///
/// Returns [`nbr_traits::NbrError::InsufficientData`] if `prices` has
/// `max(horizons)` rows or fewer.
///
/// # Example
///
/// ```no_run
/// use nbr_strategies::momentum::{HorizonSet, score_and_rank};
/// use nbr_traits::PriceMatrix;
///
/// let prices = PriceMatrix::from_columns(
///     vec![0, 1],
///     vec![
///         ("A".to_string(), vec![100.0, 102.0]),
///         ("B".to_string(), vec![100.0, 97.0]),
///     ],
/// ).unwrap();
/// let horizons = HorizonSet::new(&[1]).unwrap();
///
/// let candidates = score_and_rank(&prices, &horizons, 1, 1).unwrap();
/// assert_eq!(candidates.long, vec!["A"]);
/// assert_eq!(candidates.short, vec!["B"]);
/// ```
pub fn score_and_rank(
    prices: &PriceMatrix,
    horizons: &HorizonSet,
    long_k: usize,
    short_k: usize,
) -> Result<RankedCandidates> {
    let scores = momentum_scores(prices, horizons)?;
    Ok(rank_candidates(&scores, long_k, short_k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nbr_traits::NbrError;

    fn scores(pairs: &[(&str, f64)]) -> MomentumScores {
        MomentumScores::new(
            pairs.iter().map(|(s, _)| s.to_string()).collect(),
            pairs.iter().map(|(_, v)| *v).collect(),
        )
        .unwrap()
    }

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
    fn test_head_and_tail() {
        let s = scores(&[("B", 0.01), ("C", -0.03), ("A", 0.02)]);
        let candidates = rank_candidates(&s, 1, 1);
        assert_eq!(candidates.long, vec!["A"]);
        assert_eq!(candidates.short, vec!["C"]);
    }

    #[test]
    fn test_short_keeps_descending_tail_order() {
        let s = scores(&[("A", 0.3), ("B", 0.1), ("C", -0.2), ("D", 0.0)]);
        let candidates = rank_candidates(&s, 1, 2);
        assert_eq!(candidates.long, vec!["A"]);
        assert_eq!(candidates.short, vec!["D", "C"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let s = scores(&[("X", 0.5), ("Y", 0.5), ("Z", 0.5)]);
        let candidates = rank_candidates(&s, 2, 1);
        assert_eq!(candidates.long, vec!["X", "Y"]);
        assert_eq!(candidates.short, vec!["Z"]);

        let s = scores(&[("Z", 0.5), ("Y", 0.5), ("X", 0.5)]);
        let candidates = rank_candidates(&s, 1, 1);
        assert_eq!(candidates.long, vec!["Z"]);
        assert_eq!(candidates.short, vec!["X"]);
    }

    #[test]
    fn test_zero_counts() {
        let s = scores(&[("A", 0.1), ("B", 0.2)]);
        let candidates = rank_candidates(&s, 0, 0);
        assert!(candidates.long.is_empty());
        assert!(candidates.short.is_empty());
    }

    #[test]
    fn test_overlap_collapses_to_long() {
        let s = scores(&[("X", 0.1)]);
        let candidates = rank_candidates(&s, 1, 1);
        assert_eq!(candidates.long, vec!["X"]);
        assert!(candidates.short.is_empty());
    }

    #[test]
    fn test_counts_larger_than_universe() {
        let s = scores(&[("A", 0.3), ("B", 0.2), ("C", 0.1)]);
        let candidates = rank_candidates(&s, 2, 5);
        assert_eq!(candidates.long, vec!["A", "B"]);
        assert_eq!(candidates.short, vec!["C"]);
        assert!(candidates.is_disjoint());
        assert!(candidates.long.len() <= 2);
        assert!(candidates.short.len() <= 5);
    }

    #[test]
    fn test_non_finite_scores_excluded() {
        let s = scores(&[("A", 0.1), ("B", f64::NAN), ("C", -0.1)]);
        let candidates = rank_candidates(&s, 3, 3);
        assert_eq!(candidates.long, vec!["A", "C"]);
        assert!(candidates.short.is_empty());

        let candidates = rank_candidates(&s, 1, 1);
        assert_eq!(candidates.short, vec!["C"]);
    }

    #[test]
    fn test_score_and_rank_example() {
        // per-row rates of 2%, 1% and -3% over one row
        let prices = matrix(vec![
            ("A", vec![100.0, 102.0]),
            ("B", vec![100.0, 101.0]),
            ("C", vec![100.0, 97.0]),
        ]);
        let horizons = HorizonSet::new(&[1]).unwrap();
        let candidates = score_and_rank(&prices, &horizons, 1, 1).unwrap();
        assert_eq!(candidates.long, vec!["A"]);
        assert_eq!(candidates.short, vec!["C"]);
    }

    #[test]
    fn test_single_horizon_matches_plain_return_ranking() {
        let prices = matrix(vec![
            ("A", vec![10.0, 11.0, 12.0, 11.5, 13.0]),
            ("B", vec![20.0, 19.0, 25.0, 26.0, 24.0]),
            ("C", vec![5.0, 5.5, 5.2, 5.1, 5.0]),
            ("D", vec![7.0, 7.0, 8.0, 9.0, 9.5]),
        ]);
        let h = 3;
        let candidates = score_and_rank(&prices, &HorizonSet::new(&[h]).unwrap(), 4, 0).unwrap();

        let mut plain: Vec<(String, f64)> = prices
            .symbols()
            .into_iter()
            .map(|s| {
                let p = prices.prices(&s).unwrap();
                let r = p[4] / p[4 - h as usize] - 1.0;
                (s, r)
            })
            .collect();
        plain.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
        let plain: Vec<String> = plain.into_iter().map(|(s, _)| s).collect();

        assert_eq!(candidates.long, plain);
    }

    #[test]
    fn test_deterministic() {
        let prices = matrix(vec![
            ("A", vec![1.0, 1.2, 1.1, 1.3]),
            ("B", vec![1.0, 0.9, 1.0, 1.1]),
            ("C", vec![1.0, 1.0, 1.0, 1.0]),
        ]);
        let horizons = HorizonSet::new(&[1, 2, 3]).unwrap();
        let first = score_and_rank(&prices, &horizons, 1, 2).unwrap();
        for _ in 0..10 {
            assert_eq!(score_and_rank(&prices, &horizons, 1, 2).unwrap(), first);
        }
    }

    #[test]
    fn test_score_and_rank_insufficient() {
        let prices = matrix(vec![("A", vec![1.0, 2.0])]);
        let horizons = HorizonSet::new(&[2]).unwrap();
        assert!(matches!(
            score_and_rank(&prices, &horizons, 1, 1),
            Err(NbrError::InsufficientData(_))
        ));
    }
}
