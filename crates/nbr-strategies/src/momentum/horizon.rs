//! Lookback horizons for momentum scoring.

use nbr_traits::{NbrError, Result};

/// A non-empty set of positive lookback lengths, in rows.
///
/// Duplicates are removed keeping the first occurrence, so iteration order is
/// the order in which horizons were first given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HorizonSet {
    horizons: Vec<usize>,
}

impl HorizonSet {
    /// Creates a horizon set from signed lengths as they appear in
    /// configuration files.
    ///
    /// # Errors
    ///
    /// Returns [`NbrError::InvalidInput`] if `horizons` is empty or contains a
    /// value that is not a positive integer.
    pub fn new(horizons: &[i64]) -> Result<Self> {
        if horizons.is_empty() {
            return Err(NbrError::invalid_input("horizons must not be empty"));
        }

        let mut unique = Vec::with_capacity(horizons.len());
        for &h in horizons {
            let h = usize::try_from(h)
                .ok()
                .filter(|&h| h > 0)
                .ok_or_else(|| {
                    NbrError::invalid_input(format!(
                        "horizons must be positive integers, got {h}"
                    ))
                })?;
            if !unique.contains(&h) {
                unique.push(h);
            }
        }

        Ok(Self { horizons: unique })
    }

    /// Longest horizon.
    pub fn max(&self) -> usize {
        self.horizons.iter().copied().max().unwrap_or(0)
    }

    /// Number of distinct horizons.
    pub fn len(&self) -> usize {
        self.horizons.len()
    }

    /// Always false; a horizon set cannot be built empty.
    pub fn is_empty(&self) -> bool {
        self.horizons.is_empty()
    }

    /// Iterates horizons in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.horizons.iter().copied()
    }

    /// Horizons as a slice.
    pub fn as_slice(&self) -> &[usize] {
        &self.horizons
    }
}

impl TryFrom<&[usize]> for HorizonSet {
    type Error = NbrError;

    fn try_from(horizons: &[usize]) -> Result<Self> {
        let signed = horizons
            .iter()
            .map(|&h| {
                i64::try_from(h)
                    .map_err(|_| NbrError::invalid_input(format!("horizon {h} is too large")))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(&signed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let horizons = HorizonSet::new(&[60, 180, 360]).unwrap();
        assert_eq!(horizons.len(), 3);
        assert_eq!(horizons.max(), 360);
        assert_eq!(horizons.iter().collect::<Vec<_>>(), vec![60, 180, 360]);
    }

    #[test]
    fn test_duplicates_removed_in_order() {
        let horizons = HorizonSet::new(&[5, 1, 5, 3, 1]).unwrap();
        assert_eq!(horizons.as_slice(), &[5, 1, 3]);
    }

    #[test]
    fn test_empty_rejected() {
        assert!(matches!(HorizonSet::new(&[]), Err(NbrError::InvalidInput(_))));
    }

    #[test]
    fn test_non_positive_rejected() {
        assert!(matches!(HorizonSet::new(&[1, 0]), Err(NbrError::InvalidInput(_))));
        assert!(matches!(HorizonSet::new(&[-3]), Err(NbrError::InvalidInput(_))));
    }

    #[test]
    fn test_try_from_usize() {
        let horizons = HorizonSet::try_from([2_usize, 4].as_slice()).unwrap();
        assert_eq!(horizons.max(), 4);
        assert!(HorizonSet::try_from([0_usize].as_slice()).is_err());
    }
}
