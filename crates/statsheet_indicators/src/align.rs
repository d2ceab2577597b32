use crate::error::{IndicatorError, IndicatorResult};
use crate::indicator_series::IndicatorSeries;
use itertools::Itertools;

/// Fails unless `actual` equals `expected`.
pub fn ensure_len(expected: usize, actual: usize) -> IndicatorResult<()> {
    if expected != actual {
        return Err(IndicatorError::LengthMismatch { expected, actual });
    }

    Ok(())
}

/// Checks that every derived series has exactly `expected` positions.
pub fn ensure_aligned(expected: usize, series: &[&IndicatorSeries]) -> IndicatorResult<()> {
    series
        .iter()
        .try_for_each(|derived| ensure_len(expected, derived.len()))
}

/// Combines two aligned series position by position.
///
/// A position is defined only when both inputs are defined there.
pub fn zip_with<F>(
    left: &IndicatorSeries,
    right: &IndicatorSeries,
    f: F,
) -> IndicatorResult<IndicatorSeries>
where
    F: Fn(f64, f64) -> f64,
{
    ensure_len(left.len(), right.len())?;

    Ok(left
        .iter()
        .zip_eq(right.iter())
        .map(|(l, r)| match (l, r) {
            (Some(l), Some(r)) => Some(f(l, r)),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_lengths_are_rejected() {
        let a = IndicatorSeries::defined(&[1.0, 2.0, 3.0]);
        let b = IndicatorSeries::defined(&[1.0, 2.0]);

        assert_eq!(
            zip_with(&a, &b, |l, r| l - r),
            Err(IndicatorError::LengthMismatch {
                expected: 3,
                actual: 2
            })
        );
        assert!(ensure_aligned(3, &[&a, &b]).is_err());
    }

    #[test]
    fn undefined_propagates_through_zip() {
        let a = IndicatorSeries::new(vec![None, Some(5.0), Some(7.0)]);
        let b = IndicatorSeries::new(vec![Some(1.0), None, Some(2.0)]);

        let diff = zip_with(&a, &b, |l, r| l - r).unwrap();
        assert_eq!(diff.values(), &[None, None, Some(5.0)]);
    }
}
