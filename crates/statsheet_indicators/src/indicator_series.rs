use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Indicator output aligned one-to-one with its source series.
///
/// `None` marks a warm-up position that has no value yet. A computed NaN is
/// stored as `Some(f64::NAN)` and is never conflated with `None`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicatorSeries {
    values: Vec<Option<f64>>,
}

impl IndicatorSeries {
    pub fn new(values: Vec<Option<f64>>) -> Self {
        Self { values }
    }

    /// A series where every position is defined.
    pub fn defined(values: &[f64]) -> Self {
        Self {
            values: values.iter().copied().map(Some).collect(),
        }
    }

    /// A series of `len` warm-up positions.
    pub fn undefined(len: usize) -> Self {
        Self {
            values: vec![None; len],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    pub fn is_defined(&self, index: usize) -> bool {
        matches!(self.values.get(index), Some(Some(_)))
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.values.iter().copied()
    }

    /// `(index, value)` pairs for defined positions only.
    pub fn iter_defined(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|value| (i, value)))
    }

    pub fn first_defined_index(&self) -> Option<usize> {
        self.values.iter().position(Option::is_some)
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Most recent value, if the last position is defined.
    pub fn last(&self) -> Option<f64> {
        self.values.last().copied().flatten()
    }

    pub fn into_inner(self) -> Vec<Option<f64>> {
        self.values
    }
}

impl From<Vec<Option<f64>>> for IndicatorSeries {
    fn from(values: Vec<Option<f64>>) -> Self {
        Self::new(values)
    }
}

impl FromIterator<Option<f64>> for IndicatorSeries {
    fn from_iter<I: IntoIterator<Item = Option<f64>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Index<usize> for IndicatorSeries {
    type Output = Option<f64>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_is_distinct_from_nan() {
        let series = IndicatorSeries::new(vec![None, Some(f64::NAN), Some(1.0)]);

        assert!(!series.is_defined(0));
        assert!(series.is_defined(1));
        assert!(series.get(1).unwrap().is_nan());
        assert_eq!(series.first_defined_index(), Some(1));
        assert_eq!(series.defined_count(), 2);
    }

    #[test]
    fn serializes_gaps_as_null() {
        let series = IndicatorSeries::new(vec![None, Some(1.5)]);
        assert_eq!(serde_json::to_string(&series).unwrap(), "[null,1.5]");
    }
}
