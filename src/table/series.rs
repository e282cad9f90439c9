//! A single column of values labelled by a timestamp index.

use crate::error::{PipelineError, Result};
use crate::table::timestamp::{Timestamp, TimestampIndex};

/// Values aligned one-to-one with a [`TimestampIndex`].
#[derive(Debug, Clone, PartialEq)]
pub struct Series<T> {
    index: TimestampIndex,
    values: Vec<T>,
}

impl<T> Series<T> {
    /// Attach `values` to `index`. Fails if the lengths differ.
    pub fn new(index: TimestampIndex, values: Vec<T>) -> Result<Self> {
        if index.len() != values.len() {
            return Err(PipelineError::LengthMismatch {
                expected: index.len(),
                actual: values.len(),
            });
        }
        Ok(Self { index, values })
    }

    pub fn index(&self) -> &TimestampIndex {
        &self.index
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn into_values(self) -> Vec<T> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(timestamp, value)` pairs in row order.
    pub fn iter(&self) -> impl Iterator<Item = (&Timestamp, &T)> {
        self.index.iter().zip(self.values.iter())
    }

    /// Apply `f` to every value, keeping the same index.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Series<U> {
        Series {
            index: self.index.clone(),
            values: self.values.iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(n: usize) -> TimestampIndex {
        TimestampIndex::new(
            (0..n)
                .map(|i| Timestamp::parse(&format!("2024-01-01 00:{:02}:00", i)).unwrap())
                .collect(),
        )
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = Series::new(index(2), vec![1.0]).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::LengthMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_map_keeps_index() {
        let series = Series::new(index(3), vec![1, 2, 3]).unwrap();
        let doubled = series.map(|v| v * 2);

        assert_eq!(doubled.values(), &[2, 4, 6]);
        assert!(doubled.index().is_aligned_with(series.index()));
    }

    #[test]
    fn test_iter_pairs_rows() {
        let series = Series::new(index(2), vec!["a", "b"]).unwrap();
        let pairs: Vec<_> = series.iter().map(|(ts, v)| (ts.to_string(), *v)).collect();

        assert_eq!(pairs[0], ("2024-01-01 00:00:00".to_string(), "a"));
        assert_eq!(pairs[1], ("2024-01-01 00:01:00".to_string(), "b"));
    }
}
