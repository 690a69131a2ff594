//! Sampled signals with an explicit missing marker.
//!
//! The report format uses the literal `n.a.` for fields the instrument did not
//! record. Those become `None` here, so nothing downstream can mistake a gap
//! for a genuine zero reading.

use crate::errors::{
    LcError,
    Result,
};
use serde::{
    Deserialize,
    Serialize,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    samples: Vec<Option<f64>>,
}

impl Series {
    /// `Some(NaN)` is stored as missing.
    pub fn new(samples: Vec<Option<f64>>) -> Self {
        samples.into_iter().collect()
    }

    /// Builds a series from raw floats. NaN is treated as missing.
    pub fn from_values(values: &[f64]) -> Self {
        values.iter().map(|&x| Some(x)).collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.samples.get(index).copied().flatten()
    }

    pub fn samples(&self) -> &[Option<f64>] {
        &self.samples
    }

    pub fn num_missing(&self) -> usize {
        self.samples.iter().filter(|x| x.is_none()).count()
    }

    pub fn first_missing(&self) -> Option<usize> {
        self.samples.iter().position(|x| x.is_none())
    }

    /// Returns the samples as plain floats, failing on the first missing one.
    pub fn resolved(&self) -> Result<Vec<f64>> {
        self.samples
            .iter()
            .enumerate()
            .map(|(index, x)| x.ok_or(LcError::MissingValue { index }))
            .collect()
    }
}

impl From<Vec<f64>> for Series {
    fn from(values: Vec<f64>) -> Self {
        Self::from_values(&values)
    }
}

impl FromIterator<Option<f64>> for Series {
    fn from_iter<I: IntoIterator<Item = Option<f64>>>(iter: I) -> Self {
        Self {
            samples: iter
                .into_iter()
                .map(|x| x.filter(|v| !v.is_nan()))
                .collect(),
        }
    }
}
