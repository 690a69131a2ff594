//! Local-maximum peak detection with baseline-corrected heights.
//!
//! A peak is an interior local maximum whose raw value exceeds
//! [`PeakDetectionConfig::min_height`]. From each peak the signal is followed
//! downhill on both sides for as long as it does not rise again; the lowest
//! point reached on each side is that side's threshold. The height of the peak
//! is measured against the higher of the two valleys.
//!
//! # Plateaus
//!
//! A flat top is reported once, at its leftmost sample. The sample before the
//! plateau must be strictly lower and the first sample after it must be
//! strictly lower too, so a shoulder on a rising or falling flank is not a
//! peak, and neither is a plateau that runs into the end of the series.
//!
//! ```
//! use lcpeaks::peaks::{detect_in_slice, PeakDetectionConfig};
//!
//! let values = [0.0, 1.0, 3.0, 3.0, 1.0, 0.0];
//! let peaks = detect_in_slice(&values, &PeakDetectionConfig::default()).unwrap();
//! assert_eq!(peaks.peak_indices(), vec![2]);
//! ```

use std::ops::ControlFlow;

use crate::errors::{
    LcError,
    Result,
};
use crate::series::Series;
use serde::{
    Deserialize,
    Serialize,
};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakDetectionConfig {
    /// Candidates whose raw value is not strictly above this are discarded.
    /// The default of 0 drops non-positive peaks.
    pub min_height: f64,
}

impl PeakDetectionConfig {
    pub const DEFAULT_MIN_HEIGHT: f64 = 0.0;

    pub fn with_min_height(min_height: f64) -> Self {
        Self { min_height }
    }
}

impl Default for PeakDetectionConfig {
    fn default() -> Self {
        Self {
            min_height: Self::DEFAULT_MIN_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakRecord {
    /// Position of the local maximum.
    pub peak_index: usize,
    /// Index of the lowest point reached walking left from the peak.
    pub left_threshold: usize,
    /// Index of the lowest point reached walking right from the peak.
    pub right_threshold: usize,
    /// Value at the peak minus the higher of the two valley values.
    pub height: f64,
}

/// Peaks of one run, ordered by ascending `peak_index`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeakSet {
    peaks: Vec<PeakRecord>,
}

impl PeakSet {
    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PeakRecord> {
        self.peaks.iter()
    }

    pub fn as_slice(&self) -> &[PeakRecord] {
        &self.peaks
    }

    pub fn peak_indices(&self) -> Vec<usize> {
        self.peaks.iter().map(|p| p.peak_index).collect()
    }
}

impl From<Vec<PeakRecord>> for PeakSet {
    fn from(mut peaks: Vec<PeakRecord>) -> Self {
        peaks.sort_by_key(|p| p.peak_index);
        Self { peaks }
    }
}

impl<'a> IntoIterator for &'a PeakSet {
    type Item = &'a PeakRecord;
    type IntoIter = std::slice::Iter<'a, PeakRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.peaks.iter()
    }
}

/// Detects peaks in a series. Any missing sample is an error.
pub fn detect(values: &Series, config: &PeakDetectionConfig) -> Result<PeakSet> {
    let resolved = values.resolved()?;
    detect_in_slice(&resolved, config)
}

/// Same as [`detect`] for samples that are already plain floats.
/// NaN is rejected as a missing value.
pub fn detect_in_slice(values: &[f64], config: &PeakDetectionConfig) -> Result<PeakSet> {
    if config.min_height.is_nan() {
        return Err(LcError::InvalidParameter(
            "min_height must be a number".to_string(),
        ));
    }
    if let Some(index) = values.iter().position(|x| x.is_nan()) {
        return Err(LcError::MissingValue { index });
    }

    let peaks = find_peaks(values, config.min_height);
    debug!(
        "Found {} peaks in {} samples (min height {})",
        peaks.len(),
        values.len(),
        config.min_height
    );
    Ok(peaks)
}

fn find_peaks(values: &[f64], min_height: f64) -> PeakSet {
    let len = values.len();
    if len < 3 {
        return PeakSet::default();
    }

    let peaks = (1..len - 1)
        .filter(|&i| is_candidate(values, i, min_height))
        .map(|peak_index| {
            let left = descend(values, peak_index, (0..peak_index).rev());
            let right = descend(values, peak_index, peak_index + 1..len);
            PeakRecord {
                peak_index,
                left_threshold: left.index,
                right_threshold: right.index,
                height: values[peak_index] - left.value.max(right.value),
            }
        })
        .collect();

    PeakSet { peaks }
}

fn is_candidate(values: &[f64], i: usize, min_height: f64) -> bool {
    let current = values[i];
    if current <= min_height || current <= values[i - 1] {
        return false;
    }
    // First sample after the plateau (if any) decides.
    values[i + 1..]
        .iter()
        .find(|&&x| x != current)
        .is_some_and(|&next| next < current)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Valley {
    index: usize,
    value: f64,
}

/// Follows the signal away from the peak along `walk` while it keeps going
/// down or stays level. Level stretches do not move the threshold, so it sits
/// on the first sample that reached the minimum.
fn descend(values: &[f64], peak_index: usize, mut walk: impl Iterator<Item = usize>) -> Valley {
    let start = Valley {
        index: peak_index,
        value: values[peak_index],
    };
    let folded = walk.try_fold(start, |valley, index| {
        let value = values[index];
        if value > valley.value {
            ControlFlow::Break(valley)
        } else if value < valley.value {
            ControlFlow::Continue(Valley { index, value })
        } else {
            ControlFlow::Continue(valley)
        }
    });
    match folded {
        ControlFlow::Continue(valley) | ControlFlow::Break(valley) => valley,
    }
}
