//! Elution volume: area under the raw signal over the detected peak spans.
//!
//! Each peak contributes a right-sided Riemann sum over `[left, right)`,
//!
//! ```text
//! area = Σ_{idx = left}^{right - 1} max(values[idx], 0) * (times[idx] - times[idx - 1])
//! ```
//!
//! Negative samples are clamped to zero. The sample at index 0 has no
//! predecessor, so its time step is zero.

use crate::errors::{
    LcError,
    Result,
};
use crate::peaks::{
    PeakRecord,
    PeakSet,
};
use crate::series::Series;

/// Sum of the areas of all peaks in `peaks`, on the unsmoothed `values`.
pub fn integrate(values: &Series, times: &Series, peaks: &PeakSet) -> Result<f64> {
    peaks
        .iter()
        .try_fold(0.0, |total, peak| -> Result<f64> {
            Ok(total + area_of(values, times, peak)?)
        })
}

/// Area of a single peak.
pub fn area_of(values: &Series, times: &Series, peak: &PeakRecord) -> Result<f64> {
    if values.len() != times.len() {
        return Err(LcError::LengthMismatch {
            values: values.len(),
            times: times.len(),
        });
    }
    let (left, right) = (peak.left_threshold, peak.right_threshold);
    if right >= values.len() {
        return Err(LcError::PeakOutOfBounds {
            index: right,
            len: values.len(),
        });
    }
    if left > peak.peak_index || peak.peak_index > right {
        return Err(LcError::InvalidParameter(format!(
            "peak bounds must satisfy left <= peak <= right, got {} <= {} <= {}",
            left, peak.peak_index, right
        )));
    }

    (left..right).try_fold(0.0, |area, idx| -> Result<f64> {
        let value = values
            .get(idx)
            .ok_or(LcError::MissingValue { index: idx })?;
        Ok(area + value.max(0.0) * time_step(times, idx)?)
    })
}

fn time_step(times: &Series, idx: usize) -> Result<f64> {
    let current = times
        .get(idx)
        .ok_or(LcError::MissingTimeData { index: idx })?;
    if idx == 0 {
        return Ok(0.0);
    }
    let previous = times
        .get(idx - 1)
        .ok_or(LcError::MissingTimeData { index: idx - 1 })?;
    Ok(current - previous)
}
