use crate::errors::{
    LcError,
    Result,
};
use crate::series::Series;
use serde::{
    Deserialize,
    Serialize,
};
use tracing::instrument;

/// Savitzky-Golay smoothing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Number of consecutive samples in each fit. Must be odd.
    pub window: usize,
    /// Degree of the fitted polynomial. Must be smaller than `window`.
    pub polyorder: usize,
}

impl SmoothingConfig {
    /// Default window size for Savitzky-Golay smoothing.
    pub const DEFAULT_SG_WINDOW: usize = 11;
    /// Default polynomial order for Savitzky-Golay smoothing.
    pub const DEFAULT_SG_POLYNOMIAL: usize = 1;

    /// Checks the window against a series of `len` samples.
    pub fn validate(&self, len: usize) -> Result<()> {
        if self.window == 0 || self.window % 2 == 0 {
            return Err(LcError::InvalidParameter(format!(
                "smoothing window must be a positive odd number, got {}",
                self.window
            )));
        }
        if self.window > len {
            return Err(LcError::InvalidParameter(format!(
                "smoothing window {} is longer than the series ({} samples)",
                self.window, len
            )));
        }
        if self.polyorder >= self.window {
            return Err(LcError::InvalidParameter(format!(
                "polyorder {} must be less than the window {}",
                self.polyorder, self.window
            )));
        }
        Ok(())
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            window: Self::DEFAULT_SG_WINDOW,
            polyorder: Self::DEFAULT_SG_POLYNOMIAL,
        }
    }
}

/// Smooths a series for peak detection. The output has the same length.
///
/// Fails with [`LcError::InvalidParameter`] when the window does not fit the
/// series and with [`LcError::MissingValue`] on gaps.
#[instrument(skip(values), fields(len = values.len()))]
pub fn smooth(values: &Series, config: &SmoothingConfig) -> Result<Series> {
    config.validate(values.len())?;
    let resolved = values.resolved()?;
    let smoothed = savitzky_golay_smooth(&resolved, config.window, config.polyorder)?;
    Ok(smoothed.into_iter().map(Some).collect())
}

/// Savitzky-Golay smoothing filter
///
/// Every output sample is the value at the window centre of the least squares
/// polynomial fitted to the surrounding `window` samples. The first and last
/// `window / 2` samples are read off the polynomial fitted to the first and
/// last full window, so any polynomial of degree `<= polyorder` comes out
/// unchanged.
pub fn savitzky_golay_smooth(data: &[f64], window: usize, polyorder: usize) -> Result<Vec<f64>> {
    SmoothingConfig { window, polyorder }.validate(data.len())?;

    let half_window = window / 2;
    let len = data.len();
    let center_weights = compute_savitzky_golay_weights(window, polyorder, 0)?;
    let leading_weights = (0..half_window)
        .map(|i| compute_savitzky_golay_weights(window, polyorder, i as isize - half_window as isize))
        .collect::<Result<Vec<_>>>()?;
    let trailing_weights = (1..=half_window)
        .map(|offset| compute_savitzky_golay_weights(window, polyorder, offset as isize))
        .collect::<Result<Vec<_>>>()?;

    let head = &data[..window];
    let tail = &data[len - window..];

    let smoothed = (0..len)
        .map(|point_idx| {
            if point_idx < half_window {
                dot(&leading_weights[point_idx], head)
            } else if point_idx >= len - half_window {
                let offset = point_idx + half_window - len;
                dot(&trailing_weights[offset], tail)
            } else {
                dot(
                    &center_weights,
                    &data[point_idx - half_window..=point_idx + half_window],
                )
            }
        })
        .collect();

    Ok(smoothed)
}

fn dot(weights: &[f64], data: &[f64]) -> f64 {
    weights.iter().zip(data.iter()).map(|(w, x)| w * x).sum()
}

/// Compute Savitzky-Golay filter weights.
///
/// Returns the weights that, applied to a window of samples, give the fitted
/// polynomial evaluated `position` samples away from the window centre.
/// They are `A (AᵀA)⁻¹ e`, where `A` is the Vandermonde matrix of the centred
/// sample positions and `e` holds the powers of `position`.
fn compute_savitzky_golay_weights(
    window_size: usize,
    polynomial_order: usize,
    position: isize,
) -> Result<Vec<f64>> {
    let half_window = (window_size / 2) as isize;
    let num_terms = polynomial_order + 1;
    let offsets: Vec<f64> = (0..window_size as isize)
        .map(|j| (j - half_window) as f64)
        .collect();

    let mut normal = vec![vec![0.0; num_terms]; num_terms];
    for (row, normal_row) in normal.iter_mut().enumerate() {
        for (col, cell) in normal_row.iter_mut().enumerate() {
            *cell = offsets.iter().map(|x| x.powi((row + col) as i32)).sum();
        }
    }
    let powers: Vec<f64> = (0..num_terms)
        .map(|k| (position as f64).powi(k as i32))
        .collect();
    let coefficients = solve_linear_system(normal, powers)?;

    Ok(offsets
        .iter()
        .map(|x| {
            coefficients
                .iter()
                .enumerate()
                .map(|(k, c)| c * x.powi(k as i32))
                .sum::<f64>()
        })
        .collect())
}

/// Gaussian elimination with partial pivoting, on owned copies of the inputs.
fn solve_linear_system(mut matrix: Vec<Vec<f64>>, mut rhs: Vec<f64>) -> Result<Vec<f64>> {
    let n = rhs.len();
    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&a, &b| matrix[a][col].abs().total_cmp(&matrix[b][col].abs()))
            .unwrap_or(col);
        if matrix[pivot_row][col].abs() < f64::EPSILON {
            return Err(LcError::InvalidParameter(
                "smoothing window is too small for the polynomial order".to_string(),
            ));
        }
        matrix.swap(col, pivot_row);
        rhs.swap(col, pivot_row);

        for row in col + 1..n {
            let factor = matrix[row][col] / matrix[col][col];
            for k in col..n {
                matrix[row][k] -= factor * matrix[col][k];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut solution = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| matrix[row][k] * solution[k]).sum();
        solution[row] = (rhs[row] - tail) / matrix[row][row];
    }
    Ok(solution)
}
