// ANSI color codes
const COLOR_GRAY: &str = "\x1b[90m";
const COLOR_BLUE: &str = "\x1b[94m";
const COLOR_YELLOW: &str = "\x1b[93m";
const COLOR_RED: &str = "\x1b[91m";
const COLOR_RESET: &str = "\x1b[0m";

use crate::series::Series;

const RAW_MARK: char = '·';
const SMOOTHED_MARK: char = '•';
const PEAK_MARK: char = '○';
const AXIS_MARK: char = '─';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotSize {
    pub width: usize,
    pub height: usize,
}

impl Default for PlotSize {
    fn default() -> Self {
        Self {
            width: 100,
            height: 25,
        }
    }
}

/// Formats the raw signal, the optional smoothed signal and the peaks as a
/// framed text plot (sample index on X, signal on Y).
///
/// Peaks are drawn on the smoothed series when there is one, since that is
/// what they were detected on. Missing samples are left blank.
pub fn format_signal_plot(
    values: &Series,
    smoothed: Option<&Series>,
    peak_indices: &[usize],
    size: PlotSize,
    colored: bool,
) -> String {
    let width = size.width.max(2);
    let height = size.height.max(2);
    let mut output = String::new();

    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for y in values
        .samples()
        .iter()
        .chain(smoothed.map(|s| s.samples()).unwrap_or(&[]).iter())
        .flatten()
    {
        if y.is_finite() {
            y_min = y_min.min(*y);
            y_max = y_max.max(*y);
        }
    }

    // Handle edge cases
    if !y_min.is_finite() || !y_max.is_finite() {
        y_min = -1.0;
        y_max = 1.0;
    } else if y_min == y_max {
        y_min -= 1.0;
        y_max += 1.0;
    }
    let y_span = y_max - y_min;
    let num_samples = values.len();

    let to_col = |i: usize| -> usize {
        if num_samples < 2 {
            0
        } else {
            (i * (width - 1)) / (num_samples - 1)
        }
    };
    let to_row = |y: f64| -> usize {
        let normalized = (y - y_min) / y_span;
        (((1.0 - normalized) * (height - 1) as f64) as usize).min(height - 1)
    };

    let mut grid = vec![vec![' '; width]; height];

    if y_min <= 0.0 && y_max >= 0.0 {
        let row = to_row(0.0);
        for cell in grid[row].iter_mut() {
            *cell = AXIS_MARK;
        }
    }

    for (i, y) in values.samples().iter().enumerate() {
        if let Some(y) = y {
            grid[to_row(*y)][to_col(i)] = RAW_MARK;
        }
    }
    if let Some(smoothed) = smoothed {
        for (i, y) in smoothed.samples().iter().enumerate() {
            if let Some(y) = y {
                grid[to_row(*y)][to_col(i)] = SMOOTHED_MARK;
            }
        }
    }

    let marked_series = smoothed.unwrap_or(values);
    let mut num_marked = 0;
    for &i in peak_indices {
        if let Some(y) = marked_series.get(i) {
            grid[to_row(y)][to_col(i)] = PEAK_MARK;
            num_marked += 1;
        }
    }

    // Top border
    output.push('╔');
    output.push_str(&"═".repeat(width));
    output.push_str("╗\n");

    for row in &grid {
        output.push('║');
        for &ch in row {
            output.push_str(&paint(ch, colored));
        }
        output.push_str("║\n");
    }

    // Bottom border
    output.push('╚');
    output.push_str(&"═".repeat(width));
    output.push_str("╝\n");

    output.push_str(&format!(
        "\n  X: [0, {}]  Y: [{:.3}, {:.3}]  {} raw  {} smoothed  {} peaks ({})\n",
        num_samples.saturating_sub(1),
        y_min,
        y_max,
        paint(RAW_MARK, colored),
        paint(SMOOTHED_MARK, colored),
        paint(PEAK_MARK, colored),
        num_marked,
    ));

    output
}

fn paint(ch: char, colored: bool) -> String {
    if !colored {
        return ch.to_string();
    }
    let color = match ch {
        RAW_MARK => COLOR_BLUE,
        SMOOTHED_MARK => COLOR_YELLOW,
        PEAK_MARK => COLOR_RED,
        AXIS_MARK => COLOR_GRAY,
        _ => return ch.to_string(),
    };
    format!("{}{}{}", color, ch, COLOR_RESET)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plot_lines(plot: &str) -> Vec<&str> {
        plot.lines().collect()
    }

    #[test]
    fn test_plot_frame_and_marks() {
        let values = Series::from(vec![0.0, 1.0, 3.0, 1.0, 0.0]);
        let size = PlotSize {
            width: 5,
            height: 4,
        };
        let plot = format_signal_plot(&values, None, &[2], size, false);
        let lines = plot_lines(&plot);
        assert_eq!(lines[0], "╔═════╗");
        assert_eq!(lines[5], "╚═════╝");
        // Apex on the top row, in the middle column.
        assert_eq!(lines[1], "║  ○  ║");
        // Zero line at the bottom, raw samples on top of it.
        assert_eq!(lines[4], "║·───·║");
        assert!(plot.contains("peaks (1)"));
        assert!(!plot.contains('\x1b'));
    }

    #[test]
    fn test_peaks_follow_smoothed_series() {
        let values = Series::from(vec![0.0, 4.0, 0.0]);
        let smoothed = Series::from(vec![1.0, 2.0, 1.0]);
        let size = PlotSize {
            width: 3,
            height: 5,
        };
        let plot = format_signal_plot(&values, Some(&smoothed), &[1], size, false);
        let lines = plot_lines(&plot);
        // Raw apex stays at the top, the marker sits on the smoothed value.
        assert_eq!(lines[1], "║ · ║");
        assert_eq!(lines[3], "║ ○ ║");
        assert!(plot.contains("Y: [0.000, 4.000]"));
    }

    #[test]
    fn test_degenerate_inputs() {
        let flat = Series::from(vec![2.0; 4]);
        let plot = format_signal_plot(&flat, None, &[], PlotSize::default(), true);
        assert!(plot.contains("Y: [1.000, 3.000]"));

        let empty = Series::default();
        let plot = format_signal_plot(&empty, None, &[0], PlotSize::default(), false);
        assert!(plot.contains("peaks (0)"));

        let missing = Series::new(vec![None, None]);
        let plot = format_signal_plot(&missing, None, &[], PlotSize::default(), false);
        assert!(plot.contains("Y: [-1.000, 1.000]"));
    }
}
