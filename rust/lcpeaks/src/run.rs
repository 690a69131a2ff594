use std::path::Path;

use crate::errors::{
    LcError,
    Result,
};
use crate::integration::integrate;
use crate::peaks::{
    PeakDetectionConfig,
    PeakSet,
    detect,
};
use crate::report::{
    LcReport,
    ReportMetadata,
};
use crate::series::Series;
use crate::smoothing::{
    SmoothingConfig,
    smooth,
};
use serde::{
    Deserialize,
    Serialize,
};
use tracing::{
    info,
    instrument,
};

/// What to do with data rows that have a missing time or value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPolicy {
    /// Keep the gaps; any analysis touching one fails.
    #[default]
    Reject,
    /// Drop rows missing a time or a value before building the series.
    DropIncomplete,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub detection: PeakDetectionConfig,
    /// Smooth before detection when set.
    pub smoothing: Option<SmoothingConfig>,
    pub missing_policy: MissingPolicy,
}

/// One chromatographic run: the parallel series of a single report.
#[derive(Debug, Clone)]
pub struct LcRun {
    pub name: String,
    pub metadata: ReportMetadata,
    pub times: Series,
    pub steps: Series,
    pub values: Series,
}

/// Output of [`LcRun::analyze`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunAnalysis {
    pub peaks: PeakSet,
    pub elution_volume: f64,
    /// Series the peaks were detected on, when smoothing was requested.
    pub smoothed: Option<Series>,
}

impl LcRun {
    pub fn from_series(name: impl Into<String>, times: Series, values: Series) -> Result<Self> {
        if times.len() != values.len() {
            return Err(LcError::LengthMismatch {
                values: values.len(),
                times: times.len(),
            });
        }
        let steps = Series::new(vec![None; times.len()]);
        Ok(Self {
            name: name.into(),
            metadata: ReportMetadata::default(),
            times,
            steps,
            values,
        })
    }

    pub fn from_path(path: impl AsRef<Path>, policy: MissingPolicy) -> Result<Self> {
        let report = LcReport::from_path(path)?;
        Ok(Self::from_report(report, policy))
    }

    pub fn from_report(report: LcReport, policy: MissingPolicy) -> Self {
        let name = report
            .source
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .or_else(|| report.metadata.injection.get("Injection").cloned())
            .unwrap_or_else(|| "unnamed".to_string());

        let total = report.rows.len();
        let rows: Vec<_> = match policy {
            MissingPolicy::Reject => report.rows,
            MissingPolicy::DropIncomplete => report
                .rows
                .into_iter()
                .filter(|r| r.time.is_some() && r.value.is_some())
                .collect(),
        };
        if rows.len() != total {
            info!(
                "Dropped {} of {} rows with a missing time or value from {}",
                total - rows.len(),
                total,
                name
            );
        }

        Self {
            name,
            metadata: report.metadata,
            times: rows.iter().map(|r| r.time).collect(),
            steps: rows.iter().map(|r| r.step).collect(),
            values: rows.iter().map(|r| r.value).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Mean of the recorded `Step (s)` column, ignoring gaps.
    pub fn average_step_seconds(&self) -> Option<f64> {
        let recorded: Vec<f64> = self.steps.samples().iter().flatten().copied().collect();
        if recorded.is_empty() {
            return None;
        }
        Some(recorded.iter().sum::<f64>() / recorded.len() as f64)
    }

    /// Smooth (optionally), detect, then integrate the raw values.
    #[instrument(skip_all, fields(run = %self.name))]
    pub fn analyze(&self, config: &AnalysisConfig) -> Result<RunAnalysis> {
        let smoothed = config
            .smoothing
            .as_ref()
            .map(|s| smooth(&self.values, s))
            .transpose()?;
        let detection_input = smoothed.as_ref().unwrap_or(&self.values);
        let peaks = detect(detection_input, &config.detection)?;
        let elution_volume = integrate(&self.values, &self.times, &peaks)?;
        info!(
            "{}: {} peaks, elution volume {:.4}",
            self.name,
            peaks.len(),
            elution_volume
        );

        Ok(RunAnalysis {
            peaks,
            elution_volume,
            smoothed,
        })
    }
}
