//! Peak detection and elution volume quantification for exported LC reports.
//!
//! The pipeline for one report is load → (smooth) → detect → integrate:
//!
//! ```no_run
//! use lcpeaks::{AnalysisConfig, LcRun, MissingPolicy, SmoothingConfig};
//!
//! let run = LcRun::from_path("injection_01.txt", MissingPolicy::Reject).unwrap();
//! let config = AnalysisConfig {
//!     smoothing: Some(SmoothingConfig::default()),
//!     ..Default::default()
//! };
//! let analysis = run.analyze(&config).unwrap();
//! println!("{} peaks, {}", analysis.peaks.len(), analysis.elution_volume);
//! ```
//!
//! Smoothing only decides where the peaks are. Volumes are always integrated
//! on the raw signal.

pub mod errors;
pub mod integration;
pub mod peaks;
pub mod plotting;
pub mod report;
pub mod run;
pub mod series;
pub mod smoothing;

pub use errors::{
    LcError,
    Result,
};
pub use integration::integrate;
pub use peaks::{
    PeakDetectionConfig,
    PeakRecord,
    PeakSet,
    detect,
};
pub use report::LcReport;
pub use run::{
    AnalysisConfig,
    LcRun,
    MissingPolicy,
    RunAnalysis,
};
pub use series::Series;
pub use smoothing::{
    SmoothingConfig,
    smooth,
};
