use indicatif::{
    ParallelProgressIterator,
    ProgressStyle,
};
use lcpeaks::plotting::{
    PlotSize,
    format_signal_plot,
};
use lcpeaks::{
    AnalysisConfig,
    LcRun,
    PeakSet,
};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{
    Path,
    PathBuf,
};
use std::time::Instant;
use tracing::{
    debug,
    error,
    info,
};

use crate::error::CliError;

pub const RESULTS_FILE_NAME: &str = "results.json";
const PLOT_SUFFIX: &str = ".plot.txt";

/// Where the per-file outputs go.
#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    pub output_dir: Option<PathBuf>,
    pub save_plot: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub file: PathBuf,
    pub name: String,
    pub injection: Option<String>,
    pub num_points: usize,
    /// Mean of the recorded sampling steps, in seconds.
    pub average_step_seconds: Option<f64>,
    pub smoothed: bool,
    pub num_peaks: usize,
    pub elution_volume: f64,
    pub peaks: PeakSet,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} peaks, elution volume {:.6}",
            self.file.display(),
            self.num_peaks,
            self.elution_volume
        )
    }
}

/// Regular files of a flat directory, sorted, minus the files this tool writes.
pub fn collect_report_files(dir: &Path) -> Result<Vec<PathBuf>, CliError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if is_own_output(&path) {
            debug!("Skipping previous output {}", path.display());
            continue;
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

fn is_own_output(path: &Path) -> bool {
    let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
        return false;
    };
    name == RESULTS_FILE_NAME || name.ends_with(PLOT_SUFFIX)
}

/// `<file name>.plot.txt`, keeping the extension so `run.txt` and `run.dat`
/// do not share a plot.
pub fn plot_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let name = input
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "report".to_string());
    let file_name = format!("{}{}", name, PLOT_SUFFIX);
    match output_dir {
        Some(dir) => dir.join(file_name),
        None => input.with_file_name(file_name),
    }
}

pub fn process_file(
    path: &Path,
    config: &AnalysisConfig,
    output: &OutputOptions,
) -> Result<RunSummary, CliError> {
    let run = LcRun::from_path(path, config.missing_policy)?;
    let analysis = run.analyze(config)?;

    if output.save_plot {
        let plot = format_signal_plot(
            &run.values,
            analysis.smoothed.as_ref(),
            &analysis.peaks.peak_indices(),
            PlotSize::default(),
            false,
        );
        let plot_file = plot_path(path, output.output_dir.as_deref());
        std::fs::write(&plot_file, plot)?;
        debug!("Wrote plot to {}", plot_file.display());
    }

    Ok(RunSummary {
        file: path.to_path_buf(),
        injection: run.metadata.injection_info().injection,
        name: run.name.clone(),
        num_points: run.values.len(),
        average_step_seconds: run.average_step_seconds(),
        smoothed: analysis.smoothed.is_some(),
        num_peaks: analysis.peaks.len(),
        elution_volume: analysis.elution_volume,
        peaks: analysis.peaks,
    })
}

/// Processes every report of a directory in parallel.
///
/// A failing file is logged and counted; it never stops the batch.
pub fn process_directory(
    dir: &Path,
    config: &AnalysisConfig,
    output: &OutputOptions,
) -> Result<Vec<RunSummary>, CliError> {
    let files = collect_report_files(dir)?;
    info!("Found {} files in {}", files.len(), dir.display());
    let start = Instant::now();

    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    let results: Vec<(PathBuf, Result<RunSummary, CliError>)> = files
        .into_par_iter()
        .progress_with_style(style)
        .map(|path| {
            let result = process_file(&path, config, output);
            (path, result)
        })
        .collect();

    let mut summaries = Vec::with_capacity(results.len());
    let mut num_failed = 0;
    for (path, result) in results {
        match result {
            Ok(summary) => {
                println!("{}", summary);
                summaries.push(summary);
            }
            Err(e) => {
                error!("Failed to process {}: {}", path.display(), e);
                num_failed += 1;
            }
        }
    }

    println!(
        "Processed {} files, {} failed, in {:?}",
        summaries.len(),
        num_failed,
        start.elapsed()
    );
    Ok(summaries)
}

pub fn write_results(summaries: &[RunSummary], output_dir: &Path) -> Result<PathBuf, CliError> {
    let path = output_dir.join(RESULTS_FILE_NAME);
    let file = std::fs::File::create(&path)?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), summaries)?;
    info!("Wrote {} results to {}", summaries.len(), path.display());
    Ok(path)
}
