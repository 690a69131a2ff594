use clap::Parser;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Peak detection and elution volumes for LC reports", long_about = None)]
pub struct Cli {
    /// Path to a report file or a directory of report files
    #[arg(short, long, value_name = "PATH")]
    pub data_path: PathBuf,

    /// Smooth the signal (Savitzky-Golay) before detecting peaks
    #[arg(long)]
    pub smooth: bool,

    /// Write a text plot of every processed report
    #[arg(long)]
    pub save_plot: bool,

    /// Path to a JSON analysis configuration (flags below take precedence)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Minimum value a local maximum must exceed to be reported
    #[arg(long)]
    pub min_height: Option<f64>,

    /// Smoothing window length (odd)
    #[arg(long)]
    pub window: Option<usize>,

    /// Smoothing polynomial order (must be below the window length)
    #[arg(long)]
    pub polyorder: Option<usize>,

    /// Drop data rows with a missing time or value instead of failing
    #[arg(long)]
    pub drop_missing: bool,

    /// Directory for results.json and plots
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Number of worker threads (defaults to all cores)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Increase logging verbosity (can be repeated: -v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Decrease logging verbosity (can be repeated: -q for warn, -qq for error)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose as i16 - self.quiet as i16 {
            i16::MIN..=-2 => LevelFilter::ERROR,
            -1 => LevelFilter::WARN,
            0 => LevelFilter::INFO,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}
