mod cli;
mod config;
mod error;
mod processing;

use clap::Parser;
use tracing::subscriber::set_global_default;
use tracing::{
    debug,
    info,
};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::Registry;

use crate::cli::Cli;
use crate::config::resolve_config;
use crate::error::CliError;
use crate::processing::{
    OutputOptions,
    process_directory,
    process_file,
    write_results,
};

#[cfg(target_os = "windows")]
use mimalloc::MiMalloc;

#[cfg(target_os = "windows")]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> Result<(), CliError> {
    let args = Cli::parse();

    // RUST_LOG wins over -v/-q
    let env_filter = EnvFilter::builder()
        .with_default_directive(args.log_level().into())
        .from_env_lossy();
    let subscriber = Registry::default()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_span_events(FmtSpan::CLOSE));
    if let Err(e) = set_global_default(subscriber) {
        eprintln!("Unable to set up logging: {}", e);
    }

    let config = resolve_config(&args)?;
    info!("Parsed configuration: {:?}", config);

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| CliError::Config(format!("unable to start {} threads: {}", threads, e)))?;
    }

    if let Some(ref dir) = args.output_dir {
        std::fs::create_dir_all(dir)?;
        debug!("Using output directory {}", dir.display());
    }
    let output = OutputOptions {
        output_dir: args.output_dir.clone(),
        save_plot: args.save_plot,
    };

    let data_path = &args.data_path;
    let summaries = if data_path.is_dir() {
        process_directory(data_path, &config, &output)?
    } else if data_path.is_file() {
        let summary = process_file(data_path, &config, &output)?;
        println!("{}", summary);
        vec![summary]
    } else {
        return Err(CliError::InvalidPath {
            path: data_path.clone(),
            reason: "not a file or directory".to_string(),
        });
    };

    if let Some(ref dir) = output.output_dir {
        write_results(&summaries, dir)?;
    }
    Ok(())
}
