use lcpeaks::{
    AnalysisConfig,
    MissingPolicy,
    SmoothingConfig,
};
use std::path::Path;
use tracing::warn;

use crate::cli::Cli;
use crate::error::CliError;

pub fn load_config(path: &Path) -> Result<AnalysisConfig, CliError> {
    let file = std::fs::File::open(path).map_err(|e| {
        CliError::Config(format!("unable to open {}: {}", path.display(), e))
    })?;
    let config: AnalysisConfig = serde_json::from_reader(std::io::BufReader::new(file))?;
    Ok(config)
}

/// Reads the config file (if any) and applies the command line on top of it.
pub fn resolve_config(args: &Cli) -> Result<AnalysisConfig, CliError> {
    let config = match args.config {
        Some(ref path) => load_config(path)?,
        None => AnalysisConfig::default(),
    };
    let config = with_cli_overrides(config, args);

    if let Some(ref smoothing) = config.smoothing {
        // Length dependent checks happen per file.
        smoothing
            .validate(usize::MAX)
            .map_err(|e| CliError::Config(e.to_string()))?;
    }
    Ok(config)
}

fn with_cli_overrides(mut config: AnalysisConfig, args: &Cli) -> AnalysisConfig {
    if let Some(min_height) = args.min_height {
        config.detection.min_height = min_height;
    }
    if args.drop_missing {
        config.missing_policy = MissingPolicy::DropIncomplete;
    }
    if args.smooth && config.smoothing.is_none() {
        config.smoothing = Some(SmoothingConfig::default());
    }
    match config.smoothing {
        Some(ref mut smoothing) => {
            if let Some(window) = args.window {
                smoothing.window = window;
            }
            if let Some(polyorder) = args.polyorder {
                smoothing.polyorder = polyorder;
            }
        }
        None => {
            if args.window.is_some() || args.polyorder.is_some() {
                warn!("--window and --polyorder are ignored unless smoothing is enabled (--smooth)");
            }
        }
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn write_config(name: &str, contents: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join("lcpeaks_cli_config_tests");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_config() {
        let args = Cli::parse_from(["lcpeaks", "-d", "run.txt"]);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert!(config.smoothing.is_none());
    }

    #[test]
    fn test_flags_override_file() {
        let path = write_config(
            "override.json",
            r#"{"detection": {"min_height": 1.0}, "smoothing": {"window": 7, "polyorder": 2}}"#,
        );
        let path = path.to_string_lossy().to_string();
        let args = Cli::parse_from([
            "lcpeaks",
            "-d",
            "run.txt",
            "-c",
            path.as_str(),
            "--min-height",
            "2.5",
            "--window",
            "9",
            "--drop-missing",
        ]);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.detection.min_height, 2.5);
        assert_eq!(
            config.smoothing,
            Some(SmoothingConfig {
                window: 9,
                polyorder: 2,
            })
        );
        assert_eq!(config.missing_policy, MissingPolicy::DropIncomplete);
    }

    #[test]
    fn test_smooth_flag_uses_defaults() {
        let args = Cli::parse_from(["lcpeaks", "-d", "run.txt", "--smooth", "--polyorder", "3"]);
        let config = resolve_config(&args).unwrap();
        assert_eq!(
            config.smoothing,
            Some(SmoothingConfig {
                window: SmoothingConfig::DEFAULT_SG_WINDOW,
                polyorder: 3,
            })
        );
    }

    #[test]
    fn test_window_without_smoothing_is_ignored() {
        let args = Cli::parse_from(["lcpeaks", "-d", "run.txt", "--window", "4"]);
        let config = resolve_config(&args).unwrap();
        assert!(config.smoothing.is_none());
    }

    #[test]
    fn test_invalid_smoothing_is_a_config_error() {
        let args = Cli::parse_from(["lcpeaks", "-d", "run.txt", "--smooth", "--window", "4"]);
        assert!(matches!(resolve_config(&args), Err(CliError::Config(_))));
    }

    #[test]
    fn test_bad_json() {
        let path = write_config("bad.json", "{ not json");
        assert!(matches!(load_config(&path), Err(CliError::Json(_))));
        let missing = std::env::temp_dir().join("lcpeaks_cli_no_such_config.json");
        assert!(matches!(load_config(&missing), Err(CliError::Config(_))));
    }
}
