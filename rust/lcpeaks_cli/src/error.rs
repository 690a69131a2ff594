use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid data path {path:?}: {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    #[error("Error interpreting the config: {0}")]
    Config(String),

    #[error("Analysis error: {0}")]
    Analysis(#[from] lcpeaks::LcError),
}
