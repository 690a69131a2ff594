use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LcError {
    #[error("Error reading file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed section '{section}' (line {line}): {reason}")]
    MalformedSection {
        section: &'static str,
        line: usize,
        reason: String,
    },

    #[error("Malformed data row at line {line}: {reason}")]
    MalformedDataRow { line: usize, reason: String },

    /// A missing sample (`n.a.` in the report) reached an operation that
    /// needs a value at that position.
    #[error("Missing signal value at index {index}")]
    MissingValue { index: usize },

    #[error("Missing time value at index {index}")]
    MissingTimeData { index: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Expected series of the same length, got {values} values and {times} times")]
    LengthMismatch { values: usize, times: usize },

    #[error("Peak bound {index} is outside of a series of length {len}")]
    PeakOutOfBounds { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, LcError>;
