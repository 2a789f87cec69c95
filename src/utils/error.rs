//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while loading and decoding a trace capture
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read capture file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid capture format: {0}")]
    InvalidFormat(String),
}

/// Errors that can occur during trace graph queries
#[derive(Error, Debug)]
pub enum GraphError {
    /// A point-in-time lookup fell outside every node's interval.
    /// The correlation linker depends on lookup succeeding, so this is
    /// surfaced instead of a silent miss.
    #[error("Timestamp {0} is outside every node interval")]
    TimeOutOfRange(i64),
}

/// Recoverable gaps in the bandwidth estimator.
///
/// Each of these aborts one kernel's estimate, never the run.
#[derive(Error, Debug)]
pub enum EstimateError {
    #[error("Unknown dtype for bandwidth estimate: {0}")]
    UnknownDtype(String),

    #[error("No operand shape recoverable for launcher: {0}")]
    ShapeUnavailable(String),

    #[error("Unsupported {dims}-dimensional multiply for kernel: {name}")]
    UnsupportedShape { name: String, dims: usize },

    #[error("Kernel has no launching operation two levels up: {0}")]
    NoLauncher(String),
}

/// Errors that can occur during report output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("CSV write failed: {0}")]
    CsvFailed(#[from] csv::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
