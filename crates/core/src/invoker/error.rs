//! Error types for the invoker module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when starting or running a batch.
#[derive(Debug, Error)]
pub enum InvokerError {
    /// The batch has no input files.
    #[error("Please add at least one input file")]
    NoInputFiles,

    /// No output directory was chosen.
    #[error("Please select an output directory")]
    NoOutputDir,

    /// No output format was chosen.
    #[error("Please select an output format")]
    NoOutputFormat,

    /// Another batch is still running.
    #[error("A conversion batch is already running")]
    BatchInProgress,

    /// The conversion binary could not be started.
    #[error("Failed to start {path}: {source}")]
    Launch {
        path: PathBuf,
        source: std::io::Error,
    },

    /// I/O error while talking to the child process.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl InvokerError {
    /// Whether this error only means the batch was not started.
    ///
    /// These are reported as warnings; everything else is fatal.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::NoInputFiles | Self::NoOutputDir | Self::NoOutputFormat | Self::BatchInProgress
        )
    }
}
