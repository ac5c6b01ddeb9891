//! Error types for the provisioner module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while provisioning the conversion binary.
///
/// Every variant is fatal to provisioning; nothing is retried.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The server answered, but not with the archive.
    #[error("Failed to download {url}: {reason}")]
    Download { url: String, reason: String },

    /// Transport-level failure talking to the download server.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The downloaded archive could not be unpacked.
    #[error("Failed to extract archive {path}: {reason}")]
    Extract { path: PathBuf, reason: String },

    /// The archive did not contain exactly one top-level directory.
    #[error("Unexpected archive layout: found {found} top-level directories, expected 1")]
    ArchiveLayout { found: usize },

    /// Moving the extracted build into place failed.
    #[error("Failed to install into {path}: {source}")]
    Install {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The install completed but the binary is not where it should be.
    #[error("Binary not found after install: {path}")]
    BinaryMissing { path: PathBuf },

    /// I/O error during provisioning.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProvisionError {
    /// Creates a download error.
    pub fn download(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Download {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates an extraction error.
    pub fn extract(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Extract {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
