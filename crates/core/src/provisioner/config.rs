//! Configuration for the provisioner module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default location of the packaged ffmpeg build.
pub const DEFAULT_DOWNLOAD_URL: &str =
    "https://www.gyan.dev/ffmpeg/builds/ffmpeg-release-essentials.zip";

/// Configuration for the ffmpeg provisioner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionerConfig {
    /// Directory that holds the install, the staging directory and the archive.
    #[serde(default = "default_install_root")]
    pub install_root: PathBuf,

    /// URL of the ZIP archive to download when no install is present.
    #[serde(default = "default_download_url")]
    pub download_url: String,

    /// Name of the install directory under `install_root`.
    #[serde(default = "default_install_dir_name")]
    pub install_dir_name: String,

    /// Name of the temporary extraction directory under `install_root`.
    #[serde(default = "default_staging_dir_name")]
    pub staging_dir_name: String,

    /// File name the archive is downloaded to.
    #[serde(default = "default_archive_name")]
    pub archive_name: String,

    /// Executable name inside `<install>/bin`, without platform suffix.
    #[serde(default = "default_binary_name")]
    pub binary_name: String,

    /// Timeout for the whole download request in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_install_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_download_url() -> String {
    DEFAULT_DOWNLOAD_URL.to_string()
}

fn default_install_dir_name() -> String {
    "ffmpeg".to_string()
}

fn default_staging_dir_name() -> String {
    "ffmpeg_temp".to_string()
}

fn default_archive_name() -> String {
    "ffmpeg.zip".to_string()
}

fn default_binary_name() -> String {
    "ffmpeg".to_string()
}

fn default_request_timeout() -> u64 {
    600
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        Self {
            install_root: default_install_root(),
            download_url: default_download_url(),
            install_dir_name: default_install_dir_name(),
            staging_dir_name: default_staging_dir_name(),
            archive_name: default_archive_name(),
            binary_name: default_binary_name(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ProvisionerConfig {
    /// Creates a config rooted at the given directory.
    pub fn with_install_root(install_root: impl Into<PathBuf>) -> Self {
        Self {
            install_root: install_root.into(),
            ..Default::default()
        }
    }

    /// Sets the download URL.
    pub fn with_download_url(mut self, url: impl Into<String>) -> Self {
        self.download_url = url.into();
        self
    }
}
