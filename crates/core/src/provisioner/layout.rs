//! Filesystem layout of a managed ffmpeg install.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::config::ProvisionerConfig;

/// Paths the provisioner reads and writes, all derived from the install root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    /// Root directory (e.g. the working directory of the application).
    pub root: PathBuf,
    /// Directory the extracted build is moved into (`<root>/ffmpeg`).
    pub install_dir: PathBuf,
    /// Directory holding the executables (`<root>/ffmpeg/bin`).
    pub bin_dir: PathBuf,
    /// Path to the conversion binary.
    pub binary: PathBuf,
    /// Temporary extraction directory.
    pub staging_dir: PathBuf,
    /// Where the downloaded archive is written.
    pub archive_path: PathBuf,
}

impl InstallLayout {
    pub fn new(config: &ProvisionerConfig) -> Self {
        let root = config.install_root.clone();
        let install_dir = root.join(&config.install_dir_name);
        let bin_dir = install_dir.join("bin");
        let binary = bin_dir.join(format!(
            "{}{}",
            config.binary_name,
            std::env::consts::EXE_SUFFIX
        ));

        Self {
            staging_dir: root.join(&config.staging_dir_name),
            archive_path: root.join(&config.archive_name),
            root,
            install_dir,
            bin_dir,
            binary,
        }
    }

    /// Whether a binary is already installed.
    pub fn is_installed(&self) -> bool {
        self.binary.exists()
    }

    /// Returns a `PATH` value with the install's bin directory in front of `current`.
    ///
    /// The caller decides where the value is applied; the process environment
    /// is left untouched.
    pub fn search_path(
        &self,
        current: Option<OsString>,
    ) -> Result<OsString, std::env::JoinPathsError> {
        prepend_search_path(&self.bin_dir, current)
    }
}

/// Prepends `dir` to a platform `PATH` value.
pub fn prepend_search_path(
    dir: &Path,
    current: Option<OsString>,
) -> Result<OsString, std::env::JoinPathsError> {
    let mut entries = vec![dir.to_path_buf()];
    if let Some(current) = current {
        entries.extend(std::env::split_paths(&current));
    }
    std::env::join_paths(entries)
}
