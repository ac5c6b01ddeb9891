//! Download-and-install of the conversion binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::archive::{extract_zip, single_top_level_dir};
use super::config::ProvisionerConfig;
use super::error::ProvisionError;
use super::fetcher::{ArchiveFetcher, HttpFetcher};
use super::layout::InstallLayout;

/// Makes sure a conversion binary is available under the install root.
pub struct Provisioner<F: ArchiveFetcher> {
    config: ProvisionerConfig,
    layout: InstallLayout,
    fetcher: F,
}

impl Provisioner<HttpFetcher> {
    /// Creates a provisioner that downloads over HTTP(S).
    pub fn http(config: ProvisionerConfig) -> Result<Self, ProvisionError> {
        let fetcher = HttpFetcher::new(Duration::from_secs(config.request_timeout_secs))?;
        Ok(Self::new(config, fetcher))
    }
}

impl<F: ArchiveFetcher> Provisioner<F> {
    pub fn new(config: ProvisionerConfig, fetcher: F) -> Self {
        let layout = InstallLayout::new(&config);
        Self {
            config,
            layout,
            fetcher,
        }
    }

    /// The paths this provisioner works with.
    pub fn layout(&self) -> &InstallLayout {
        &self.layout
    }

    /// Returns the path to the binary, installing it first if it is missing.
    ///
    /// An existing binary is returned as-is without touching the network.
    /// The staging directory and the downloaded archive are removed on every
    /// exit path.
    pub async fn ensure_binary(&self) -> Result<PathBuf, ProvisionError> {
        if self.layout.is_installed() {
            info!("ffmpeg found at {:?}", self.layout.binary);
            return Ok(self.layout.binary.clone());
        }

        info!(
            "ffmpeg not found at {:?}, installing with {} fetcher",
            self.layout.binary,
            self.fetcher.name()
        );
        tokio::fs::create_dir_all(&self.layout.root).await?;

        let _cleanup = CleanupGuard::new([
            self.layout.staging_dir.clone(),
            self.layout.archive_path.clone(),
        ]);
        // Leftovers from an interrupted run would confuse the layout check.
        remove_path(&self.layout.staging_dir);

        self.fetcher
            .fetch(&self.config.download_url, &self.layout.archive_path)
            .await?;

        info!("Download complete. Extracting files...");
        let layout = self.layout.clone();
        let binary = tokio::task::spawn_blocking(move || install_from_archive(&layout))
            .await
            .map_err(std::io::Error::other)??;

        info!("ffmpeg has been installed at {:?}", binary);
        Ok(binary)
    }
}

/// Extracts the downloaded archive and moves its single top-level directory
/// into the install location, replacing any previous install.
fn install_from_archive(layout: &InstallLayout) -> Result<PathBuf, ProvisionError> {
    extract_zip(&layout.archive_path, &layout.staging_dir)?;
    let extracted = single_top_level_dir(&layout.staging_dir)?;
    debug!("Archive root directory: {:?}", extracted);

    // Not transactional: a crash between the removal and the rename leaves no install.
    if layout.install_dir.exists() {
        fs::remove_dir_all(&layout.install_dir).map_err(|source| ProvisionError::Install {
            path: layout.install_dir.clone(),
            source,
        })?;
    }
    fs::rename(&extracted, &layout.install_dir).map_err(|source| ProvisionError::Install {
        path: layout.install_dir.clone(),
        source,
    })?;

    // Never leave an install behind without a usable binary.
    if let Err(e) = check_binary(&layout.binary) {
        remove_path(&layout.install_dir);
        return Err(e);
    }

    Ok(layout.binary.clone())
}

/// Makes sure the installed binary is a regular file and executable.
fn check_binary(binary: &Path) -> Result<(), ProvisionError> {
    if !binary.is_file() {
        return Err(ProvisionError::BinaryMissing {
            path: binary.to_path_buf(),
        });
    }
    mark_executable(binary)
}

#[cfg(unix)]
fn mark_executable(path: &Path) -> Result<(), ProvisionError> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)?.permissions();
    if permissions.mode() & 0o111 != 0o111 {
        permissions.set_mode(permissions.mode() | 0o755);
        fs::set_permissions(path, permissions)?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) -> Result<(), ProvisionError> {
    Ok(())
}

/// Removes the given files or directories when dropped.
struct CleanupGuard {
    paths: Vec<PathBuf>,
}

impl CleanupGuard {
    fn new(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            paths: paths.into_iter().collect(),
        }
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        for path in &self.paths {
            remove_path(path);
        }
    }
}

fn remove_path(path: &Path) {
    let result = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(_) => return,
    };
    if let Err(e) = result {
        warn!("Failed to clean up {:?}: {}", path, e);
    }
}
