//! Provisioner module for the external conversion binary.
//!
//! This module makes sure an ffmpeg build is present under a configurable
//! install root, downloading and unpacking a packaged ZIP archive on first
//! use.
//!
//! # Layout
//!
//! ```text
//! <install_root>/
//!   ffmpeg/bin/ffmpeg   installed binary (returned by `ensure_binary`)
//!   ffmpeg_temp/        staging directory, only present during install
//!   ffmpeg.zip          downloaded archive, only present during install
//! ```
//!
//! # Example
//!
//! ```ignore
//! use vconv_core::provisioner::{Provisioner, ProvisionerConfig};
//!
//! let provisioner = Provisioner::http(ProvisionerConfig::default())?;
//! let ffmpeg = provisioner.ensure_binary().await?;
//! let path_var = provisioner.layout().search_path(std::env::var_os("PATH"))?;
//! ```

mod archive;
mod config;
mod error;
mod fetcher;
mod installer;
mod layout;

pub use archive::{extract_zip, single_top_level_dir};
pub use config::{ProvisionerConfig, DEFAULT_DOWNLOAD_URL};
pub use error::ProvisionError;
pub use fetcher::{ArchiveFetcher, HttpFetcher};
pub use installer::Provisioner;
pub use layout::{prepend_search_path, InstallLayout};
