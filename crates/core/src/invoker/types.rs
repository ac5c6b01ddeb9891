//! Types for the invoker module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use super::error::InvokerError;

/// Software video codecs offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    /// H.264 / AVC
    Libx264,
    /// H.265 / HEVC
    Libx265,
    /// Copy (no re-encoding)
    Copy,
}

impl VideoCodec {
    pub const ALL: [VideoCodec; 3] = [Self::Libx264, Self::Libx265, Self::Copy];

    /// Returns the ffmpeg codec name for this codec.
    pub fn ffmpeg_codec(&self) -> &'static str {
        match self {
            Self::Libx264 => "libx264",
            Self::Libx265 => "libx265",
            Self::Copy => "copy",
        }
    }
}

impl fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ffmpeg_codec())
    }
}

impl FromStr for VideoCodec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|codec| codec.ffmpeg_codec().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!("unknown codec '{}', expected one of: libx264, libx265, copy", s)
            })
    }
}

/// Hardware acceleration choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GpuMode {
    /// Software encoding only.
    #[default]
    None,
    /// NVIDIA NVENC H.264 encoder.
    Nvenc,
}

impl GpuMode {
    /// The hardware encoder this mode selects, if any.
    pub fn encoder(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Nvenc => Some("h264_nvenc"),
        }
    }
}

impl fmt::Display for GpuMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Nvenc => f.write_str("nvenc"),
        }
    }
}

impl FromStr for GpuMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(Self::None),
            "nvenc" => Ok(Self::Nvenc),
            other => Err(format!("unknown GPU mode '{}', expected none or nvenc", other)),
        }
    }
}

/// Encoding options shared by every file in a batch.
///
/// Only presence is checked. Values are handed to ffmpeg as typed, so a
/// malformed resolution or bitrate is rejected by ffmpeg itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionOptions {
    /// Frame size such as `1920x1080`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    /// Video bitrate such as `1000k`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<String>,
    /// Software codec.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<VideoCodec>,
    /// Hardware encoder override.
    #[serde(default)]
    pub gpu: GpuMode,
}

impl ConversionOptions {
    pub fn with_resolution(mut self, resolution: impl Into<String>) -> Self {
        self.resolution = Some(resolution.into());
        self
    }

    pub fn with_bitrate(mut self, bitrate: impl Into<String>) -> Self {
        self.bitrate = Some(bitrate.into());
        self
    }

    pub fn with_codec(mut self, codec: VideoCodec) -> Self {
        self.codec = Some(codec);
        self
    }

    pub fn with_gpu(mut self, gpu: GpuMode) -> Self {
        self.gpu = gpu;
        self
    }

    /// Resolution, if one was entered.
    pub fn resolution(&self) -> Option<&str> {
        non_blank(&self.resolution)
    }

    /// Bitrate, if one was entered.
    pub fn bitrate(&self) -> Option<&str> {
        non_blank(&self.bitrate)
    }

    /// Whether both a software codec and a hardware encoder are selected.
    pub fn gpu_overrides_codec(&self) -> bool {
        self.codec.is_some() && self.gpu.encoder().is_some()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// One file to convert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    /// 1-based position in the batch.
    pub index: usize,
    /// Input file path.
    pub input_path: PathBuf,
    /// Output file path.
    pub output_path: PathBuf,
    /// Options shared across the batch.
    pub options: Arc<ConversionOptions>,
}

impl ConversionJob {
    /// Builds a job writing `<output_dir>/<input stem>.<output_format>`.
    pub fn new(
        index: usize,
        input_path: impl Into<PathBuf>,
        output_dir: &Path,
        output_format: &str,
        options: Arc<ConversionOptions>,
    ) -> Self {
        let input_path = input_path.into();
        let output_path = output_path_for(&input_path, output_dir, output_format);
        Self {
            index,
            input_path,
            output_path,
            options,
        }
    }
}

/// Derives the output path for an input: same stem, new extension, in `output_dir`.
pub fn output_path_for(input: &Path, output_dir: &Path, output_format: &str) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    output_dir.join(format!("{}.{}", stem, output_format))
}

/// What the user asked to convert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequest {
    /// Input files, in conversion order.
    pub inputs: Vec<PathBuf>,
    /// Directory the outputs are written to.
    pub output_dir: PathBuf,
    /// Output container extension, e.g. `mp4`.
    pub output_format: String,
    /// Shared encoding options.
    #[serde(default)]
    pub options: ConversionOptions,
}

impl BatchRequest {
    pub fn new(
        inputs: Vec<PathBuf>,
        output_dir: impl Into<PathBuf>,
        output_format: impl Into<String>,
        options: ConversionOptions,
    ) -> Self {
        Self {
            inputs,
            output_dir: output_dir.into(),
            output_format: output_format.into(),
            options,
        }
    }

    /// Checks that inputs, output directory and format were selected.
    pub fn validate(&self) -> Result<(), InvokerError> {
        if self.inputs.is_empty() {
            return Err(InvokerError::NoInputFiles);
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(InvokerError::NoOutputDir);
        }
        if self.output_format.trim().is_empty() {
            return Err(InvokerError::NoOutputFormat);
        }
        Ok(())
    }

    /// Expands the request into one job per input, in input order.
    pub fn into_jobs(self) -> Vec<ConversionJob> {
        let options = Arc::new(self.options);
        let format = self.output_format.trim();
        self.inputs
            .into_iter()
            .enumerate()
            .map(|(i, input)| {
                ConversionJob::new(i + 1, input, &self.output_dir, format, Arc::clone(&options))
            })
            .collect()
    }
}

/// Notification sent from a running batch to its observer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BatchEvent {
    /// Coarse batch progress, 0-100, based on file position.
    Progress { percent: u8 },
    /// A line of text for the log view.
    Log { line: String },
    /// Every file has been processed.
    Completed { files: usize },
}

/// A batch event with the batch it belongs to and when it was emitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEventEnvelope {
    pub batch_id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: BatchEvent,
}
