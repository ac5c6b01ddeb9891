//! CLI argument definitions using clap derive macros.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use vconv_core::{GpuMode, VideoCodec};

/// Batch video conversion with a self-provisioned ffmpeg.
#[derive(Parser, Debug)]
#[command(name = "vconv")]
#[command(author, version, about)]
pub struct Cli {
    /// Configuration file (defaults to ./vconv.toml when present)
    #[arg(long, global = true, env = "VCONV_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory the ffmpeg install lives under
    #[arg(long, global = true)]
    pub install_root: Option<PathBuf>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download and install ffmpeg if it is not present, then print its path
    Install,
    /// Convert a batch of files with one set of options
    Convert(ConvertArgs),
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input files, converted in the given order
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    pub output_dir: PathBuf,

    /// Output container format (mp4, avi, mkv, mov)
    #[arg(short = 'f', long, default_value = "mp4")]
    pub format: String,

    /// Output frame size, e.g. 1920x1080
    #[arg(long)]
    pub resolution: Option<String>,

    /// Video bitrate, e.g. 2M
    #[arg(long)]
    pub bitrate: Option<String>,

    /// Video codec: libx264, libx265, copy or none (let ffmpeg choose)
    #[arg(long, default_value = "libx264", value_parser = parse_codec)]
    pub codec: CodecChoice,

    /// GPU acceleration: none or nvenc
    #[arg(long, default_value = "none")]
    pub gpu: GpuMode,

    /// Replace output files that already exist
    #[arg(long)]
    pub overwrite: bool,

    /// Print events as JSON lines instead of a progress bar
    #[arg(long)]
    pub json: bool,
}

/// Codec selection where `none` leaves the choice to ffmpeg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecChoice(pub Option<VideoCodec>);

fn parse_codec(value: &str) -> Result<CodecChoice, String> {
    if value.trim().eq_ignore_ascii_case("none") {
        return Ok(CodecChoice(None));
    }
    value.parse::<VideoCodec>().map(|codec| CodecChoice(Some(codec)))
}
