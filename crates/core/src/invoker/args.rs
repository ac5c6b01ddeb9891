//! ffmpeg argument construction.

use std::path::Path;

use super::config::InvokerConfig;
use super::types::ConversionJob;

/// Builds the ffmpeg argument list for one job (without the executable).
///
/// When a hardware encoder is selected next to a software codec, both `-c:v`
/// flags are emitted; ffmpeg keeps the last one, so the hardware encoder wins.
pub fn build_args(job: &ConversionJob, config: &InvokerConfig) -> Vec<String> {
    let mut args = Vec::new();

    if config.overwrite_existing {
        args.push("-y".to_string());
    }

    args.extend([
        "-i".to_string(),
        job.input_path.to_string_lossy().to_string(),
    ]);

    let options = &job.options;
    if let Some(resolution) = options.resolution() {
        args.extend(["-s".to_string(), resolution.to_string()]);
    }
    if let Some(bitrate) = options.bitrate() {
        args.extend(["-b:v".to_string(), bitrate.to_string()]);
    }
    if let Some(codec) = options.codec {
        args.extend(["-c:v".to_string(), codec.ffmpeg_codec().to_string()]);
    }
    if let Some(encoder) = options.gpu.encoder() {
        args.extend(["-c:v".to_string(), encoder.to_string()]);
    }

    args.extend(config.extra_args.iter().cloned());

    args.push(job.output_path.to_string_lossy().to_string());

    args
}

/// Renders the full command line for the log view.
pub fn format_command(executable: &Path, args: &[String]) -> String {
    let mut command = executable.to_string_lossy().to_string();
    for arg in args {
        command.push(' ');
        command.push_str(arg);
    }
    command
}
