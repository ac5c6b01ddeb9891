//! Sequential batch execution of the conversion binary.

use std::io::PipeReader;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncRead;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::args::{build_args, format_command};
use super::config::InvokerConfig;
use super::error::InvokerError;
use super::events::EventSink;
use super::progress::{parse_timestamp, BatchState, LogLines};
use super::types::{BatchRequest, ConversionJob};

/// Runs the conversion binary once per input file, one file at a time.
#[derive(Debug, Clone)]
pub struct BatchInvoker {
    executable: PathBuf,
    config: InvokerConfig,
}

impl BatchInvoker {
    pub fn new(executable: impl Into<PathBuf>, config: InvokerConfig) -> Self {
        Self {
            executable: executable.into(),
            config,
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn config(&self) -> &InvokerConfig {
        &self.config
    }

    /// Converts every input in order, then emits a single `Completed` event.
    ///
    /// Exit codes of the binary are not inspected; a failed file shows up
    /// only in the log lines. If the binary cannot be started at all the
    /// batch stops with [`InvokerError::Launch`] and no `Completed` event is
    /// sent.
    pub async fn run(&self, request: BatchRequest, sink: &EventSink) -> Result<(), InvokerError> {
        let mut state = BatchState::new(request.into_jobs());
        info!(
            "Starting batch {} with {} file(s)",
            sink.batch_id(),
            state.total()
        );

        while let Some(job) = state.start_next() {
            self.run_job(&job, &mut state, sink).await?;
        }

        info!("Batch {} finished", sink.batch_id());
        sink.completed(state.total()).await;
        Ok(())
    }

    async fn run_job(
        &self,
        job: &ConversionJob,
        state: &mut BatchState,
        sink: &EventSink,
    ) -> Result<(), InvokerError> {
        let args = build_args(job, &self.config);
        if job.options.gpu_overrides_codec() {
            debug!(
                "GPU encoder {:?} overrides codec {:?} for {:?}",
                job.options.gpu.encoder(),
                job.options.codec,
                job.input_path
            );
        }

        sink.log(format!(
            "Starting conversion: {} -> {}\nCommand: {}",
            job.input_path.display(),
            job.output_path.display(),
            format_command(&self.executable, &args)
        ))
        .await;

        // stdout and stderr share one pipe so lines keep the order they were written in.
        let (reader, writer) = std::io::pipe()?;
        let mut command = Command::new(&self.executable);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(writer.try_clone()?)
            .stderr(writer);
        if let Some(ref search_path) = self.config.search_path {
            command.env("PATH", search_path);
        }

        let spawned = command.spawn();
        // The command holds the parent's write ends; EOF only arrives once they are closed.
        drop(command);
        let mut child = spawned.map_err(|source| InvokerError::Launch {
            path: self.executable.clone(),
            source,
        })?;

        let mut lines = LogLines::new(merged_output(reader)?);
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    warn!("Failed to read process output: {}", e);
                    break;
                }
            };
            let matched = parse_timestamp(&line).is_some();
            sink.log(line).await;
            if matched {
                sink.progress(state.record_timestamp()).await;
            }
        }

        let status = child.wait().await?;
        debug!(
            "File {}/{} ({:?}) finished with {}",
            job.index,
            state.total(),
            job.input_path,
            status
        );

        Ok(())
    }
}

/// Async reader over the read end of the child's output pipe.
#[cfg(unix)]
fn merged_output(reader: PipeReader) -> std::io::Result<impl AsyncRead + Unpin> {
    tokio::net::unix::pipe::Receiver::from_owned_fd(reader.into())
}

/// Async reader over the read end of the child's output pipe.
///
/// Anonymous pipes cannot be registered with the reactor here, so a blocking
/// task copies the pipe into an in-memory duplex stream.
#[cfg(not(unix))]
fn merged_output(mut reader: PipeReader) -> std::io::Result<impl AsyncRead + Unpin> {
    use std::io::Read;
    use tokio::io::AsyncWriteExt;

    let (mut tx, rx) = tokio::io::duplex(8 * 1024);
    let handle = tokio::runtime::Handle::current();
    tokio::task::spawn_blocking(move || {
        let mut buf = [0u8; 8 * 1024];
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => n,
            };
            if handle.block_on(tx.write_all(&buf[..n])).is_err() {
                break;
            }
        }
    });
    Ok(rx)
}
