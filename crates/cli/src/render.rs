//! Terminal rendering of batch events.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;

use vconv_core::{BatchEvent, BatchEventEnvelope};

/// Message printed once every file in a batch has been processed.
pub const COMPLETION_MESSAGE: &str = "All files have been converted successfully!";

/// Consumes batch events and presents them to the user.
pub trait EventRenderer {
    fn render(&mut self, envelope: &BatchEventEnvelope) -> Result<()>;

    /// Called once the event stream has ended.
    fn finish(&mut self) {}
}

/// Progress bar on stderr with log lines printed above it on stdout.
pub struct BarRenderer {
    bar: ProgressBar,
}

impl BarRenderer {
    pub fn new(files: usize) -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.set_message(format!("{} file(s)", files));
        Self { bar }
    }
}

impl EventRenderer for BarRenderer {
    fn render(&mut self, envelope: &BatchEventEnvelope) -> Result<()> {
        match &envelope.event {
            BatchEvent::Progress { percent } => self.bar.set_position(u64::from(*percent)),
            BatchEvent::Log { line } => self.bar.suspend(|| println!("{}", line)),
            BatchEvent::Completed { .. } => {
                self.bar.set_position(100);
                self.bar.finish_with_message("done");
                println!("{}", COMPLETION_MESSAGE);
            }
        }
        Ok(())
    }

    fn finish(&mut self) {
        if !self.bar.is_finished() {
            self.bar.abandon();
        }
    }
}

/// One JSON object per event on the given writer.
pub struct JsonRenderer<W: Write> {
    out: W,
}

impl<W: Write> JsonRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> EventRenderer for JsonRenderer<W> {
    fn render(&mut self, envelope: &BatchEventEnvelope) -> Result<()> {
        serde_json::to_writer(&mut self.out, envelope)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}
