//! Invoker module for running conversion batches.
//!
//! A batch converts a list of input files with one shared option set by
//! running the conversion binary once per file, strictly in order. The
//! binary's merged output is relayed line by line, and a coarse progress
//! percentage (based on the position of the file in the batch) is emitted
//! whenever a line carries a `time=HH:MM:SS.ms` stamp.
//!
//! # Example
//!
//! ```ignore
//! use vconv_core::invoker::{
//!     BatchController, BatchEvent, BatchInvoker, BatchRequest, ConversionOptions, InvokerConfig,
//! };
//!
//! let invoker = BatchInvoker::new(ffmpeg_path, InvokerConfig::default());
//! let controller = BatchController::new(invoker);
//!
//! let request = BatchRequest::new(inputs, "/out", "mp4", ConversionOptions::default());
//! let mut batch = controller.start(request)?;
//!
//! while let Some(envelope) = batch.next_event().await {
//!     match envelope.event {
//!         BatchEvent::Progress { percent } => println!("{}%", percent),
//!         BatchEvent::Log { line } => println!("{}", line),
//!         BatchEvent::Completed { files } => println!("{} files done", files),
//!     }
//! }
//! batch.join().await?;
//! ```

mod args;
mod batch;
mod config;
mod controller;
mod error;
mod events;
mod progress;
mod types;

pub use args::{build_args, format_command};
pub use batch::BatchInvoker;
pub use config::InvokerConfig;
pub use controller::{BatchController, BatchHandle};
pub use error::InvokerError;
pub use events::EventSink;
pub use progress::{parse_timestamp, BatchState, LogLines};
pub use types::{
    output_path_for, BatchEvent, BatchEventEnvelope, BatchRequest, ConversionJob,
    ConversionOptions, GpuMode, VideoCodec,
};
