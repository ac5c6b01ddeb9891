//! Configuration for the invoker module.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;

/// Configuration for running conversion batches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokerConfig {
    /// Pass `-y` so existing outputs are replaced. When off no flag is
    /// passed; with stdin closed ffmpeg then refuses to overwrite and the
    /// file is skipped.
    #[serde(default = "default_overwrite")]
    pub overwrite_existing: bool,

    /// Additional ffmpeg arguments inserted before the output path.
    #[serde(default)]
    pub extra_args: Vec<String>,

    /// Capacity of the event channel between a batch and its observer.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    /// `PATH` value for child processes. Inherited from the parent when unset.
    #[serde(skip)]
    pub search_path: Option<OsString>,
}

fn default_overwrite() -> bool {
    false
}

fn default_event_buffer() -> usize {
    256
}

impl Default for InvokerConfig {
    fn default() -> Self {
        Self {
            overwrite_existing: default_overwrite(),
            extra_args: Vec::new(),
            event_buffer: default_event_buffer(),
            search_path: None,
        }
    }
}

impl InvokerConfig {
    /// Sets the `PATH` handed to child processes.
    pub fn with_search_path(mut self, search_path: OsString) -> Self {
        self.search_path = Some(search_path);
        self
    }

    /// Sets whether existing outputs are overwritten.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite_existing = overwrite;
        self
    }
}
