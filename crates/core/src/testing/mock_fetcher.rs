//! Mock archive fetcher for testing.

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::provisioner::{ArchiveFetcher, ProvisionError};

#[derive(Debug, Clone)]
enum Response {
    Bytes(Arc<Vec<u8>>),
    Fail(String),
}

/// Mock implementation of the ArchiveFetcher trait.
///
/// Either serves a fixed payload for every request or fails every request
/// with a download error. Clones share the request log, so a clone can be
/// handed to the provisioner while another is kept for assertions.
#[derive(Debug, Clone)]
pub struct MockFetcher {
    response: Response,
    calls: Arc<AtomicUsize>,
    urls: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    fn with_response(response: Response) -> Self {
        Self {
            response,
            calls: Arc::new(AtomicUsize::new(0)),
            urls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Writes `bytes` to the destination on every fetch.
    pub fn serving(bytes: Vec<u8>) -> Self {
        Self::with_response(Response::Bytes(Arc::new(bytes)))
    }

    /// Fails every fetch with [`ProvisionError::Download`].
    pub fn failing(reason: impl Into<String>) -> Self {
        Self::with_response(Response::Fail(reason.into()))
    }

    /// Number of fetches attempted so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// URLs requested so far, in order.
    pub fn requested_urls(&self) -> Vec<String> {
        self.urls.lock().map(|urls| urls.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ArchiveFetcher for MockFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, url: &str, destination: &Path) -> Result<u64, ProvisionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut urls) = self.urls.lock() {
            urls.push(url.to_string());
        }

        match &self.response {
            Response::Bytes(bytes) => {
                tokio::fs::write(destination, bytes.as_slice()).await?;
                Ok(bytes.len() as u64)
            }
            Response::Fail(reason) => Err(ProvisionError::download(url, reason.clone())),
        }
    }
}
