//! Archive download.

use async_trait::async_trait;
use futures::StreamExt;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::error::ProvisionError;

/// Something that can fetch the packaged binary archive to a local file.
#[async_trait]
pub trait ArchiveFetcher: Send + Sync {
    /// Returns the name of this fetcher implementation.
    fn name(&self) -> &str;

    /// Downloads `url` into `destination`, returning the number of bytes written.
    async fn fetch(&self, url: &str, destination: &Path) -> Result<u64, ProvisionError>;
}

/// Plain HTTP(S) GET via reqwest. No authentication, no retry, no checksum.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, ProvisionError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Creates a fetcher around an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ArchiveFetcher for HttpFetcher {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, url: &str, destination: &Path) -> Result<u64, ProvisionError> {
        info!("Downloading ffmpeg from: {}", url);

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ProvisionError::download(
                url,
                format!("HTTP {}", response.status()),
            ));
        }

        let total_size = response.content_length().unwrap_or(0);
        let mut file = tokio::fs::File::create(destination).await?;
        let mut downloaded: u64 = 0;
        let mut last_reported = 0;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            if total_size > 0 {
                let percent = downloaded * 100 / total_size;
                if percent >= last_reported + 10 {
                    debug!("Downloaded {}% ({} of {} bytes)", percent, downloaded, total_size);
                    last_reported = percent;
                }
            }
        }
        file.flush().await?;

        info!("Download complete ({} bytes)", downloaded);
        Ok(downloaded)
    }
}
