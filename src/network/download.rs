// file: src/network/download.rs
// version: 2.0.0
// guid: u1v2w3x4-y5z6-7890-1234-567890uvwxyz

//! Package file downloads

use crate::{BridgeError, Result};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Fetches a URL into a local file
#[async_trait::async_trait]
pub trait Downloader: Send + Sync {
    /// Download `url` to `dest`, returning the number of bytes written
    async fn download(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// Last path segment of a URL, used as the local file name
pub fn file_name_from_url(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(|segment| segment.to_string())
}

/// HTTP downloader with a progress bar
pub struct NetworkDownloader {
    client: reqwest::Client,
    show_progress: bool,
}

impl NetworkDownloader {
    /// Create a new network downloader
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            show_progress: true,
        }
    }

    /// Disable the progress bar (non-terminal output)
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    fn progress_bar(&self, total_size: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total_size);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}

impl Default for NetworkDownloader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Downloader for NetworkDownloader {
    async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        info!("Downloading: {}", url);

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(BridgeError::network(format!(
                "Download of {} failed with status: {}",
                url,
                response.status()
            )));
        }

        let pb = self.progress_bar(response.content_length().unwrap_or(0));

        let mut file = File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut downloaded = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;
            pb.set_position(downloaded);
        }

        file.flush().await?;
        pb.finish_and_clear();

        debug!("Downloaded {} bytes to {}", downloaded, dest.display());
        Ok(downloaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_name_from_url() {
        assert_eq!(
            file_name_from_url(
                "http://ftp.debian.org/debian/pool/main/b/bridge-utils/bridge-utils_1.7.1-1_armhf.deb"
            ),
            Some("bridge-utils_1.7.1-1_armhf.deb".to_string())
        );
        assert_eq!(file_name_from_url("http://example.org/"), None);
        assert_eq!(file_name_from_url("not a url"), None);
    }

    #[tokio::test]
    async fn test_download_from_closed_port_fails() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("pkg.deb");
        let downloader = NetworkDownloader::new().without_progress();

        let result = downloader.download("http://127.0.0.1:1/pkg.deb", &dest).await;

        assert!(result.is_err());
    }
}
