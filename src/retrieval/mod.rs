//! File retrieval — stream one archive URL to local storage.
//!
//! One GET per archive, no retry, no resume. The destination directory is
//! created on demand and an existing file with the same derived name is
//! overwritten.

pub mod filename;

use anyhow::{Context, Result};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Result of one retrieval.
#[derive(Debug, Clone)]
pub struct Downloaded {
    /// Where the archive landed.
    pub path: PathBuf,
    /// Bytes written.
    pub bytes: u64,
}

/// Streams archive URLs to disk.
#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    /// Create a fetcher. `connect_timeout_ms` bounds connection setup only;
    /// an overall request timeout would cut off large archives mid-stream.
    pub fn new(connect_timeout_ms: u64) -> Self {
        let ua = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                  AppleWebKit/537.36 (KHTML, like Gecko) \
                  Chrome/131.0.0.0 Safari/537.36";

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(connect_timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(ua)
            .build()
            .unwrap_or_default();

        Self { client }
    }

    /// Download `url` into `dest_dir`, naming the file after the URL's last
    /// path segment. Single attempt; non-2xx statuses are errors.
    pub async fn download(&self, url: &str, dest_dir: &Path) -> Result<Downloaded> {
        tokio::fs::create_dir_all(dest_dir)
            .await
            .with_context(|| format!("failed to create {}", dest_dir.display()))?;

        let name = filename::derive_filename(url);
        let path = dest_dir.join(&name);

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("server rejected {url}"))?;

        let mut file = tokio::fs::File::create(&path)
            .await
            .with_context(|| format!("failed to create {}", path.display()))?;

        let mut bytes: u64 = 0;
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.with_context(|| format!("stream from {url} broke"))?;
            file.write_all(&chunk)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            bytes += chunk.len() as u64;
        }
        file.flush()
            .await
            .with_context(|| format!("failed to flush {}", path.display()))?;

        Ok(Downloaded { path, bytes })
    }
}
