//! PDF download with size/type validation
//!
//! The body is streamed to `<name>.part` and only renamed to its final name once
//! it passes validation, so the download directory never holds a truncated or
//! error-page "report". The final name is also the de-duplication key.

use futures::StreamExt;
use reqwest::header::{HeaderMap, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::{ReportError, Result};

/// Anything smaller is assumed to be an error page.
pub const MIN_DOCUMENT_BYTES: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    /// Target already existed; nothing was requested
    AlreadyPresent(PathBuf),
    Downloaded { path: PathBuf, bytes: u64 },
}

impl Fetched {
    pub fn path(&self) -> &Path {
        match self {
            Fetched::AlreadyPresent(path) => path,
            Fetched::Downloaded { path, .. } => path,
        }
    }
}

pub struct FileFetcher {
    client: Client,
    download_dir: PathBuf,
    timeout: Duration,
    max_retries: u32,
}

impl FileFetcher {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            download_dir: config.download_dir.clone(),
            timeout: config.download_timeout(),
            max_retries: config.http.max_retries,
        }
    }

    pub fn target_path(&self, filename: &str) -> PathBuf {
        self.download_dir.join(filename)
    }

    /// Download `url` to `filename` inside the download directory.
    pub async fn fetch(&self, url: &str, filename: &str) -> Result<Fetched> {
        let path = self.target_path(filename);

        if path.exists() {
            info!("File already exists: {}", filename);
            return Ok(Fetched::AlreadyPresent(path));
        }

        info!("Downloading {} from {}", filename, url);

        let mut attempt = 0;
        loop {
            match self.download_once(url, &path).await {
                Ok(bytes) => {
                    info!(
                        "✓ Downloaded {} ({:.2} MB)",
                        filename,
                        bytes as f64 / 1024.0 / 1024.0
                    );
                    return Ok(Fetched::Downloaded { path, bytes });
                }
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!("Request failed for {} (attempt {}): {}", url, attempt, e);
                    tokio::time::sleep(Duration::from_millis(1000 * attempt as u64)).await;
                }
                Err(e) => {
                    warn!("✗ Download of {} failed: {}", filename, e);
                    return Err(e);
                }
            }
        }
    }

    async fn download_once(&self, url: &str, path: &Path) -> Result<u64> {
        let response = self.client.get(url).timeout(self.timeout).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ReportError::HttpStatus {
                status_code: status.as_u16(),
                url: url.to_string(),
            });
        }

        check_headers(response.headers())?;

        let partial = partial_path(path);
        let written: Result<u64> = async {
            let bytes = write_body(response, &partial).await?;
            if bytes < MIN_DOCUMENT_BYTES {
                return Err(ReportError::Validation(format!(
                    "only {} bytes, probably an error page",
                    bytes
                )));
            }
            tokio::fs::rename(&partial, path).await?;
            Ok(bytes)
        }
        .await;

        if written.is_err() {
            remove_if_exists(&partial).await;
        }
        written
    }
}

/// Reject responses whose headers already say they are not a document.
fn check_headers(headers: &HeaderMap) -> Result<()> {
    if let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) {
        if !is_document_type(content_type) {
            return Err(ReportError::Validation(format!(
                "unexpected content type '{}'",
                content_type
            )));
        }
    }

    let declared_length = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    if let Some(length) = declared_length {
        if length < MIN_DOCUMENT_BYTES {
            return Err(ReportError::Validation(format!(
                "declared length {} bytes, probably an error page",
                length
            )));
        }
    }

    Ok(())
}

fn is_document_type(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    ["pdf", "octet-stream", "download", "binary"]
        .iter()
        .any(|kind| content_type.contains(kind))
}

async fn write_body(response: reqwest::Response, partial: &Path) -> Result<u64> {
    let mut file = tokio::fs::File::create(partial).await?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        file.write_all(&chunk?).await?;
    }
    file.flush().await?;
    drop(file);

    Ok(tokio::fs::metadata(partial).await?.len())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

async fn remove_if_exists(path: &Path) {
    if path.exists() {
        if let Err(e) = tokio::fs::remove_file(path).await {
            warn!("Failed to remove partial file {}: {}", path.display(), e);
        } else {
            debug!("Removed partial file {}", path.display());
        }
    }
}
