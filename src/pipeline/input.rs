//! Input resolution: turn whatever the caller supplied into raw document bytes.
//!
//! The pipeline only ever sees bytes. [`DocumentSource`] is the tagged union a
//! front end builds from its request (an uploaded body, a URL to fetch, or a
//! local path), and [`resolve_document`] collapses it to a `Vec<u8>` before
//! rasterisation starts. No magic-byte validation happens here: deciding
//! whether the bytes are renderable is the rasteriser's job.

use crate::error::PageCropError;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Where the document bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// Bytes already in memory (e.g. a multipart upload or stdin).
    Uploaded(Vec<u8>),
    /// An HTTP/HTTPS URL to download.
    Url(String),
    /// A file on the local file system.
    Path(PathBuf),
}

impl DocumentSource {
    /// Classify a user-supplied string as a URL or a local path.
    ///
    /// Strings with a scheme other than http/https are rejected rather than
    /// being mistaken for a relative path.
    pub fn from_arg(input: &str) -> Result<Self, PageCropError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(PageCropError::MissingInput);
        }
        if is_url(input) {
            return Ok(DocumentSource::Url(input.to_string()));
        }
        if input.contains("://") {
            return Err(PageCropError::InvalidInput {
                input: input.to_string(),
            });
        }
        Ok(DocumentSource::Path(PathBuf::from(input)))
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve a document source to its raw bytes.
pub async fn resolve_document(
    source: DocumentSource,
    timeout_secs: u64,
) -> Result<Vec<u8>, PageCropError> {
    match source {
        DocumentSource::Uploaded(bytes) => {
            debug!("Using uploaded document ({} bytes)", bytes.len());
            Ok(bytes)
        }
        DocumentSource::Url(url) => fetch_document(&url, timeout_secs).await,
        DocumentSource::Path(path) => read_local(&path).await,
    }
}

/// Read a local file, mapping I/O failures to retrieval errors.
async fn read_local(path: &Path) -> Result<Vec<u8>, PageCropError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => {
            debug!("Read local document: {} ({} bytes)", path.display(), bytes.len());
            Ok(bytes)
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(PageCropError::PermissionDenied {
                path: path.to_path_buf(),
            })
        }
        Err(_) => Err(PageCropError::FileNotFound {
            path: path.to_path_buf(),
        }),
    }
}

/// Download a document over HTTP(S).
///
/// # Errors
/// * [`PageCropError::InvalidInput`] for non-http(s) URLs
/// * [`PageCropError::DownloadTimeout`] when `timeout_secs` elapses
/// * [`PageCropError::DownloadFailed`] for connection errors and non-2xx statuses
pub async fn fetch_document(url: &str, timeout_secs: u64) -> Result<Vec<u8>, PageCropError> {
    if !is_url(url) || reqwest::Url::parse(url).is_err() {
        return Err(PageCropError::InvalidInput {
            input: url.to_string(),
        });
    }

    info!("Downloading document from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| PageCropError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let map_send_err = |e: reqwest::Error| {
        if e.is_timeout() {
            PageCropError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            PageCropError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    };

    let response = client.get(url).send().await.map_err(map_send_err)?;

    if !response.status().is_success() {
        return Err(PageCropError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response.bytes().await.map_err(map_send_err)?;
    info!("Downloaded {} bytes", bytes.len());

    Ok(bytes.to_vec())
}
