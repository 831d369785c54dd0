//! Error types for the pagecrop library.
//!
//! Three error types reflect three distinct failure modes:
//!
//! * [`PageCropError`] — **Fatal**: the request cannot produce output at all
//!   (document could not be retrieved, a frame failed under the strict frame
//!   policy, invalid configuration). Returned as `Err(PageCropError)` from
//!   [`crate::convert::run_pipeline`] and the `convert*` functions.
//!
//! * [`DecodeError`] — **Rasteriser**: the document bytes could not be turned
//!   into a frame. Under the default [`crate::config::DecodeFallback::Placeholder`]
//!   policy it never escapes the pipeline; it is recorded in
//!   [`crate::output::PipelineOutput::degraded`] and a blank frame is used instead.
//!
//! * [`FrameError`] — **Non-fatal**: a single frame failed to crop or encode
//!   while running under [`crate::config::FramePolicy::Skip`]. Stored in
//!   [`crate::output::FrameResult`] so callers can inspect partial success.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pagecrop library.
#[derive(Debug, Error)]
pub enum PageCropError {
    // ── Retrieval errors ──────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Document not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// No document was supplied at all.
    #[error("No document supplied: provide uploaded bytes, a file path, or a URL")]
    MissingInput,

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Pipeline errors ───────────────────────────────────────────────────
    /// The document could not be decoded and the fallback policy is `Propagate`.
    #[error("Document could not be rendered: {0}")]
    Decode(#[from] DecodeError),

    /// A frame failed to crop or encode under the strict frame policy.
    #[error("Failed to process frame {frame}: {detail}")]
    FrameFailed { frame: usize, detail: String },

    /// Every frame failed under the skip policy; output would be empty.
    #[error("All {total} frames failed.\nFirst error: {first_error}")]
    AllFramesFailed { total: usize, first_error: String },

    /// A string handed back for decoding is not an image data URI.
    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PageCropError {
    /// `true` when the document never reached the pipeline.
    ///
    /// A front end maps these to a client-side failure status and everything
    /// else to a server-side one.
    pub fn is_retrieval(&self) -> bool {
        matches!(
            self,
            PageCropError::FileNotFound { .. }
                | PageCropError::PermissionDenied { .. }
                | PageCropError::InvalidInput { .. }
                | PageCropError::MissingInput
                | PageCropError::DownloadFailed { .. }
                | PageCropError::DownloadTimeout { .. }
        )
    }
}

/// Why the rasteriser could not produce a frame from the document bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum DecodeError {
    /// Zero-length input.
    #[error("document is empty")]
    Empty,

    /// The leading bytes match no supported image codec.
    #[error("unrecognised document format (first bytes: {magic:02x?})")]
    UnrecognisedFormat { magic: Vec<u8> },

    /// The codec was identified but decoding failed.
    #[error("malformed {format} data: {detail}")]
    Malformed { format: String, detail: String },
}

/// A non-fatal error for a single frame.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum FrameError {
    /// Encoding the cropped frame failed.
    #[error("Frame {frame}: encoding failed: {detail}")]
    EncodeFailed { frame: usize, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_timeout_display() {
        let e = PageCropError::DownloadTimeout {
            url: "https://example.com/a.pdf".into(),
            secs: 10,
        };
        let msg = e.to_string();
        assert!(msg.contains("10s"), "got: {msg}");
        assert!(msg.contains("example.com"));
    }

    #[test]
    fn retrieval_errors_are_classified() {
        assert!(PageCropError::MissingInput.is_retrieval());
        assert!(PageCropError::DownloadFailed {
            url: "u".into(),
            reason: "HTTP 404 Not Found".into(),
        }
        .is_retrieval());
        assert!(!PageCropError::FrameFailed {
            frame: 1,
            detail: "boom".into(),
        }
        .is_retrieval());
        assert!(!PageCropError::Decode(DecodeError::Empty).is_retrieval());
    }

    #[test]
    fn unrecognised_format_shows_magic_bytes() {
        let e = DecodeError::UnrecognisedFormat {
            magic: vec![0x25, 0x50, 0x44, 0x46],
        };
        assert!(e.to_string().contains("25, 50, 44, 46"), "got: {e}");
    }

    #[test]
    fn decode_error_converts_into_fatal() {
        let fatal: PageCropError = DecodeError::Empty.into();
        assert!(fatal.to_string().contains("document is empty"));
    }
}
