//! # pagecrop
//!
//! Render a document to raster images, trim the blank margins around the
//! content, and return each image as a base64 data URI.
//!
//! ## Pipeline Overview
//!
//! ```text
//! document (upload / URL / path)
//!  │
//!  ├─ 1. Input   resolve to raw bytes (URL fetch with timeout)
//!  ├─ 2. Render  decode at most one frame; placeholder on failure
//!  ├─ 3. Crop    luminance-threshold bounding box
//!  └─ 4. Encode  JPEG/PNG → data:image/...;base64,...
//! ```
//!
//! The stages after input are synchronous, side-effect free and keep no
//! state between calls: the same bytes and config always yield the same
//! frames.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pagecrop::{run_pipeline, PipelineConfig};
//!
//! let bytes = std::fs::read("scan.png")?;
//! let output = run_pipeline(&bytes, &PipelineConfig::default())?;
//! for uri in output.data_uris() {
//!     println!("{}", &uri[..40]);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pagecrop` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{DecodeFallback, FramePolicy, OutputFormat, PipelineConfig, PipelineConfigBuilder};
pub use convert::{
    convert, convert_sync, convert_to_file, encode_document, process_frames, run_pipeline,
};
pub use error::{DecodeError, FrameError, PageCropError};
pub use output::{FrameResult, PipelineOutput, PipelineStats};
pub use pipeline::crop::{autocrop, autocrop_with_box, find_content_box, CropBox};
pub use pipeline::encode::{encode_frame, EncodedImage};
pub use pipeline::input::{fetch_document, resolve_document, DocumentSource};
pub use pipeline::render::{placeholder_frame, rasterize, rasterize_with_fallback, RasterOutcome};
pub use progress::{NoopProgressCallback, PipelineProgressCallback, ProgressCallback};
