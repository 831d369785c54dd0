//! Progress-callback trait for per-frame pipeline events.
//!
//! Inject an [`Arc<dyn PipelineProgressCallback>`] via
//! [`crate::config::PipelineConfigBuilder::progress_callback`] to receive
//! events as the pipeline crops and encodes each frame.
//!
//! # Example
//!
//! ```rust
//! use pagecrop::{PipelineConfig, PipelineProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: Arc<AtomicUsize>,
//! }
//!
//! impl PipelineProgressCallback for CountingCallback {
//!     fn on_frame_complete(&self, frame_num: usize, total_frames: usize, encoded_len: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Frame {}/{} done ({} bytes)", frame_num, total_frames, encoded_len);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     completed: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = PipelineConfig::builder()
//!     .progress_callback(counter as Arc<dyn PipelineProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the pipeline as it processes each frame.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. The pipeline itself is sequential, but the same
/// callback may be shared by concurrent requests, hence `Send + Sync`.
pub trait PipelineProgressCallback: Send + Sync {
    /// Called once after rasterisation, before the first frame is cropped.
    ///
    /// # Arguments
    /// * `total_frames` — frames handed over by the rasteriser, placeholder included
    fn on_pipeline_start(&self, total_frames: usize) {
        let _ = total_frames;
    }

    /// Called before a frame is cropped.
    ///
    /// # Arguments
    /// * `frame_num`    — 1-indexed position in rasteriser order
    /// * `total_frames` — same value passed to `on_pipeline_start`
    fn on_frame_start(&self, frame_num: usize, total_frames: usize) {
        let _ = (frame_num, total_frames);
    }

    /// Called once a frame has been cropped and encoded.
    ///
    /// # Arguments
    /// * `frame_num`    — 1-indexed position in rasteriser order
    /// * `total_frames` — same value passed to `on_pipeline_start`
    /// * `encoded_len`  — length of the frame's data URI in bytes
    fn on_frame_complete(&self, frame_num: usize, total_frames: usize, encoded_len: usize) {
        let _ = (frame_num, total_frames, encoded_len);
    }

    /// Called when a frame cannot be encoded, before the frame policy applies.
    ///
    /// # Arguments
    /// * `frame_num`    — 1-indexed position in rasteriser order
    /// * `total_frames` — same value passed to `on_pipeline_start`
    /// * `error`        — encoder message
    fn on_frame_error(&self, frame_num: usize, total_frames: usize, error: &str) {
        let _ = (frame_num, total_frames, error);
    }

    /// Called once every frame has been attempted.
    ///
    /// Not called when a frame error aborts the run.
    ///
    /// # Arguments
    /// * `total_frames`  — frames attempted
    /// * `success_count` — frames that produced a data URI
    fn on_pipeline_complete(&self, total_frames: usize, success_count: usize) {
        let _ = (total_frames, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl PipelineProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::PipelineConfig`].
pub type ProgressCallback = Arc<dyn PipelineProgressCallback>;
