//! Output types produced by a pipeline run.

use crate::error::{DecodeError, FrameError};
use crate::pipeline::crop::CropBox;
use crate::pipeline::encode::EncodedImage;
use serde::{Deserialize, Serialize};

/// Everything a pipeline run produced.
///
/// Serialises with `cropped_images` as the leading key, so a JSON consumer
/// that only wants the images can ignore the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutput {
    /// One data URI per successfully processed frame, in frame order.
    pub cropped_images: Vec<EncodedImage>,

    /// Per-frame details, including frames dropped under `FramePolicy::Skip`.
    pub frames: Vec<FrameResult>,

    /// Set when the document could not be decoded and a placeholder was used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degraded: Option<DecodeError>,

    pub stats: PipelineStats,
}

impl PipelineOutput {
    /// `true` if the images come from a placeholder rather than the document.
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }

    /// The data URIs as plain strings.
    pub fn data_uris(&self) -> Vec<String> {
        self.cropped_images.iter().map(|i| i.to_data_uri()).collect()
    }
}

/// Result for a single frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameResult {
    /// 1-indexed frame number.
    pub frame_num: usize,
    pub original_width: u32,
    pub original_height: u32,
    /// Region kept by auto-crop (full bounds when the frame was blank).
    pub crop_box: CropBox,
    /// Length of the data URI, 0 when the frame failed.
    pub encoded_len: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<FrameError>,
}

/// Aggregate statistics for a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineStats {
    pub total_frames: usize,
    pub processed_frames: usize,
    pub failed_frames: usize,
    pub input_bytes: usize,
    pub render_duration_ms: u64,
    pub total_duration_ms: u64,
    /// A placeholder frame stood in for an undecodable document.
    #[serde(default)]
    pub degraded: bool,
}
