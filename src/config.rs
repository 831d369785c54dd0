//! Configuration types for the render → crop → encode pipeline.
//!
//! Every knob lives in [`PipelineConfig`], built via its
//! [`PipelineConfigBuilder`]. The pipeline functions take the config by
//! reference and hold no other state, so one config can be shared freely
//! across threads and requests.

use crate::error::PageCropError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Configuration for a pipeline run.
///
/// Built via [`PipelineConfig::builder()`] or using
/// [`PipelineConfig::default()`].
///
/// # Example
/// ```rust
/// use pagecrop::{OutputFormat, PipelineConfig};
///
/// let config = PipelineConfig::builder()
///     .threshold(230)
///     .format(OutputFormat::Png)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// Luminance cutoff for auto-crop. Pixels strictly darker are content. Default: 240.
    ///
    /// 240 leaves room for JPEG ringing and off-white paper scans while
    /// still treating light-grey text as content.
    pub threshold: u8,

    /// Compressed format of each emitted image. Default: [`OutputFormat::Jpeg`].
    pub format: OutputFormat,

    /// Encoder quality, 0–100. Default: 85. Ignored by lossless formats.
    pub quality: u8,

    /// What to do when the rasteriser cannot decode the document.
    /// Default: [`DecodeFallback::Placeholder`].
    pub decode_fallback: DecodeFallback,

    /// What to do when a single frame fails to crop or encode.
    /// Default: [`FramePolicy::Abort`].
    pub frame_policy: FramePolicy,

    /// Placeholder frame width in pixels. Default: 800.
    pub placeholder_width: u32,

    /// Placeholder frame height in pixels. Default: 600.
    pub placeholder_height: u32,

    /// Placeholder fill colour (RGB). Default: white.
    pub placeholder_color: [u8; 3],

    /// Download timeout for URL inputs in seconds. Default: 10.
    pub download_timeout_secs: u64,

    /// Optional per-frame progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: 240,
            format: OutputFormat::default(),
            quality: 85,
            decode_fallback: DecodeFallback::default(),
            frame_policy: FramePolicy::default(),
            placeholder_width: 800,
            placeholder_height: 600,
            placeholder_color: [255, 255, 255],
            download_timeout_secs: 10,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("threshold", &self.threshold)
            .field("format", &self.format)
            .field("quality", &self.quality)
            .field("decode_fallback", &self.decode_fallback)
            .field("frame_policy", &self.frame_policy)
            .field("placeholder_width", &self.placeholder_width)
            .field("placeholder_height", &self.placeholder_height)
            .field("placeholder_color", &self.placeholder_color)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn PipelineProgressCallback>"),
            )
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn threshold(mut self, threshold: u8) -> Self {
        self.config.threshold = threshold;
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn quality(mut self, quality: u8) -> Self {
        self.config.quality = quality.min(100);
        self
    }

    pub fn decode_fallback(mut self, fallback: DecodeFallback) -> Self {
        self.config.decode_fallback = fallback;
        self
    }

    pub fn frame_policy(mut self, policy: FramePolicy) -> Self {
        self.config.frame_policy = policy;
        self
    }

    pub fn placeholder_size(mut self, width: u32, height: u32) -> Self {
        self.config.placeholder_width = width;
        self.config.placeholder_height = height;
        self
    }

    pub fn placeholder_color(mut self, rgb: [u8; 3]) -> Self {
        self.config.placeholder_color = rgb;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, PageCropError> {
        let c = &self.config;
        if c.placeholder_width == 0 || c.placeholder_height == 0 {
            return Err(PageCropError::InvalidConfig(format!(
                "Placeholder dimensions must be ≥ 1, got {}x{}",
                c.placeholder_width, c.placeholder_height
            )));
        }
        if c.download_timeout_secs == 0 {
            return Err(PageCropError::InvalidConfig(
                "Download timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Compressed format of an emitted image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossy JPEG; smallest payloads. (default)
    #[default]
    Jpeg,
    /// Lossless PNG; pixel-exact round trip.
    Png,
}

impl OutputFormat {
    /// MIME type placed in the data-URI prefix.
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
        }
    }

    pub fn is_lossless(&self) -> bool {
        matches!(self, OutputFormat::Png)
    }

    /// Map a MIME type back to a format.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(OutputFormat::Jpeg),
            "image/png" => Some(OutputFormat::Png),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Jpeg => f.write_str("jpeg"),
            OutputFormat::Png => f.write_str("png"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = PageCropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" | "lossy" => Ok(OutputFormat::Jpeg),
            "png" | "lossless" => Ok(OutputFormat::Png),
            other => Err(PageCropError::InvalidConfig(format!(
                "Unknown output format '{other}' (expected jpeg, png, lossy or lossless)"
            ))),
        }
    }
}

/// Policy applied when the rasteriser cannot decode the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DecodeFallback {
    /// Substitute a blank placeholder frame and keep going. (default)
    ///
    /// The degradation is still recorded in
    /// [`crate::output::PipelineOutput::degraded`].
    #[default]
    Placeholder,
    /// Fail the request with [`PageCropError::Decode`].
    Propagate,
}

/// Policy applied when a single frame fails to crop or encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FramePolicy {
    /// Fail the whole request on the first frame error. (default)
    #[default]
    Abort,
    /// Drop the failed frame and keep the others; fail only if none succeed.
    Skip,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_behaviour() {
        let c = PipelineConfig::default();
        assert_eq!(c.threshold, 240);
        assert_eq!(c.format, OutputFormat::Jpeg);
        assert_eq!(c.quality, 85);
        assert_eq!((c.placeholder_width, c.placeholder_height), (800, 600));
        assert_eq!(c.placeholder_color, [255, 255, 255]);
        assert_eq!(c.download_timeout_secs, 10);
        assert_eq!(c.decode_fallback, DecodeFallback::Placeholder);
        assert_eq!(c.frame_policy, FramePolicy::Abort);
    }

    #[test]
    fn builder_clamps_quality() {
        let c = PipelineConfig::builder().quality(250).build().unwrap();
        assert_eq!(c.quality, 100);
    }

    #[test]
    fn builder_rejects_zero_placeholder() {
        let err = PipelineConfig::builder()
            .placeholder_size(0, 600)
            .build()
            .unwrap_err();
        assert!(matches!(err, PageCropError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_zero_timeout() {
        assert!(PipelineConfig::builder()
            .download_timeout_secs(0)
            .build()
            .is_err());
    }

    #[test]
    fn output_format_parsing() {
        assert_eq!("lossy".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("JPG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("png".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert_eq!(
            "lossless".parse::<OutputFormat>().unwrap(),
            OutputFormat::Png
        );
        assert!("gif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn mime_types_round_trip() {
        for f in [OutputFormat::Jpeg, OutputFormat::Png] {
            assert_eq!(OutputFormat::from_mime_type(f.mime_type()), Some(f));
        }
        assert_eq!(OutputFormat::from_mime_type("image/gif"), None);
    }

    #[test]
    fn debug_hides_callback() {
        let c = PipelineConfig::builder()
            .progress_callback(std::sync::Arc::new(crate::progress::NoopProgressCallback))
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(dbg.contains("<dyn PipelineProgressCallback>"), "got: {dbg}");
    }
}
