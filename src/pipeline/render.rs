//! Rasterisation: decode document bytes into raster frames.
//!
//! The rasteriser hands the bytes to the `image` crate's codecs and renders
//! **at most one frame regardless of document page count**. Multi-page
//! containers (animated GIF, multi-page TIFF) yield their first frame; PDF and
//! other vector formats are not parsed and fall through to the decode-failure
//! path.
//!
//! ## Degraded mode
//!
//! [`rasterize`] reports failures as a [`DecodeError`]. The orchestrator calls
//! [`rasterize_with_fallback`], which applies the configured
//! [`DecodeFallback`]: under the default `Placeholder` policy a fixed-size
//! blank frame is substituted so callers always receive at least one frame,
//! and the error is kept in [`RasterOutcome::degraded`] instead of vanishing.

use crate::config::{DecodeFallback, PipelineConfig};
use crate::error::{DecodeError, PageCropError};
use image::{DynamicImage, Rgb, RgbImage};
use tracing::{debug, warn};

/// Result of rasterising with a fallback policy applied.
#[derive(Debug)]
pub struct RasterOutcome {
    /// Frames in document order. Never empty.
    pub frames: Vec<DynamicImage>,
    /// Set when the document failed to decode and a placeholder was used.
    pub degraded: Option<DecodeError>,
}

/// Decode document bytes into raster frames.
///
/// # Returns
/// A single-element vector on success.
///
/// # Errors
/// * [`DecodeError::Empty`] for zero-length input
/// * [`DecodeError::UnrecognisedFormat`] when no codec claims the magic bytes
/// * [`DecodeError::Malformed`] when the codec rejects the payload
pub fn rasterize(bytes: &[u8]) -> Result<Vec<DynamicImage>, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let format = image::guess_format(bytes).map_err(|_| DecodeError::UnrecognisedFormat {
        magic: bytes.iter().take(8).copied().collect(),
    })?;

    let frame = image::load_from_memory_with_format(bytes, format).map_err(|e| {
        DecodeError::Malformed {
            format: format!("{:?}", format),
            detail: e.to_string(),
        }
    })?;

    debug!(
        "Decoded {:?} document → {}x{} px",
        format,
        frame.width(),
        frame.height()
    );

    Ok(vec![frame])
}

/// Build the blank frame substituted for undecodable documents.
pub fn placeholder_frame(config: &PipelineConfig) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(
        config.placeholder_width,
        config.placeholder_height,
        Rgb(config.placeholder_color),
    ))
}

/// Rasterise, applying `config.decode_fallback` on failure.
///
/// # Errors
/// Returns [`PageCropError::Decode`] only under [`DecodeFallback::Propagate`].
pub fn rasterize_with_fallback(
    bytes: &[u8],
    config: &PipelineConfig,
) -> Result<RasterOutcome, PageCropError> {
    match rasterize(bytes) {
        Ok(frames) => Ok(RasterOutcome {
            frames,
            degraded: None,
        }),
        Err(e) => match config.decode_fallback {
            DecodeFallback::Placeholder => {
                warn!("Rendering failed ({}); substituting placeholder frame", e);
                Ok(RasterOutcome {
                    frames: vec![placeholder_frame(config)],
                    degraded: Some(e),
                })
            }
            DecodeFallback::Propagate => Err(PageCropError::Decode(e)),
        },
    }
}
