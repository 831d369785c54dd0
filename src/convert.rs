//! Pipeline orchestration and entry points.
//!
//! [`run_pipeline`] is the synchronous core: bytes in, data URIs out. It is a
//! pure function of `(bytes, config)` and keeps no state between calls.
//! [`convert`] wraps it for async callers: it resolves a [`DocumentSource`]
//! first, then runs the CPU-bound stages on the blocking thread pool so Tokio
//! worker threads never stall on JPEG compression.

use crate::config::{FramePolicy, OutputFormat, PipelineConfig};
use crate::error::{FrameError, PageCropError};
use crate::output::{FrameResult, PipelineOutput, PipelineStats};
use crate::pipeline::encode::EncodedImage;
use crate::pipeline::input::{self, DocumentSource};
use crate::pipeline::{crop, encode, render};
use image::DynamicImage;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Render, auto-crop and encode a document.
///
/// # Errors
/// * [`PageCropError::Decode`] — only under `DecodeFallback::Propagate`
/// * [`PageCropError::FrameFailed`] — a frame failed under `FramePolicy::Abort`
/// * [`PageCropError::AllFramesFailed`] — every frame failed under `FramePolicy::Skip`
pub fn run_pipeline(
    bytes: &[u8],
    config: &PipelineConfig,
) -> Result<PipelineOutput, PageCropError> {
    let total_start = Instant::now();
    debug!("Running pipeline on {} bytes with {:?}", bytes.len(), config);

    // ── Step 1: Rasterise ────────────────────────────────────────────────
    let render_start = Instant::now();
    let raster = render::rasterize_with_fallback(bytes, config)?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;

    // ── Step 2+3: Crop and encode each frame ─────────────────────────────
    let (cropped_images, frames) = process_frames(raster.frames, config)?;

    let failed = frames.iter().filter(|f| f.error.is_some()).count();
    let stats = PipelineStats {
        total_frames: frames.len(),
        processed_frames: cropped_images.len(),
        failed_frames: failed,
        input_bytes: bytes.len(),
        render_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        degraded: raster.degraded.is_some(),
    };

    info!(
        "Pipeline complete: {}/{} frames, {}ms total{}",
        stats.processed_frames,
        stats.total_frames,
        stats.total_duration_ms,
        if stats.degraded {
            " (placeholder)"
        } else {
            ""
        }
    );

    Ok(PipelineOutput {
        cropped_images,
        frames,
        degraded: raster.degraded,
        stats,
    })
}

/// Auto-crop and encode already-rasterised frames, preserving their order.
///
/// Frames are processed sequentially. How a failed frame is handled depends
/// on `config.frame_policy`.
pub fn process_frames(
    frames: Vec<DynamicImage>,
    config: &PipelineConfig,
) -> Result<(Vec<EncodedImage>, Vec<FrameResult>), PageCropError> {
    let total = frames.len();
    let cb = config.progress_callback.as_ref();
    if let Some(cb) = cb {
        cb.on_pipeline_start(total);
    }

    let mut images = Vec::with_capacity(total);
    let mut results = Vec::with_capacity(total);

    for (idx, frame) in frames.into_iter().enumerate() {
        let frame_num = idx + 1;
        if let Some(cb) = cb {
            cb.on_frame_start(frame_num, total);
        }

        let (cropped, crop_box) = crop::autocrop_with_box(&frame, config.threshold);
        debug!(
            "Frame {}: {}x{} → {}x{}",
            frame_num,
            frame.width(),
            frame.height(),
            crop_box.width(),
            crop_box.height()
        );

        let mut result = FrameResult {
            frame_num,
            original_width: frame.width(),
            original_height: frame.height(),
            crop_box,
            encoded_len: 0,
            error: None,
        };

        match encode::encode_frame(&cropped, config.format, config.quality) {
            Ok(encoded) => {
                result.encoded_len = encoded.to_data_uri().len();
                if let Some(cb) = cb {
                    cb.on_frame_complete(frame_num, total, result.encoded_len);
                }
                images.push(encoded);
            }
            Err(e) => {
                if let Some(cb) = cb {
                    cb.on_frame_error(frame_num, total, &e.to_string());
                }
                match config.frame_policy {
                    FramePolicy::Abort => {
                        return Err(PageCropError::FrameFailed {
                            frame: frame_num,
                            detail: e.to_string(),
                        });
                    }
                    FramePolicy::Skip => {
                        warn!("Skipping frame {}: {}", frame_num, e);
                        result.error = Some(FrameError::EncodeFailed {
                            frame: frame_num,
                            detail: e.to_string(),
                        });
                    }
                }
            }
        }

        results.push(result);
    }

    if let Some(cb) = cb {
        cb.on_pipeline_complete(total, images.len());
    }

    if images.is_empty() && total > 0 {
        let first_error = results
            .iter()
            .find_map(|r| r.error.as_ref())
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(PageCropError::AllFramesFailed { total, first_error });
    }

    Ok((images, results))
}

/// Run the pipeline with explicit parameters and return only the images.
///
/// Shorthand for callers that do not need stats or per-frame details. Uses
/// the default placeholder fallback and strict frame policy.
pub fn encode_document(
    bytes: &[u8],
    threshold: u8,
    format: OutputFormat,
    quality: u8,
) -> Result<Vec<EncodedImage>, PageCropError> {
    let config = PipelineConfig::builder()
        .threshold(threshold)
        .format(format)
        .quality(quality)
        .build()?;
    Ok(run_pipeline(bytes, &config)?.cropped_images)
}

/// Resolve a document source and run the pipeline.
///
/// This is the primary async entry point.
///
/// # Errors
/// Retrieval errors ([`PageCropError::is_retrieval`]) are returned before
/// the pipeline runs; otherwise as for [`run_pipeline`].
pub async fn convert(
    source: DocumentSource,
    config: &PipelineConfig,
) -> Result<PipelineOutput, PageCropError> {
    let bytes = input::resolve_document(source, config.download_timeout_secs).await?;
    info!("Starting pipeline: {} bytes", bytes.len());

    let config = config.clone();
    tokio::task::spawn_blocking(move || run_pipeline(&bytes, &config))
        .await
        .map_err(|e| PageCropError::Internal(format!("Pipeline task panicked: {}", e)))?
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    source: DocumentSource,
    config: &PipelineConfig,
) -> Result<PipelineOutput, PageCropError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PageCropError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(source, config))
}

/// Run the pipeline and write the JSON output to a file.
///
/// Writes to a temp file in the target directory, then renames it into
/// place, so readers never observe a partial file.
pub async fn convert_to_file(
    source: DocumentSource,
    output_path: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<PipelineStats, PageCropError> {
    let output = convert(source, config).await?;
    let path = output_path.as_ref().to_path_buf();
    let write_err = |source: std::io::Error| PageCropError::OutputWriteFailed {
        path: path.clone(),
        source,
    };

    let json = serde_json::to_vec_pretty(&output)
        .map_err(|e| PageCropError::Internal(format!("Failed to serialise output: {e}")))?;

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    tokio::fs::create_dir_all(&dir).await.map_err(write_err)?;

    let target = path.clone();
    tokio::task::spawn_blocking(move || -> Result<(), std::io::Error> {
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&json)?;
        tmp.persist(&target).map_err(|e| e.error)?;
        Ok(())
    })
    .await
    .map_err(|e| PageCropError::Internal(format!("Write task panicked: {}", e)))?
    .map_err(write_err)?;

    info!("Wrote {} images to {}", output.cropped_images.len(), path.display());
    Ok(output.stats)
}
