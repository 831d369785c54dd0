//! Integration tests for pagecrop.
//!
//! All fixtures are generated in memory or in temp dirs, so these run
//! offline and need no test files on disk.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use pagecrop::{
    convert, convert_to_file, encode_document, rasterize, run_pipeline, DecodeError,
    DocumentSource, OutputFormat, PageCropError, PipelineConfig, PipelineOutput,
    PipelineProgressCallback,
};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// 100×100 white page with a black 10×10 square at (40,40)-(50,50).
fn page_with_square() -> RgbImage {
    let mut img = RgbImage::from_pixel(100, 100, Rgb([255, 255, 255]));
    for y in 40..50 {
        for x in 40..50 {
            img.put_pixel(x, y, Rgb([0, 0, 0]));
        }
    }
    img
}

fn encode_as(img: &RgbImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img.clone())
        .write_to(&mut Cursor::new(&mut buf), format)
        .expect("fixture encodes");
    buf
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn png_config() -> PipelineConfig {
    init_tracing();
    PipelineConfig::builder()
        .format(OutputFormat::Png)
        .build()
        .expect("valid config")
}

fn assert_placeholder(output: &PipelineOutput) {
    assert_eq!(output.cropped_images.len(), 1, "exactly one placeholder");
    let img = output.cropped_images[0].decode_image().unwrap();
    assert_eq!((img.width(), img.height()), (800, 600));
    assert!(output.is_degraded());
}

// ── End-to-end crop + encode ─────────────────────────────────────────────────

#[test]
fn square_page_crops_to_ten_by_ten_jpeg() {
    let bytes = encode_as(&page_with_square(), ImageFormat::Png);
    let images = encode_document(&bytes, 240, OutputFormat::Jpeg, 85).unwrap();

    assert_eq!(images.len(), 1);
    let uri = images[0].to_data_uri();
    assert!(uri.starts_with("data:image/jpeg;base64,"), "got: {}", &uri[..30]);
    assert!(uri.len() > "data:image/jpeg;base64,".len());

    let back = images[0].decode_image().unwrap();
    assert_eq!((back.width(), back.height()), (10, 10));
}

#[test]
fn square_page_png_is_pixel_exact() {
    let bytes = encode_as(&page_with_square(), ImageFormat::Png);
    let output = run_pipeline(&bytes, &png_config()).unwrap();

    let back = output.cropped_images[0].decode_image().unwrap().to_rgb8();
    assert_eq!(back.dimensions(), (10, 10));
    assert!(back.pixels().all(|p| p.0 == [0, 0, 0]));
    assert_eq!(output.frames[0].original_width, 100);
    assert_eq!(output.frames[0].crop_box.x0, 40);
    assert!(!output.is_degraded());
}

#[test]
fn jpeg_input_is_accepted() {
    // Ringing can darken the rest of the 8×8 blocks the square ends in.
    let bytes = encode_as(&page_with_square(), ImageFormat::Jpeg);
    let output = run_pipeline(&bytes, &png_config()).unwrap();
    let b = output.frames[0].crop_box;
    assert!((10..=16).contains(&b.width()), "got {b:?}");
    assert!((10..=16).contains(&b.height()), "got {b:?}");
}

#[test]
fn cropping_is_idempotent_through_the_pipeline() {
    let bytes = encode_as(&page_with_square(), ImageFormat::Png);
    let first = run_pipeline(&bytes, &png_config()).unwrap();
    let again_bytes = first.cropped_images[0].decode_bytes().unwrap();
    let second = run_pipeline(&again_bytes, &png_config()).unwrap();
    assert!(second.frames[0].crop_box.is_full(10, 10));
}

#[test]
fn blank_page_is_not_cropped() {
    let blank = RgbImage::from_pixel(64, 48, Rgb([250, 250, 250]));
    let output = run_pipeline(&encode_as(&blank, ImageFormat::Png), &png_config()).unwrap();
    let back = output.cropped_images[0].decode_image().unwrap();
    assert_eq!((back.width(), back.height()), (64, 48));
}

#[test]
fn lower_threshold_ignores_light_grey() {
    let mut img = RgbImage::from_pixel(50, 50, Rgb([255, 255, 255]));
    img.put_pixel(10, 10, Rgb([200, 200, 200])); // light grey
    img.put_pixel(30, 30, Rgb([0, 0, 0]));
    let bytes = encode_as(&img, ImageFormat::Png);

    let default = run_pipeline(&bytes, &png_config()).unwrap();
    assert_eq!(default.frames[0].crop_box.width(), 21);

    let strict = PipelineConfig::builder()
        .format(OutputFormat::Png)
        .threshold(150)
        .build()
        .unwrap();
    let out = run_pipeline(&bytes, &strict).unwrap();
    assert_eq!(out.frames[0].crop_box.width(), 1);
}

// ── Degraded mode ────────────────────────────────────────────────────────────

#[test]
fn malformed_bytes_yield_placeholder() {
    let output = run_pipeline(b"%PDF-1.4\nnot really a pdf", &png_config()).unwrap();
    assert_placeholder(&output);
    let px = output.cropped_images[0]
        .decode_image()
        .unwrap()
        .to_rgb8()
        .get_pixel(400, 300)
        .0;
    assert_eq!(px, [255, 255, 255]);
}

#[test]
fn empty_bytes_yield_placeholder() {
    let output = run_pipeline(&[], &png_config()).unwrap();
    assert_placeholder(&output);
    assert_eq!(output.degraded, Some(DecodeError::Empty));
}

#[test]
fn rasterize_reports_errors_explicitly() {
    assert!(rasterize(&[]).is_err());
    assert!(rasterize(b"garbage").is_err());
}

// ── Async entry points ───────────────────────────────────────────────────────

#[tokio::test]
async fn convert_uploaded_bytes() {
    let bytes = encode_as(&page_with_square(), ImageFormat::Png);
    let output = convert(DocumentSource::Uploaded(bytes), &PipelineConfig::default())
        .await
        .unwrap();
    assert_eq!(output.stats.processed_frames, 1);
    assert_eq!(output.stats.failed_frames, 0);
}

#[tokio::test]
async fn convert_local_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.png");
    std::fs::write(&path, encode_as(&page_with_square(), ImageFormat::Png)).unwrap();

    let output = convert(DocumentSource::Path(path), &png_config())
        .await
        .unwrap();
    let back = output.cropped_images[0].decode_image().unwrap();
    assert_eq!((back.width(), back.height()), (10, 10));
}

#[tokio::test]
async fn convert_missing_path_is_retrieval_error() {
    let err = convert(
        DocumentSource::Path("/definitely/not/a/real/file.png".into()),
        &PipelineConfig::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, PageCropError::FileNotFound { .. }));
    assert!(err.is_retrieval());
}

#[tokio::test]
async fn convert_to_file_writes_json() {
    let dir = tempfile::tempdir().unwrap();
    let out_path = dir.path().join("nested/out.json");
    let bytes = encode_as(&page_with_square(), ImageFormat::Png);

    let stats = convert_to_file(DocumentSource::Uploaded(bytes), &out_path, &png_config())
        .await
        .unwrap();
    assert_eq!(stats.processed_frames, 1);
    assert!(!stats.degraded);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    let images = json["cropped_images"].as_array().unwrap();
    assert_eq!(images.len(), 1);
    assert!(images[0]
        .as_str()
        .unwrap()
        .starts_with("data:image/png;base64,"));
    assert!(json.get("degraded").is_none());

    let parsed: PipelineOutput = serde_json::from_value(json).unwrap();
    assert_eq!(parsed.cropped_images.len(), 1);
}

#[tokio::test]
async fn convert_to_file_reports_placeholder_in_stats() {
    let dir = tempfile::tempdir().unwrap();
    let out_path = dir.path().join("degraded.json");

    let stats = convert_to_file(
        DocumentSource::Uploaded(b"%PDF-1.7 not an image".to_vec()),
        &out_path,
        &png_config(),
    )
    .await
    .unwrap();
    assert!(stats.degraded);
    assert_eq!(stats.processed_frames, 1);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(json["stats"]["degraded"], serde_json::Value::Bool(true));
    assert!(json.get("degraded").is_some());
}

// ── Progress events ──────────────────────────────────────────────────────────

#[derive(Default)]
struct Counter {
    started: AtomicUsize,
    completed: AtomicUsize,
    finished_ok: AtomicUsize,
}

impl PipelineProgressCallback for Counter {
    fn on_pipeline_start(&self, total_frames: usize) {
        self.started.store(total_frames, Ordering::SeqCst);
    }

    fn on_frame_complete(&self, _frame_num: usize, _total_frames: usize, encoded_len: usize) {
        assert!(encoded_len > 0);
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    fn on_pipeline_complete(&self, _total_frames: usize, success_count: usize) {
        self.finished_ok.store(success_count, Ordering::SeqCst);
    }
}

#[test]
fn progress_callback_sees_every_frame() {
    let counter = Arc::new(Counter::default());
    let config = PipelineConfig::builder()
        .progress_callback(counter.clone())
        .build()
        .unwrap();

    run_pipeline(&encode_as(&page_with_square(), ImageFormat::Png), &config).unwrap();

    assert_eq!(counter.started.load(Ordering::SeqCst), 1);
    assert_eq!(counter.completed.load(Ordering::SeqCst), 1);
    assert_eq!(counter.finished_ok.load(Ordering::SeqCst), 1);
}
