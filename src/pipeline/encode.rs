//! Image encoding: `DynamicImage` → compressed bytes → base64 data URI.
//!
//! A data URI (`data:image/jpeg;base64,...`) is self-describing and text-safe,
//! so it can be dropped straight into a JSON response or an `<img src>`.
//! JPEG is the default because cropped page images are usually served to
//! people, not OCR engines; PNG is available when pixels must survive exactly.

use crate::config::OutputFormat;
use crate::error::PageCropError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::DynamicImage;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use tracing::debug;

static RE_DATA_URI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^data:(image/[A-Za-z0-9.+-]+);base64,([A-Za-z0-9+/]*={0,2})$").unwrap()
});

/// A compressed image as MIME type plus base64 payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub mime_type: String,
    /// Standard-alphabet, padded base64.
    pub data: String,
}

impl EncodedImage {
    /// Render as `data:<mime>;base64,<payload>`.
    pub fn to_data_uri(&self) -> String {
        self.to_string()
    }

    /// Parse a `data:image/...;base64,...` URI.
    pub fn parse(uri: &str) -> Result<Self, PageCropError> {
        let caps = RE_DATA_URI.captures(uri.trim()).ok_or_else(|| {
            PageCropError::InvalidDataUri("expected data:image/<type>;base64,<payload>".into())
        })?;
        Ok(Self {
            mime_type: caps[1].to_string(),
            data: caps[2].to_string(),
        })
    }

    /// The compressed image bytes.
    pub fn decode_bytes(&self) -> Result<Vec<u8>, PageCropError> {
        STANDARD
            .decode(&self.data)
            .map_err(|e| PageCropError::InvalidDataUri(format!("bad base64 payload: {e}")))
    }

    /// Decode the payload back into pixels.
    pub fn decode_image(&self) -> Result<DynamicImage, PageCropError> {
        let bytes = self.decode_bytes()?;
        image::load_from_memory(&bytes)
            .map_err(|e| PageCropError::InvalidDataUri(format!("payload is not an image: {e}")))
    }
}

impl fmt::Display for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.data)
    }
}

impl Serialize for EncodedImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EncodedImage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        EncodedImage::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Compress `frame` as `format` and wrap it as an [`EncodedImage`].
///
/// `quality` (0–100) applies to JPEG only and is clamped to 1–100. PNG always
/// uses the strongest compression with adaptive filtering.
pub fn encode_frame(
    frame: &DynamicImage,
    format: OutputFormat,
    quality: u8,
) -> Result<EncodedImage, image::ImageError> {
    let mut buf = Vec::new();
    match format {
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel.
            let rgb = frame.to_rgb8();
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
            rgb.write_with_encoder(encoder)?;
        }
        OutputFormat::Png => {
            let encoder =
                PngEncoder::new_with_quality(&mut buf, CompressionType::Best, FilterType::Adaptive);
            png_compatible(frame).write_with_encoder(encoder)?;
        }
    }

    let data = STANDARD.encode(&buf);
    debug!(
        "Encoded {}x{} frame as {} → {} bytes base64",
        frame.width(),
        frame.height(),
        format,
        data.len()
    );

    Ok(EncodedImage {
        mime_type: format.mime_type().to_string(),
        data,
    })
}

/// PNG has no float sample type; widen 32-bit float frames to 16-bit integers.
fn png_compatible(frame: &DynamicImage) -> Cow<'_, DynamicImage> {
    match frame {
        DynamicImage::ImageRgb32F(_) => Cow::Owned(DynamicImage::ImageRgb16(frame.to_rgb16())),
        DynamicImage::ImageRgba32F(_) => Cow::Owned(DynamicImage::ImageRgba16(frame.to_rgba16())),
        _ => Cow::Borrowed(frame),
    }
}
