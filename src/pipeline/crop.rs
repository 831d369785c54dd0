//! Auto-crop: trim uniform light margins from a raster frame.
//!
//! The frame is reduced to 8-bit luminance and every pixel strictly darker
//! than the threshold counts as content. Luminance uses the ITU-R 601 integer
//! weights common to document tooling (`L = R·0.299 + G·0.587 + B·0.114`),
//! not the Rec. 709 weights of [`DynamicImage::to_luma8`].
//!
//! The crop box is the smallest axis-aligned rectangle holding all content
//! pixels. A frame with no content at all is returned untouched.

use image::{DynamicImage, GrayImage, Luma};
use serde::{Deserialize, Serialize};

/// Half-open pixel rectangle `[x0, x1) × [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropBox {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl CropBox {
    /// The box covering a whole `width × height` frame.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x0: 0,
            y0: 0,
            x1: width,
            y1: height,
        }
    }

    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    pub fn is_full(&self, width: u32, height: u32) -> bool {
        *self == Self::full(width, height)
    }
}

/// Find the bounding box of all pixels with luminance `< threshold`.
///
/// Returns `None` when the frame is entirely background.
pub fn find_content_box(frame: &DynamicImage, threshold: u8) -> Option<CropBox> {
    content_box_of(&luminance(frame), threshold)
}

/// 8-bit Rec. 601 luminance in 16.16 fixed point. Alpha is ignored.
fn luminance(frame: &DynamicImage) -> GrayImage {
    let rgb = frame.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let l = (r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16;
        Luma([l as u8])
    })
}

fn content_box_of(luma: &GrayImage, threshold: u8) -> Option<CropBox> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;

    for (x, y, px) in luma.enumerate_pixels() {
        if px.0[0] >= threshold {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((min_x, min_y, max_x, max_y)) => {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            }
        });
    }

    bounds.map(|(min_x, min_y, max_x, max_y)| CropBox {
        x0: min_x,
        y0: min_y,
        x1: max_x + 1,
        y1: max_y + 1,
    })
}

/// Crop `frame` to its content, returning the frame and the box used.
///
/// The box is the full frame bounds when no content was found.
pub fn autocrop_with_box(frame: &DynamicImage, threshold: u8) -> (DynamicImage, CropBox) {
    match find_content_box(frame, threshold) {
        Some(b) => (frame.crop_imm(b.x0, b.y0, b.width(), b.height()), b),
        None => (frame.clone(), CropBox::full(frame.width(), frame.height())),
    }
}

/// Crop `frame` to the minimal box enclosing every pixel darker than `threshold`.
pub fn autocrop(frame: &DynamicImage, threshold: u8) -> DynamicImage {
    autocrop_with_box(frame, threshold).0
}
