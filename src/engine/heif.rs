//! HEIC/HEIF decoding through libheif (feature `heif`).

use image::{DynamicImage, RgbImage, RgbaImage};
use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

use crate::engine::codec::SourceDecoder;
use crate::error::TaskError;
use crate::types::SourceFormat;

/// Decodes the primary image of a HEIF container to 8-bit RGB or RGBA.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeifDecoder;

impl HeifDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl SourceDecoder for HeifDecoder {
    fn decode(&self, bytes: &[u8], _hint: SourceFormat) -> Result<DynamicImage, TaskError> {
        // libheif init is reference counted; one handle per call keeps the decoder Send + Sync.
        let lib = LibHeif::new();
        let ctx = HeifContext::read_from_bytes(bytes)
            .map_err(|e| TaskError::decode(format!("not a readable HEIF container: {e}")))?;
        let handle = ctx
            .primary_image_handle()
            .map_err(|e| TaskError::decode(format!("no primary image: {e}")))?;
        let has_alpha = handle.has_alpha_channel();
        let chroma = if has_alpha {
            RgbChroma::Rgba
        } else {
            RgbChroma::Rgb
        };
        let decoded = lib
            .decode(&handle, ColorSpace::Rgb(chroma), None)
            .map_err(|e| TaskError::decode(e.to_string()))?;

        let (width, height) = (decoded.width(), decoded.height());
        let planes = decoded.planes();
        let plane = planes
            .interleaved
            .ok_or_else(|| TaskError::decode("decoder returned no interleaved plane"))?;

        // Rows may be padded; copy exactly width * channels bytes per row.
        let channels: usize = if has_alpha { 4 } else { 3 };
        let row_len = width as usize * channels;
        let mut pixels = Vec::with_capacity(row_len * height as usize);
        for row in plane.data.chunks(plane.stride).take(height as usize) {
            let row = row
                .get(..row_len)
                .ok_or_else(|| TaskError::decode("truncated pixel row"))?;
            pixels.extend_from_slice(row);
        }

        let image = if has_alpha {
            RgbaImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgba8)
        } else {
            RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8)
        };
        image.ok_or_else(|| TaskError::decode("pixel buffer size mismatch"))
    }
}
