//! Codec adapter: source decode and PNG/JPEG/WEBP encode at the pixel-buffer level.
//!
//! Decoding goes through [`SourceDecoder`] so callers can swap the HEIF backend. With the `heif`
//! feature the default decoder is libheif; without it every source file fails with a decode error.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, GenericImageView, RgbImage};
use std::sync::Arc;

use crate::error::TaskError;
use crate::types::{OutputFormat, SourceFormat};

type CodecResult<T> = std::result::Result<T, TaskError>;

/// Decodes source bytes into a pixel buffer. Called concurrently from every worker.
pub trait SourceDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8], hint: SourceFormat) -> CodecResult<DynamicImage>;
}

/// Decoder used when the crate is built without HEIF support.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableDecoder;

impl SourceDecoder for UnavailableDecoder {
    fn decode(&self, _bytes: &[u8], hint: SourceFormat) -> CodecResult<DynamicImage> {
        Err(TaskError::decode(format!(
            "{hint:?} decoding is not available in this build (enable the `heif` feature)"
        )))
    }
}

/// The decoder [`BatchRunner`](crate::pipeline::BatchRunner) uses unless one is injected.
pub fn default_decoder() -> Arc<dyn SourceDecoder> {
    #[cfg(feature = "heif")]
    {
        Arc::new(crate::engine::heif::HeifDecoder::new())
    }
    #[cfg(not(feature = "heif"))]
    {
        Arc::new(UnavailableDecoder)
    }
}

/// PNG compression level for a quality value: `floor((100 - quality) / 10)`, 0..=9.
pub fn png_compression_level(quality: u32) -> u8 {
    ((100 - quality.clamp(1, 100)) / 10) as u8
}

/// Level 0 stores the image data without compression; 1..=9 are deflate levels.
fn png_compression_type(level: u8) -> CompressionType {
    match level {
        0 => CompressionType::Uncompressed,
        n => CompressionType::Level(n.min(9)),
    }
}

/// Composite onto an opaque white background using the image's own alpha as the mask.
pub fn flatten_onto_white(img: &DynamicImage) -> RgbImage {
    let rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();
    RgbImage::from_fn(w, h, |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let a = a as u32;
        let blend = |c: u8| ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8;
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}

/// JPEG has no alpha: flatten when the buffer has one, otherwise plain RGB conversion.
pub fn prepare_for_jpeg(img: &DynamicImage) -> RgbImage {
    if img.color().has_alpha() {
        flatten_onto_white(img)
    } else {
        img.to_rgb8()
    }
}

/// Encode `img` as `format`. `quality` is 1..=100 (JPEG/WEBP quality, PNG compression intensity).
pub fn encode(img: &DynamicImage, format: OutputFormat, quality: u32) -> CodecResult<Vec<u8>> {
    match format {
        OutputFormat::Png => encode_png(img, png_compression_level(quality)),
        OutputFormat::Jpeg => encode_jpeg(img, quality),
        OutputFormat::Webp => encode_webp(img, quality),
    }
}

pub fn encode_png(img: &DynamicImage, level: u8) -> CodecResult<Vec<u8>> {
    let mut buf = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut buf, png_compression_type(level), FilterType::Adaptive);
    img.write_with_encoder(encoder)
        .map_err(|e| TaskError::encode(format!("PNG encode failed: {e}")))?;
    Ok(buf)
}

pub fn encode_jpeg(img: &DynamicImage, quality: u32) -> CodecResult<Vec<u8>> {
    let rgb = DynamicImage::ImageRgb8(prepare_for_jpeg(img));
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100) as u8);
    rgb.write_with_encoder(encoder)
        .map_err(|e| TaskError::encode(format!("JPEG encode failed: {e}")))?;
    Ok(buf)
}

/// Lossy WebP; keeps the alpha channel when the buffer has one.
pub fn encode_webp(img: &DynamicImage, quality: u32) -> CodecResult<Vec<u8>> {
    let (w, h) = img.dimensions();
    let quality = quality.clamp(1, 100) as f32;
    let encoded = if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        webp::Encoder::from_rgba(&rgba, w, h).encode_simple(false, quality)
    } else {
        let rgb = img.to_rgb8();
        webp::Encoder::from_rgb(&rgb, w, h).encode_simple(false, quality)
    };
    let mem = encoded.map_err(|e| TaskError::encode(format!("WebP encode failed: {e:?}")))?;
    Ok(mem.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};

    fn half_transparent_red(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |_, _| {
            image::Rgba([255, 0, 0, 128])
        }))
    }

    #[test]
    fn flatten_blends_toward_white_by_alpha() {
        let flat = flatten_onto_white(&half_transparent_red(2, 2));
        let [r, g, b] = flat.get_pixel(0, 0).0;
        assert_eq!(r, 255);
        // 255 * (127 / 255) rounded
        assert_eq!(g, 127);
        assert_eq!(b, 127);
    }

    #[test]
    fn flatten_keeps_opaque_pixels_and_whitens_transparent_ones() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                image::Rgba([10, 20, 30, 255])
            } else {
                image::Rgba([10, 20, 30, 0])
            }
        }));
        let flat = flatten_onto_white(&img);
        assert_eq!(flat.get_pixel(0, 0).0, [10, 20, 30]);
        assert_eq!(flat.get_pixel(1, 0).0, [255, 255, 255]);
    }

    #[test]
    fn jpeg_from_rgba_decodes_as_rgb() {
        let bytes = encode(&half_transparent_red(8, 8), OutputFormat::Jpeg, 90).unwrap();
        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg).unwrap();
        assert!(!decoded.color().has_alpha());
        assert_eq!(decoded.dimensions(), (8, 8));
    }

    #[test]
    fn png_keeps_alpha() {
        let bytes = encode(&half_transparent_red(4, 4), OutputFormat::Png, 50).unwrap();
        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png).unwrap();
        assert!(decoded.color().has_alpha());
    }

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x * 4) as u8, (y * 4) as u8, ((x + y) * 2) as u8])
        }))
    }

    /// Sum of IDAT payload lengths in a PNG stream.
    fn idat_len(png: &[u8]) -> usize {
        let mut pos = 8;
        let mut total = 0;
        while pos + 8 <= png.len() {
            let len = u32::from_be_bytes(png[pos..pos + 4].try_into().unwrap()) as usize;
            if &png[pos + 4..pos + 8] == b"IDAT" {
                total += len;
            }
            pos += 12 + len;
        }
        total
    }

    #[test]
    fn png_quality_reaches_the_encoder() {
        let img = gradient(64, 64);
        let high = encode(&img, OutputFormat::Png, 95).unwrap();
        let low = encode(&img, OutputFormat::Png, 5).unwrap();
        assert!(
            high.len() > low.len(),
            "q=95 gave {} bytes, q=5 gave {}",
            high.len(),
            low.len()
        );
    }

    #[test]
    fn png_top_quality_is_stored_uncompressed() {
        let img = gradient(64, 64);
        // One filter byte per row plus RGB samples.
        let raw = (64 * 3 + 1) * 64;
        for q in [91, 95, 100] {
            let bytes = encode(&img, OutputFormat::Png, q).unwrap();
            let idat = idat_len(&bytes);
            assert!(
                idat >= raw && idat <= raw + raw / 20,
                "q={q}: IDAT {idat} bytes, raw {raw}"
            );
            let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png).unwrap();
            assert_eq!(decoded.to_rgb8(), img.to_rgb8());
        }
    }

    #[test]
    fn webp_output_has_riff_header() {
        let bytes = encode(&half_transparent_red(4, 4), OutputFormat::Webp, 80).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WEBP");
    }

    #[test]
    fn unavailable_decoder_reports_decode_error() {
        let err = UnavailableDecoder
            .decode(b"anything", SourceFormat::Heic)
            .unwrap_err();
        assert!(matches!(err, TaskError::Decode(_)));
    }
}
