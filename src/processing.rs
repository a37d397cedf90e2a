use crate::constants::{
    AVIF_ENCODE_SPEED, HIGH_COMPRESSION_QUALITY_THRESHOLD, LIBDEFLATER_HIGH_LEVEL,
    LIBDEFLATER_LOW_LEVEL, PNG_OPTIMIZATION_PRESET, WEBP_MAX_DIMENSION, ZOPFLI_ITERATIONS,
    ZOPFLI_QUALITY_THRESHOLD,
};
use crate::error::{CompressionError, Result};
use crate::formats::OutputFormat;
use crate::settings::quality_to_percent;
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use oxipng::{Deflaters, Options};
use std::io::Cursor;
use std::num::NonZeroU8;
use tracing::debug;

/// Computes the largest size that fits inside the optional bounds while
/// keeping the aspect ratio. Never upscales; never returns a zero side.
///
/// # Example
/// ```
/// use squeeze_compare::processing::fit_within;
///
/// assert_eq!(fit_within(4000, 3000, Some(1000), None), (1000, 750));
/// assert_eq!(fit_within(800, 600, Some(1000), Some(1000)), (800, 600));
/// ```
pub fn fit_within(
    width: u32,
    height: u32,
    max_width: Option<u32>,
    max_height: Option<u32>,
) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }

    let mut scale: f64 = 1.0;
    if let Some(w) = max_width.filter(|&w| w > 0) {
        scale = scale.min(w as f64 / width as f64);
    }
    if let Some(h) = max_height.filter(|&h| h > 0) {
        scale = scale.min(h as f64 / height as f64);
    }

    if scale >= 1.0 {
        return (width, height);
    }

    let new_width = ((width as f64 * scale).round() as u32).max(1);
    let new_height = ((height as f64 * scale).round() as u32).max(1);
    (new_width, new_height)
}

/// Shrinks the image so it fits inside the bounds; returns it untouched otherwise.
pub fn resize_to_fit(
    img: DynamicImage,
    max_width: Option<u32>,
    max_height: Option<u32>,
) -> DynamicImage {
    let (width, height) = img.dimensions();
    let (new_width, new_height) = fit_within(width, height, max_width, max_height);
    if (new_width, new_height) == (width, height) {
        return img;
    }

    debug!(width, height, new_width, new_height, "resizing image");
    img.resize_exact(new_width, new_height, FilterType::Lanczos3)
}

/// Scales both sides by `factor`, keeping at least one pixel per side.
pub fn scale_by(img: &DynamicImage, factor: f32) -> DynamicImage {
    let (width, height) = img.dimensions();
    let new_width = ((width as f32 * factor).round() as u32).max(1);
    let new_height = ((height as f32 * factor).round() as u32).max(1);
    img.resize_exact(new_width, new_height, FilterType::Lanczos3)
}

/// Encodes the image in memory.
///
/// # Arguments
/// * `img` - Decoded pixels
/// * `format` - Target format
/// * `quality` - Lossy quality in `[0, 1]`; for PNG it picks the deflater
///
/// # Returns
/// * `Ok(bytes)` - The encoded image
/// * `Err(CompressionError)` - If the codec or the PNG optimizer fails
pub fn encode_image(img: &DynamicImage, format: OutputFormat, quality: f32) -> Result<Vec<u8>> {
    let mut buf = Vec::new();

    match format {
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality_to_percent(quality));
            DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)?;
        }
        OutputFormat::Png => {
            img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
            buf = optimize_png(&buf, quality)?;
        }
        OutputFormat::WebP => buf = encode_webp(img, quality)?,
        OutputFormat::Avif => {
            let encoder = AvifEncoder::new_with_speed_quality(
                &mut buf,
                AVIF_ENCODE_SPEED,
                quality_to_percent(quality),
            );
            DynamicImage::ImageRgba8(img.to_rgba8()).write_with_encoder(encoder)?;
        }
    }

    debug!(%format, quality, bytes = buf.len(), "encoded image");
    Ok(buf)
}

/// Lossy WebP through libwebp. Oversized pictures are rejected up front and
/// libwebp's own failures come back as errors.
fn encode_webp(img: &DynamicImage, quality: f32) -> Result<Vec<u8>> {
    let (w, h) = img.dimensions();
    if w > WEBP_MAX_DIMENSION || h > WEBP_MAX_DIMENSION {
        return Err(CompressionError::WebPEncoding(format!(
            "{}x{} exceeds the WebP limit of {}x{}",
            w, h, WEBP_MAX_DIMENSION, WEBP_MAX_DIMENSION
        )));
    }

    let rgba = img.to_rgba8();
    let encoded = webp::Encoder::from_rgba(&rgba, w, h)
        .encode_simple(false, quality * 100.0)
        .map_err(|e| CompressionError::WebPEncoding(format!("{:?}", e)))?;
    Ok(encoded.to_vec())
}

/// Runs oxipng over an encoded PNG, choosing the deflater by quality.
pub fn optimize_png(png: &[u8], quality: f32) -> Result<Vec<u8>> {
    let mut options = Options::from_preset(PNG_OPTIMIZATION_PRESET);
    options.force = true;

    options.deflate = if quality >= ZOPFLI_QUALITY_THRESHOLD {
        Deflaters::Zopfli {
            iterations: NonZeroU8::new(ZOPFLI_ITERATIONS).unwrap_or(NonZeroU8::MIN),
        }
    } else if quality >= HIGH_COMPRESSION_QUALITY_THRESHOLD {
        Deflaters::Libdeflater {
            compression: LIBDEFLATER_HIGH_LEVEL,
        }
    } else {
        Deflaters::Libdeflater {
            compression: LIBDEFLATER_LOW_LEVEL,
        }
    };

    oxipng::optimize_from_memory(png, &options)
        .map_err(|e| CompressionError::PngOptimization(e.to_string()))
}

/// Reads only the header of an encoded image to get its dimensions.
pub fn probe_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}
