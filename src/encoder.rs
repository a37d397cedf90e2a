//! The two interchangeable encoders and the contract they share.
//!
//! An encoder receives the shared source image plus a copy of the settings
//! and produces encoded bytes. Pixel work runs on tokio's blocking pool so
//! an encode never stalls the task that awaits it.

use crate::constants::{
    DEFAULT_MAX_SIZE_BYTES, MAX_SIZE_ITERATIONS, PNG_CONVERT_SIZE, SIZE_STEP_FACTOR,
};
use crate::error::{CompressionError, Result};
use crate::formats::OutputFormat;
use crate::processing::{encode_image, fit_within, resize_to_fit, scale_by};
use crate::settings::CompressionSettings;
use crate::source::SourceImage;
use async_trait::async_trait;
use image::GenericImageView;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Identity of the encoder slot a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EncoderId {
    A,
    B,
}

impl EncoderId {
    pub const ALL: [EncoderId; 2] = [EncoderId::A, EncoderId::B];

    pub(crate) fn index(self) -> usize {
        match self {
            EncoderId::A => 0,
            EncoderId::B => 1,
        }
    }
}

impl fmt::Display for EncoderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncoderId::A => write!(f, "A"),
            EncoderId::B => write!(f, "B"),
        }
    }
}

/// Input of one encode: the shared source and the settings captured at start.
#[derive(Debug, Clone)]
pub struct EncodeRequest {
    pub source: Arc<SourceImage>,
    pub settings: CompressionSettings,
}

impl EncodeRequest {
    pub fn new(source: Arc<SourceImage>, settings: CompressionSettings) -> Self {
        Self { source, settings }
    }
}

/// Output of one encode. The format may differ from the requested one when
/// the encoder converts (see [`CompressorEncoder`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
}

#[async_trait]
pub trait Encoder: Send + Sync {
    fn name(&self) -> &str;

    async fn encode(&self, request: EncodeRequest) -> Result<EncodedImage>;
}

async fn run_blocking<F>(work: F) -> Result<EncodedImage>
where
    F: FnOnce() -> Result<EncodedImage> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| CompressionError::EncoderTask(e.to_string()))?
}

/// Encoder A: bounds the output by max width/height, keeps the aspect ratio,
/// and encodes once at the requested quality.
#[derive(Debug, Clone)]
pub struct CompressorEncoder {
    /// PNG output is switched to JPEG for sources larger than this many bytes
    pub convert_size: u64,
    /// Return the source bytes when compressing would only make the file bigger
    pub strict: bool,
}

impl Default for CompressorEncoder {
    fn default() -> Self {
        Self {
            convert_size: PNG_CONVERT_SIZE,
            strict: true,
        }
    }
}

impl CompressorEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The format actually produced for a request.
    pub fn effective_format(&self, source_size: u64, requested: OutputFormat) -> OutputFormat {
        if requested == OutputFormat::Png && source_size > self.convert_size {
            OutputFormat::Jpeg
        } else {
            requested
        }
    }

    fn encode_blocking(&self, request: &EncodeRequest) -> Result<EncodedImage> {
        let source = &request.source;
        let settings = &request.settings;
        let format = self.effective_format(source.size(), settings.output_type);

        let img = source.decode()?;
        let img = resize_to_fit(img, settings.max_width, settings.max_height);
        let resized = img.dimensions() != source.dimensions();
        let bytes = encode_image(&img, format, settings.quality)?;

        let same_type = source.image_format() == Some(format.to_image_format());
        if self.strict && same_type && !resized && bytes.len() as u64 > source.size() {
            debug!(
                encoded = bytes.len(),
                source = source.size(),
                "output larger than source, keeping source bytes"
            );
            return Ok(EncodedImage {
                bytes: source.bytes().to_vec(),
                format,
            });
        }

        Ok(EncodedImage { bytes, format })
    }
}

#[async_trait]
impl Encoder for CompressorEncoder {
    fn name(&self) -> &str {
        "compressor"
    }

    async fn encode(&self, request: EncodeRequest) -> Result<EncodedImage> {
        let encoder = self.clone();
        run_blocking(move || encoder.encode_blocking(&request)).await
    }
}

/// Encoder B: bounds the longest side, then keeps shrinking dimensions and
/// quality until the output fits `max_size_bytes` and is no larger than the
/// source, or the iteration budget runs out. If the budget runs out with an
/// output still larger than an unbounded source of the same type, the source
/// bytes are returned instead.
#[derive(Debug, Clone)]
pub struct SizeTargetEncoder {
    pub max_size_bytes: u64,
    pub max_iterations: u32,
    pub step_factor: f32,
}

impl Default for SizeTargetEncoder {
    fn default() -> Self {
        Self {
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
            max_iterations: MAX_SIZE_ITERATIONS,
            step_factor: SIZE_STEP_FACTOR,
        }
    }
}

impl SizeTargetEncoder {
    pub fn new(max_size_bytes: u64) -> Self {
        Self {
            max_size_bytes,
            ..Self::default()
        }
    }

    fn over_budget(&self, len: usize, source_size: u64) -> bool {
        let len = len as u64;
        len > self.max_size_bytes || len > source_size
    }

    fn encode_blocking(&self, request: &EncodeRequest) -> Result<EncodedImage> {
        let source = &request.source;
        let settings = &request.settings;
        let format = settings.output_type;
        let max_side = settings.max_side();

        let img = source.decode()?;
        let (width, height) = img.dimensions();
        let (fit_w, fit_h) = fit_within(width, height, max_side, max_side);
        let bounded = (fit_w, fit_h) != (width, height);
        let mut img = resize_to_fit(img, Some(fit_w), Some(fit_h));

        let mut quality = settings.quality;
        let mut best = encode_image(&img, format, quality)?;
        let mut remaining = self.max_iterations;

        while remaining > 0 && self.over_budget(best.len(), source.size()) {
            remaining -= 1;
            img = scale_by(&img, self.step_factor);
            quality *= self.step_factor;
            let attempt = encode_image(&img, format, quality)?;
            debug!(
                attempt = self.max_iterations - remaining,
                bytes = attempt.len(),
                quality,
                "size-target iteration"
            );
            if attempt.len() < best.len() {
                best = attempt;
            }
            if img.width() == 1 && img.height() == 1 {
                break;
            }
        }

        let same_type = source.image_format() == Some(format.to_image_format());
        if same_type && !bounded && best.len() as u64 > source.size() {
            debug!(
                encoded = best.len(),
                source = source.size(),
                "budget exhausted above source size, keeping source bytes"
            );
            return Ok(EncodedImage {
                bytes: source.bytes().to_vec(),
                format,
            });
        }

        Ok(EncodedImage {
            bytes: best,
            format,
        })
    }
}

#[async_trait]
impl Encoder for SizeTargetEncoder {
    fn name(&self) -> &str {
        "size-target"
    }

    async fn encode(&self, request: EncodeRequest) -> Result<EncodedImage> {
        let encoder = self.clone();
        run_blocking(move || encoder.encode_blocking(&request)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn noisy_source(width: u32, height: u32, format: ImageFormat) -> Arc<SourceImage> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            let v = (x.wrapping_mul(7919) ^ y.wrapping_mul(104_729)) % 256;
            Rgb([v as u8, (v * 3 % 256) as u8, (v * 5 % 256) as u8])
        }));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
        Arc::new(SourceImage::from_bytes(buf).unwrap())
    }

    #[test]
    fn test_encoder_id_display_and_index() {
        assert_eq!(EncoderId::A.to_string(), "A");
        assert_eq!(EncoderId::B.index(), 1);
        assert_eq!(EncoderId::ALL.len(), 2);
    }

    #[test]
    fn test_compressor_converts_large_png() {
        let encoder = CompressorEncoder::default();
        assert_eq!(
            encoder.effective_format(PNG_CONVERT_SIZE + 1, OutputFormat::Png),
            OutputFormat::Jpeg
        );
        assert_eq!(
            encoder.effective_format(1024, OutputFormat::Png),
            OutputFormat::Png
        );
        assert_eq!(
            encoder.effective_format(PNG_CONVERT_SIZE + 1, OutputFormat::WebP),
            OutputFormat::WebP
        );
    }

    #[tokio::test]
    async fn test_compressor_respects_bounds() {
        let source = noisy_source(400, 200, ImageFormat::Png);
        let settings =
            CompressionSettings::new(Some(0.7), Some(100), None, Some(OutputFormat::Jpeg)).unwrap();

        let encoded = CompressorEncoder::new()
            .encode(EncodeRequest::new(source, settings))
            .await
            .unwrap();

        assert_eq!(encoded.format, OutputFormat::Jpeg);
        let img = image::load_from_memory(&encoded.bytes).unwrap();
        assert_eq!(img.dimensions(), (100, 50));
    }

    #[tokio::test]
    async fn test_compressor_strict_keeps_smaller_source() {
        let source = noisy_source(64, 64, ImageFormat::Jpeg);
        let settings =
            CompressionSettings::new(Some(1.0), None, None, Some(OutputFormat::Jpeg)).unwrap();

        let encoded = CompressorEncoder::new()
            .encode(EncodeRequest::new(Arc::clone(&source), settings))
            .await
            .unwrap();

        // quality 1.0 re-encode of a default-quality JPEG only grows the file
        assert_eq!(encoded.bytes, source.bytes());
        assert_eq!(encoded.format, OutputFormat::Jpeg);
    }

    #[tokio::test]
    async fn test_size_target_shrinks_below_png_source() {
        let source = noisy_source(256, 256, ImageFormat::Png);
        let settings =
            CompressionSettings::new(Some(0.9), None, None, Some(OutputFormat::Jpeg)).unwrap();
        let encoder = SizeTargetEncoder::new(8 * 1024);

        let encoded = encoder
            .encode(EncodeRequest::new(Arc::clone(&source), settings))
            .await
            .unwrap();

        assert!(encoded.bytes.len() as u64 <= source.size());
        assert!(image::load_from_memory(&encoded.bytes).is_ok());
    }

    #[tokio::test]
    async fn test_size_target_keeps_source_when_budget_runs_out() {
        let source = noisy_source(64, 64, ImageFormat::Jpeg);
        let settings =
            CompressionSettings::new(Some(1.0), None, None, Some(OutputFormat::Jpeg)).unwrap();
        let encoder = SizeTargetEncoder {
            max_size_bytes: u64::MAX,
            max_iterations: 0,
            ..SizeTargetEncoder::default()
        };

        let encoded = encoder
            .encode(EncodeRequest::new(Arc::clone(&source), settings))
            .await
            .unwrap();

        assert_eq!(encoded.bytes, source.bytes());
        assert!(encoded.bytes.len() as u64 <= source.size());
    }

    #[tokio::test]
    async fn test_size_target_bounds_longest_side() {
        let source = noisy_source(300, 150, ImageFormat::Png);
        let settings =
            CompressionSettings::new(Some(0.8), Some(60), Some(120), Some(OutputFormat::Jpeg))
                .unwrap();
        let encoder = SizeTargetEncoder {
            max_size_bytes: u64::MAX,
            max_iterations: 0,
            ..SizeTargetEncoder::default()
        };

        let encoded = encoder
            .encode(EncodeRequest::new(source, settings))
            .await
            .unwrap();

        let img = image::load_from_memory(&encoded.bytes).unwrap();
        assert_eq!(img.dimensions(), (120, 60));
    }
}
