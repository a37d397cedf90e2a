use crate::encoder::{EncodedImage, EncoderId};
use crate::error::{CompressionError, Result};
use crate::formats::OutputFormat;
use crate::processing::probe_dimensions;
use crate::settings::CompressionSettings;
use crate::source::SourceImage;
use serde::Serialize;
use std::sync::{Arc, OnceLock};

/// Stored outcome of one successful encode.
#[derive(Debug)]
pub struct EncodeResult {
    encoder: EncoderId,
    bytes: Arc<[u8]>,
    format: OutputFormat,
    settings: CompressionSettings,
    dimensions: OnceLock<Option<(u32, u32)>>,
}

impl EncodeResult {
    /// Wraps an encoder's output. Zero-length output is rejected: a result
    /// must have a size the compression ratio can be computed against.
    pub fn new(
        encoder: EncoderId,
        encoded: EncodedImage,
        settings: CompressionSettings,
    ) -> Result<Self> {
        if encoded.bytes.is_empty() {
            return Err(CompressionError::EmptyEncodeOutput);
        }

        Ok(Self {
            encoder,
            bytes: encoded.bytes.into(),
            format: encoded.format,
            settings,
            dimensions: OnceLock::new(),
        })
    }

    pub fn encoder(&self) -> EncoderId {
        self.encoder
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn settings(&self) -> &CompressionSettings {
        &self.settings
    }

    /// Pixel dimensions, read from the encoded header on first use.
    /// `None` when the bytes cannot be probed.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        *self.dimensions.get_or_init(|| probe_dimensions(&self.bytes))
    }
}

/// `source_size / result_size`; `None` for an empty result.
pub fn compression_ratio(source_size: u64, result_size: u64) -> Option<f64> {
    if result_size == 0 {
        return None;
    }
    Some(source_size as f64 / result_size as f64)
}

/// Size reduction as a percentage (positive means reduction, negative means increase)
pub fn size_reduction_percent(source_size: u64, result_size: u64) -> f64 {
    if source_size == 0 {
        return 0.0;
    }
    ((source_size as f64 - result_size as f64) / source_size as f64) * 100.0
}

/// Before/after statistics for one stored result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionStats {
    pub encoder: EncoderId,
    pub ratio: f64,
    pub reduction_percent: f64,
    pub size_bytes: u64,
    pub dimensions: Option<(u32, u32)>,
}

impl CompressionStats {
    pub fn compute(source: &SourceImage, result: &EncodeResult) -> Self {
        let size_bytes = result.size();
        Self {
            encoder: result.encoder(),
            // EncodeResult guarantees a non-zero size
            ratio: compression_ratio(source.size(), size_bytes).unwrap_or(f64::INFINITY),
            reduction_percent: size_reduction_percent(source.size(), size_bytes),
            size_bytes,
            dimensions: result.dimensions(),
        }
    }

    /// e.g. `5.00:1`
    pub fn ratio_label(&self) -> String {
        format!("{:.2}:1", self.ratio)
    }

    /// e.g. `80.0%`
    pub fn reduction_label(&self) -> String {
        format!("{:.1}%", self.reduction_percent)
    }
}
