use crate::constants::{DEFAULT_QUALITY, MAX_QUALITY, MIN_QUALITY};
use crate::error::{CompressionError, Result};
use crate::formats::OutputFormat;
use serde::Serialize;

/// User-chosen compression parameters.
///
/// Settings are a plain `Copy` value: each encode captures its own copy when
/// it starts, so later changes never leak into an encode already running.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionSettings {
    pub quality: f32,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub output_type: OutputFormat,
}

impl CompressionSettings {
    /// Builds validated settings.
    ///
    /// # Arguments
    /// * `quality` - Lossy quality hint in `[0, 1]` (default 0.8)
    /// * `max_width` / `max_height` - Output bounds; `Some(0)` means no bound
    /// * `output_type` - Target format (default JPEG)
    ///
    /// # Returns
    /// * `Err(CompressionError::InvalidQuality)` if quality is out of range or not finite
    pub fn new(
        quality: Option<f32>,
        max_width: Option<u32>,
        max_height: Option<u32>,
        output_type: Option<OutputFormat>,
    ) -> Result<Self> {
        let quality = quality.unwrap_or(DEFAULT_QUALITY);
        if !quality.is_finite() || !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
            return Err(CompressionError::InvalidQuality(quality));
        }

        Ok(Self {
            quality,
            max_width: max_width.filter(|&w| w > 0),
            max_height: max_height.filter(|&h| h > 0),
            output_type: output_type.unwrap_or_default(),
        })
    }

    /// Longest-side bound used by the size-target encoder.
    pub fn max_side(&self) -> Option<u32> {
        match (self.max_width, self.max_height) {
            (Some(w), Some(h)) => Some(w.max(h)),
            (Some(w), None) => Some(w),
            (None, Some(h)) => Some(h),
            (None, None) => None,
        }
    }

    /// Quality mapped onto the 1..=100 scale the JPEG and AVIF encoders take.
    pub fn quality_percent(&self) -> u8 {
        quality_to_percent(self.quality)
    }
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            max_width: None,
            max_height: None,
            output_type: OutputFormat::default(),
        }
    }
}

pub fn quality_to_percent(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}
