use crate::comparison::{ComparisonImages, ComparisonMode};
use crate::constants::{DEFAULT_SLIDER_POSITION, SIDE_BY_SIDE_GAP, SLIDER_DIVIDER_WIDTH};
use crate::error::{CompressionError, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use std::fs;
use std::path::Path;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const DIVIDER: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Turns a pair of encoded images into a single comparison picture.
pub trait ComparisonRenderer {
    fn side_by_side(&self, images: &ComparisonImages) -> Result<RgbaImage>;

    fn slider(&self, images: &ComparisonImages) -> Result<RgbaImage>;
}

/// Renders comparisons as composited still images.
#[derive(Debug, Clone, Copy)]
pub struct CompositeRenderer {
    /// Fraction of the width showing the "before" image, in `[0, 1]`
    pub slider_position: f32,
    pub gap: u32,
}

impl Default for CompositeRenderer {
    fn default() -> Self {
        Self {
            slider_position: DEFAULT_SLIDER_POSITION,
            gap: SIDE_BY_SIDE_GAP,
        }
    }
}

impl CompositeRenderer {
    pub fn new(slider_position: f32) -> Self {
        Self {
            slider_position: slider_position.clamp(0.0, 1.0),
            ..Self::default()
        }
    }
}

fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}

impl ComparisonRenderer for CompositeRenderer {
    fn side_by_side(&self, images: &ComparisonImages) -> Result<RgbaImage> {
        let before = decode(&images.before)?.to_rgba8();
        let after = decode(&images.after)?;

        // after is shown at the before image's height
        let height = before.height();
        let after_width = ((after.width() as f64 * height as f64 / after.height().max(1) as f64)
            .round() as u32)
            .max(1);
        let after = after
            .resize_exact(after_width, height, FilterType::Lanczos3)
            .to_rgba8();

        let width = before.width() + self.gap + after.width();
        let mut canvas = RgbaImage::from_pixel(width, height, BACKGROUND);
        imageops::overlay(&mut canvas, &before, 0, 0);
        imageops::overlay(&mut canvas, &after, (before.width() + self.gap) as i64, 0);
        Ok(canvas)
    }

    fn slider(&self, images: &ComparisonImages) -> Result<RgbaImage> {
        let mut canvas = decode(&images.before)?.to_rgba8();
        let (width, height) = canvas.dimensions();
        let after = decode(&images.after)?
            .resize_exact(width, height, FilterType::Lanczos3)
            .to_rgba8();

        let split = (width as f32 * self.slider_position).round() as u32;
        for (x, y, pixel) in canvas.enumerate_pixels_mut() {
            if x >= split {
                *pixel = *after.get_pixel(x, y);
            }
        }

        let half = SLIDER_DIVIDER_WIDTH / 2;
        let start = split.saturating_sub(half);
        let end = (split + SLIDER_DIVIDER_WIDTH - half).min(width);
        for x in start..end {
            for y in 0..height {
                canvas.put_pixel(x, y, DIVIDER);
            }
        }

        Ok(canvas)
    }
}

/// Renders the comparison for `mode`; `ComparisonMode::None` renders nothing.
pub fn render_comparison(
    renderer: &dyn ComparisonRenderer,
    mode: ComparisonMode,
    images: &ComparisonImages,
) -> Result<Option<RgbaImage>> {
    match mode {
        ComparisonMode::None => Ok(None),
        ComparisonMode::SideBySide => renderer.side_by_side(images).map(Some),
        ComparisonMode::Slider => renderer.slider(images).map(Some),
    }
}

/// Writes a rendering; the format follows the path's extension.
pub fn save_rendering(rendering: &RgbaImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|_| CompressionError::DirectoryCreationFailed(parent.to_path_buf()))?;
    }
    rendering.save(path)?;
    Ok(())
}
