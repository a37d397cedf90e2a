use crate::constants::{MAX_FILE_SIZE, MAX_IMAGE_DIMENSION};
use crate::error::{CompressionError, Result};
use crate::validation::{is_image_mime, is_potential_image_file, validate_input_path};
use image::{DynamicImage, ImageFormat, ImageReader};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// The uploaded image. Immutable once built; the byte buffer is shared
/// read-only with every encoder invocation.
#[derive(Debug, Clone)]
pub struct SourceImage {
    bytes: Arc<[u8]>,
    mime_type: String,
    width: u32,
    height: u32,
}

impl SourceImage {
    /// Loads and validates an image file.
    ///
    /// # Security
    /// - Canonicalizes the path and rejects directories
    /// - Enforces the maximum file size before reading
    /// - Enforces the maximum image dimension from the header, without a full decode
    pub fn open(path: &Path) -> Result<Self> {
        let canonical_path = validate_input_path(path)?;
        if !is_potential_image_file(&canonical_path) {
            debug!(path = %canonical_path.display(), "unexpected extension, sniffing content");
        }
        let bytes = fs::read(&canonical_path)?;
        Self::from_bytes(bytes)
    }

    /// Sniffs the format from the content and reads the header dimensions.
    /// Non-image content is rejected.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Result<Self> {
        let bytes: Arc<[u8]> = bytes.into();
        let size = bytes.len() as u64;
        if size == 0 {
            return Err(CompressionError::UnsupportedFormat(
                "Empty upload is not a valid image".to_string(),
            ));
        }
        if size > MAX_FILE_SIZE {
            return Err(CompressionError::FileTooLarge(size, MAX_FILE_SIZE));
        }

        let reader = ImageReader::new(Cursor::new(&bytes[..])).with_guessed_format()?;
        let format = reader.format().ok_or_else(|| {
            CompressionError::UnsupportedFormat("Please select a valid image file".to_string())
        })?;
        let (width, height) = reader.into_dimensions()?;

        Self::from_parts(bytes, format.to_mime_type(), width, height)
    }

    /// Builds a source from attributes the caller has already established.
    pub fn from_parts(
        bytes: impl Into<Arc<[u8]>>,
        mime_type: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let mime_type = mime_type.into();
        if !is_image_mime(&mime_type) {
            return Err(CompressionError::UnsupportedFormat(mime_type));
        }
        if width > MAX_IMAGE_DIMENSION || height > MAX_IMAGE_DIMENSION {
            return Err(CompressionError::InvalidDimensions(
                width,
                height,
                MAX_IMAGE_DIMENSION,
            ));
        }

        Ok(Self {
            bytes: bytes.into(),
            mime_type,
            width,
            height,
        })
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

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn image_format(&self) -> Option<ImageFormat> {
        ImageFormat::from_mime_type(&self.mime_type)
    }

    /// Fully decodes the pixel data.
    pub fn decode(&self) -> Result<DynamicImage> {
        let img = ImageReader::new(Cursor::new(&self.bytes[..]))
            .with_guessed_format()?
            .decode()?;
        Ok(img)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([10, 20, 30])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
        buf
    }

    #[test]
    fn test_from_bytes_reads_header() {
        let bytes = png_bytes(64, 32);
        let size = bytes.len() as u64;
        let source = SourceImage::from_bytes(bytes).unwrap();

        assert_eq!(source.dimensions(), (64, 32));
        assert_eq!(source.mime_type(), "image/png");
        assert_eq!(source.size(), size);
        assert_eq!(source.image_format(), Some(ImageFormat::Png));
    }

    #[test]
    fn test_from_bytes_rejects_non_image() {
        let result = SourceImage::from_bytes(b"definitely not an image".to_vec());
        assert!(matches!(result, Err(CompressionError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_from_bytes_rejects_empty() {
        let result = SourceImage::from_bytes(Vec::new());
        assert!(matches!(result, Err(CompressionError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_from_parts_rejects_non_image_mime() {
        let result = SourceImage::from_parts(vec![1, 2, 3], "text/plain", 1, 1);
        assert!(matches!(result, Err(CompressionError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_from_parts_rejects_huge_dimensions() {
        let result = SourceImage::from_parts(vec![1], "image/png", MAX_IMAGE_DIMENSION + 1, 10);
        assert!(matches!(
            result,
            Err(CompressionError::InvalidDimensions(_, 10, MAX_IMAGE_DIMENSION))
        ));
    }

    #[test]
    fn test_decode_round_trips_pixels() {
        let source = SourceImage::from_bytes(png_bytes(8, 8)).unwrap();
        let img = source.decode().unwrap();
        assert_eq!(img.width(), 8);
        assert_eq!(img.to_rgb8().get_pixel(0, 0), &image::Rgb([10, 20, 30]));
    }

    #[test]
    fn test_open_not_found() {
        let result = SourceImage::open(Path::new("nonexistent.png"));
        assert!(matches!(result, Err(CompressionError::FileNotFound(_))));
    }

    #[test]
    fn test_shared_bytes_are_not_copied() {
        let source = SourceImage::from_bytes(png_bytes(4, 4)).unwrap();
        let shared = source.shared_bytes();
        assert!(std::ptr::eq(shared.as_ptr(), source.bytes().as_ptr()));
    }
}
