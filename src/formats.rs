//! Output format handling
//!
//! The encoders accept a target mime type; this module maps between mime
//! strings, user-facing names and the image crate's formats.

use crate::error::{CompressionError, Result};
use image::ImageFormat;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Supported output image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JPEG with lossy compression
    Jpeg,
    /// PNG, lossless, post-processed by oxipng
    Png,
    /// WebP with lossy compression
    WebP,
    /// AVIF
    Avif,
}

impl OutputFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::WebP => "image/webp",
            OutputFormat::Avif => "image/avif",
        }
    }

    /// The part of the mime type after the slash; used for download names
    pub fn mime_subtype(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
            OutputFormat::Avif => "avif",
        }
    }

    pub fn is_lossy(&self) -> bool {
        !matches!(self, OutputFormat::Png)
    }

    /// Convert to the image crate's ImageFormat
    pub fn to_image_format(&self) -> ImageFormat {
        match self {
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::WebP => ImageFormat::WebP,
            OutputFormat::Avif => ImageFormat::Avif,
        }
    }

    pub fn from_mime(mime: &str) -> Result<Self> {
        match mime.trim().to_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Ok(OutputFormat::Jpeg),
            "image/png" => Ok(OutputFormat::Png),
            "image/webp" => Ok(OutputFormat::WebP),
            "image/avif" => Ok(OutputFormat::Avif),
            _ => Err(CompressionError::UnsupportedFormat(mime.to_string())),
        }
    }

    pub fn all_formats() -> Vec<OutputFormat> {
        vec![
            OutputFormat::Jpeg,
            OutputFormat::Png,
            OutputFormat::WebP,
            OutputFormat::Avif,
        ]
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Jpeg
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::Png => "PNG",
            OutputFormat::WebP => "WebP",
            OutputFormat::Avif => "AVIF",
        };
        write!(f, "{}", name)
    }
}

/// Accepts both short names (`jpg`, `webp`) and mime types (`image/webp`).
impl FromStr for OutputFormat {
    type Err = CompressionError;

    fn from_str(s: &str) -> Result<Self> {
        if s.contains('/') {
            return OutputFormat::from_mime(s);
        }
        match s.to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::WebP),
            "avif" => Ok(OutputFormat::Avif),
            "heic" | "heif" | "jxl" | "jpegxl" => Err(CompressionError::UnsupportedFormat(format!(
                "{} format is not yet supported in this version. Use AVIF for modern compression",
                s
            ))),
            _ => Err(CompressionError::UnsupportedFormat(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("jpeg").unwrap(), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::from_str("jpg").unwrap(), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::from_str("PNG").unwrap(), OutputFormat::Png);
        assert_eq!(OutputFormat::from_str("webp").unwrap(), OutputFormat::WebP);
        assert_eq!(OutputFormat::from_str("avif").unwrap(), OutputFormat::Avif);

        assert!(OutputFormat::from_str("unsupported").is_err());
    }

    #[test]
    fn test_output_format_from_mime() {
        assert_eq!(OutputFormat::from_str("image/jpeg").unwrap(), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::from_mime("image/webp").unwrap(), OutputFormat::WebP);
        assert_eq!(OutputFormat::from_mime(" IMAGE/PNG ").unwrap(), OutputFormat::Png);
        assert!(matches!(
            OutputFormat::from_mime("image/gif"),
            Err(CompressionError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_modern_format_hint() {
        let result = OutputFormat::from_str("heic");
        if let Err(CompressionError::UnsupportedFormat(msg)) = result {
            assert!(msg.contains("not yet supported"));
            assert!(msg.contains("AVIF"));
        } else {
            panic!("heic should be rejected");
        }
    }

    #[test]
    fn test_mime_round_trip_for_every_format() {
        for format in OutputFormat::all_formats() {
            assert_eq!(OutputFormat::from_mime(format.mime_type()).unwrap(), format);
            assert_eq!(
                ImageFormat::from_mime_type(format.mime_type()),
                Some(format.to_image_format())
            );
        }
    }

    #[test]
    fn test_mime_subtype_and_lossiness() {
        assert_eq!(OutputFormat::Jpeg.mime_subtype(), "jpeg");
        assert!(!OutputFormat::Png.is_lossy());
        assert!(OutputFormat::WebP.is_lossy());
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(format!("{}", OutputFormat::Jpeg), "JPEG");
        assert_eq!(format!("{}", OutputFormat::Png), "PNG");
        assert_eq!(format!("{}", OutputFormat::WebP), "WebP");
    }
}
