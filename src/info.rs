use crate::console_info;
use crate::source::SourceImage;
use crate::utils::{format_dimensions, format_file_size};
use image::ImageFormat;

const MIB: u64 = 1024 * 1024;

/// Prints an analysis of the uploaded image with compression suggestions.
pub fn print_source_info(source: &SourceImage) {
    let (width, height) = source.dimensions();

    console_info!("📋 Basic Information:");
    console_info!("  📏 Dimensions: {} pixels", format_dimensions(width, height));
    console_info!(
        "  📦 File size: {} bytes ({})",
        source.size(),
        format_file_size(source.size())
    );
    console_info!("  🎭 Type: {}", source.mime_type());

    let total_pixels = width as u64 * height as u64;
    console_info!("  🔢 Total pixels: {}", total_pixels);
    console_info!("  🧮 Megapixels: {:.2} MP", total_pixels as f64 / 1_000_000.0);
    if height > 0 {
        console_info!("  📐 Aspect ratio: {:.2}:1", width as f64 / height as f64);
    }
    console_info!(
        "  💾 Estimated decoded memory: {:.2} MB",
        estimate_memory_usage(width, height, source.image_format())
    );

    console_info!("\n💡 Compression Suggestions:");
    for suggestion in suggestions(source) {
        console_info!("  {}", suggestion);
    }
}

/// Decoded size in MiB, assuming RGBA unless the format has no alpha channel.
pub fn estimate_memory_usage(width: u32, height: u32, format: Option<ImageFormat>) -> f64 {
    let bytes_per_pixel: u64 = match format {
        Some(ImageFormat::Jpeg) => 3,
        _ => 4,
    };
    (width as u64 * height as u64 * bytes_per_pixel) as f64 / MIB as f64
}

pub fn suggestions(source: &SourceImage) -> Vec<String> {
    let mut out = Vec::new();

    let size = source.size();
    if size > 5 * MIB {
        out.push("🎯 Large file (>5MB): Consider high compression (quality 0.6-0.8)".to_string());
    } else if size > MIB {
        out.push("🎯 Medium file (1-5MB): Consider medium compression (quality 0.7-0.85)".to_string());
    } else {
        out.push("🎯 Small file (<1MB): Consider light compression (quality 0.85-0.95)".to_string());
    }

    let (width, height) = source.dimensions();
    if width > 1920 || height > 1080 {
        out.push("📏 Large dimensions: Consider a 1920x1080 bound".to_string());
    } else if width > 1280 || height > 720 {
        out.push("📏 HD dimensions: Consider a 1280x720 bound for web use".to_string());
    }

    match source.image_format() {
        Some(ImageFormat::Png) => {
            out.push("🎭 PNG: lossless output is optimized with oxipng; WebP is usually smaller".to_string())
        }
        Some(ImageFormat::Jpeg) => {
            out.push("🎭 JPEG: adjust quality for the size/quality balance".to_string())
        }
        Some(ImageFormat::WebP) | Some(ImageFormat::Avif) => {
            out.push("🎭 Already a modern format; consider a quality adjustment".to_string())
        }
        _ => out.push("🎭 Consider converting to JPEG or WebP".to_string()),
    }

    out
}
