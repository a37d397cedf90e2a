pub const DEFAULT_QUALITY: f32 = 0.8;
pub const MIN_QUALITY: f32 = 0.0;
pub const MAX_QUALITY: f32 = 1.0;

/// Maximum accepted source size in bytes (100MB)
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;
pub const MAX_IMAGE_DIMENSION: u32 = 16_384;

pub const PNG_OPTIMIZATION_PRESET: u8 = 4;
pub const ZOPFLI_ITERATIONS: u8 = 15;
pub const LIBDEFLATER_HIGH_LEVEL: u8 = 12;
pub const LIBDEFLATER_LOW_LEVEL: u8 = 8;
pub const ZOPFLI_QUALITY_THRESHOLD: f32 = 0.9;
pub const HIGH_COMPRESSION_QUALITY_THRESHOLD: f32 = 0.7;

pub const AVIF_ENCODE_SPEED: u8 = 8;
/// libwebp rejects pictures with a side longer than this
pub const WEBP_MAX_DIMENSION: u32 = 16_383;

// Encoder A: PNG output for sources above this size is converted to JPEG
pub const PNG_CONVERT_SIZE: u64 = 5_000_000;

// Encoder B: size-target search
pub const DEFAULT_MAX_SIZE_BYTES: u64 = 1024 * 1024;
pub const MAX_SIZE_ITERATIONS: u32 = 10;
pub const SIZE_STEP_FACTOR: f32 = 0.95;

pub const DEFAULT_SLIDER_POSITION: f32 = 0.5;
pub const SIDE_BY_SIDE_GAP: u32 = 20;
pub const SLIDER_DIVIDER_WIDTH: u32 = 2;

pub const DOWNLOAD_FILE_PREFIX: &str = "compressed_";
pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";

pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "webp", "bmp", "tiff", "tif", "gif", "avif",
];
