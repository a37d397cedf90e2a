use crate::comparison::ComparisonTarget;
use crate::encoder::EncoderId;
use std::path::PathBuf;
use thiserror::Error;

/// One encoder's failure, as reported by `encode_with` and `compare_both`.
#[derive(Debug, Error)]
#[error("encoder {encoder} failed: {cause}")]
pub struct EncodeFailure {
    pub encoder: EncoderId,
    #[source]
    pub cause: Box<CompressionError>,
}

impl EncodeFailure {
    pub fn new(encoder: EncoderId, cause: CompressionError) -> Self {
        Self {
            encoder,
            cause: Box::new(cause),
        }
    }
}

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    ImageProcessing(#[from] image::ImageError),

    #[error("PNG optimization error: {0}")]
    PngOptimization(String),

    #[error("WebP encoding error: {0}")]
    WebPEncoding(String),

    #[error("Invalid quality value: {0}. Must be between 0.0 and 1.0")]
    InvalidQuality(f32),

    #[error("Invalid image dimensions: {0}x{1}. Maximum allowed: {2}x{2}")]
    InvalidDimensions(u32, u32, u32),

    #[error("File too large: {0} bytes. Maximum allowed: {1} bytes")]
    FileTooLarge(u64, u64),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to create output directory: {0}")]
    DirectoryCreationFailed(PathBuf),

    #[error("Report serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Encoder task failed: {0}")]
    EncoderTask(String),

    #[error("Encoder produced an empty output")]
    EmptyEncodeOutput,

    #[error("No source image loaded. Please upload an image first")]
    NoSource,

    #[error(transparent)]
    EncodeFailed(EncodeFailure),

    /// Joint form of [`CompressionError::EncodeFailed`]: one entry per failed
    /// encoder of a `compare_both`, in A, B order.
    #[error("Comparison failed for encoder(s) {}", failed_encoders(.0))]
    CompareFailed(Vec<EncodeFailure>),

    #[error("Encoder {0} is already compressing this image")]
    EncodeInProgress(EncoderId),

    #[error("Encoder {0} has no compressed result yet")]
    NoResult(EncoderId),

    #[error("No compressed image available")]
    NoLatestResult,

    #[error("Comparison target {0} is missing one of its images")]
    MissingTarget(ComparisonTarget),

    #[error("Source image was replaced while encoder {0} was running; result discarded")]
    SourceReplaced(EncoderId),
}

fn failed_encoders(failures: &[EncodeFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.encoder, f.cause))
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, CompressionError>;
