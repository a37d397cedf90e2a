pub mod batch;
pub mod cli;
pub mod comparison;
pub mod constants;
pub mod download;
pub mod encoder;
pub mod error;
pub mod formats;
pub mod info;
pub mod logger;
pub mod processing;
pub mod render;
pub mod result;
pub mod session;
pub mod settings;
pub mod source;
pub mod utils;
pub mod validation;

pub use batch::{generate_report, sweep_settings, CompressionReport, SweepEntry};
pub use comparison::{ActiveComparison, ComparisonImages, ComparisonMode, ComparisonTarget};
pub use download::{download_file_name, save_result};
pub use encoder::{
    CompressorEncoder, EncodeRequest, EncodedImage, Encoder, EncoderId, SizeTargetEncoder,
};
pub use error::{CompressionError, EncodeFailure, Result};
pub use formats::OutputFormat;
pub use info::print_source_info;
pub use render::{render_comparison, save_rendering, ComparisonRenderer, CompositeRenderer};
pub use result::{CompressionStats, EncodeResult};
pub use session::{CompressionSession, ResultPair};
pub use settings::CompressionSettings;
pub use source::SourceImage;
