use crate::constants::DOWNLOAD_FILE_PREFIX;
use crate::error::Result;
use crate::formats::OutputFormat;
use crate::result::EncodeResult;
use crate::validation::validate_output_dir;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name for a downloaded result, e.g. `compressed_1700000000000.jpeg`.
/// The extension is the mime subtype of the format.
pub fn download_file_name(format: OutputFormat, timestamp_millis: i64) -> String {
    format!(
        "{}{}.{}",
        DOWNLOAD_FILE_PREFIX,
        timestamp_millis,
        format.mime_subtype()
    )
}

/// Writes a result into `dir` under a timestamped name.
///
/// # Arguments
/// * `result` - The stored encode result to write
/// * `dir` - Output directory; created if missing
///
/// # Returns
/// * `Ok(path)` - Path of the written file
/// * `Err(CompressionError)` - If the directory or file cannot be written
pub fn save_result(result: &EncodeResult, dir: &Path) -> Result<PathBuf> {
    let dir = validate_output_dir(dir)?;
    let name = download_file_name(result.format(), Utc::now().timestamp_millis());
    let path = dir.join(name);

    fs::write(&path, result.bytes())?;
    info!(path = %path.display(), bytes = result.size(), encoder = %result.encoder(), "result saved");
    Ok(path)
}
