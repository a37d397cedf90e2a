use crate::constants::{MAX_FILE_SIZE, SUPPORTED_IMAGE_EXTENSIONS};
use crate::error::{CompressionError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Validate an upload path and return its canonical form
pub fn validate_input_path(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        return Err(CompressionError::FileNotFound(path.to_path_buf()));
    }

    if !path.is_file() {
        return Err(CompressionError::UnsupportedFormat(
            "Input path is not a file".to_string(),
        ));
    }

    let canonical_path = path
        .canonicalize()
        .map_err(|_| CompressionError::FileNotFound(path.to_path_buf()))?;

    let size = fs::metadata(&canonical_path)?.len();
    if size > MAX_FILE_SIZE {
        return Err(CompressionError::FileTooLarge(size, MAX_FILE_SIZE));
    }

    Ok(canonical_path)
}

/// Create the output directory if needed and return its canonical form
pub fn validate_output_dir(dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .map_err(|_| CompressionError::DirectoryCreationFailed(dir.to_path_buf()))?;
    dir.canonicalize()
        .map_err(|_| CompressionError::DirectoryCreationFailed(dir.to_path_buf()))
}

/// Uploads are accepted only when their declared type is an image type
pub fn is_image_mime(mime: &str) -> bool {
    mime.trim().to_lowercase().starts_with("image/")
}

/// Check if the file extension indicates it might be an image
pub fn is_potential_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_validate_input_path_not_found() {
        let result = validate_input_path(Path::new("nonexistent.jpg"));
        assert!(matches!(result, Err(CompressionError::FileNotFound(_))));
    }

    #[test]
    fn test_validate_input_path_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = validate_input_path(temp_dir.path());
        assert!(matches!(result, Err(CompressionError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_validate_input_path_valid_file() {
        let temp_dir = TempDir::new().unwrap();
        let test_file = temp_dir.path().join("test.jpg");
        let mut file = File::create(&test_file).unwrap();
        file.write_all(b"fake image data").unwrap();

        let canonical = validate_input_path(&test_file).unwrap();
        assert!(canonical.is_absolute());
    }

    #[test]
    fn test_validate_output_dir_creates_nested() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        let canonical = validate_output_dir(&nested).unwrap();
        assert!(canonical.is_dir());
    }

    #[test]
    fn test_is_image_mime() {
        assert!(is_image_mime("image/png"));
        assert!(is_image_mime("IMAGE/JPEG"));
        assert!(!is_image_mime("text/plain"));
        assert!(!is_image_mime(""));
    }

    #[test]
    fn test_is_potential_image_file() {
        assert!(is_potential_image_file(Path::new("test.jpg")));
        assert!(is_potential_image_file(Path::new("test.PNG")));
        assert!(is_potential_image_file(Path::new("test.webp")));
        assert!(!is_potential_image_file(Path::new("test.txt")));
        assert!(!is_potential_image_file(Path::new("test")));
    }
}
