//! Pattern file reading with size, extension and encoding checks

use crate::config::constants::compile_time::file_processing::{
    ALTERNATE_PATTERN_EXTENSION, LARGE_FILE_THRESHOLD, MAX_FILE_SIZE, PATTERN_EXTENSION,
};
use crate::config::runtime::FileProcessorPreferences;
use crate::logging::codes;
use crate::{log_debug, log_error, log_success};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// File processor specific errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum FileProcessorError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file extension: expected .xml or .bulletml, found {extension:?}")]
    InvalidExtension { extension: Option<String> },

    #[error("File too large: {size} bytes (max: {max_size})")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("File is empty")]
    EmptyFile,

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("Invalid UTF-8 encoding in file: {path}")]
    InvalidEncoding { path: String },

    #[error("I/O error reading file: {message}")]
    IoError { message: String },
}

impl FileProcessorError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            FileProcessorError::FileNotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            FileProcessorError::InvalidExtension { .. } => {
                codes::file_processing::INVALID_EXTENSION
            }
            FileProcessorError::FileTooLarge { .. } => codes::file_processing::FILE_TOO_LARGE,
            FileProcessorError::EmptyFile => codes::file_processing::EMPTY_FILE,
            FileProcessorError::PermissionDenied { .. } => {
                codes::file_processing::PERMISSION_DENIED
            }
            FileProcessorError::InvalidEncoding { .. } => codes::file_processing::INVALID_ENCODING,
            FileProcessorError::IoError { .. } => codes::file_processing::IO_ERROR,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    fn from_io(error: std::io::Error, path: &str) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => FileProcessorError::FileNotFound {
                path: path.to_string(),
            },
            std::io::ErrorKind::PermissionDenied => FileProcessorError::PermissionDenied {
                path: path.to_string(),
            },
            _ => FileProcessorError::IoError {
                message: format!("{}: {}", path, error),
            },
        }
    }
}

/// File metadata collected during processing
#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub path: PathBuf,
    pub size: u64,
    pub extension: Option<String>,
    pub line_count: usize,
    /// Whether the extension is one of the pattern extensions
    pub is_pattern_file: bool,
}

impl FileMetadata {
    pub fn human_readable_size(&self) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
        let mut size = self.size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", self.size, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    pub fn is_large_file(&self) -> bool {
        self.size > LARGE_FILE_THRESHOLD
    }
}

/// Source text plus what was learned while reading it
#[derive(Debug, Clone)]
pub struct FileProcessingResult {
    pub source: String,
    pub metadata: FileMetadata,
    pub processing_duration: Duration,
}

/// Reads pattern scripts from disk
pub struct FileProcessor {
    pub require_pattern_extension: bool,
    pub log_file_metrics: bool,
}

impl FileProcessor {
    pub fn new() -> Self {
        Self {
            require_pattern_extension: false,
            log_file_metrics: true,
        }
    }

    pub fn from_preferences(prefs: &FileProcessorPreferences) -> Self {
        Self {
            require_pattern_extension: prefs.require_pattern_extension,
            log_file_metrics: prefs.log_file_metrics,
        }
    }

    pub fn with_pattern_extension_required(mut self, required: bool) -> Self {
        self.require_pattern_extension = required;
        self
    }

    /// Read `file_path` after checking existence, extension and size
    pub fn process_file(
        &self,
        file_path: &Path,
    ) -> Result<FileProcessingResult, FileProcessorError> {
        let start_time = Instant::now();
        let display = file_path.display().to_string();

        log_debug!("Starting file processing", "file" => display);

        let metadata = self.get_metadata(file_path, &display)?;
        self.validate_file(&metadata, &display)?;

        let bytes = fs::read(file_path).map_err(|e| {
            let error = FileProcessorError::from_io(e, &display);
            log_error!(error.error_code(), "Failed to read file", "file" => display);
            error
        })?;

        let source = String::from_utf8(bytes).map_err(|_| {
            let error = FileProcessorError::InvalidEncoding {
                path: display.clone(),
            };
            log_error!(error.error_code(), "File is not valid UTF-8", "file" => display);
            error
        })?;

        let mut metadata = metadata;
        metadata.line_count = source.lines().count();

        let result = FileProcessingResult {
            source,
            metadata,
            processing_duration: start_time.elapsed(),
        };

        self.log_processing_success(&result, &display);
        Ok(result)
    }

    fn get_metadata(&self, path: &Path, display: &str) -> Result<FileMetadata, FileProcessorError> {
        let fs_metadata = fs::metadata(path).map_err(|e| {
            let error = FileProcessorError::from_io(e, display);
            log_error!(error.error_code(), "Cannot access file", "file" => display);
            error
        })?;

        if !fs_metadata.is_file() {
            let error = FileProcessorError::IoError {
                message: format!("{} is not a regular file", display),
            };
            log_error!(error.error_code(), "Path is not a file", "file" => display);
            return Err(error);
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let is_pattern_file = matches!(
            extension.as_deref(),
            Some(PATTERN_EXTENSION) | Some(ALTERNATE_PATTERN_EXTENSION)
        );

        Ok(FileMetadata {
            path: path.to_path_buf(),
            size: fs_metadata.len(),
            extension,
            line_count: 0,
            is_pattern_file,
        })
    }

    fn validate_file(
        &self,
        metadata: &FileMetadata,
        display: &str,
    ) -> Result<(), FileProcessorError> {
        if self.require_pattern_extension && !metadata.is_pattern_file {
            let error = FileProcessorError::InvalidExtension {
                extension: metadata.extension.clone(),
            };
            log_error!(error.error_code(), "File does not have a pattern extension",
                "file" => display,
                "extension" => metadata.extension.as_deref().unwrap_or("none")
            );
            return Err(error);
        }

        if metadata.size > MAX_FILE_SIZE {
            let error = FileProcessorError::FileTooLarge {
                size: metadata.size,
                max_size: MAX_FILE_SIZE,
            };
            log_error!(error.error_code(), "File exceeds maximum size",
                "file" => display,
                "size" => metadata.size,
                "max_size" => MAX_FILE_SIZE
            );
            return Err(error);
        }

        if metadata.size == 0 {
            let error = FileProcessorError::EmptyFile;
            log_error!(error.error_code(), "File is empty", "file" => display);
            return Err(error);
        }

        Ok(())
    }

    fn log_processing_success(&self, result: &FileProcessingResult, display: &str) {
        if self.log_file_metrics {
            let duration_ms = format!("{:.2}", result.processing_duration.as_secs_f64() * 1000.0);
            log_success!(
                codes::success::FILE_PROCESSING_SUCCESS,
                "File processed successfully",
                "file" => display,
                "size" => result.metadata.human_readable_size(),
                "lines" => result.metadata.line_count,
                "large_file" => result.metadata.is_large_file(),
                "duration_ms" => duration_ms
            );
        } else {
            log_success!(
                codes::success::FILE_PROCESSING_SUCCESS,
                "File processed successfully",
                "file" => display
            );
        }
    }
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn test_reads_pattern_file() {
        let file = write_temp(".xml", b"<bulletml>\n</bulletml>\n");
        let result = FileProcessor::new().process_file(file.path()).unwrap();

        assert_eq!(result.metadata.line_count, 2);
        assert!(result.metadata.is_pattern_file);
        assert!(result.source.starts_with("<bulletml>"));
    }

    #[test]
    fn test_missing_file() {
        let result = FileProcessor::new().process_file(Path::new("/no/such/pattern.xml"));
        assert_matches!(result, Err(FileProcessorError::FileNotFound { .. }));
    }

    #[test]
    fn test_empty_file_rejected() {
        let file = write_temp(".xml", b"");
        let result = FileProcessor::new().process_file(file.path());
        assert_matches!(result, Err(FileProcessorError::EmptyFile));
    }

    #[test]
    fn test_extension_enforced_when_required() {
        let file = write_temp(".txt", b"<bulletml/>");
        let processor = FileProcessor::new().with_pattern_extension_required(true);
        assert_matches!(
            processor.process_file(file.path()),
            Err(FileProcessorError::InvalidExtension { extension: Some(ext) }) if ext == "txt"
        );

        assert!(FileProcessor::new().process_file(file.path()).is_ok());
    }

    #[test]
    fn test_invalid_utf8() {
        let file = write_temp(".bulletml", &[0x3c, 0xff, 0xfe, 0x3e]);
        let result = FileProcessor::new().process_file(file.path());
        assert_matches!(result, Err(FileProcessorError::InvalidEncoding { .. }));
    }

    #[test]
    fn test_human_readable_size() {
        let metadata = FileMetadata {
            path: PathBuf::from("a.xml"),
            size: 2048,
            extension: Some("xml".into()),
            line_count: 0,
            is_pattern_file: true,
        };
        assert_eq!(metadata.human_readable_size(), "2.00 KB");
    }
}
