//! File processor module: reads pattern scripts from disk under size limits

mod processor;

use crate::config::runtime::FileProcessorPreferences;
use std::path::Path;

pub use processor::{FileMetadata, FileProcessingResult, FileProcessor, FileProcessorError};

pub type FileProcessorResult<T> = Result<T, FileProcessorError>;

/// Process a file with default settings
pub fn process_file(file_path: &Path) -> FileProcessorResult<FileProcessingResult> {
    FileProcessor::new().process_file(file_path)
}

/// Process a file with the given preferences
pub fn process_file_with_preferences(
    file_path: &Path,
    prefs: &FileProcessorPreferences,
) -> FileProcessorResult<FileProcessingResult> {
    FileProcessor::from_preferences(prefs).process_file(file_path)
}
