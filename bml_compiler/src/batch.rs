//! Batch loading of pattern files
//!
//! Expands files and directories into a list of pattern files and loads each
//! one with its own file context, so the global error collector can report a
//! cargo-style summary at the end.

use crate::config::constants::compile_time::file_processing::{
    ALTERNATE_PATTERN_EXTENSION, PATTERN_EXTENSION,
};
use crate::config::runtime::RuntimeConfig;
use crate::logging::codes;
use crate::pattern::Pattern;
use crate::pipeline::{self, PipelineError};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// BATCH PROCESSING TYPES
// ============================================================================

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_threads: usize,
    pub recursive: bool,
    pub max_files: Option<usize>,
    pub fail_fast: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_threads: thread::available_parallelism()
                .map(|n| n.get().min(8))
                .unwrap_or(4),
            recursive: true,
            max_files: None,
            fail_fast: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct BatchResults {
    pub loaded: Vec<(PathBuf, Pattern)>,
    pub failed: Vec<(PathBuf, PipelineError)>,
    pub processing_duration: Duration,
    pub files_discovered: usize,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files_processed(&self) -> usize {
        self.loaded.len() + self.failed.len()
    }

    pub fn success_count(&self) -> usize {
        self.loaded.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    fn record(&mut self, path: PathBuf, result: Result<Pattern, PipelineError>) {
        match result {
            Ok(pattern) => self.loaded.push((path, pattern)),
            Err(error) => self.failed.push((path, error)),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} files checked, {} loaded, {} failed, {:.2}s total",
            self.files_processed(),
            self.success_count(),
            self.failure_count(),
            self.processing_duration.as_secs_f64()
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Path not found: {path}")]
    PathNotFound { path: String },

    #[error("No pattern files found under {path}")]
    NoFilesFound { path: String },

    #[error("IO error during directory traversal: {error}")]
    IoError { error: String },
}

// ============================================================================
// FILE DISCOVERY
// ============================================================================

/// Expand `paths` into pattern files; explicit files are kept whatever
/// their extension, directories contribute `.xml` and `.bulletml` files
pub fn discover_pattern_files(
    paths: &[PathBuf],
    config: &BatchConfig,
) -> Result<Vec<PathBuf>, BatchError> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            let mut found = Vec::new();
            visit_directory(path, &mut found, config)?;
            if found.is_empty() {
                return Err(BatchError::NoFilesFound {
                    path: path.display().to_string(),
                });
            }
            found.sort();
            files.extend(found);
        } else {
            return Err(BatchError::PathNotFound {
                path: path.display().to_string(),
            });
        }
    }

    if let Some(max_files) = config.max_files {
        if files.len() > max_files {
            crate::log_warning!("Reached maximum file limit",
                "files_found" => files.len(),
                "limit" => max_files
            );
            files.truncate(max_files);
        }
    }

    Ok(files)
}

fn visit_directory(
    dir: &Path,
    files: &mut Vec<PathBuf>,
    config: &BatchConfig,
) -> Result<(), BatchError> {
    let entries = fs::read_dir(dir).map_err(|e| BatchError::IoError {
        error: e.to_string(),
    })?;

    for entry in entries {
        let path = entry
            .map_err(|e| BatchError::IoError {
                error: e.to_string(),
            })?
            .path();

        if path.is_dir() {
            if config.recursive {
                visit_directory(&path, files, config)?;
            }
        } else if is_pattern_file(&path) {
            files.push(path);
        }
    }
    Ok(())
}

fn is_pattern_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ext.eq_ignore_ascii_case(PATTERN_EXTENSION)
                || ext.eq_ignore_ascii_case(ALTERNATE_PATTERN_EXTENSION)
        })
        .unwrap_or(false)
}

// ============================================================================
// BATCH PROCESSING
// ============================================================================

fn load_one(
    file_path: &Path,
    file_id: usize,
    config: &RuntimeConfig,
) -> Result<Pattern, PipelineError> {
    let result = pipeline::load_file_with_id(file_path, file_id, config);
    match &result {
        Ok(_) => crate::log_success!(
            codes::success::FILE_PROCESSING_SUCCESS,
            "File checked",
            "file" => file_path.display(),
            "file_id" => file_id
        ),
        Err(error) => crate::log_error!(error.error_code(), "File check failed",
            "file" => file_path.display(),
            "file_id" => file_id
        ),
    }
    result
}

/// Load every file one after another
pub fn check_sequential(
    paths: &[PathBuf],
    config: &BatchConfig,
    runtime: &RuntimeConfig,
) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();
    let files = discover_pattern_files(paths, config)?;

    let mut results = BatchResults::new();
    results.files_discovered = files.len();

    for (file_id, file_path) in files.iter().enumerate() {
        let result = load_one(file_path, file_id, runtime);
        let failed = result.is_err();
        results.record(file_path.clone(), result);

        if failed && config.fail_fast {
            crate::log_warning!("Fail-fast mode enabled, stopping batch");
            break;
        }
    }

    results.processing_duration = start_time.elapsed();
    crate::log_info!("Batch check completed",
        "files" => results.files_processed(),
        "failed" => results.failure_count()
    );
    Ok(results)
}

/// Load files on up to `max_threads` scoped threads; result order follows
/// discovery order
pub fn check_parallel(
    paths: &[PathBuf],
    config: &BatchConfig,
    runtime: &RuntimeConfig,
) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();
    let files = discover_pattern_files(paths, config)?;

    let mut results = BatchResults::new();
    results.files_discovered = files.len();
    if files.is_empty() {
        return Ok(results);
    }

    let threads = config.max_threads.max(1);
    let chunk_size = files.len().div_ceil(threads);

    let outcomes: Vec<Vec<(PathBuf, Result<Pattern, PipelineError>)>> = thread::scope(|scope| {
        let handles: Vec<_> = files
            .chunks(chunk_size)
            .enumerate()
            .map(|(chunk_index, chunk)| {
                scope.spawn(move || {
                    chunk
                        .iter()
                        .enumerate()
                        .map(|(i, path)| {
                            let file_id = chunk_index * chunk_size + i;
                            (path.clone(), load_one(path, file_id, runtime))
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .filter_map(|handle| handle.join().ok())
            .collect()
    });

    for (path, result) in outcomes.into_iter().flatten() {
        results.record(path, result);
    }

    results.processing_duration = start_time.elapsed();
    crate::log_info!("Parallel batch check completed",
        "files" => results.files_processed(),
        "failed" => results.failure_count(),
        "threads" => threads
    );
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_discovers_pattern_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.xml", "<bulletml/>");
        write(dir.path(), "a.bulletml", "<bulletml/>");
        write(dir.path(), "notes.txt", "ignored");

        let files =
            discover_pattern_files(&[dir.path().to_path_buf()], &BatchConfig::default()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.bulletml", "b.xml"]);
    }

    #[test]
    fn test_missing_path() {
        let result =
            discover_pattern_files(&[PathBuf::from("/nonexistent/dir")], &BatchConfig::default());
        assert!(matches!(result, Err(BatchError::PathNotFound { .. })));
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "good.xml",
            r#"<bulletml><action label="top"><wait>1</wait></action></bulletml>"#,
        );
        write(
            dir.path(),
            "bad.xml",
            r#"<bulletml><action label="top"><actionRef label="x"/></action></bulletml>"#,
        );
        let paths = vec![dir.path().to_path_buf()];
        let runtime = RuntimeConfig::default();

        let sequential = check_sequential(&paths, &BatchConfig::default(), &runtime).unwrap();
        assert_eq!(sequential.success_count(), 1);
        assert_eq!(sequential.failure_count(), 1);
        assert!(!sequential.is_success());

        let config = BatchConfig {
            max_threads: 2,
            ..BatchConfig::default()
        };
        let parallel = check_parallel(&paths, &config, &runtime).unwrap();
        assert_eq!(parallel.files_processed(), 2);
        assert_eq!(parallel.failed[0].0.file_name().unwrap(), "bad.xml");
    }

    #[test]
    fn test_fail_fast_stops_early() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.xml", "<nope/>");
        write(dir.path(), "b.xml", "<bulletml/>");
        let config = BatchConfig {
            fail_fast: true,
            ..BatchConfig::default()
        };

        let results =
            check_sequential(&[dir.path().to_path_buf()], &config, &RuntimeConfig::default())
                .unwrap();
        assert_eq!(results.files_processed(), 1);
    }
}
