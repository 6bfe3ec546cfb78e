//! Pattern loading pipeline
//!
//! text -> markup tokens -> element tree -> pattern tree -> validation.
//! Any stage failing aborts the load; no partially valid pattern is returned.

mod error;

pub use error::PipelineError;

use crate::config::runtime::{LoaderPreferences, RuntimeConfig};
use crate::logging::{self, codes};
use crate::pattern::Pattern;
use crate::{log_info, log_success};
use std::path::Path;

/// Load a pattern from script text with default preferences
pub fn load(source: &str) -> Result<Pattern, PipelineError> {
    load_with_preferences(source, &LoaderPreferences::default())
}

pub fn load_with_preferences(
    source: &str,
    preferences: &LoaderPreferences,
) -> Result<Pattern, PipelineError> {
    let tokens = crate::lexical::tokenize(source)?;
    let document = crate::syntax::parse_document(tokens)?;
    let (mut tree, orientation) = crate::ast::build_ast(&document, preferences)?;
    crate::validation::validate_tree(&mut tree, preferences)?;

    let pattern = Pattern::new(tree, orientation);
    log_success!(
        codes::success::PATTERN_LOADED,
        "Pattern loaded",
        "nodes" => pattern.tree().len(),
        "entry_points" => pattern.entry_points().len()
    );
    Ok(pattern)
}

/// Load a pattern file with default configuration
pub fn load_file(path: &Path) -> Result<Pattern, PipelineError> {
    load_file_with_config(path, &RuntimeConfig::default())
}

pub fn load_file_with_config(
    path: &Path,
    config: &RuntimeConfig,
) -> Result<Pattern, PipelineError> {
    load_file_with_id(path, 0, config)
}

/// Read, compile and validate one file; log events carry the file context
pub fn load_file_with_id(
    path: &Path,
    file_id: usize,
    config: &RuntimeConfig,
) -> Result<Pattern, PipelineError> {
    logging::with_file_context(path.to_path_buf(), file_id, || -> Result<Pattern, PipelineError> {
        log_info!("Loading pattern file", "file" => path.display());

        let file_result =
            crate::file_processor::process_file_with_preferences(path, &config.file_processor)?;
        let pattern = load_with_preferences(&file_result.source, &config.loader)?;
        Ok(pattern.with_filename(path.to_path_buf()))
    })
}
