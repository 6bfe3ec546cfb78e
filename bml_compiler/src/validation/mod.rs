//! Structural validation of a complete pattern tree
//!
//! Runs only after the whole tree exists, since references may point forward
//! or into sibling subtrees. Resolved references, fire bullet descriptions
//! and enclosing repeats are recorded on the nodes as the walk goes.

pub mod error;
pub mod rules;

pub use error::{ValidationError, ValidationResult};
pub use rules::{ValidationStats, Validator};

use crate::ast::PatternTree;
use crate::config::runtime::LoaderPreferences;
use crate::logging::codes;
use crate::{log_debug, log_error, log_success};

/// Validate `tree` in place with logging
pub fn validate_tree(
    tree: &mut PatternTree,
    preferences: &LoaderPreferences,
) -> ValidationResult<ValidationStats> {
    log_debug!("Starting validation", "nodes" => tree.len());

    match Validator::new(tree).run() {
        Ok(stats) => {
            log_success!(
                codes::success::REFERENCE_RESOLUTION_COMPLETE,
                "References resolved",
                "references" => stats.references_resolved
            );
            if preferences.log_validation_details {
                log_success!(
                    codes::success::VALIDATION_COMPLETE,
                    "Validation completed",
                    "nodes" => stats.nodes_validated,
                    "fires" => stats.fires_bound
                );
            } else {
                log_success!(codes::success::VALIDATION_COMPLETE, "Validation completed");
            }
            Ok(stats)
        }
        Err(error) => {
            log_error!(error.error_code(), &error.to_string(), span = error.span());
            Err(error)
        }
    }
}
