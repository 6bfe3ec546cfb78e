//! Pattern AST
//!
//! Nodes live in a flat arena ([`PatternTree`]) addressed by [`NodeId`];
//! parent and child links are indices, so the finished tree is plain data
//! that can be shared read-only between any number of entities.

mod builder;
mod error;
mod kind;
mod node;
mod tree;

pub use builder::{build_tree, TreeBuilder};
pub use error::{AstResult, FormatError};
pub use kind::{NodeKind, NodeType, Orientation};
pub use node::{Node, NodeId};
pub use tree::PatternTree;

use crate::config::runtime::LoaderPreferences;
use crate::logging::codes;
use crate::syntax::Document;
use crate::{log_debug, log_error, log_success};

/// Build the AST with logging
pub fn build_ast(
    document: &Document,
    preferences: &LoaderPreferences,
) -> AstResult<(PatternTree, Orientation)> {
    log_debug!("Starting AST construction", "root" => document.root.name);

    match build_tree(document, preferences) {
        Ok((tree, orientation)) => {
            log_success!(
                codes::success::AST_CONSTRUCTION_COMPLETE,
                "Pattern tree built",
                "nodes" => tree.len(),
                "orientation" => format!("{:?}", orientation)
            );
            Ok((tree, orientation))
        }
        Err(error) => {
            log_error!(error.error_code(), &error.to_string(), span = error.span());
            Err(error)
        }
    }
}
