// Internal modules
pub mod ast;
pub mod batch;
pub mod config;
pub mod expression;
pub mod file_processor;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod pattern;
pub mod pipeline;
pub mod reference_resolution;
pub mod syntax;
pub mod tokens;
pub mod utils;
pub mod validation;

// Re-export key types for library consumers
pub use ast::{NodeId, NodeKind, NodeType, Orientation, PatternTree};
pub use batch::{BatchConfig, BatchError, BatchResults};
pub use expression::{Expression, ExpressionContext, Randomizer};
pub use pattern::Pattern;
pub use pipeline::{load, load_file, PipelineError};
