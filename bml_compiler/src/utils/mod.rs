//! Shared primitives used by every compiler stage

pub mod span;

pub use span::{Position, SourceMap, Span, Spanned};
