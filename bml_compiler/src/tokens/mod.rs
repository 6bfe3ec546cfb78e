//! Markup tokens and the token stream consumed by the syntax parser

pub mod token;
pub mod token_stream;

pub use token::Token;
pub use token_stream::{SpannedToken, TokenStream};
