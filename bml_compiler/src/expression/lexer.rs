//! Tokenizer for inline arithmetic expressions

use super::error::{ExpressionError, ExpressionResult};
use crate::config::constants::compile_time::expression::MAX_PARAMETER_INDEX;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExprToken {
    Number(f32),
    /// `$1`, `$2`, ...
    Param(usize),
    /// `$rand`
    Rand,
    /// `$rank`
    Rank,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
    Eof,
}

/// A token and the byte offset it starts at
pub type OffsetToken = (ExprToken, usize);

pub fn tokenize(source: &str) -> ExpressionResult<Vec<OffsetToken>> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        let start = i;

        let token = match c {
            b' ' | b'\t' | b'\n' | b'\r' => {
                i += 1;
                continue;
            }
            b'+' => ExprToken::Plus,
            b'-' => ExprToken::Minus,
            b'*' => ExprToken::Star,
            b'/' => ExprToken::Slash,
            b'%' => ExprToken::Percent,
            b'(' => ExprToken::LParen,
            b')' => ExprToken::RParen,
            b'0'..=b'9' | b'.' => {
                i = scan_number(bytes, i);
                let text = &source[start..i];
                let value = text.parse::<f32>().map_err(|_| {
                    ExpressionError::parse(source, format!("invalid number '{}'", text), start)
                })?;
                tokens.push((ExprToken::Number(value), start));
                continue;
            }
            b'$' => {
                i += 1;
                let name_start = i;
                while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
                    i += 1;
                }
                tokens.push((variable(source, &source[name_start..i], start)?, start));
                continue;
            }
            _ => {
                let ch = source[start..].chars().next().unwrap_or('?');
                return Err(ExpressionError::parse(
                    source,
                    format!("unexpected character '{}'", ch),
                    start,
                ));
            }
        };

        tokens.push((token, start));
        i += 1;
    }

    tokens.push((ExprToken::Eof, source.len()));
    Ok(tokens)
}

/// Digits with an optional fraction and exponent; returns the end offset
fn scan_number(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }
    i
}

fn variable(source: &str, name: &str, offset: usize) -> ExpressionResult<ExprToken> {
    match name {
        "rand" => Ok(ExprToken::Rand),
        "rank" => Ok(ExprToken::Rank),
        "" => Err(ExpressionError::parse(source, "'$' without a name", offset)),
        _ => match name.parse::<usize>() {
            Ok(index) if (1..=MAX_PARAMETER_INDEX).contains(&index) => Ok(ExprToken::Param(index)),
            Ok(index) => Err(ExpressionError::parse(
                source,
                format!("parameter ${} out of range 1..={}", index, MAX_PARAMETER_INDEX),
                offset,
            )),
            Err(_) => Err(ExpressionError::parse(
                source,
                format!("unknown variable '${}'", name),
                offset,
            )),
        },
    }
}
