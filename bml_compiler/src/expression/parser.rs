//! Precedence-climbing parser for inline expressions
//!
//! expr   ::= term (('+' | '-') term)*
//! term   ::= unary (('*' | '/' | '%') unary)*
//! unary  ::= ('+' | '-') unary | primary
//! primary ::= NUMBER | '$' INDEX | '$rand' | '$rank' | '(' expr ')'

use super::error::{ExpressionError, ExpressionResult};
use super::lexer::{ExprToken, OffsetToken};
use crate::config::constants::compile_time::expression::MAX_EXPRESSION_DEPTH;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    pub fn apply(self, lhs: f32, rhs: f32) -> f32 {
        match self {
            BinaryOp::Add => lhs + rhs,
            BinaryOp::Sub => lhs - rhs,
            BinaryOp::Mul => lhs * rhs,
            BinaryOp::Div => lhs / rhs,
            BinaryOp::Rem => lhs % rhs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Number(f32),
    Param(usize),
    Rand,
    Rank,
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    /// True when no parameter or builtin appears in the tree
    pub fn is_constant(&self) -> bool {
        match self {
            Expr::Number(_) => true,
            Expr::Param(_) | Expr::Rand | Expr::Rank => false,
            Expr::Neg(inner) => inner.is_constant(),
            Expr::Binary { lhs, rhs, .. } => lhs.is_constant() && rhs.is_constant(),
        }
    }

    /// Highest `$n` referenced, 0 if none
    pub fn max_param(&self) -> usize {
        match self {
            Expr::Param(index) => *index,
            Expr::Number(_) | Expr::Rand | Expr::Rank => 0,
            Expr::Neg(inner) => inner.max_param(),
            Expr::Binary { lhs, rhs, .. } => lhs.max_param().max(rhs.max_param()),
        }
    }
}

pub struct ExprParser<'a> {
    source: &'a str,
    tokens: Vec<OffsetToken>,
    position: usize,
    depth: usize,
}

impl<'a> ExprParser<'a> {
    pub fn new(source: &'a str, tokens: Vec<OffsetToken>) -> Self {
        Self {
            source,
            tokens,
            position: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> ExprToken {
        self.tokens
            .get(self.position)
            .map(|(t, _)| *t)
            .unwrap_or(ExprToken::Eof)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.position)
            .map(|(_, o)| *o)
            .unwrap_or(self.source.len())
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn error(&self, message: &str) -> ExpressionError {
        ExpressionError::parse(self.source, message, self.offset())
    }

    /// Parse a complete expression; trailing tokens are an error
    pub fn parse(mut self) -> ExpressionResult<Expr> {
        let expr = self.parse_add_expr()?;
        if self.peek() != ExprToken::Eof {
            return Err(self.error("unexpected trailing input"));
        }
        Ok(expr)
    }

    fn parse_add_expr(&mut self) -> ExpressionResult<Expr> {
        let mut lhs = self.parse_mul_expr()?;
        loop {
            let op = match self.peek() {
                ExprToken::Plus => BinaryOp::Add,
                ExprToken::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_mul_expr()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_mul_expr(&mut self) -> ExpressionResult<Expr> {
        let mut lhs = self.parse_unary_expr()?;
        loop {
            let op = match self.peek() {
                ExprToken::Star => BinaryOp::Mul,
                ExprToken::Slash => BinaryOp::Div,
                ExprToken::Percent => BinaryOp::Rem,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary_expr()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn enter(&mut self) -> ExpressionResult<()> {
        self.depth += 1;
        if self.depth > MAX_EXPRESSION_DEPTH {
            return Err(ExpressionError::TooDeep {
                source_text: self.source.to_string(),
            });
        }
        Ok(())
    }

    fn parse_unary_expr(&mut self) -> ExpressionResult<Expr> {
        match self.peek() {
            ExprToken::Minus => {
                self.advance();
                self.enter()?;
                let operand = self.parse_unary_expr()?;
                self.depth -= 1;
                Ok(match operand {
                    Expr::Number(value) => Expr::Number(-value),
                    other => Expr::Neg(Box::new(other)),
                })
            }
            ExprToken::Plus => {
                self.advance();
                self.enter()?;
                let operand = self.parse_unary_expr()?;
                self.depth -= 1;
                Ok(operand)
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> ExpressionResult<Expr> {
        let expr = match self.peek() {
            ExprToken::Number(value) => Expr::Number(value),
            ExprToken::Param(index) => Expr::Param(index),
            ExprToken::Rand => Expr::Rand,
            ExprToken::Rank => Expr::Rank,
            ExprToken::LParen => {
                self.advance();
                self.enter()?;
                let inner = self.parse_add_expr()?;
                self.depth -= 1;
                if self.peek() != ExprToken::RParen {
                    return Err(self.error("expected ')'"));
                }
                inner
            }
            ExprToken::Eof => return Err(self.error("unexpected end of expression")),
            _ => return Err(self.error("expected a number, parameter or '('")),
        };
        self.advance();
        Ok(expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::lexer::tokenize;

    fn parse(source: &str) -> ExpressionResult<Expr> {
        ExprParser::new(source, tokenize(source)?).parse()
    }

    #[test]
    fn test_precedence() {
        let expr = parse("1 + 2 * 3").unwrap();
        assert_eq!(
            expr,
            Expr::Binary {
                op: BinaryOp::Add,
                lhs: Box::new(Expr::Number(1.0)),
                rhs: Box::new(Expr::Binary {
                    op: BinaryOp::Mul,
                    lhs: Box::new(Expr::Number(2.0)),
                    rhs: Box::new(Expr::Number(3.0)),
                }),
            }
        );
    }

    #[test]
    fn test_negative_literal_folded() {
        assert_eq!(parse("-5").unwrap(), Expr::Number(-5.0));
        assert_eq!(parse("-$1").unwrap(), Expr::Neg(Box::new(Expr::Param(1))));
    }

    #[test]
    fn test_constant_and_max_param() {
        assert!(parse("(1 + 2) % 2").unwrap().is_constant());
        let expr = parse("$2 * $rand + $1").unwrap();
        assert!(!expr.is_constant());
        assert_eq!(expr.max_param(), 2);
    }

    #[test]
    fn test_errors() {
        assert!(parse("1 +").is_err());
        assert!(parse("(1 + 2").is_err());
        assert!(parse("1 2").is_err());
        assert!(parse("*3").is_err());
    }

    #[test]
    fn test_depth_limit() {
        let depth = MAX_EXPRESSION_DEPTH + 1;
        let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert!(matches!(parse(&source), Err(ExpressionError::TooDeep { .. })));
    }
}
