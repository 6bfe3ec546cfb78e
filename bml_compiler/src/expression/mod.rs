//! Inline arithmetic expressions
//!
//! Value nodes (`wait`, `times`, `direction`, `speed`, `param`, ...) carry an
//! expression compiled once at load time and evaluated many times against
//! different parameter scopes.

mod error;
mod lexer;
mod parser;
mod random;

pub use error::{ExpressionError, ExpressionResult};
pub use parser::{BinaryOp, Expr};
pub use random::Randomizer;

use crate::config::constants::compile_time::expression::MAX_EXPRESSION_LENGTH;
use crate::log_debug;
use serde::Serialize;

/// What an expression can read while evaluating
pub trait ExpressionContext {
    /// Value of `$index` (1-based), `None` when nothing in scope binds it
    fn param(&self, index: usize) -> Option<f32>;

    /// Value of `$rank`
    fn rank(&self) -> f32;

    /// Value of `$rand`, uniform in [0, 1)
    fn random(&mut self) -> f32;
}

/// Fixed parameters, difficulty and a random source
#[derive(Debug, Clone)]
pub struct SimpleContext {
    pub params: Vec<f32>,
    pub rank: f32,
    pub randomizer: Randomizer,
}

impl SimpleContext {
    pub fn new(params: Vec<f32>, rank: f32, randomizer: Randomizer) -> Self {
        Self {
            params,
            rank,
            randomizer,
        }
    }
}

impl Default for SimpleContext {
    fn default() -> Self {
        Self::new(Vec::new(), 0.0, Randomizer::seeded(0))
    }
}

impl ExpressionContext for SimpleContext {
    fn param(&self, index: usize) -> Option<f32> {
        index
            .checked_sub(1)
            .and_then(|i| self.params.get(i))
            .copied()
    }

    fn rank(&self) -> f32 {
        self.rank
    }

    fn random(&mut self) -> f32 {
        self.randomizer.next_f32()
    }
}

/// A compiled expression; an empty source evaluates to 0
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expression {
    source: String,
    #[serde(skip)]
    root: Option<Expr>,
}

impl Expression {
    pub fn parse(source: &str) -> ExpressionResult<Self> {
        if source.len() > MAX_EXPRESSION_LENGTH {
            return Err(ExpressionError::TooLong {
                length: source.len(),
            });
        }

        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Ok(Self::empty());
        }

        let tokens = lexer::tokenize(trimmed)?;
        let root = parser::ExprParser::new(trimmed, tokens).parse()?;

        Ok(Self {
            source: trimmed.to_string(),
            root: Some(root),
        })
    }

    pub fn empty() -> Self {
        Self {
            source: String::new(),
            root: None,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn root(&self) -> Option<&Expr> {
        self.root.as_ref()
    }

    pub fn is_constant(&self) -> bool {
        self.root.as_ref().map_or(true, Expr::is_constant)
    }

    /// Evaluate, failing on the first unbound parameter
    pub fn try_evaluate(&self, ctx: &mut dyn ExpressionContext) -> ExpressionResult<f32> {
        match &self.root {
            Some(root) => eval(root, ctx, true),
            None => Ok(0.0),
        }
    }

    /// Evaluate, reading unbound parameters as 0
    pub fn evaluate(&self, ctx: &mut dyn ExpressionContext) -> f32 {
        match &self.root {
            Some(root) => eval(root, ctx, false).unwrap_or(0.0),
            None => 0.0,
        }
    }
}

fn eval(expr: &Expr, ctx: &mut dyn ExpressionContext, strict: bool) -> ExpressionResult<f32> {
    Ok(match expr {
        Expr::Number(value) => *value,
        Expr::Param(index) => match ctx.param(*index) {
            Some(value) => value,
            None if strict => return Err(ExpressionError::UnboundParameter { index: *index }),
            None => {
                log_debug!("Unbound parameter read as 0", "index" => index);
                0.0
            }
        },
        Expr::Rand => ctx.random(),
        Expr::Rank => ctx.rank(),
        Expr::Neg(inner) => -eval(inner, ctx, strict)?,
        Expr::Binary { op, lhs, rhs } => {
            let lhs = eval(lhs, ctx, strict)?;
            let rhs = eval(rhs, ctx, strict)?;
            op.apply(lhs, rhs)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn eval_with(source: &str, params: Vec<f32>, rank: f32) -> f32 {
        let mut ctx = SimpleContext::new(params, rank, Randomizer::seeded(3));
        Expression::parse(source).unwrap().evaluate(&mut ctx)
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval_with("1 + 2 * 3", vec![], 0.0), 7.0);
        assert_eq!(eval_with("(1 + 2) * 3", vec![], 0.0), 9.0);
        assert_eq!(eval_with("7 % 4 - -1", vec![], 0.0), 4.0);
        assert_eq!(eval_with("10 / 4", vec![], 0.0), 2.5);
    }

    #[test]
    fn test_params_and_rank() {
        assert_eq!(eval_with("$1 * 2 + $2", vec![3.0, 1.0], 0.0), 7.0);
        assert_eq!(eval_with("180 * $rank", vec![], 0.5), 90.0);
    }

    #[test]
    fn test_unbound_parameter() {
        let expression = Expression::parse("$3 + 5").unwrap();
        let mut ctx = SimpleContext::new(vec![1.0, 2.0], 0.0, Randomizer::seeded(0));

        assert_eq!(expression.evaluate(&mut ctx), 5.0);
        assert_matches!(
            expression.try_evaluate(&mut ctx),
            Err(ExpressionError::UnboundParameter { index: 3 })
        );
    }

    #[test]
    fn test_rand_in_unit_range_and_varies() {
        let expression = Expression::parse("$rand").unwrap();
        let mut ctx = SimpleContext::default();
        let values: Vec<f32> = (0..8).map(|_| expression.evaluate(&mut ctx)).collect();

        assert!(values.iter().all(|v| (0.0..1.0).contains(v)));
        assert!(values.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn test_empty_is_zero() {
        let expression = Expression::parse("  \n ").unwrap();
        assert!(expression.is_empty());
        assert!(expression.is_constant());
        assert_eq!(expression.evaluate(&mut SimpleContext::default()), 0.0);
    }

    #[test]
    fn test_division_by_zero_not_checked() {
        assert!(eval_with("1 / 0", vec![], 0.0).is_infinite());
    }

    #[test]
    fn test_too_long() {
        let source = "1+".repeat(MAX_EXPRESSION_LENGTH) + "1";
        assert_matches!(Expression::parse(&source), Err(ExpressionError::TooLong { .. }));
    }
}
