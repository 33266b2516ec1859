//! Operator and keyword tokens recognised by the filter expression language.

use crate::ast::{LogicalOperator, Operator};

/// Represents a span in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// The starting byte offset.
    pub start: usize,
    /// The ending byte offset.
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// A textual operator and the operator it stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorToken {
    pub text: &'static str,
    pub operator: Operator,
}

const fn token(text: &'static str, operator: Operator) -> OperatorToken {
    OperatorToken { text, operator }
}

/// Keyword operators, most specific first so that `IN` is never found inside
/// `NOT IN` and `IS NULL` never inside `IS NOT NULL`.
/// Each is searched as `" <KEYWORD>"`, case-insensitively.
pub const KEYWORD_OPERATORS: [OperatorToken; 5] = [
    token("NOT IN", Operator::NotIn),
    token("IS NOT NULL", Operator::IsNotNull),
    token("IS NULL", Operator::IsNull),
    token("LIKE", Operator::Like),
    token("IN", Operator::In),
];

/// Symbolic comparison operators, two-character forms before the one-character
/// forms they contain.
pub const COMPARISON_OPERATORS: [OperatorToken; 7] = [
    token("!=", Operator::Neq),
    token("<>", Operator::Neq),
    token(">=", Operator::Gte),
    token("<=", Operator::Lte),
    token(">", Operator::Gt),
    token("<", Operator::Lt),
    token("=", Operator::Eq),
];

/// Logical keywords in detection order.
pub const LOGICAL_OPERATORS: [LogicalOperator; 2] = [LogicalOperator::And, LogicalOperator::Or];

impl LogicalOperator {
    /// The keyword as written in expressions.
    pub fn keyword(self) -> &'static str {
        match self {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
        }
    }
}
