//! Expression error types

use thiserror::Error;

use crate::machine::MachineError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    // Lexical errors
    #[error("No match at position {position}\n{input}\n{}", caret(.position))]
    Lex { position: usize, input: String },

    #[error("Expression has more than {limit} tokens")]
    TooManyTokens { limit: usize },

    #[error("Token '{text}' is longer than {limit} bytes")]
    TokenTooLong { text: String, limit: usize },

    // Structural errors
    #[error("Empty expression")]
    EmptyExpression,

    #[error("Unbalanced parentheses")]
    UnbalancedParentheses,

    #[error("Bad expression: {reason}")]
    MalformedExpression { reason: String },

    #[error("Expression nests deeper than {limit} levels")]
    TooDeep { limit: usize },

    #[error("Literal '{literal}' does not fit in a machine word")]
    LiteralOverflow { literal: String },

    // Runtime errors
    #[error("Division by zero")]
    DivisionByZero,

    #[error(transparent)]
    Machine(#[from] MachineError),
}

impl EvalError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        EvalError::MalformedExpression {
            reason: reason.into(),
        }
    }
}

fn caret(position: &usize) -> String {
    format!("{:>width$}", "^", width = position + 1)
}
