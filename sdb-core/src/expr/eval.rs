//! Expression evaluator
//!
//! Evaluates token sequences by recursive splitting: a parenthesized range
//! evaluates its interior, otherwise the range is split at its loosest
//! binary operator and both halves are evaluated.
//!
//! Recursion is bounded by [`MAX_NESTING`] so input size never turns into
//! stack depth.

use super::error::EvalError;
use super::lexer::Lexer;
use super::token::{Token, TokenKind};
use crate::config::LexerLimits;
use crate::machine::{MachineAccess, Word};

/// Deepest recursion the evaluator allows for one expression
pub const MAX_NESTING: usize = 1024;

/// Expression evaluator over a machine state
pub struct Evaluator<M> {
    machine: M,
    lexer: Lexer,
}

impl<M: MachineAccess> Evaluator<M> {
    pub fn new(machine: M) -> Self {
        Self {
            machine,
            lexer: Lexer::default(),
        }
    }

    pub fn with_limits(machine: M, limits: LexerLimits) -> Self {
        Self {
            machine,
            lexer: Lexer::new(limits),
        }
    }

    /// Tokenize and evaluate `source`
    pub fn evaluate(&self, source: &str) -> Result<Word, EvalError> {
        let tokens = self.lexer.tokenize(source)?;
        let value = self.eval_tokens(&tokens)?;
        log::debug!("evaluate({:?}) = {}", source, value);
        Ok(value)
    }

    /// Evaluate a full token sequence
    pub fn eval_tokens(&self, tokens: &[Token]) -> Result<Word, EvalError> {
        if tokens.is_empty() {
            return Err(EvalError::EmptyExpression);
        }
        check_balanced(tokens)?;
        self.eval_range(tokens, 0)
    }

    fn eval_range(&self, tokens: &[Token], depth: usize) -> Result<Word, EvalError> {
        if depth >= MAX_NESTING {
            return Err(EvalError::TooDeep { limit: MAX_NESTING });
        }
        let depth = depth + 1;

        match tokens {
            [] => Err(EvalError::malformed("missing operand")),
            [token] => self.eval_operand(token),
            _ if is_wrapped_in_parens(tokens) => {
                self.eval_range(&tokens[1..tokens.len() - 1], depth)
            }
            _ => match split_point(tokens) {
                Some(op) => {
                    let left = self.eval_range(&tokens[..op], depth)?;
                    let right = self.eval_range(&tokens[op + 1..], depth)?;
                    apply_binary(tokens[op].kind, left, right)
                }
                None if tokens[0].kind.is_prefix() => {
                    let operand = self.eval_range(&tokens[1..], depth)?;
                    self.apply_prefix(tokens[0].kind, operand)
                }
                None => Err(EvalError::malformed(format!(
                    "no operator joins '{}' at position {}",
                    tokens[0].text, tokens[0].position
                ))),
            },
        }
    }

    fn eval_operand(&self, token: &Token) -> Result<Word, EvalError> {
        let overflow = || EvalError::LiteralOverflow {
            literal: token.text.clone(),
        };

        match token.kind {
            TokenKind::Decimal => Word::from_str_radix(&token.text, 10).map_err(|_| overflow()),
            TokenKind::Hex => Word::from_str_radix(&token.text, 16).map_err(|_| overflow()),
            TokenKind::Register => Ok(self.machine.register(&token.text)?),
            other => Err(EvalError::malformed(format!(
                "expected an operand, found '{}' at position {}",
                other.as_str(),
                token.position
            ))),
        }
    }

    fn apply_prefix(&self, kind: TokenKind, operand: Word) -> Result<Word, EvalError> {
        match kind {
            TokenKind::Neg => Ok(operand.wrapping_neg()),
            TokenKind::Deref => Ok(self.machine.read_word(operand)?),
            other => Err(EvalError::malformed(format!(
                "'{}' is not a prefix operator",
                other.as_str()
            ))),
        }
    }
}

/// Evaluate `source` against `machine` with default limits
pub fn evaluate<M: MachineAccess + ?Sized>(source: &str, machine: &M) -> Result<Word, EvalError> {
    Evaluator::new(machine).evaluate(source)
}

fn apply_binary(kind: TokenKind, left: Word, right: Word) -> Result<Word, EvalError> {
    match kind {
        TokenKind::Plus => Ok(left.wrapping_add(right)),
        TokenKind::Minus => Ok(left.wrapping_sub(right)),
        TokenKind::Star => Ok(left.wrapping_mul(right)),
        TokenKind::Slash => left.checked_div(right).ok_or(EvalError::DivisionByZero),
        TokenKind::Eq => Ok(Word::from(left == right)),
        other => Err(EvalError::malformed(format!(
            "'{}' is not a binary operator",
            other.as_str()
        ))),
    }
}

/// Running paren depth never drops below zero and ends at zero
fn check_balanced(tokens: &[Token]) -> Result<(), EvalError> {
    let mut depth: i32 = 0;
    for token in tokens {
        match token.kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => depth -= 1,
            _ => {}
        }
        if depth < 0 {
            return Err(EvalError::UnbalancedParentheses);
        }
    }
    if depth != 0 {
        return Err(EvalError::UnbalancedParentheses);
    }
    Ok(())
}

/// Whether the first and last token are one matching pair of parentheses.
///
/// `(1)+(2)` starts and ends with parentheses but is not wrapped: the depth
/// returns to zero before the last token.
fn is_wrapped_in_parens(tokens: &[Token]) -> bool {
    let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
        return false;
    };
    if first.kind != TokenKind::LParen || last.kind != TokenKind::RParen {
        return false;
    }

    let last_index = tokens.len() - 1;
    let mut depth: i32 = 0;
    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => depth -= 1,
            _ => {}
        }
        if depth < 0 || (depth == 0 && i < last_index) {
            return false;
        }
    }
    depth == 0
}

/// Index of the operator to split on.
///
/// The leftmost operator at the lowest precedence level outside any
/// parentheses. Ties keep the earlier operator, so `8-3-2` splits at the
/// first minus and evaluates as `8-(3-2)`.
fn split_point(tokens: &[Token]) -> Option<usize> {
    let mut depth: i32 = 0;
    let mut best: Option<(usize, u8)> = None;

    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => depth -= 1,
            kind if depth == 0 => {
                if let Some(level) = kind.binary_precedence() {
                    if best.map_or(true, |(_, lowest)| level < lowest) {
                        best = Some((i, level));
                    }
                }
            }
            _ => {}
        }
    }

    best.map(|(i, _)| i)
}
