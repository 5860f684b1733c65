//! Rule-table tokenizer
//!
//! Rules are tried in declaration order at the current offset and the first
//! one that matches wins, so the table order decides between overlapping
//! patterns: `==` sits before `-`, hex before decimal.

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::EvalError;
use super::token::{Token, TokenKind};
use crate::config::LexerLimits;

struct Rule {
    pattern: &'static str,
    kind: TokenKind,
}

const RULES: &[Rule] = &[
    Rule { pattern: " +", kind: TokenKind::Whitespace },
    Rule { pattern: r"\+", kind: TokenKind::Plus },
    Rule { pattern: "==", kind: TokenKind::Eq },
    Rule { pattern: "-", kind: TokenKind::Minus },
    Rule { pattern: r"\*", kind: TokenKind::Star },
    Rule { pattern: "/", kind: TokenKind::Slash },
    Rule { pattern: r"\(", kind: TokenKind::LParen },
    Rule { pattern: r"\)", kind: TokenKind::RParen },
    Rule { pattern: "0x[0-9A-Fa-f]+", kind: TokenKind::Hex },
    Rule { pattern: "[0-9]+", kind: TokenKind::Decimal },
    Rule { pattern: r"\$[0-9a-z]+", kind: TokenKind::Register },
];

/// Rules compiled once, anchored at the start of the remaining input
static COMPILED: Lazy<Vec<Regex>> = Lazy::new(|| {
    RULES
        .iter()
        .map(|rule| {
            Regex::new(&format!("^(?:{})", rule.pattern))
                .unwrap_or_else(|e| panic!("lexer rule {:?} failed to compile: {}", rule.pattern, e))
        })
        .collect()
});

/// Reclassify `-` and `*` that cannot be binary operators.
///
/// A minus or star is a prefix operator when it is the first token or the
/// token before it cannot end an operand. The lexeme picks the operator:
/// `-` negates, `*` dereferences.
pub fn prefix_operator(kind: TokenKind, previous: Option<&Token>) -> TokenKind {
    let in_prefix_position = previous.map_or(true, |prev| !prev.kind.ends_operand());
    match kind {
        TokenKind::Minus if in_prefix_position => TokenKind::Neg,
        TokenKind::Star if in_prefix_position => TokenKind::Deref,
        other => other,
    }
}

/// Strip the `0x` / `$` prefix from literal and register lexemes
fn payload(kind: TokenKind, lexeme: &str) -> &str {
    match kind {
        TokenKind::Hex => &lexeme[2..],
        TokenKind::Register => &lexeme[1..],
        _ => lexeme,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Lexer {
    limits: LexerLimits,
}

impl Lexer {
    pub fn new(limits: LexerLimits) -> Self {
        Self { limits }
    }

    /// Split `input` into tokens, dropping whitespace
    pub fn tokenize(&self, input: &str) -> Result<Vec<Token>, EvalError> {
        let mut tokens: Vec<Token> = Vec::new();
        let mut position = 0;

        while position < input.len() {
            let rest = &input[position..];
            let (index, len) = COMPILED
                .iter()
                .enumerate()
                .find_map(|(i, re)| re.find(rest).map(|m| (i, m.end())))
                .ok_or_else(|| EvalError::Lex {
                    position,
                    input: input.to_string(),
                })?;

            let rule = &RULES[index];
            let lexeme = &rest[..len];
            log::trace!(
                "match rules[{}] = \"{}\" at position {} with len {}: {}",
                index,
                rule.pattern,
                position,
                len,
                lexeme
            );

            let start = position;
            position += len;

            if rule.kind == TokenKind::Whitespace {
                continue;
            }
            if tokens.len() >= self.limits.max_tokens {
                return Err(EvalError::TooManyTokens {
                    limit: self.limits.max_tokens,
                });
            }

            let text = payload(rule.kind, lexeme);
            if text.len() > self.limits.max_token_len {
                return Err(EvalError::TokenTooLong {
                    text: text.to_string(),
                    limit: self.limits.max_token_len,
                });
            }

            let kind = prefix_operator(rule.kind, tokens.last());
            tokens.push(Token::new(kind, text, start));
        }

        Ok(tokens)
    }
}

/// Tokenize with default limits
pub fn tokenize(input: &str) -> Result<Vec<Token>, EvalError> {
    Lexer::default().tokenize(input)
}
