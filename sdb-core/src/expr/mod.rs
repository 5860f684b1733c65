//! Expression evaluation module
//!
//! Tokenizes and evaluates debugger expressions: decimal and hex literals,
//! `$register` references, `+ - * / ==`, parentheses, prefix `-` and `*`.

pub mod error;
pub mod eval;
pub mod lexer;
pub mod token;

pub use error::EvalError;
pub use eval::{evaluate, Evaluator, MAX_NESTING};
pub use lexer::{tokenize, Lexer};
pub use token::{Token, TokenKind};
