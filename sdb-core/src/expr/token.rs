//! Token definitions

/// Token classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Spaces, recognized and dropped
    Whitespace,

    // Binary operators
    Plus,  // +
    Minus, // -
    Star,  // *
    Slash, // /
    Eq,    // ==

    LParen, // (
    RParen, // )

    // Operands
    Decimal,  // 42
    Hex,      // 0x2a
    Register, // $a0

    // Prefix operators
    Neg,   // -x
    Deref, // *x
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Whitespace => "whitespace",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Eq => "==",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Decimal => "decimal",
            TokenKind::Hex => "hex",
            TokenKind::Register => "register",
            TokenKind::Neg => "neg",
            TokenKind::Deref => "deref",
        }
    }

    /// Precedence level when used as a binary operator. Lower binds looser.
    pub fn binary_precedence(&self) -> Option<u8> {
        match self {
            TokenKind::Eq => Some(0),
            TokenKind::Plus | TokenKind::Minus => Some(1),
            TokenKind::Star | TokenKind::Slash => Some(2),
            _ => None,
        }
    }

    /// Whether a token of this kind can be the last token of an operand
    pub fn ends_operand(&self) -> bool {
        matches!(
            self,
            TokenKind::RParen | TokenKind::Decimal | TokenKind::Hex | TokenKind::Register
        )
    }

    pub fn is_prefix(&self) -> bool {
        matches!(self, TokenKind::Neg | TokenKind::Deref)
    }
}

/// A classified lexical unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Digits for literals, name for registers, lexeme otherwise
    pub text: String,
    /// Byte offset in the source
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }
}
