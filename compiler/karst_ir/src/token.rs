//! Token types produced by the lexer.
//!
//! The lexer itself lives outside this workspace; these types are the
//! contract through which source positions flow from raw text into
//! diagnostics.

use std::fmt;

use crate::Span;

/// The kind of a lexed token.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenKind {
    // Punctuation and operators
    Ampersand,
    AmpersandAmpersand,
    Arrow,
    Bang,
    BangEqual,
    Bar,
    BarBar,
    Colon,
    ColonEqual,
    Comma,
    Dot,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    LeftBrace,
    LeftBracket,
    LeftParen,
    Less,
    LessEqual,
    Minus,
    Percent,
    Plus,
    RightBrace,
    RightBracket,
    RightParen,
    Semicolon,
    Slash,
    Star,

    // Literals
    Character,
    Float64,
    Int32,
    Int64,
    Uint64,
    String,
    Identifier,

    // Keywords
    KwArena,
    KwAssert,
    KwBool,
    KwBreak,
    KwChar,
    KwConst,
    KwContinue,
    KwDefault,
    KwDelete,
    KwElse,
    KwF64,
    KwFalse,
    KwFn,
    KwFor,
    KwI32,
    KwI64,
    KwIf,
    KwImport,
    KwIn,
    KwLet,
    KwLoop,
    KwNew,
    KwNull,
    KwNullptr,
    KwReturn,
    KwSizeof,
    KwStruct,
    KwTrue,
    KwTypeof,
    KwU64,
    KwWhile,

    Eof,
}

impl TokenKind {
    /// Human-readable token description for diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Ampersand => "&",
            TokenKind::AmpersandAmpersand => "&&",
            TokenKind::Arrow => "->",
            TokenKind::Bang => "!",
            TokenKind::BangEqual => "!=",
            TokenKind::Bar => "|",
            TokenKind::BarBar => "||",
            TokenKind::Colon => ":",
            TokenKind::ColonEqual => ":=",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::Equal => "=",
            TokenKind::EqualEqual => "==",
            TokenKind::Greater => ">",
            TokenKind::GreaterEqual => ">=",
            TokenKind::LeftBrace => "{",
            TokenKind::LeftBracket => "[",
            TokenKind::LeftParen => "(",
            TokenKind::Less => "<",
            TokenKind::LessEqual => "<=",
            TokenKind::Minus => "-",
            TokenKind::Percent => "%",
            TokenKind::Plus => "+",
            TokenKind::RightBrace => "}",
            TokenKind::RightBracket => "]",
            TokenKind::RightParen => ")",
            TokenKind::Semicolon => ";",
            TokenKind::Slash => "/",
            TokenKind::Star => "*",
            TokenKind::Character => "character literal",
            TokenKind::Float64 => "f64 literal",
            TokenKind::Int32 => "i32 literal",
            TokenKind::Int64 => "i64 literal",
            TokenKind::Uint64 => "u64 literal",
            TokenKind::String => "string literal",
            TokenKind::Identifier => "identifier",
            TokenKind::KwArena => "arena",
            TokenKind::KwAssert => "assert",
            TokenKind::KwBool => "bool",
            TokenKind::KwBreak => "break",
            TokenKind::KwChar => "char",
            TokenKind::KwConst => "const",
            TokenKind::KwContinue => "continue",
            TokenKind::KwDefault => "default",
            TokenKind::KwDelete => "delete",
            TokenKind::KwElse => "else",
            TokenKind::KwF64 => "f64",
            TokenKind::KwFalse => "false",
            TokenKind::KwFn => "fn",
            TokenKind::KwFor => "for",
            TokenKind::KwI32 => "i32",
            TokenKind::KwI64 => "i64",
            TokenKind::KwIf => "if",
            TokenKind::KwImport => "import",
            TokenKind::KwIn => "in",
            TokenKind::KwLet => "let",
            TokenKind::KwLoop => "loop",
            TokenKind::KwNew => "new",
            TokenKind::KwNull => "null",
            TokenKind::KwNullptr => "nullptr",
            TokenKind::KwReturn => "return",
            TokenKind::KwSizeof => "sizeof",
            TokenKind::KwStruct => "struct",
            TokenKind::KwTrue => "true",
            TokenKind::KwTypeof => "typeof",
            TokenKind::KwU64 => "u64",
            TokenKind::KwWhile => "while",
            TokenKind::Eof => "end of file",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A lexed token: its kind plus where it came from.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    /// Create a new token.
    #[inline]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_surface_syntax() {
        assert_eq!(TokenKind::ColonEqual.to_string(), ":=");
        assert_eq!(TokenKind::KwSizeof.to_string(), "sizeof");
        assert_eq!(TokenKind::Identifier.to_string(), "identifier");
    }

    #[test]
    fn token_carries_span() {
        let tok = Token::new(TokenKind::KwStruct, Span::new(0, 6));
        assert_eq!(tok.span.len(), 6);
    }
}
