//! Flat token types produced by the Whisker lexer.

use crate::Span;

/// Token types produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    /// Raw text content outside tags.
    Text,
    /// `{{name}}` - escaped interpolation
    Name,
    /// `{{{name}}}` or `{{&name}}` - raw interpolation
    Raw,
    /// `#` - section open
    Section,
    /// `^` - inverted section open
    Inverted,
    /// `/` - section close
    Close,
    /// `>` - partial reference
    Partial,
    /// `=` - delimiter change
    Delimiters,
    /// `!` - comment
    Comment,
}

impl TokenType {
    /// Map the sigil following an open delimiter to its token type.
    pub fn from_sigil(sigil: char) -> Option<Self> {
        match sigil {
            '#' => Some(TokenType::Section),
            '^' => Some(TokenType::Inverted),
            '/' => Some(TokenType::Close),
            '>' => Some(TokenType::Partial),
            '&' | '{' => Some(TokenType::Raw),
            '=' => Some(TokenType::Delimiters),
            '!' => Some(TokenType::Comment),
            _ => None,
        }
    }

    /// Tags of these types do not count as line content for standalone
    /// detection.
    pub fn is_block_tag(self) -> bool {
        !matches!(self, TokenType::Text | TokenType::Name | TokenType::Raw)
    }
}

/// A token with its type, value, and source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub value: String,
    pub span: Span,
}

impl Token {
    pub fn new(token_type: TokenType, value: impl Into<String>, span: Span) -> Self {
        Self {
            token_type,
            value: value.into(),
            span,
        }
    }
}
