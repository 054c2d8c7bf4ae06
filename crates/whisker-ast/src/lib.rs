//! Tokenizer and section-tree parser for Whisker templates.
//!
//! Parsing runs in three passes:
//! - [`lexer`] scans the source under the active delimiter pair, validates
//!   section nesting and strips standalone tag lines
//! - [`token_processor`] coalesces adjacent text tokens
//! - [`parser`] nests the flat stream into a tree of [`Node`]s
//!
//! # Example
//!
//! ```rust
//! use whisker_ast::{parse, Delimiters, Node};
//!
//! let nodes = parse("Hello, {{name}}!", &Delimiters::default()).unwrap();
//! assert_eq!(nodes.len(), 3);
//! assert!(matches!(&nodes[1], Node::Variable(v) if v.name == "name"));
//! ```

pub mod lexer;
pub mod parser;
pub mod token;
pub mod token_processor;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

// ============================================================================
// Location
// ============================================================================

/// Location in source code (1-indexed line and column, 0-indexed byte offset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub line: usize,
    pub column: usize,
    pub byte_offset: usize,
}

impl Location {
    pub fn new(line: usize, column: usize, byte_offset: usize) -> Self {
        Self {
            line,
            column,
            byte_offset,
        }
    }

    /// Compute the line and column of `offset` within `source`.
    ///
    /// Offsets past the end of `source` are clamped to its length.
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let mut offset = offset.min(source.len());
        while !source.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |p| p + 1);
        let column = before[line_start..].chars().count() + 1;
        Self::new(line, column, offset)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Byte range of a token in the template source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

// ============================================================================
// Delimiters
// ============================================================================

/// The open/close tag markers in effect while scanning.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Delimiters {
    open: String,
    close: String,
}

impl Delimiters {
    /// Create a delimiter pair, rejecting empty markers and markers that
    /// contain whitespace.
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Result<Self, DelimiterError> {
        let open = open.into();
        let close = close.into();
        if !is_valid_marker(&open) || !is_valid_marker(&close) {
            return Err(DelimiterError {
                value: format!("{open} {close}"),
            });
        }
        Ok(Self { open, close })
    }

    pub fn open(&self) -> &str {
        &self.open
    }

    pub fn close(&self) -> &str {
        &self.close
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            open: "{{".to_string(),
            close: "}}".to_string(),
        }
    }
}

impl FromStr for Delimiters {
    type Err = DelimiterError;

    /// Parse a whitespace-separated pair such as `"<% %>"`.
    ///
    /// Anything other than exactly two markers is an error; a third word is
    /// not silently dropped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = s.split_whitespace().collect();
        match words.as_slice() {
            [open, close] => Self::new(*open, *close),
            _ => Err(DelimiterError {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Delimiters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.open, self.close)
    }
}

fn is_valid_marker(marker: &str) -> bool {
    !marker.is_empty() && !marker.chars().any(char::is_whitespace)
}

/// A delimiter pair that is not exactly two non-empty markers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid delimiters '{value}': expected two whitespace-separated markers")]
pub struct DelimiterError {
    pub value: String,
}

// ============================================================================
// Tree Nodes
// ============================================================================

/// A node of the parsed template tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(TextNode),
    /// `{{name}}`, HTML-escaped on output.
    Variable(VariableNode),
    /// `{{{name}}}` or `{{& name}}`, emitted verbatim.
    Unescaped(VariableNode),
    /// `{{#name}} ... {{/name}}`
    Section(SectionNode),
    /// `{{^name}} ... {{/name}}`
    Inverted(SectionNode),
    /// `{{> name}}`
    Partial(PartialNode),
    /// `{{=<% %>=}}`; consumed while scanning, renders nothing.
    Delimiters(DelimitersNode),
    /// `{{! ... }}`; renders nothing.
    Comment(CommentNode),
}

impl Node {
    pub fn span(&self) -> Span {
        match self {
            Node::Text(n) => n.span,
            Node::Variable(n) | Node::Unescaped(n) => n.span,
            Node::Section(n) | Node::Inverted(n) => n.span,
            Node::Partial(n) => n.span,
            Node::Delimiters(n) => n.span,
            Node::Comment(n) => n.span,
        }
    }
}

/// Raw text content.
#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub content: String,
    pub span: Span,
}

/// An interpolated name, possibly dotted (`user.name`) or the implicit
/// iterator (`.`).
#[derive(Debug, Clone, PartialEq)]
pub struct VariableNode {
    pub name: String,
    pub span: Span,
}

/// A section or inverted section with its nested children.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionNode {
    pub name: String,
    pub children: Vec<Node>,
    /// Span of the opening tag.
    pub span: Span,
    /// Offset where the matching close tag begins.
    pub body_end: usize,
}

impl SectionNode {
    /// The unparsed source text between the opening and closing tags.
    pub fn body<'s>(&self, source: &'s str) -> Option<&'s str> {
        source.get(self.span.end..self.body_end)
    }
}

/// Reference to a partial, resolved at render time.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialNode {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DelimitersNode {
    pub delimiters: Delimiters,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentNode {
    pub content: String,
    pub span: Span,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unclosed tag at {location}")]
    UnclosedTag { location: Location },

    #[error("unopened section '{name}' at {location}")]
    UnopenedSection { name: String, location: Location },

    #[error("unclosed section '{open}' at {location}: found close tag for '{close}'")]
    MismatchedSection {
        open: String,
        close: String,
        location: Location,
    },

    #[error("unclosed section '{name}' at {location}")]
    UnclosedSection { name: String, location: Location },

    #[error("invalid delimiters '{value}' at {location}")]
    InvalidDelimiters { value: String, location: Location },
}

impl ParseError {
    pub fn location(&self) -> Location {
        match self {
            ParseError::UnclosedTag { location }
            | ParseError::UnopenedSection { location, .. }
            | ParseError::MismatchedSection { location, .. }
            | ParseError::UnclosedSection { location, .. }
            | ParseError::InvalidDelimiters { location, .. } => *location,
        }
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse a template source string into a tree of nodes.
///
/// `delimiters` is the pair in effect at the start of the template; a
/// `{{=<% %>=}}` tag switches it for everything that follows.
pub fn parse(source: &str, delimiters: &Delimiters) -> Result<Vec<Node>, ParseError> {
    if source.is_empty() {
        return Ok(Vec::new());
    }
    let tokens = lexer::tokenize(source, delimiters)?;
    let tokens = token_processor::process(tokens);
    parser::parse(source, tokens)
}

// ============================================================================
// Tests
// ============================================================================
