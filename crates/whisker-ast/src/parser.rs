//! Recursive descent parser that nests the flat token stream.
//!
//! Tokens between a section open and its matching close become the
//! section's children. The lexer already rejects unbalanced sections; the
//! checks here keep the tree builder total on any token stream.

use std::vec::IntoIter;

use crate::token::{Token, TokenType};
use crate::{
    CommentNode, DelimitersNode, Location, Node, ParseError, PartialNode, SectionNode, TextNode,
    VariableNode,
};

/// Nest a processed token stream into a tree of nodes.
pub fn parse(source: &str, tokens: Vec<Token>) -> Result<Vec<Node>, ParseError> {
    let mut parser = Parser::new(source, tokens);
    let (nodes, close) = parser.parse_nodes()?;
    match close {
        Some(token) => Err(ParseError::UnopenedSection {
            name: token.value,
            location: parser.location(token.span.start),
        }),
        None => Ok(nodes),
    }
}

struct Parser<'a> {
    source: &'a str,
    tokens: IntoIter<Token>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            source,
            tokens: tokens.into_iter(),
        }
    }

    /// Parse nodes until a close token or end of input, returning the close
    /// token that stopped the scan.
    fn parse_nodes(&mut self) -> Result<(Vec<Node>, Option<Token>), ParseError> {
        let mut nodes = Vec::new();

        while let Some(token) = self.tokens.next() {
            let span = token.span;
            let node = match token.token_type {
                TokenType::Close => return Ok((nodes, Some(token))),
                TokenType::Text => Node::Text(TextNode {
                    content: token.value,
                    span,
                }),
                TokenType::Name => Node::Variable(VariableNode {
                    name: token.value,
                    span,
                }),
                TokenType::Raw => Node::Unescaped(VariableNode {
                    name: token.value,
                    span,
                }),
                TokenType::Section => Node::Section(self.parse_section(token)?),
                TokenType::Inverted => Node::Inverted(self.parse_section(token)?),
                TokenType::Partial => Node::Partial(PartialNode {
                    name: token.value,
                    span,
                }),
                TokenType::Delimiters => {
                    let delimiters =
                        token
                            .value
                            .parse()
                            .map_err(|_| ParseError::InvalidDelimiters {
                                value: token.value.clone(),
                                location: self.location(span.start),
                            })?;
                    Node::Delimiters(DelimitersNode { delimiters, span })
                }
                TokenType::Comment => Node::Comment(CommentNode {
                    content: token.value,
                    span,
                }),
            };
            nodes.push(node);
        }

        Ok((nodes, None))
    }

    fn parse_section(&mut self, open: Token) -> Result<SectionNode, ParseError> {
        let (children, close) = self.parse_nodes()?;
        let close = close.ok_or_else(|| ParseError::UnclosedSection {
            name: open.value.clone(),
            location: self.location(self.source.len()),
        })?;

        if close.value != open.value {
            return Err(ParseError::MismatchedSection {
                open: open.value,
                close: close.value,
                location: self.location(close.span.start),
            });
        }

        Ok(SectionNode {
            name: open.value,
            children,
            span: open.span,
            body_end: close.span.start,
        })
    }

    fn location(&self, offset: usize) -> Location {
        Location::from_offset(self.source, offset)
    }
}
