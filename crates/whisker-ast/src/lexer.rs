//! Hand-written lexer for Whisker templates.
//!
//! Alternates between two modes:
//! - Text mode: emits text runs until the active open delimiter
//! - Tag mode: reads the sigil, the tag value and the close delimiter
//!
//! Text is emitted as separate whitespace and non-whitespace runs, each
//! whitespace run ending at most at one newline. When a line holds only
//! whitespace and block tags (sections, partials, delimiter changes,
//! comments), its whitespace runs are dropped so the tags leave no blank
//! line behind.

use crate::token::{Token, TokenType};
use crate::{Delimiters, Location, ParseError, Span};

/// Tokenize a source string into a flat sequence of tokens.
pub fn tokenize(source: &str, delimiters: &Delimiters) -> Result<Vec<Token>, ParseError> {
    Lexer::new(source, delimiters.clone()).tokenize()
}

struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    delimiters: Delimiters,
    /// Emitted tokens; `None` marks whitespace removed by standalone stripping.
    tokens: Vec<Option<Token>>,
    /// Indices of whitespace text tokens on the current line.
    spaces: Vec<usize>,
    /// Whether the current line has a tag.
    has_tag: bool,
    /// Whether the current line has non-whitespace content.
    non_space: bool,
    /// Open sections with the offset of their opening tag.
    sections: Vec<(String, usize)>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str, delimiters: Delimiters) -> Self {
        Self {
            source,
            pos: 0,
            delimiters,
            tokens: Vec::new(),
            spaces: Vec::new(),
            has_tag: false,
            non_space: false,
            sections: Vec::new(),
        }
    }

    fn tokenize(mut self) -> Result<Vec<Token>, ParseError> {
        while self.pos < self.source.len() {
            self.tokenize_text();
            if self.pos >= self.source.len() {
                break;
            }
            self.tokenize_tag()?;
        }

        if let Some((name, _)) = self.sections.pop() {
            return Err(ParseError::UnclosedSection {
                name,
                location: self.location(self.pos),
            });
        }

        Ok(self.tokens.into_iter().flatten().collect())
    }

    /// Emit text runs up to the next open delimiter or end of input.
    fn tokenize_text(&mut self) {
        let rest = &self.source[self.pos..];
        let text_len = rest.find(self.delimiters.open()).unwrap_or(rest.len());
        let text_end = self.pos + text_len;

        while self.pos < text_end {
            let run = &self.source[self.pos..text_end];
            let Some(first) = run.chars().next() else {
                break;
            };

            let run_len = if first.is_whitespace() {
                whitespace_run_len(run)
            } else {
                run.find(char::is_whitespace).unwrap_or(run.len())
            };
            let value = &run[..run_len];

            if first.is_whitespace() {
                self.spaces.push(self.tokens.len());
            } else {
                self.non_space = true;
            }
            let span = Span::new(self.pos, self.pos + run_len);
            self.tokens.push(Some(Token::new(TokenType::Text, value, span)));
            self.pos += run_len;

            if value.ends_with('\n') {
                self.strip_space();
            }
        }
    }

    /// Read one tag starting at the open delimiter.
    fn tokenize_tag(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        let close = self.delimiters.close().to_string();

        self.pos += self.delimiters.open().len();
        self.skip_whitespace();
        self.has_tag = true;

        let sigil = self.current_char();
        let token_type = sigil
            .and_then(TokenType::from_sigil)
            .unwrap_or(TokenType::Name);
        if token_type != TokenType::Name {
            self.pos += 1;
        }
        self.skip_whitespace();

        let value = match sigil {
            Some('=') => {
                let value = self.scan_until("=");
                self.consume("=");
                value
            }
            Some('{') => {
                let value = self.scan_until(&format!("}}{close}"));
                self.consume("}");
                value
            }
            _ => self.scan_until(&close),
        };

        // Anything between the value terminator and the close delimiter is
        // discarded, as in `{{=<% %>= junk}}`.
        self.scan_until(&close);
        if !self.consume(&close) {
            return Err(ParseError::UnclosedTag {
                location: self.location(start),
            });
        }

        let span = Span::new(start, self.pos);
        self.handle_tag(token_type, &value, start)?;
        self.tokens.push(Some(Token::new(token_type, value, span)));
        Ok(())
    }

    fn handle_tag(
        &mut self,
        token_type: TokenType,
        value: &str,
        start: usize,
    ) -> Result<(), ParseError> {
        match token_type {
            TokenType::Section | TokenType::Inverted => {
                self.sections.push((value.to_string(), start));
            }
            TokenType::Close => match self.sections.pop() {
                None => {
                    return Err(ParseError::UnopenedSection {
                        name: value.to_string(),
                        location: self.location(start),
                    })
                }
                Some((open, _)) if open != value => {
                    return Err(ParseError::MismatchedSection {
                        open,
                        close: value.to_string(),
                        location: self.location(start),
                    })
                }
                Some(_) => {}
            },
            TokenType::Delimiters => {
                self.delimiters = value.parse().map_err(|_| ParseError::InvalidDelimiters {
                    value: value.to_string(),
                    location: self.location(start),
                })?;
            }
            _ => {}
        }

        if !token_type.is_block_tag() {
            self.non_space = true;
        }
        Ok(())
    }

    /// Drop the current line's whitespace if the line was standalone, then
    /// reset line state.
    fn strip_space(&mut self) {
        if self.has_tag && !self.non_space {
            for index in self.spaces.drain(..) {
                self.tokens[index] = None;
            }
        } else {
            self.spaces.clear();
        }
        self.has_tag = false;
        self.non_space = false;
    }

    /// Advance to the next occurrence of `pattern` (or end of input) and
    /// return the skipped text without trailing whitespace.
    fn scan_until(&mut self, pattern: &str) -> String {
        let rest = &self.source[self.pos..];
        let len = rest.find(pattern).unwrap_or(rest.len());
        self.pos += len;
        rest[..len].trim_end().to_string()
    }

    fn consume(&mut self, expected: &str) -> bool {
        if self.source[self.pos..].starts_with(expected) {
            self.pos += expected.len();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.source[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn current_char(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn location(&self, offset: usize) -> Location {
        Location::from_offset(self.source, offset)
    }
}

/// Length of the leading whitespace run of `text`, ending after the first
/// newline if one occurs inside the run.
fn whitespace_run_len(text: &str) -> usize {
    let mut len = 0;
    for c in text.chars() {
        if !c.is_whitespace() {
            break;
        }
        len += c.len_utf8();
        if c == '\n' {
            break;
        }
    }
    len
}
