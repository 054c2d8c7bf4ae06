//! Token processor that coalesces adjacent text tokens.
//!
//! The lexer emits text as whitespace and non-whitespace runs so that
//! standalone lines can be stripped run by run; once stripping is done the
//! runs are merged back into one text token per gap between tags.

use crate::token::{Token, TokenType};

/// Merge consecutive text tokens into one.
pub fn process(tokens: Vec<Token>) -> Vec<Token> {
    let mut result: Vec<Token> = Vec::with_capacity(tokens.len());

    for token in tokens {
        if token.token_type == TokenType::Text {
            if let Some(last) = result.last_mut() {
                if last.token_type == TokenType::Text {
                    last.value.push_str(&token.value);
                    last.span.end = token.span.end;
                    continue;
                }
            }
        }
        result.push(token);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Span;
    use pretty_assertions::assert_eq;

    fn text_token(value: &str, start: usize) -> Token {
        Token::new(TokenType::Text, value, Span::new(start, start + value.len()))
    }

    fn tag_token(tt: TokenType, value: &str, start: usize, end: usize) -> Token {
        Token::new(tt, value, Span::new(start, end))
    }

    #[test]
    fn test_adjacent_text_merged() {
        let tokens = vec![
            text_token("hello", 0),
            text_token(" ", 5),
            text_token("world", 6),
        ];
        let result = process(tokens);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].value, "hello world");
        assert_eq!(result[0].span, Span::new(0, 11));
    }

    #[test]
    fn test_tags_separate_text() {
        let tokens = vec![
            text_token("a", 0),
            tag_token(TokenType::Name, "x", 1, 6),
            text_token("b", 6),
            text_token("c", 7),
        ];
        let result = process(tokens);
        let values: Vec<&str> = result.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, vec!["a", "x", "bc"]);
    }

    #[test]
    fn test_empty_stream() {
        assert!(process(Vec::new()).is_empty());
    }
}
