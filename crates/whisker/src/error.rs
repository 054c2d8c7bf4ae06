//! Error types for the Whisker template engine.

use thiserror::Error;

pub use whisker_ast::{Location, ParseError};

/// All errors that can occur while parsing or rendering
#[derive(Error, Debug)]
pub enum WhiskerError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error(
        "Invalid template! Template should be a \"string\" but \"{found}\" was given as the template to render"
    )]
    TemplateType { found: String },

    #[error("Cannot use higher-order section '{section}' without the original template")]
    MissingSourceTemplate { section: String },

    #[error("Partial '{name}' exceeds the maximum nesting depth of {depth}")]
    PartialDepthExceeded { name: String, depth: usize },

    #[error("Lambda error: {message}")]
    Lambda { message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WhiskerError {
    /// Build an error from inside a section lambda.
    pub fn lambda(message: impl Into<String>) -> Self {
        WhiskerError::Lambda {
            message: message.into(),
        }
    }

    /// Short, stable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            WhiskerError::Parse(_) => "ParseError",
            WhiskerError::TemplateType { .. } => "TemplateTypeError",
            WhiskerError::MissingSourceTemplate { .. } => "MissingSourceTemplate",
            WhiskerError::PartialDepthExceeded { .. } => "PartialDepthExceeded",
            WhiskerError::Lambda { .. } => "LambdaError",
            WhiskerError::Json(_) => "JsonError",
        }
    }

    /// Source location, for errors raised while parsing.
    pub fn location(&self) -> Option<Location> {
        match self {
            WhiskerError::Parse(e) => Some(e.location()),
            _ => None,
        }
    }
}

/// Result type alias for Whisker operations
pub type Result<T> = std::result::Result<T, WhiskerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_error_carries_location() {
        let err: WhiskerError = ParseError::UnclosedTag {
            location: Location::new(2, 3, 9),
        }
        .into();
        assert_eq!(err.kind(), "ParseError");
        assert_eq!(err.location(), Some(Location::new(2, 3, 9)));
        assert_eq!(err.to_string(), "Parse error: unclosed tag at line 2, column 3");
    }

    #[test]
    fn test_template_type_message() {
        let err = WhiskerError::TemplateType {
            found: "number".to_string(),
        };
        assert!(err.to_string().contains("\"number\""));
        assert_eq!(err.location(), None);
    }
}
