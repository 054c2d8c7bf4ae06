use std::fmt;
use std::sync::Arc;

/// Escape HTML special characters: & < > " ' / ` =
pub fn escape(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#39;"),
            '/' => output.push_str("&#x2F;"),
            '`' => output.push_str("&#x60;"),
            '=' => output.push_str("&#x3D;"),
            _ => output.push(c),
        }
    }
    output
}

/// Escape policy applied to `{{name}}` interpolations.
#[derive(Clone, Default)]
pub enum Escape {
    #[default]
    Html,
    /// Emit values verbatim.
    None,
    Custom(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl Escape {
    pub fn custom(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Escape::Custom(Arc::new(f))
    }

    pub fn apply(&self, input: &str) -> String {
        match self {
            Escape::Html => escape(input),
            Escape::None => input.to_string(),
            Escape::Custom(f) => f(input),
        }
    }
}

impl fmt::Debug for Escape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Escape::Html => write!(f, "Html"),
            Escape::None => write!(f, "None"),
            Escape::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}
