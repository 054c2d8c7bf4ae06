//! Whisker - a logic-less, mustache-compatible template engine
//!
//! Templates are compiled to a tree of nodes and rendered against a
//! hierarchical data context:
//! - `{{name}}` interpolates with HTML escaping, `{{{name}}}` and `{{& name}}` without
//! - `{{#name}}...{{/name}}` sections iterate lists, push objects and call lambdas
//! - `{{^name}}...{{/name}}` renders when the value is falsy or an empty list
//! - `{{> name}}` includes a partial, `{{! ... }}` is a comment, `{{=<% %>=}}` changes delimiters
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//!
//! let result = whisker::render(
//!     "Hello, {{ name }}!",
//!     json!({"name": "World"}),
//! ).unwrap();
//!
//! assert_eq!(result, "Hello, World!");
//! ```

// Public modules
pub mod context;
pub mod engine;
pub mod error;
pub mod html_escape;
pub mod partials;
pub mod renderer;
pub mod request;
pub mod value;

pub use context::Context;
pub use engine::{Engine, EngineBuilder, Options};
pub use error::{Result, WhiskerError};
pub use html_escape::{escape, Escape};
pub use partials::{NoPartials, Partials};
pub use renderer::{SectionValue, SubRender};
pub use request::RenderRequest;
pub use value::Value;
pub use whisker_ast::{Delimiters, Location, Node, ParseError};

use std::sync::Arc;

use once_cell::sync::Lazy;

static DEFAULT_ENGINE: Lazy<Engine> = Lazy::new(Engine::new);

/// The engine behind the free functions of this crate.
pub fn default_engine() -> &'static Engine {
    &DEFAULT_ENGINE
}

/// Convenience function: parse and render in one call
///
/// # Example
///
/// ```rust
/// use serde_json::json;
///
/// let result = whisker::render(
///     "{{#admin}}Admin{{/admin}}{{^admin}}Guest{{/admin}}",
///     json!({"admin": false}),
/// ).unwrap();
///
/// assert_eq!(result, "Guest");
/// ```
pub fn render(template: &str, view: impl Into<Value>) -> Result<String> {
    DEFAULT_ENGINE.render(template, view, &NoPartials)
}

/// Convenience function: parse and render with partials
///
/// # Example
///
/// ```rust
/// use std::collections::HashMap;
/// use serde_json::json;
///
/// let mut partials = HashMap::new();
/// partials.insert("user".to_string(), "<b>{{name}}</b>".to_string());
///
/// let result = whisker::render_with_partials(
///     "{{> user}}",
///     json!({"name": "Sam"}),
///     &partials,
/// ).unwrap();
///
/// assert_eq!(result, "<b>Sam</b>");
/// ```
pub fn render_with_partials(
    template: &str,
    view: impl Into<Value>,
    partials: &dyn Partials,
) -> Result<String> {
    DEFAULT_ENGINE.render(template, view, partials)
}

/// Parse a template into the default engine's cache.
pub fn parse(template: &str) -> Result<Arc<[Node]>> {
    DEFAULT_ENGINE.parse(template)
}

/// Parse a template that starts with `delimiters` instead of `{{ }}`.
pub fn parse_with(template: &str, delimiters: &Delimiters) -> Result<Arc<[Node]>> {
    DEFAULT_ENGINE.parse_with(template, delimiters)
}

/// Clear the default engine's cache.
pub fn clear_cache() {
    DEFAULT_ENGINE.clear_cache();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_template_reuse() {
        let result1 = render("Hello, {{ name }}!", json!({"name": "Alice"})).unwrap();
        assert_eq!(result1, "Hello, Alice!");

        let result2 = render("Hello, {{ name }}!", json!({"name": "Bob"})).unwrap();
        assert_eq!(result2, "Hello, Bob!");
    }

    #[test]
    fn test_parse_warms_default_cache() {
        let template = "warm {{cache}} test";
        let nodes = parse(template).unwrap();
        assert!(Arc::ptr_eq(&nodes, &default_engine().parse(template).unwrap()));
    }

    #[test]
    fn test_parse_with_custom_delimiters() {
        let delimiters: Delimiters = "<% %>".parse().unwrap();
        let nodes = parse_with("<% name %> {{name}}", &delimiters).unwrap();
        assert!(matches!(&nodes[0], Node::Variable(n) if n.name == "name"));
        assert!(matches!(&nodes[1], Node::Text(n) if n.content == " {{name}}"));
        assert!(Arc::ptr_eq(
            &nodes,
            &default_engine().parse_with("<% name %> {{name}}", &delimiters).unwrap()
        ));
        assert!(!Arc::ptr_eq(&nodes, &parse("<% name %> {{name}}").unwrap()));
    }
}
