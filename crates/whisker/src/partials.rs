//! Partial template resolution.
//!
//! A partial is looked up by name when a `{{> name}}` tag is rendered.
//! Name-to-template maps and resolver closures both implement [`Partials`].

use std::collections::{BTreeMap, HashMap};

/// Source of partial templates.
pub trait Partials {
    /// Return the template source for `name`, or `None` if there is none.
    fn get_partial(&self, name: &str) -> Option<String>;
}

/// Resolver that never finds a partial.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPartials;

impl Partials for NoPartials {
    fn get_partial(&self, _name: &str) -> Option<String> {
        None
    }
}

impl Partials for () {
    fn get_partial(&self, _name: &str) -> Option<String> {
        None
    }
}

impl Partials for HashMap<String, String> {
    fn get_partial(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl Partials for HashMap<&str, &str> {
    fn get_partial(&self, name: &str) -> Option<String> {
        self.get(name).map(|s| s.to_string())
    }
}

impl Partials for BTreeMap<String, String> {
    fn get_partial(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// A JSON object of name to template string; non-string entries are ignored.
impl Partials for serde_json::Map<String, serde_json::Value> {
    fn get_partial(&self, name: &str) -> Option<String> {
        self.get(name)
            .and_then(|value| value.as_str())
            .map(str::to_string)
    }
}

impl<F> Partials for F
where
    F: Fn(&str) -> Option<String>,
{
    fn get_partial(&self, name: &str) -> Option<String> {
        self(name)
    }
}
