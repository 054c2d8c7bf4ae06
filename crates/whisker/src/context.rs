//! Context for name resolution during template rendering.
//!
//! A context wraps one view and borrows the context it was pushed from, so
//! the chain of enclosing scopes lives on the renderer's stack.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::value::Value;

/// One scope of the rendering context stack.
pub struct Context<'a> {
    view: Value,
    parent: Option<&'a Context<'a>>,
    cache: RefCell<HashMap<String, Value>>,
}

impl<'a> Context<'a> {
    /// Create a root context for a view.
    pub fn new(view: impl Into<Value>) -> Self {
        Self {
            view: view.into(),
            parent: None,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Create a child scope whose parent is this context.
    pub fn push(&self, view: impl Into<Value>) -> Context<'_> {
        Context {
            view: view.into(),
            parent: Some(self),
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn view(&self) -> &Value {
        &self.view
    }

    pub fn parent(&self) -> Option<&Context<'a>> {
        self.parent
    }

    /// Resolve a name to a value.
    ///
    /// `.` is the current view. A plain name is searched from this scope
    /// outward. In a dotted name only the first segment is searched outward;
    /// the remaining segments descend from that value and a miss yields
    /// `Null`. Computed values are invoked with this scope's view.
    pub fn lookup(&self, name: &str) -> Value {
        let cached = self.cache.borrow().get(name).cloned();
        let value = match cached {
            Some(value) => value,
            None => {
                let value = self.resolve(name);
                self.cache
                    .borrow_mut()
                    .insert(name.to_string(), value.clone());
                value
            }
        };

        match value {
            Value::Computed(f) => match f(&self.view) {
                // A computed value does not yield another computed value.
                Value::Computed(_) => Value::Null,
                other => other,
            },
            other => other,
        }
    }

    fn resolve(&self, name: &str) -> Value {
        if name == "." {
            return self.view.clone();
        }

        let mut segments = name.split('.');
        let Some(first) = segments.next() else {
            return Value::Null;
        };

        let mut value = match self.find_in_scopes(first) {
            Some(value) => value,
            None => return Value::Null,
        };
        for segment in segments {
            value = match value.get(segment) {
                Some(next) => next,
                None => return Value::Null,
            };
        }
        value
    }

    fn find_in_scopes(&self, key: &str) -> Option<Value> {
        let mut scope = Some(self);
        while let Some(context) = scope {
            if let Some(value) = context.view.get(key) {
                return Some(value);
            }
            scope = context.parent;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::cell::Cell;
    use std::rc::Rc;

    fn create_test_context() -> Context<'static> {
        Context::new(json!({
            "name": "Alice",
            "user": {"email": "alice@example.com", "tags": ["a", "b"]},
            "nothing": null
        }))
    }

    #[test]
    fn test_lookup_simple() {
        let ctx = create_test_context();
        assert_eq!(ctx.lookup("name"), Value::from("Alice"));
    }

    #[test]
    fn test_lookup_dotted() {
        let ctx = create_test_context();
        assert_eq!(ctx.lookup("user.email"), Value::from("alice@example.com"));
        assert_eq!(ctx.lookup("user.tags.1"), Value::from("b"));
        assert_eq!(ctx.lookup("user.missing.name"), Value::Null);
    }

    #[test]
    fn test_lookup_miss_is_null() {
        let ctx = create_test_context();
        assert_eq!(ctx.lookup("unknown"), Value::Null);
    }

    #[test]
    fn test_dot_is_current_view() {
        let ctx = create_test_context();
        let child = ctx.push("item");
        assert_eq!(child.lookup("."), Value::from("item"));
    }

    #[test]
    fn test_parent_fallback() {
        let ctx = create_test_context();
        let child = ctx.push(json!({"item": 42}));
        assert_eq!(child.lookup("item"), Value::from(42));
        assert_eq!(child.lookup("name"), Value::from("Alice"));
        assert_eq!(ctx.lookup("item"), Value::Null);
    }

    #[test]
    fn test_present_null_stops_search() {
        let ctx = Context::new(json!({"name": "outer"}));
        let child = ctx.push(json!({"name": null}));
        assert_eq!(child.lookup("name"), Value::Null);
    }

    #[test]
    fn test_dotted_tail_does_not_fall_back() {
        let ctx = Context::new(json!({"a": {"b": {"c": "outer"}}}));
        let child = ctx.push(json!({"a": {"x": 1}}));
        assert_eq!(child.lookup("a.b.c"), Value::Null);
    }

    #[test]
    fn test_computed_invoked_each_lookup() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let view = Value::object([
            ("first", Value::from("Ada")),
            (
                "greeting",
                Value::computed(move |view| {
                    counter.set(counter.get() + 1);
                    let first = view.get("first").unwrap_or_default();
                    Value::from(format!("Hi {}", first.stringify()))
                }),
            ),
        ]);
        let ctx = Context::new(view);

        assert_eq!(ctx.lookup("greeting"), Value::from("Hi Ada"));
        assert_eq!(ctx.lookup("greeting"), Value::from("Hi Ada"));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_computed_uses_current_view() {
        let root = Value::object([(
            "label",
            Value::computed(|view| view.get("id").unwrap_or_default()),
        )]);
        let ctx = Context::new(root);
        let child = ctx.push(json!({"id": 7}));
        assert_eq!(child.lookup("label"), Value::from(7));
    }
}
