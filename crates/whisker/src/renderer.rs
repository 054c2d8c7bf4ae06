//! Renderer for evaluating a parsed Whisker tree.
//!
//! Standalone-line stripping happens while scanning, so the renderer only
//! walks nodes and never touches whitespace.

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, warn};
use whisker_ast::{Node, PartialNode, SectionNode, VariableNode};

use crate::context::Context;
use crate::engine::Engine;
use crate::error::{Result, WhiskerError};
use crate::partials::Partials;
use crate::value::{LambdaFn, Value};

/// How a section tag treats the value it looked up.
pub enum SectionValue {
    /// Renders nothing.
    Falsy,
    /// `true`: renders the body once in the current context.
    Flag,
    /// A non-empty string or non-zero number, pushed as the view.
    Scalar(Value),
    /// An object, pushed as the view.
    Object(Value),
    /// Renders the body once per element.
    List(Rc<[Value]>),
    /// A higher-order section.
    Lambda(Rc<LambdaFn>),
}

impl From<Value> for SectionValue {
    fn from(value: Value) -> Self {
        match value {
            value if !value.is_truthy() => SectionValue::Falsy,
            Value::List(items) => SectionValue::List(items),
            Value::Lambda(f) => SectionValue::Lambda(f),
            value @ Value::Object(_) => SectionValue::Object(value),
            value @ (Value::String(_) | Value::Number(_)) => SectionValue::Scalar(value),
            Value::Bool(_) => SectionValue::Flag,
            // Lookups resolve computed values before they reach a section.
            Value::Null | Value::Computed(_) => SectionValue::Falsy,
        }
    }
}

/// Renderer for evaluating a Whisker tree against a context
pub struct Renderer<'r> {
    engine: &'r Engine,
    partials: &'r dyn Partials,
    partial_depth: Cell<usize>,
}

impl<'r> Renderer<'r> {
    pub fn new(engine: &'r Engine, partials: &'r dyn Partials) -> Self {
        Self {
            engine,
            partials,
            partial_depth: Cell::new(0),
        }
    }

    /// Render nodes in `context`.
    ///
    /// `source` is the template text the nodes were parsed from; lambdas need
    /// it to recover their raw section body.
    pub fn render(
        &self,
        nodes: &[Node],
        context: &Context<'_>,
        source: Option<&str>,
    ) -> Result<String> {
        let mut output = String::new();

        for node in nodes {
            match node {
                Node::Text(n) => output.push_str(&n.content),
                Node::Variable(n) => output.push_str(&self.render_variable(n, context)),
                Node::Unescaped(n) => output.push_str(&self.render_unescaped(n, context)),
                Node::Section(n) => output.push_str(&self.render_section(n, context, source)?),
                Node::Inverted(n) => output.push_str(&self.render_inverted(n, context, source)?),
                Node::Partial(n) => output.push_str(&self.render_partial(n, context)?),
                Node::Delimiters(_) | Node::Comment(_) => {}
            }
        }

        Ok(output)
    }

    fn render_variable(&self, node: &VariableNode, context: &Context<'_>) -> String {
        let value = context.lookup(&node.name);
        if value.is_null() {
            return String::new();
        }
        self.engine.escape(&value.stringify())
    }

    fn render_unescaped(&self, node: &VariableNode, context: &Context<'_>) -> String {
        context.lookup(&node.name).stringify()
    }

    fn render_section(
        &self,
        node: &SectionNode,
        context: &Context<'_>,
        source: Option<&str>,
    ) -> Result<String> {
        match SectionValue::from(context.lookup(&node.name)) {
            SectionValue::Falsy => Ok(String::new()),
            SectionValue::Flag => self.render(&node.children, context, source),
            SectionValue::Scalar(value) | SectionValue::Object(value) => {
                let child = context.push(value);
                self.render(&node.children, &child, source)
            }
            SectionValue::List(items) => {
                let mut output = String::new();
                for item in items.iter() {
                    let child = context.push(item.clone());
                    output.push_str(&self.render(&node.children, &child, source)?);
                }
                Ok(output)
            }
            SectionValue::Lambda(f) => {
                let body = source.and_then(|s| node.body(s)).ok_or_else(|| {
                    WhiskerError::MissingSourceTemplate {
                        section: node.name.clone(),
                    }
                })?;
                let sub_render = SubRender {
                    renderer: self,
                    context,
                };
                f(body, &sub_render)
            }
        }
    }

    fn render_inverted(
        &self,
        node: &SectionNode,
        context: &Context<'_>,
        source: Option<&str>,
    ) -> Result<String> {
        if context.lookup(&node.name).is_truthy() {
            Ok(String::new())
        } else {
            self.render(&node.children, context, source)
        }
    }

    fn render_partial(&self, node: &PartialNode, context: &Context<'_>) -> Result<String> {
        let Some(template) = self.partials.get_partial(&node.name) else {
            debug!(partial = %node.name, "partial not found, rendering nothing");
            return Ok(String::new());
        };

        let depth = self.partial_depth.get();
        let max_depth = self.engine.options().max_partial_depth;
        if depth >= max_depth {
            warn!(partial = %node.name, max_depth, "partial nesting too deep");
            return Err(WhiskerError::PartialDepthExceeded {
                name: node.name.clone(),
                depth: max_depth,
            });
        }

        let nodes = self.engine.parse(&template)?;
        self.partial_depth.set(depth + 1);
        let result = self.render(&nodes, context, Some(&template));
        self.partial_depth.set(depth);
        result
    }
}

/// Handle passed to section lambdas for rendering text in the section's
/// context.
pub struct SubRender<'r> {
    renderer: &'r Renderer<'r>,
    context: &'r Context<'r>,
}

impl<'r> SubRender<'r> {
    /// Parse `template` with the engine's default delimiters and render it
    /// in the section's context with the same partials.
    pub fn render(&self, template: &str) -> Result<String> {
        let nodes = self.renderer.engine.parse(template)?;
        self.renderer.render(&nodes, self.context, Some(template))
    }

    /// The context the section was rendered in.
    pub fn context(&self) -> &Context<'r> {
        self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partials::NoPartials;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::HashMap;

    fn render(template: &str, data: serde_json::Value) -> Result<String> {
        Engine::new().render(template, data, &NoPartials)
    }

    #[test]
    fn test_section_value_classification() {
        assert!(matches!(SectionValue::from(Value::Null), SectionValue::Falsy));
        assert!(matches!(SectionValue::from(Value::from(0)), SectionValue::Falsy));
        assert!(matches!(SectionValue::from(Value::from(true)), SectionValue::Flag));
        assert!(matches!(SectionValue::from(Value::from("a")), SectionValue::Scalar(_)));
        assert!(matches!(SectionValue::from(Value::from(json!({}))), SectionValue::Object(_)));
        assert!(matches!(SectionValue::from(Value::from(json!([1]))), SectionValue::List(_)));
        assert!(matches!(SectionValue::from(Value::from(json!([]))), SectionValue::Falsy));
        let lambda = Value::lambda(|_, _| Ok(String::new()));
        assert!(matches!(SectionValue::from(lambda), SectionValue::Lambda(_)));
        let computed = Value::computed(|_| Value::from(true));
        assert!(matches!(SectionValue::from(computed), SectionValue::Falsy));
    }

    #[test]
    fn test_render_text_and_variables() {
        let result = render(
            "Hello, {{name}}! {{{raw}}} {{&raw}}",
            json!({"name": "<b>", "raw": "<i>"}),
        );
        assert_eq!(result.unwrap(), "Hello, &lt;b&gt;! <i> <i>");
    }

    #[test]
    fn test_missing_and_null_render_empty() {
        let result = render("[{{a}}][{{b}}][{{{b}}}]", json!({"b": null}));
        assert_eq!(result.unwrap(), "[][][]");
    }

    #[test]
    fn test_section_list_iteration() {
        let result = render("{{#items}}<{{.}}>{{/items}}", json!({"items": [1, 2, 3]}));
        assert_eq!(result.unwrap(), "<1><2><3>");
    }

    #[test]
    fn test_section_true_keeps_context() {
        let result = render("{{#show}}{{name}}{{/show}}", json!({"show": true, "name": "x"}));
        assert_eq!(result.unwrap(), "x");
    }

    #[test]
    fn test_section_scalar_is_pushed() {
        let result = render("{{#name}}[{{.}}]{{/name}}", json!({"name": "Ada"}));
        assert_eq!(result.unwrap(), "[Ada]");
    }

    #[test]
    fn test_inverted_section() {
        assert_eq!(render("{{^a}}no{{/a}}", json!({"a": false})).unwrap(), "no");
        assert_eq!(render("{{^a}}no{{/a}}", json!({"a": []})).unwrap(), "no");
        assert_eq!(render("{{^a}}no{{/a}}", json!({"a": true})).unwrap(), "");
    }

    #[test]
    fn test_lambda_receives_raw_body() {
        let view = Value::object([
            ("name", Value::from("Ada")),
            (
                "wrap",
                Value::lambda(|body, sub| Ok(format!("<b>{}</b>|{}", body, sub.render(body)?))),
            ),
        ]);
        let result = Engine::new().render("{{#wrap}}Hi {{name}}{{/wrap}}", view, &NoPartials);
        assert_eq!(result.unwrap(), "<b>Hi {{name}}</b>|Hi Ada");
    }

    #[test]
    fn test_lambda_without_source_fails() {
        let engine = Engine::new();
        let nodes = engine.parse("{{#f}}x{{/f}}").unwrap();
        let view = Value::object([("f", Value::lambda(|body, _| Ok(body.to_string())))]);
        let context = Context::new(view);
        let result = engine.render_tokens(&nodes, &context, &NoPartials, None);
        assert!(matches!(
            result,
            Err(WhiskerError::MissingSourceTemplate { ref section }) if section == "f"
        ));
    }

    #[test]
    fn test_partial_in_current_context() {
        let mut partials = HashMap::new();
        partials.insert("item".to_string(), "({{name}})".to_string());
        let result = Engine::new().render(
            "{{#people}}{{> item}}{{/people}}",
            json!({"people": [{"name": "a"}, {"name": "b"}]}),
            &partials,
        );
        assert_eq!(result.unwrap(), "(a)(b)");
    }

    #[test]
    fn test_recursive_partial_depth_limit() {
        let mut partials = HashMap::new();
        partials.insert("loop".to_string(), "x{{> loop}}".to_string());
        let engine = Engine::builder().max_partial_depth(4).build();
        let result = engine.render("{{> loop}}", json!({}), &partials);
        assert!(matches!(
            result,
            Err(WhiskerError::PartialDepthExceeded { depth: 4, .. })
        ));
    }
}
