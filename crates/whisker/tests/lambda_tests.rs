//! Tests for function values, render entry points and engine configuration.

use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use whisker::{Context, Engine, Escape, NoPartials, Value, WhiskerError};

fn profile_view() -> Value {
    Value::object([
        ("first", Value::from("Grace")),
        ("last", Value::from("Hopper")),
        (
            "fullName",
            Value::computed(|view| {
                let first = view.get("first").unwrap_or_default().stringify();
                let last = view.get("last").unwrap_or_default().stringify();
                Value::from(format!("{first} {last}"))
            }),
        ),
    ])
}

#[test]
fn test_computed_value_interpolation() {
    let result = Engine::new().render("{{fullName}}", profile_view(), &NoPartials);
    assert_eq!(result.unwrap(), "Grace Hopper");
}

#[test]
fn test_computed_value_bound_to_item_view() {
    let view = Value::object([
        ("people", Value::from(json!([{"n": 1}, {"n": 2}]))),
        (
            "double",
            Value::computed(|view| {
                let n = view.get("n").and_then(|v| v.stringify().parse::<i64>().ok());
                Value::from(n.map(|n| n * 2))
            }),
        ),
    ]);
    let result = Engine::new().render("{{#people}}{{double}};{{/people}}", view, &NoPartials);
    assert_eq!(result.unwrap(), "2;4;");
}

#[test]
fn test_computed_value_as_section() {
    let view = Value::object([
        ("visible", Value::computed(|_| Value::from(false))),
        ("items", Value::computed(|_| Value::from(json!(["a", "b"])))),
    ]);
    let result = Engine::new().render(
        "{{#visible}}hidden{{/visible}}{{#items}}{{.}}{{/items}}",
        view,
        &NoPartials,
    );
    assert_eq!(result.unwrap(), "ab");
}

#[test]
fn test_lambda_wraps_rendered_body() {
    let view = Value::object([
        ("name", Value::from("Willy")),
        (
            "bold",
            Value::lambda(|body, sub| Ok(format!("<b>{}</b>", sub.render(body)?))),
        ),
    ]);
    let result = Engine::new().render("{{#bold}}Hi {{name}}.{{/bold}}", view, &NoPartials);
    assert_eq!(result.unwrap(), "<b>Hi Willy.</b>");
}

#[test]
fn test_lambda_body_is_raw_source() {
    let view = Value::object([(
        "echo",
        Value::lambda(|body, _| Ok(body.to_string())),
    )]);
    let result = Engine::new().render("{{#echo}}{{x}} {{! c }}\n{{/echo}}", view, &NoPartials);
    assert_eq!(result.unwrap(), "{{x}} {{! c }}\n");
}

#[test]
fn test_lambda_output_is_not_escaped_or_reparsed() {
    let view = Value::object([(
        "f",
        Value::lambda(|_, _| Ok("<i>{{literal}}</i>".to_string())),
    )]);
    let result = Engine::new().render("{{#f}}{{/f}}", view, &NoPartials);
    assert_eq!(result.unwrap(), "<i>{{literal}}</i>");
}

#[test]
fn test_lambda_sub_render_sees_section_context() {
    let view = Value::object([
        ("items", Value::from(json!([{"id": 1}, {"id": 2}]))),
        (
            "link",
            Value::lambda(|body, sub| Ok(format!("[{}]", sub.render(body)?))),
        ),
    ]);
    let result = Engine::new().render(
        "{{#items}}{{#link}}#{{id}}{{/link}}{{/items}}",
        view,
        &NoPartials,
    );
    assert_eq!(result.unwrap(), "[#1][#2]");
}

#[test]
fn test_lambda_sub_render_uses_partials() {
    let mut partials = HashMap::new();
    partials.insert("badge".to_string(), "({{name}})".to_string());
    let view = Value::object([
        ("name", Value::from("x")),
        (
            "wrap",
            Value::lambda(|_, sub| sub.render("{{> badge}}")),
        ),
    ]);
    let result = Engine::new().render("{{#wrap}}ignored{{/wrap}}", view, &partials);
    assert_eq!(result.unwrap(), "(x)");
}

#[test]
fn test_lambda_error_propagates() {
    let view = Value::object([(
        "fail",
        Value::lambda(|_, _| Err(WhiskerError::lambda("boom"))),
    )]);
    let result = Engine::new().render("a{{#fail}}b{{/fail}}c", view, &NoPartials);
    match result {
        Err(WhiskerError::Lambda { message }) => assert_eq!(message, "boom"),
        other => panic!("expected lambda error, got {:?}", other),
    }
}

#[test]
fn test_lambda_inside_partial_sees_partial_source() {
    let mut partials = HashMap::new();
    partials.insert("p".to_string(), "{{#echo}}from partial{{/echo}}".to_string());
    let view = Value::object([(
        "echo",
        Value::lambda(|body, _| Ok(body.to_uppercase())),
    )]);
    let result = Engine::new().render("{{> p}}", view, &partials);
    assert_eq!(result.unwrap(), "FROM PARTIAL");
}

#[test]
fn test_inverted_lambda_renders_nothing() {
    let view = Value::object([("f", Value::lambda(|_, _| Ok("x".to_string())))]);
    let result = Engine::new().render("[{{^f}}no{{/f}}]", view, &NoPartials);
    assert_eq!(result.unwrap(), "[]");
}

#[test]
fn test_render_tokens_without_source() {
    let engine = Engine::new();
    let nodes = engine.parse("{{#a}}{{b}}{{/a}}").unwrap();
    let context = Context::new(json!({"a": {"b": "ok"}}));
    let result = engine.render_tokens(&nodes, &context, &NoPartials, None);
    assert_eq!(result.unwrap(), "ok");
}

#[test]
fn test_render_in_context_uses_parents() {
    let engine = Engine::new();
    let root = Context::new(json!({"site": "Docs"}));
    let page = root.push(json!({"title": "Intro"}));
    let result = engine.render_in_context("{{title}} - {{site}}", &page, &NoPartials);
    assert_eq!(result.unwrap(), "Intro - Docs");
}

#[test]
fn test_custom_escape_policy() {
    let engine = Engine::builder()
        .escape(Escape::custom(|s| s.replace('<', "[").replace('>', "]")))
        .build();
    let result = engine.render("{{x}} {{{x}}}", json!({"x": "<b>"}), &NoPartials);
    assert_eq!(result.unwrap(), "[b] <b>");
}

#[test]
fn test_closure_partials() {
    let resolver = |name: &str| match name {
        "header" => Some("<h1>{{title}}</h1>".to_string()),
        _ => None,
    };
    let result = Engine::new().render(
        "{{> header}}{{> footer}}",
        json!({"title": "Home"}),
        &resolver,
    );
    assert_eq!(result.unwrap(), "<h1>Home</h1>");
}

#[test]
fn test_free_functions_share_default_engine() {
    let template = "free {{fn}} shared";
    let nodes = whisker::parse(template).unwrap();
    assert!(Arc::ptr_eq(
        &nodes,
        &whisker::default_engine().parse(template).unwrap()
    ));
    assert_eq!(whisker::render(template, json!({"fn": 1})).unwrap(), "free 1 shared");
    assert_eq!(whisker::escape("<a href='/'>"), "&lt;a href&#x3D;&#39;&#x2F;&#39;&gt;");
}

#[test]
fn test_clear_cache_keeps_output_identical() {
    let engine = Engine::new();
    let template = "{{#list}}{{.}}{{/list}}";
    let data = json!({"list": [1, 2, 3]});
    let first = engine.render(template, data.clone(), &NoPartials).unwrap();
    engine.clear_cache();
    assert_eq!(engine.cached_templates(), 0);
    let second = engine.render(template, data, &NoPartials).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_engine_shared_across_threads() {
    let engine = Arc::new(Engine::new());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                engine
                    .render("{{n}}-{{#x}}y{{/x}}", json!({"n": i, "x": true}), &NoPartials)
                    .unwrap()
            })
        })
        .collect();

    let outputs: Vec<String> = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect();
    assert_eq!(outputs, vec!["0-y", "1-y", "2-y", "3-y"]);
    assert_eq!(engine.cached_templates(), 1);
}
