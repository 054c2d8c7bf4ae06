//! Template engine: options, parse cache and render entry points.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, trace};
use whisker_ast::{Delimiters, Node};

use crate::context::Context;
use crate::error::{Result, WhiskerError};
use crate::html_escape::Escape;
use crate::partials::Partials;
use crate::renderer::Renderer;
use crate::request::RenderRequest;
use crate::value::Value;

/// Default limit on nested partial inclusion.
pub const DEFAULT_MAX_PARTIAL_DEPTH: usize = 128;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct Options {
    /// Delimiters in effect at the start of every template.
    pub delimiters: Delimiters,
    /// Escape policy for `{{name}}` interpolation.
    pub escape: Escape,
    /// How deeply partials may include other partials.
    pub max_partial_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            delimiters: Delimiters::default(),
            escape: Escape::Html,
            max_partial_depth: DEFAULT_MAX_PARTIAL_DEPTH,
        }
    }
}

/// Builder for [`Engine`].
#[derive(Debug, Clone, Default)]
pub struct EngineBuilder {
    options: Options,
}

impl EngineBuilder {
    pub fn delimiters(mut self, delimiters: Delimiters) -> Self {
        self.options.delimiters = delimiters;
        self
    }

    pub fn escape(mut self, escape: Escape) -> Self {
        self.options.escape = escape;
        self
    }

    pub fn max_partial_depth(mut self, depth: usize) -> Self {
        self.options.max_partial_depth = depth;
        self
    }

    pub fn build(self) -> Engine {
        Engine::with_options(self.options)
    }
}

type CacheKey = (String, Delimiters);

/// A template engine with its own parse cache and escape policy
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use whisker::{Engine, NoPartials};
///
/// let engine = Engine::new();
/// let html = engine
///     .render("{{#items}}<li>{{.}}</li>{{/items}}", json!({"items": ["a", "b"]}), &NoPartials)
///     .unwrap();
/// assert_eq!(html, "<li>a</li><li>b</li>");
/// ```
#[derive(Debug, Default)]
pub struct Engine {
    options: Options,
    cache: RwLock<HashMap<CacheKey, Arc<[Node]>>>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: Options) -> Self {
        Self {
            options,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Parse a template with the engine's delimiters, caching the result.
    pub fn parse(&self, template: &str) -> Result<Arc<[Node]>> {
        self.parse_with(template, &self.options.delimiters)
    }

    /// Parse a template with explicit initial delimiters, caching the result.
    pub fn parse_with(&self, template: &str, delimiters: &Delimiters) -> Result<Arc<[Node]>> {
        let key = (template.to_string(), delimiters.clone());
        if let Some(nodes) = self.read_cache().get(&key) {
            trace!(len = template.len(), "template cache hit");
            return Ok(Arc::clone(nodes));
        }

        debug!(len = template.len(), %delimiters, "parsing template");
        let nodes: Arc<[Node]> = whisker_ast::parse(template, delimiters)?.into();
        self.write_cache().insert(key, Arc::clone(&nodes));
        Ok(nodes)
    }

    /// Parse (or fetch from cache) and render a template against a view.
    pub fn render(
        &self,
        template: &str,
        view: impl Into<Value>,
        partials: &dyn Partials,
    ) -> Result<String> {
        let context = Context::new(view);
        self.render_in_context(template, &context, partials)
    }

    /// Render a template against an existing context.
    pub fn render_in_context(
        &self,
        template: &str,
        context: &Context<'_>,
        partials: &dyn Partials,
    ) -> Result<String> {
        let nodes = self.parse(template)?;
        self.render_tokens(&nodes, context, partials, Some(template))
    }

    /// Render already-parsed nodes.
    ///
    /// `original` is the source the nodes came from. Without it, sections
    /// whose value is a lambda fail with
    /// [`WhiskerError::MissingSourceTemplate`].
    pub fn render_tokens(
        &self,
        nodes: &[Node],
        context: &Context<'_>,
        partials: &dyn Partials,
        original: Option<&str>,
    ) -> Result<String> {
        Renderer::new(self, partials).render(nodes, context, original)
    }

    /// Render a JSON request whose `template` field must be a string.
    pub fn render_request(&self, request: &RenderRequest) -> Result<String> {
        let template = request
            .template
            .as_str()
            .ok_or_else(|| WhiskerError::TemplateType {
                found: json_type_name(&request.template).to_string(),
            })?;
        self.render(template, request.view.clone(), &request.partials)
    }

    /// Apply the engine's escape policy.
    pub fn escape(&self, input: &str) -> String {
        self.options.escape.apply(input)
    }

    /// Drop every cached parse.
    pub fn clear_cache(&self) {
        self.write_cache().clear();
    }

    /// Number of cached parses.
    pub fn cached_templates(&self) -> usize {
        self.read_cache().len()
    }

    fn read_cache(&self) -> RwLockReadGuard<'_, HashMap<CacheKey, Arc<[Node]>>> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, HashMap<CacheKey, Arc<[Node]>>> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
