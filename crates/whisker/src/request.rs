//! JSON render requests.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::Result;

/// A template, its view and its partials, as received over a JSON boundary.
///
/// `template` is kept as raw JSON so a request carrying a non-string
/// template can be rejected with a typed error at render time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderRequest {
    pub template: JsonValue,
    #[serde(default)]
    pub view: JsonValue,
    #[serde(default)]
    pub partials: Map<String, JsonValue>,
}

impl RenderRequest {
    pub fn new(template: impl Into<String>, view: JsonValue) -> Self {
        Self {
            template: JsonValue::String(template.into()),
            view,
            partials: Map::new(),
        }
    }

    pub fn with_partial(mut self, name: impl Into<String>, template: impl Into<String>) -> Self {
        self.partials
            .insert(name.into(), JsonValue::String(template.into()));
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
