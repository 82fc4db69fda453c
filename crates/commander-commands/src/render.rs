//! Minimal `{{ key }}` template rendering for configuration files.

use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Template source and rendered destination for a template-driven command.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderTarget {
    pub template: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template refers to unknown value '{0}'")]
    UnknownKey(String),

    #[error("parameters did not serialize to an object")]
    NotAnObject,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").expect("placeholder pattern")
    })
}

/// Serializes a parameter container into the key/value map a template is
/// rendered from.
pub fn parameter_values<P: Serialize>(params: &P) -> Result<Map<String, Value>, RenderError> {
    match serde_json::to_value(params) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(RenderError::NotAnObject),
    }
}

/// Substitutes every `{{ key }}` placeholder from `values`. A placeholder
/// without a matching key is an error rather than silently left in place.
pub fn render(template: &str, values: &Map<String, Value>) -> Result<String, RenderError> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for caps in placeholder().captures_iter(template) {
        let Some(whole) = caps.get(0) else { continue };
        let key = &caps[1];
        let value = values
            .get(key)
            .ok_or_else(|| RenderError::UnknownKey(key.to_string()))?;
        out.push_str(&template[last..whole.start()]);
        out.push_str(&render_value(value));
        last = whole.end();
    }

    out.push_str(&template[last..]);
    Ok(out)
}

/// Reads the template, renders it, and writes the destination file.
pub async fn render_to_file(
    target: &RenderTarget,
    values: &Map<String, Value>,
) -> Result<(), RenderError> {
    let source = tokio::fs::read_to_string(&target.template).await?;
    let rendered = render(&source, values)?;
    tokio::fs::write(&target.output, rendered).await?;
    Ok(())
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(render_value)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}
