// JSON file post source.
//
// Accepts an array whose elements are either plain strings or objects with a
// `text` (or, as Instagram exports name it, `caption`) field. Anything else
// is skipped with a warning; other object fields are ignored.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

/// Read raw post texts from a JSON file.
pub fn load_posts(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read posts file {}", path.display()))?;
    let texts = parse_posts(&raw)
        .with_context(|| format!("Failed to parse posts file {}", path.display()))?;
    info!(count = texts.len(), path = %path.display(), "Loaded posts from file");
    Ok(texts)
}

/// Parse the JSON document itself (split out for tests).
pub fn parse_posts(raw: &str) -> Result<Vec<String>> {
    let value: Value = serde_json::from_str(raw).context("Posts file is not valid JSON")?;
    let Value::Array(items) = value else {
        anyhow::bail!("Posts file must contain a JSON array");
    };

    let mut texts = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match item {
            Value::String(text) => texts.push(text),
            Value::Object(mut fields) => {
                let mut string_field = |key: &str| match fields.remove(key) {
                    Some(Value::String(text)) => Some(text),
                    _ => None,
                };
                let text = string_field("text").or_else(|| string_field("caption"));
                match text {
                    Some(text) => texts.push(text),
                    None => warn!(index, "Skipping entry without a `text` or `caption` field"),
                }
            }
            _ => warn!(index, "Skipping entry that is neither a string nor an object"),
        }
    }
    Ok(texts)
}
