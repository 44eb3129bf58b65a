// Attribute reply parsing — strict parse, then default.
//
// Models wrap JSON in prose or code fences, list several topics, or ignore
// the format entirely. We try JSON first (outermost braces), then
// `key: value` lines. Nothing untyped leaves this module: the caller gets
// either RawAttributes or a Parse error, and `resolve` turns both into
// PostAttributes.

use regex_lite::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::debug;

use crate::error::{QuillError, Result};
use crate::model::{LengthBucket, PostAttributes};

/// Fields pulled out of a classification reply, before defaults are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawAttributes {
    pub topic: Option<String>,
    pub language: Option<String>,
    pub length: Option<String>,
}

impl RawAttributes {
    fn is_empty(&self) -> bool {
        self.topic.is_none() && self.language.is_none() && self.length.is_none()
    }
}

/// Parse a classification reply. Fails only when no field can be found at all.
pub fn parse_reply(reply: &str) -> Result<RawAttributes> {
    let parsed = match parse_json(reply) {
        Some(raw) if !raw.is_empty() => raw,
        _ => parse_key_values(reply),
    };

    if parsed.is_empty() {
        return Err(QuillError::Parse(format!(
            "no topic/language/length found in reply ({} chars)",
            reply.chars().count()
        )));
    }
    Ok(parsed)
}

/// Turn a reply into attributes, substituting sentinels for anything missing.
///
/// The length bucket always comes from the post's own word count; the model's
/// length answer is informational only.
pub fn resolve(text: &str, reply: &str) -> PostAttributes {
    let mut attributes = PostAttributes::fallback(text);

    match parse_reply(reply) {
        Ok(raw) => {
            if let Some(topic) = raw.topic.as_deref().and_then(first_label) {
                attributes.topic = topic;
            }
            if let Some(language) = raw.language.as_deref().and_then(first_label) {
                attributes.language = language.to_lowercase();
            }
            if let Some(claimed) = raw.length.as_deref() {
                let agrees = claimed.parse::<LengthBucket>().ok() == Some(attributes.length_bucket);
                debug!(
                    claimed = claimed,
                    local = %attributes.length_bucket,
                    agrees,
                    "Model length label (local bucket wins)"
                );
            }
        }
        Err(e) => {
            debug!(error = %e, "Unparsable attribute reply, using defaults");
        }
    }

    attributes
}

/// Pick the primary label out of something like "Fitness, Health / Running".
/// Returns None for blank or sentinel-like values.
pub fn first_label(value: &str) -> Option<String> {
    // "N/A" would otherwise split into "N".
    if is_placeholder(value.trim()) {
        return None;
    }
    value
        .split([',', '/', ';', '|', '\n'])
        .map(|part| {
            part.trim()
                .trim_matches(|c: char| c == '"' || c == '\'' || c == '#' || c == '`')
                .trim()
        })
        .find(|part| !part.is_empty())
        .filter(|label| !is_placeholder(label))
        .map(str::to_string)
}

fn is_placeholder(label: &str) -> bool {
    matches!(
        label.to_ascii_lowercase().as_str(),
        "unknown" | "none" | "n/a" | "na" | "null" | "-"
    )
}

/// Extract the outermost `{ ... }` and read the three fields from it.
fn parse_json(reply: &str) -> Option<RawAttributes> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end <= start {
        return None;
    }

    let value: Value = serde_json::from_str(&reply[start..=end]).ok()?;
    let object = value.as_object()?;

    // Names are tried in priority order, exact key first, then ignoring case.
    // The map iterates alphabetically, so "tags" would otherwise beat "topic".
    let field = |names: &[&str]| {
        names.iter().find_map(|name| {
            object
                .get(*name)
                .or_else(|| {
                    object
                        .iter()
                        .find(|(k, _)| k.eq_ignore_ascii_case(name))
                        .map(|(_, v)| v)
                })
                .and_then(json_label)
        })
    };

    Some(RawAttributes {
        topic: field(&["topic", "topics", "tags", "tag"]),
        language: field(&["language", "lang"]),
        length: field(&["length", "length_bucket"]),
    })
}

/// A JSON value as a label: strings as-is, arrays by their first string.
fn json_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(|v| v.as_str().map(str::to_string)),
        _ => None,
    }
}

fn key_value_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?im)^[\s*\-]*(topic|topics|tags|language|lang|length)\**\s*[:=]\s*(.+?)\s*$")
            .expect("static regex is valid")
    })
}

fn parse_key_values(reply: &str) -> RawAttributes {
    let mut raw = RawAttributes::default();
    for caps in key_value_pattern().captures_iter(reply) {
        let value = caps[2].to_string();
        let slot = match caps[1].to_ascii_lowercase().as_str() {
            "topic" | "topics" | "tags" => &mut raw.topic,
            "language" | "lang" => &mut raw.language,
            _ => &mut raw.length,
        };
        // First occurrence wins.
        if slot.is_none() {
            *slot = Some(value);
        }
    }
    raw
}
