use crate::analyze::structure::is_structural;
use crate::types::result::{Assessment, ExplainRow};
use crate::types::version::SchemaVersion;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const VALUE_CHARS: usize = 64;
const MESSAGE_CHARS: usize = 128;

/// Per-attribute breakdown of one record's score, in taxonomy order.
pub fn rows(
    overlaid: &Map<String, Value>,
    completeness: &Assessment,
    errors: &Assessment,
    messages: &BTreeMap<String, Vec<String>>,
    version: SchemaVersion,
) -> Vec<ExplainRow> {
    completeness
        .levels
        .iter()
        .flat_map(|level| {
            level.attributes.iter().map(move |score| {
                let value = if is_structural(version, &score.attribute) {
                    score.indicator.to_string()
                } else {
                    overlaid
                        .get(&score.attribute)
                        .map(render_value)
                        .unwrap_or_default()
                };
                let message = messages
                    .get(&score.attribute)
                    .and_then(|list| list.last())
                    .map(|text| tail(text, MESSAGE_CHARS))
                    .unwrap_or_default();
                ExplainRow {
                    attribute: score.attribute.clone(),
                    level: level.level.clone(),
                    weight: score.weight,
                    value: head(&value, VALUE_CHARS),
                    completeness: score.indicator * score.weight,
                    error: errors.indicator(&score.attribute).unwrap_or(0.0) * score.weight,
                    message,
                }
            })
        })
        .collect()
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn head(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

fn tail(text: &str, limit: usize) -> String {
    let skip = text.chars().count().saturating_sub(limit);
    text.chars().skip(skip).collect()
}
