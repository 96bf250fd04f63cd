use crate::error::Result;
use crate::types::taxonomy::{Taxonomy, ID_KEY};
use serde_json::{Map, Value};

/// All-null template over the attributes of `levels`, plus `id`.
pub fn generate(taxonomy: &Taxonomy, levels: &[String]) -> Result<Map<String, Value>> {
    let scoped = taxonomy.restrict(levels)?;
    Ok(template(&scoped))
}

/// All-null template over every attribute of `taxonomy`, plus `id`.
pub fn template(taxonomy: &Taxonomy) -> Map<String, Value> {
    let mut baseline = Map::with_capacity(taxonomy.attribute_count() + 1);
    baseline.insert(ID_KEY.to_string(), Value::Null);
    for attribute in taxonomy.attributes() {
        baseline.insert(attribute.to_string(), Value::Null);
    }
    baseline
}

/// Record values laid over the baseline. Keys the baseline does not know are
/// dropped, so every record is scored against the same attribute set.
pub fn overlay(baseline: &Map<String, Value>, flat: &Map<String, Value>) -> Map<String, Value> {
    baseline
        .iter()
        .map(|(key, placeholder)| {
            let value = flat.get(key).unwrap_or(placeholder);
            (key.clone(), value.clone())
        })
        .collect()
}
