use crate::analyze::structure::{count_value, is_structural, is_table_count, StructuralSummary};
use crate::types::rules::SpecialRules;
use crate::types::taxonomy::Taxonomy;
use crate::types::version::SchemaVersion;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Filled indicator for every taxonomy attribute of one record.
///
/// `overlaid` is the baseline with the record's values laid over it. Plain
/// attributes score 1 when present; structural attributes take their
/// indicators from `structure`.
pub fn assess(
    overlaid: &Map<String, Value>,
    structure: &StructuralSummary,
    taxonomy: &Taxonomy,
    rules: &SpecialRules,
    version: SchemaVersion,
) -> HashMap<String, f64> {
    let structural: HashMap<String, f64> = structure.completeness(version).into_iter().collect();
    let satisfied = rules.satisfied_by(rules.periodicity_of(overlaid));

    taxonomy
        .attributes()
        .map(|attribute| {
            let indicator = if is_table_count(version, attribute)
                && overlaid
                    .get(attribute)
                    .and_then(count_value)
                    .is_some_and(|count| count > 0)
            {
                1.0
            } else if is_structural(version, attribute) {
                structural.get(attribute).copied().unwrap_or(0.0)
            } else {
                let filled = satisfied.contains(&attribute)
                    || overlaid
                        .get(attribute)
                        .is_some_and(|value| version.is_present(value));
                if filled {
                    1.0
                } else {
                    0.0
                }
            };
            (attribute.to_string(), indicator)
        })
        .collect()
}
