use crate::analyze::structure::{is_structural, StructuralSummary};
use crate::schema::resolve::AttributeResolver;
use crate::schema::Violation;
use crate::types::taxonomy::Taxonomy;
use crate::types::version::SchemaVersion;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorFindings {
    pub indicators: HashMap<String, f64>,
    pub messages: BTreeMap<String, Vec<String>>,
    pub unattributed: usize,
}

/// Error indicator for every taxonomy attribute of one record.
///
/// `violations` must already be in validation order. Violations on exempt
/// attributes are ignored; violations no attribute claims are counted in
/// `unattributed`. Structural attributes take their indicators from
/// `structure` and ignore schema findings.
pub fn assess(
    record_id: &str,
    violations: &[Violation],
    resolver: &dyn AttributeResolver,
    structure: &StructuralSummary,
    taxonomy: &Taxonomy,
    exemptions: &HashSet<&str>,
    version: SchemaVersion,
) -> ErrorFindings {
    let mut findings = ErrorFindings {
        indicators: taxonomy
            .attributes()
            .map(|attribute| (attribute.to_string(), 0.0))
            .collect(),
        ..ErrorFindings::default()
    };

    for violation in violations {
        let Some(attribute) = resolver.resolve_attribute(violation) else {
            findings.unattributed += 1;
            debug!(
                record = record_id,
                path = %violation.joined_path(),
                message = %violation.message,
                "unattributed schema violation"
            );
            continue;
        };
        if exemptions.contains(attribute.as_str()) || is_structural(version, &attribute) {
            continue;
        }
        findings.indicators.insert(attribute.clone(), 1.0);
        findings
            .messages
            .entry(attribute)
            .or_default()
            .push(violation.message.clone());
    }

    for (attribute, indicator) in structure.errors(version) {
        if taxonomy.contains(&attribute) && !exemptions.contains(attribute.as_str()) {
            findings.indicators.insert(attribute, indicator);
        }
    }

    findings
}
