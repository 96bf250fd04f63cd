use crate::types::version::SchemaVersion;
use serde_json::{Map, Value};
use std::collections::HashSet;

pub const CONTINUOUS: &str = "CONTINUOUS";
pub const IRREGULAR: &str = "IRREGULAR";

/// Domain exceptions applied on top of the plain presence and validity
/// checks. Attribute names are taxonomy keys for the active schema version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialRules {
    /// Satisfied by the record's catalogue id. v1 scores the record's own
    /// identifier value like any other attribute.
    pub identifier: Option<String>,
    pub periodicity: String,
    pub end_date: String,
    pub release_date: String,
    /// Never error-accounted.
    pub always_exempt: Vec<String>,
}

impl SpecialRules {
    pub fn builtin(version: SchemaVersion) -> Self {
        match version {
            SchemaVersion::V1 => Self {
                identifier: None,
                periodicity: "periodicity".to_string(),
                end_date: "datasetEndDate".to_string(),
                release_date: "releaseDate".to_string(),
                always_exempt: Vec::new(),
            },
            SchemaVersion::V2 => Self {
                identifier: Some("identifier".to_string()),
                periodicity: "provenance.temporal.accrualPeriodicity".to_string(),
                end_date: "provenance.temporal.endDate".to_string(),
                release_date: "provenance.temporal.distributionReleaseDate".to_string(),
                always_exempt: vec!["accessibility.usage.isReferencedBy".to_string()],
            },
        }
    }

    pub fn periodicity_of<'a>(&self, flat: &'a Map<String, Value>) -> Option<&'a str> {
        flat.get(&self.periodicity)
            .and_then(Value::as_str)
            .map(str::trim)
    }

    /// Attributes counted as filled regardless of their value.
    pub fn satisfied_by(&self, periodicity: Option<&str>) -> Vec<&str> {
        let mut satisfied: Vec<&str> = self.identifier.iter().map(String::as_str).collect();
        if periodicity.is_some_and(|value| value.eq_ignore_ascii_case(CONTINUOUS)) {
            satisfied.push(&self.end_date);
            satisfied.push(&self.release_date);
        }
        satisfied
    }

    /// Attributes whose schema violations are ignored for this record.
    pub fn exemptions(&self, periodicity: Option<&str>) -> HashSet<&str> {
        let mut exempt: HashSet<&str> = self.always_exempt.iter().map(String::as_str).collect();
        match periodicity {
            Some(value) if value.eq_ignore_ascii_case(CONTINUOUS) => {
                exempt.insert(&self.periodicity);
                exempt.insert(&self.release_date);
                exempt.insert(&self.end_date);
            }
            Some(value) if value.eq_ignore_ascii_case(IRREGULAR) => {
                exempt.insert(&self.periodicity);
                exempt.insert(&self.release_date);
            }
            _ => {}
        }
        exempt
    }
}
