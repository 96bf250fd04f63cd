//! Table and column accounting for the technical-metadata level.
//!
//! Structural attributes are scored as fractions of the tables and columns
//! a record declares instead of by schema validation.

use crate::types::record::DatasetRecord;
use crate::types::version::SchemaVersion;
use serde::Serialize;
use serde_json::Value;

const NAME_MIN_CHARS: usize = 2;
const DESCRIPTION_MIN_CHARS: usize = 6;
const PRECOMPUTED_KEY: &str = "structuralMetadataCount";
const PRECOMPUTED_PREFIX: &str = "structuralMetadata.";

pub const TABLE_COUNT: &str = "dataClassesCount";
pub const TABLE_NAME: &str = "tableName";
pub const TABLE_DESCRIPTION: &str = "tableDescription";
pub const COLUMN_COUNT: &str = "dataElementsCount";
pub const COLUMN_NAME: &str = "columnName";
pub const COLUMN_DESCRIPTION: &str = "columnDescription";
pub const DATA_TYPE: &str = "dataType";
pub const SENSITIVE: &str = "sensitive";

const TABLE_CHILDREN: [&str; 2] = [TABLE_NAME, TABLE_DESCRIPTION];
const COLUMN_CHILDREN: [&str; 4] = [COLUMN_NAME, COLUMN_DESCRIPTION, DATA_TYPE, SENSITIVE];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StructuralSummary {
    pub tables: u64,
    pub tables_named: u64,
    pub tables_described: u64,
    pub columns: u64,
    pub columns_named: u64,
    pub columns_described: u64,
    pub columns_typed: u64,
    pub columns_sensitive: u64,
}

impl StructuralSummary {
    /// Precomputed export counts win, then a `dataClasses` list under
    /// `structuralMetadata` (or `structuralMetadata` itself as a list), then
    /// a top-level `dataClasses` list, then a bare declared table count.
    pub fn from_record(record: &DatasetRecord) -> Self {
        if let Some(counts) = record
            .lookup("structuralMetadata")
            .and_then(|section| section.get(PRECOMPUTED_KEY))
            .and_then(Value::as_object)
        {
            let count = |name: &str| {
                counts
                    .get(&format!("{PRECOMPUTED_PREFIX}{name}"))
                    .or_else(|| counts.get(name))
                    .and_then(Value::as_u64)
                    .unwrap_or(0)
            };
            return Self {
                tables: count(TABLE_COUNT),
                tables_named: count(TABLE_NAME),
                tables_described: count(TABLE_DESCRIPTION),
                columns: count(COLUMN_COUNT),
                columns_named: count(COLUMN_NAME),
                columns_described: count(COLUMN_DESCRIPTION),
                columns_typed: count(DATA_TYPE),
                columns_sensitive: count(SENSITIVE),
            };
        }

        let classes = match record.lookup("structuralMetadata") {
            Some(Value::Array(classes)) => Some(classes),
            Some(Value::Object(section)) => section.get("dataClasses").and_then(Value::as_array),
            _ => None,
        }
        .or_else(|| record.lookup("dataClasses").and_then(Value::as_array));

        match classes {
            Some(classes) => Self::from_classes(classes),
            None => Self {
                tables: declared_table_count(record),
                ..Self::default()
            },
        }
    }

    pub fn from_classes(classes: &[Value]) -> Self {
        let mut summary = Self::default();
        for class in classes {
            summary.tables += 1;
            if text_len(class.get("label").or_else(|| class.get("name"))) >= NAME_MIN_CHARS {
                summary.tables_named += 1;
            }
            if text_len(class.get("description")) >= DESCRIPTION_MIN_CHARS {
                summary.tables_described += 1;
            }
            let elements = class
                .get("dataElements")
                .or_else(|| class.get("columns"))
                .and_then(Value::as_array);
            for element in elements.into_iter().flatten() {
                summary.columns += 1;
                if text_len(element.get("label").or_else(|| element.get("name")))
                    >= NAME_MIN_CHARS
                {
                    summary.columns_named += 1;
                }
                if text_len(element.get("description")) >= DESCRIPTION_MIN_CHARS {
                    summary.columns_described += 1;
                }
                if element.get(DATA_TYPE).is_some_and(non_empty) {
                    summary.columns_typed += 1;
                }
                if element
                    .get(SENSITIVE)
                    .is_some_and(|flag| !flag.is_null())
                {
                    summary.columns_sensitive += 1;
                }
            }
        }
        summary
    }

    /// Filled indicators keyed by `<prefix><attribute>`: the table count is
    /// 1 only when at least one table exists, children are fractions.
    pub fn completeness(&self, version: SchemaVersion) -> Vec<(String, f64)> {
        let prefix = version.structural_prefix();
        let key = |name: &str| format!("{prefix}{name}");
        vec![
            (key(TABLE_COUNT), flag(self.tables > 0)),
            (key(TABLE_NAME), ratio(self.tables_named, self.tables)),
            (key(TABLE_DESCRIPTION), ratio(self.tables_described, self.tables)),
            (key(COLUMN_COUNT), flag(self.columns > 0)),
            (key(COLUMN_NAME), ratio(self.columns_named, self.columns)),
            (key(COLUMN_DESCRIPTION), ratio(self.columns_described, self.columns)),
            (key(DATA_TYPE), ratio(self.columns_typed, self.columns)),
            (key(SENSITIVE), ratio(self.columns_sensitive, self.columns)),
        ]
    }

    /// Error indicators: the share of sub-elements lacking each property.
    /// No tables flags the table count and every child as fully erroneous;
    /// no columns does the same at column granularity.
    pub fn errors(&self, version: SchemaVersion) -> Vec<(String, f64)> {
        let prefix = version.structural_prefix();
        let key = |name: &str| format!("{prefix}{name}");
        let mut out = Vec::with_capacity(8);

        if self.tables == 0 {
            out.push((key(TABLE_COUNT), 1.0));
            out.extend(TABLE_CHILDREN.iter().map(|name| (key(name), 1.0)));
        } else {
            out.push((key(TABLE_COUNT), 0.0));
            out.push((key(TABLE_NAME), missing(self.tables_named, self.tables)));
            out.push((
                key(TABLE_DESCRIPTION),
                missing(self.tables_described, self.tables),
            ));
        }

        if self.columns == 0 {
            out.push((key(COLUMN_COUNT), 1.0));
            out.extend(COLUMN_CHILDREN.iter().map(|name| (key(name), 1.0)));
        } else {
            out.push((key(COLUMN_COUNT), 0.0));
            out.push((key(COLUMN_NAME), missing(self.columns_named, self.columns)));
            out.push((
                key(COLUMN_DESCRIPTION),
                missing(self.columns_described, self.columns),
            ));
            out.push((key(DATA_TYPE), missing(self.columns_typed, self.columns)));
            out.push((key(SENSITIVE), missing(self.columns_sensitive, self.columns)));
        }
        out
    }
}

/// Numeric `dataClassesCount` on the record, top-level (v1) or under
/// `structuralMetadata` (v2).
fn declared_table_count(record: &DatasetRecord) -> u64 {
    record
        .lookup(TABLE_COUNT)
        .or_else(|| record.lookup(&format!("{PRECOMPUTED_PREFIX}{TABLE_COUNT}")))
        .and_then(count_value)
        .unwrap_or(0)
}

pub(crate) fn count_value(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|n| *n > 0.0).map(|n| n as u64))
}

/// Whether `attribute` names the table count for `version`.
pub fn is_table_count(version: SchemaVersion, attribute: &str) -> bool {
    attribute.strip_prefix(version.structural_prefix()) == Some(TABLE_COUNT)
}

/// Whether `attribute` is one of the structural attributes for `version`.
pub fn is_structural(version: SchemaVersion, attribute: &str) -> bool {
    attribute
        .strip_prefix(version.structural_prefix())
        .is_some_and(|name| {
            [TABLE_COUNT, COLUMN_COUNT]
                .iter()
                .chain(TABLE_CHILDREN.iter())
                .chain(COLUMN_CHILDREN.iter())
                .any(|known| *known == name)
        })
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator.min(denominator) as f64 / denominator as f64
    }
}

fn missing(present: u64, total: u64) -> f64 {
    if total == 0 {
        1.0
    } else {
        (total - present.min(total)) as f64 / total as f64
    }
}

fn text_len(value: Option<&Value>) -> usize {
    match value {
        Some(Value::String(text)) => text.trim().chars().count(),
        Some(Value::Number(number)) => number.to_string().len(),
        _ => 0,
    }
}

fn non_empty(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(text) => !text.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}
