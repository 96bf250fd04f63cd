use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Catalogue schema generation a corpus was exported against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVersion {
    /// Flat records, attributes are top-level keys.
    V1,
    /// Nested records, attributes live under dotted section paths.
    #[default]
    V2,
}

impl SchemaVersion {
    pub fn label(self) -> &'static str {
        match self {
            Self::V1 => "1.1.7",
            Self::V2 => "2.0.1",
        }
    }

    /// Prefix shared by the structural (table/column) attributes.
    pub fn structural_prefix(self) -> &'static str {
        match self {
            Self::V1 => "",
            Self::V2 => "structuralMetadata.",
        }
    }

    /// v2 uses truthiness: empty strings, empty collections, `false` and
    /// zero are unset. v1 only rejects nulls.
    pub fn is_present(self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => false,
            (Self::V1, _) => true,
            (Self::V2, Value::String(text)) => !text.trim().is_empty(),
            (Self::V2, Value::Array(items)) => !items.is_empty(),
            (Self::V2, Value::Object(map)) => !map.is_empty(),
            (Self::V2, Value::Bool(flag)) => *flag,
            (Self::V2, Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => f.write_str("v1"),
            Self::V2 => f.write_str("v2"),
        }
    }
}
