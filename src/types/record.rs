use crate::error::{QualityError, Result};
use crate::types::taxonomy::{Taxonomy, ID_KEY};
use crate::types::version::SchemaVersion;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Catalogue export: `{ "count": n, "dataModels": [...] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct Corpus {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(rename = "dataModels", default)]
    pub data_models: Vec<DatasetRecord>,
}

impl Corpus {
    pub fn from_json_str(content: &str) -> Result<Self> {
        let corpus: Corpus = serde_json::from_str(content)
            .map_err(|e| QualityError::Corpus(format!("invalid dataset corpus: {e}")))?;
        Ok(corpus)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordIdentity {
    pub id: String,
    pub pid: String,
    pub publisher: String,
    pub title: String,
}

/// One catalogue entry, kept as the untyped JSON tree it arrived as.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct DatasetRecord(Value);

impl DatasetRecord {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn id(&self) -> Option<String> {
        scalar_text(self.0.get(ID_KEY)?).filter(|id| !id.is_empty())
    }

    /// Dotted lookup through nested objects, e.g. `summary.publisher.name`.
    pub fn lookup(&self, dotted: &str) -> Option<&Value> {
        dotted
            .split('.')
            .try_fold(&self.0, |node, segment| node.get(segment))
    }

    pub fn identity(&self, version: SchemaVersion) -> Option<RecordIdentity> {
        let id = self.id()?;
        let pid = self.0.get("pid").and_then(scalar_text).unwrap_or_default();
        let (publisher, title) = match version {
            SchemaVersion::V1 => (self.text_at("publisher"), self.text_at("title")),
            SchemaVersion::V2 => {
                let name = self.text_at("summary.publisher.name");
                let member_of = self
                    .lookup("summary.publisher.memberOf")
                    .and_then(scalar_text);
                let publisher = match member_of {
                    Some(member_of) if !member_of.is_empty() => format!("{member_of} > {name}"),
                    _ => name,
                };
                (publisher, self.text_at("summary.title"))
            }
        };
        Some(RecordIdentity {
            id,
            pid,
            publisher,
            title,
        })
    }

    fn text_at(&self, dotted: &str) -> String {
        self.lookup(dotted).and_then(scalar_text).unwrap_or_default()
    }

    /// Attribute-keyed view of the record: top-level keys for v1, dotted
    /// paths through nested objects for v2. Arrays are leaves.
    pub fn flatten(&self, version: SchemaVersion) -> Map<String, Value> {
        let mut flat = Map::new();
        let Some(root) = self.0.as_object() else {
            return flat;
        };
        match version {
            SchemaVersion::V1 => {
                for (key, value) in root {
                    flat.insert(key.clone(), value.clone());
                }
            }
            SchemaVersion::V2 => {
                for (key, value) in root {
                    flatten_into(key, value, &mut flat);
                }
            }
        }
        flat
    }

    /// Copy of the record holding only what the taxonomy scores, for schema
    /// validation. v1 keeps taxonomy keys; v2 keeps the top-level sections
    /// that taxonomy paths start from.
    pub fn scoped(&self, version: SchemaVersion, taxonomy: &Taxonomy) -> Value {
        let Some(root) = self.0.as_object() else {
            return self.0.clone();
        };
        let keep = |key: &str| match version {
            SchemaVersion::V1 => key == ID_KEY || taxonomy.contains(key),
            SchemaVersion::V2 => {
                key == ID_KEY
                    || taxonomy
                        .attributes()
                        .any(|attribute| attribute.split('.').next() == Some(key))
            }
        };
        Value::Object(
            root.iter()
                .filter(|(key, _)| keep(key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }
}

fn flatten_into(prefix: &str, value: &Value, flat: &mut Map<String, Value>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                flatten_into(&format!("{prefix}.{key}"), child, flat);
            }
        }
        _ => {
            flat.insert(prefix.to_string(), value.clone());
        }
    }
}

pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
