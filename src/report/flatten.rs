use serde_json::{Map, Value};
use std::collections::HashSet;

/// Flattens one nested result into a tabular row.
///
/// The first attribute of a level is keyed `"{level}, {attribute}"`, the
/// rest `"{level[..2]} {attribute}"`. Downstream spreadsheets match on these
/// exact headers. Scalar keys pass through unchanged.
pub fn flatten_row(nested: &Map<String, Value>) -> Map<String, Value> {
    let mut row = Map::new();
    for (key, value) in nested {
        match value {
            Value::Object(children) => {
                let abbreviation: String = key.chars().take(2).collect();
                for (index, (child, child_value)) in children.iter().enumerate() {
                    let header = if index == 0 {
                        format!("{key}, {child}")
                    } else {
                        format!("{abbreviation} {child}")
                    };
                    row.insert(header, child_value.clone());
                }
            }
            _ => {
                row.insert(key.clone(), value.clone());
            }
        }
    }
    row
}

/// Union of row headers in first-seen order.
#[derive(Debug, Default)]
pub struct HeaderSet {
    headers: Vec<String>,
    seen: HashSet<String>,
}

impl HeaderSet {
    pub fn extend_from(&mut self, row: &Map<String, Value>) {
        for key in row.keys() {
            if self.seen.insert(key.clone()) {
                self.headers.push(key.clone());
            }
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}
