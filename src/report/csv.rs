use serde_json::{Map, Value};

/// RFC 4180 style CSV with a header line. Missing cells are empty.
pub fn to_csv(headers: &[String], rows: &[Map<String, Value>]) -> String {
    let mut output = String::new();
    push_line(&mut output, headers.iter().map(|header| escape(header)));
    for row in rows {
        push_line(
            &mut output,
            headers
                .iter()
                .map(|header| escape(&cell(row.get(header)))),
        );
    }
    output
}

fn push_line(output: &mut String, cells: impl Iterator<Item = String>) {
    output.push_str(&cells.collect::<Vec<_>>().join(","));
    output.push('\n');
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn escape(text: &str) -> String {
    if text.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}
