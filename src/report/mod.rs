pub mod csv;
pub mod flatten;
pub mod json;
pub mod md;

use crate::error::Result;
use crate::types::result::{Measure, QualitySummary, RecordScore, ScoreRun};
use flatten::{flatten_row, HeaderSet};
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Md,
    Csv,
}

/// Quality summary rows.
pub fn render(run: &ScoreRun, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(json::summaries_to_json(run)?),
        OutputFormat::Md => Ok(md::summaries_to_markdown(run)),
        OutputFormat::Csv => {
            let headers: Vec<String> = QualitySummary::HEADERS
                .iter()
                .map(|header| (*header).to_string())
                .collect();
            let rows = run
                .summaries()
                .into_iter()
                .map(|summary| match serde_json::to_value(summary)? {
                    Value::Object(map) => Ok(map),
                    _ => Ok(Map::new()),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(csv::to_csv(&headers, &rows))
        }
    }
}

/// Completeness or error result sets. Tabular formats use the flattened
/// rows over the header superset of all records.
pub fn render_results(run: &ScoreRun, measure: Measure, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(json::results_to_json(run, measure)?);
    }

    let mut headers = HeaderSet::default();
    let rows: Vec<Map<String, Value>> = run
        .records
        .iter()
        .map(|record| {
            let mut nested = match measure {
                Measure::Completeness => record.completeness.to_nested(),
                Measure::Errors => record.errors.to_nested(),
            };
            if measure == Measure::Errors {
                nested.insert(
                    "unattributed_violations".to_string(),
                    json!(record.unattributed_violations),
                );
            }
            let row = flatten_row(&nested);
            headers.extend_from(&row);
            row
        })
        .collect();

    Ok(match format {
        OutputFormat::Md => md_table(headers.headers(), &rows),
        _ => csv::to_csv(headers.headers(), &rows),
    })
}

pub fn render_explain(record: &RecordScore, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(json::explain_to_json(record)?),
        OutputFormat::Md => Ok(md::explain_to_markdown(record)),
        OutputFormat::Csv => {
            let headers: Vec<String> = [
                "attribute",
                "level",
                "weight",
                "value",
                "completeness",
                "error",
                "message",
            ]
            .iter()
            .map(|header| (*header).to_string())
            .collect();
            let rows = record
                .explain
                .iter()
                .map(|row| match serde_json::to_value(row)? {
                    Value::Object(map) => Ok(map),
                    _ => Ok(Map::new()),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(csv::to_csv(&headers, &rows))
        }
    }
}

fn md_table(headers: &[String], rows: &[Map<String, Value>]) -> String {
    let mut output = format!("| {} |\n", headers.join(" | "));
    output.push_str(&format!("|{}\n", "---|".repeat(headers.len())));
    for row in rows {
        let cells: Vec<String> = headers
            .iter()
            .map(|header| match row.get(header) {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(text)) => text.replace('|', "\\|"),
                Some(other) => other.to_string(),
            })
            .collect();
        output.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    output
}
