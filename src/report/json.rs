use crate::types::result::{Measure, RecordScore, ScoreRun};
use serde_json::{json, Value};

pub fn summaries_to_json(run: &ScoreRun) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&run.summaries())
}

/// Nested per-record results; error results also carry the violation
/// messages and the unattributed count.
pub fn results_to_json(run: &ScoreRun, measure: Measure) -> Result<String, serde_json::Error> {
    let records: Vec<Value> = run
        .records
        .iter()
        .map(|record| match measure {
            Measure::Completeness => Value::Object(record.completeness.to_nested()),
            Measure::Errors => {
                let mut nested = record.errors.to_nested();
                nested.insert("messages".to_string(), json!(record.messages));
                nested.insert(
                    "unattributed_violations".to_string(),
                    json!(record.unattributed_violations),
                );
                Value::Object(nested)
            }
        })
        .collect();
    serde_json::to_string_pretty(&records)
}

pub fn explain_to_json(record: &RecordScore) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({
        "summary": record.summary,
        "attributes": record.explain,
    }))
}
