use crate::types::record::RecordIdentity;
use crate::types::version::SchemaVersion;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Measure {
    Completeness,
    Errors,
}

impl Measure {
    /// Per-level subtotal key in exported results.
    pub fn count_key(self) -> &'static str {
        match self {
            Self::Completeness => "filled_attributes",
            Self::Errors => "attributes_with_errors",
        }
    }

    pub fn weighted_key(self) -> &'static str {
        match self {
            Self::Completeness => "weighted_completeness",
            Self::Errors => "weighted_errors",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeScore {
    pub attribute: String,
    /// 1, 0, or a fraction for structural attributes.
    pub indicator: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelResult {
    pub level: String,
    pub attributes: Vec<AttributeScore>,
    pub count: usize,
    pub total: usize,
    pub weighted: f64,
}

/// Completeness or error findings of one record, aggregated per level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub measure: Measure,
    pub id: String,
    pub levels: Vec<LevelResult>,
    pub count: usize,
    pub total: usize,
    pub weighted: f64,
}

impl Assessment {
    pub fn indicator(&self, attribute: &str) -> Option<f64> {
        self.levels
            .iter()
            .flat_map(|level| level.attributes.iter())
            .find(|score| score.attribute == attribute)
            .map(|score| score.indicator)
    }

    pub fn level(&self, name: &str) -> Option<&LevelResult> {
        self.levels.iter().find(|level| level.level == name)
    }

    /// Export shape: one object per level holding the attribute indicators
    /// followed by the level subtotals.
    pub fn to_nested(&self) -> Map<String, Value> {
        let mut out = Map::new();
        out.insert("id".to_string(), json!(self.id));
        for level in &self.levels {
            let mut entry = Map::new();
            for score in &level.attributes {
                entry.insert(score.attribute.clone(), indicator_value(score.indicator));
            }
            entry.insert(self.measure.count_key().to_string(), json!(level.count));
            entry.insert("total_attributes".to_string(), json!(level.total));
            entry.insert(self.measure.weighted_key().to_string(), json!(level.weighted));
            out.insert(level.level.clone(), Value::Object(entry));
        }
        out.insert(self.measure.count_key().to_string(), json!(self.count));
        out.insert("total_attributes".to_string(), json!(self.total));
        out.insert(self.measure.weighted_key().to_string(), json!(self.weighted));
        out
    }
}

/// Whole indicators export as integers so they read as 0/1 flags.
fn indicator_value(indicator: f64) -> Value {
    if indicator.fract() == 0.0 && (0.0..=1.0).contains(&indicator) {
        json!(indicator as u8)
    } else {
        json!(indicator)
    }
}

/// One summary row per scored record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualitySummary {
    pub schema_version: String,
    pub id: String,
    pub pid: String,
    pub publisher: String,
    pub title: String,
    pub completeness_percent: f64,
    pub weighted_completeness_percent: f64,
    pub error_percent: f64,
    pub weighted_error_percent: f64,
    pub quality_score: f64,
    pub quality_rating: String,
    pub weighted_quality_score: f64,
    pub weighted_quality_rating: String,
}

impl QualitySummary {
    pub const HEADERS: [&'static str; 13] = [
        "schema_version",
        "id",
        "pid",
        "publisher",
        "title",
        "completeness_percent",
        "weighted_completeness_percent",
        "error_percent",
        "weighted_error_percent",
        "quality_score",
        "quality_rating",
        "weighted_quality_score",
        "weighted_quality_rating",
    ];

    pub fn blank(version: SchemaVersion, identity: &RecordIdentity) -> Self {
        Self {
            schema_version: version.label().to_string(),
            id: identity.id.clone(),
            pid: identity.pid.clone(),
            publisher: identity.publisher.clone(),
            title: identity.title.clone(),
            completeness_percent: 0.0,
            weighted_completeness_percent: 0.0,
            error_percent: 0.0,
            weighted_error_percent: 0.0,
            quality_score: 0.0,
            quality_rating: String::new(),
            weighted_quality_score: 0.0,
            weighted_quality_rating: String::new(),
        }
    }
}

/// Per-attribute line of a score explanation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainRow {
    pub attribute: String,
    pub level: String,
    pub weight: f64,
    pub value: String,
    pub completeness: f64,
    pub error: f64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordScore {
    pub identity: RecordIdentity,
    pub summary: QualitySummary,
    pub completeness: Assessment,
    pub errors: Assessment,
    /// Violation messages per attribute, in validation order.
    pub messages: BTreeMap<String, Vec<String>>,
    pub unattributed_violations: usize,
    pub explain: Vec<ExplainRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreRun {
    pub records: Vec<RecordScore>,
    pub skipped: usize,
    pub unattributed_violations: usize,
}

impl ScoreRun {
    pub fn summaries(&self) -> Vec<&QualitySummary> {
        self.records.iter().map(|record| &record.summary).collect()
    }

    pub fn find(&self, id: &str) -> Option<&RecordScore> {
        self.records.iter().find(|record| record.identity.id == id)
    }
}
