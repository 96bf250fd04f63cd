use crate::error::{QualityError, Result};
use crate::types::version::SchemaVersion;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const NOT_RATED: &str = "Not Rated";

const BOUNDARY_TOLERANCE: f64 = 1e-9;

/// One tier: scores in `(min_excluding, max_including]` get `label`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingBand {
    pub label: String,
    pub min_excluding: f64,
    pub max_including: f64,
}

impl RatingBand {
    pub fn new(label: &str, min_excluding: f64, max_including: f64) -> Self {
        Self {
            label: label.to_string(),
            min_excluding,
            max_including,
        }
    }

    fn contains(&self, score: f64) -> bool {
        self.min_excluding < score && score <= self.max_including
    }
}

pub trait Classifier {
    fn classify(&self, score: f64) -> Option<&str>;

    fn rating(&self, score: f64) -> String {
        self.classify(score).unwrap_or(NOT_RATED).to_string()
    }
}

/// Ordered, validated tier bands.
///
/// The bands must partition `[0, 100]`: contiguous, non-overlapping, with the
/// lowest band also closed at its lower bound so a score of 0 is rated.
/// Bands are evaluated in the order they were supplied.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingBands {
    bands: Vec<RatingBand>,
    floor: f64,
}

impl RatingBands {
    pub fn new(bands: Vec<RatingBand>) -> Result<Self> {
        if bands.is_empty() {
            return Err(QualityError::RatingBands(
                "at least one rating band is required".to_string(),
            ));
        }

        for (index, band) in bands.iter().enumerate() {
            if band.label.trim().is_empty() {
                return Err(QualityError::RatingBands(
                    "rating band labels must be non-empty".to_string(),
                ));
            }
            if bands[..index].iter().any(|other| other.label == band.label) {
                return Err(QualityError::RatingBands(format!(
                    "rating band '{}' is defined more than once",
                    band.label
                )));
            }
            if !band.min_excluding.is_finite()
                || !band.max_including.is_finite()
                || band.min_excluding >= band.max_including
            {
                return Err(QualityError::RatingBands(format!(
                    "rating band '{}' must have min < max (found {} .. {})",
                    band.label, band.min_excluding, band.max_including
                )));
            }
        }

        let mut sorted: Vec<&RatingBand> = bands.iter().collect();
        sorted.sort_by(|a, b| a.min_excluding.total_cmp(&b.min_excluding));

        let floor = sorted[0].min_excluding;
        if floor > 0.0 {
            return Err(QualityError::RatingBands(format!(
                "rating bands leave a gap below {floor} (lowest band '{}')",
                sorted[0].label
            )));
        }
        for pair in sorted.windows(2) {
            let (lower, upper) = (pair[0], pair[1]);
            let delta = upper.min_excluding - lower.max_including;
            if delta > BOUNDARY_TOLERANCE {
                return Err(QualityError::RatingBands(format!(
                    "rating bands leave a gap between '{}' and '{}' ({} .. {})",
                    lower.label, upper.label, lower.max_including, upper.min_excluding
                )));
            }
            if delta < -BOUNDARY_TOLERANCE {
                return Err(QualityError::RatingBands(format!(
                    "rating bands '{}' and '{}' overlap",
                    lower.label, upper.label
                )));
            }
        }
        let ceiling = sorted[sorted.len() - 1];
        if ceiling.max_including < 100.0 {
            return Err(QualityError::RatingBands(format!(
                "rating bands leave a gap above {} (highest band '{}')",
                ceiling.max_including, ceiling.label
            )));
        }

        Ok(Self { bands, floor })
    }

    /// Reads a medallion table: `{ "<label>": { "min excluding": x, "max including": y } }`.
    pub fn from_medallion_table(value: &Value) -> Result<Self> {
        let table = value.as_object().ok_or_else(|| {
            QualityError::RatingBands("medallion table must be a JSON object".to_string())
        })?;

        let mut bands = Vec::with_capacity(table.len());
        for (label, rules) in table {
            let bound = |key: &str| {
                rules.get(key).and_then(Value::as_f64).ok_or_else(|| {
                    QualityError::RatingBands(format!(
                        "medallion '{label}' needs a numeric '{key}'"
                    ))
                })
            };
            bands.push(RatingBand::new(
                label,
                bound("min excluding")?,
                bound("max including")?,
            ));
        }
        Self::new(bands)
    }

    pub fn from_medallion_str(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| QualityError::RatingBands(format!("invalid medallion JSON: {e}")))?;
        Self::from_medallion_table(&value)
    }

    pub fn builtin(version: SchemaVersion) -> Self {
        let bands = match version {
            SchemaVersion::V1 => vec![
                RatingBand::new(NOT_RATED, 0.0, 50.0),
                RatingBand::new("Bronze", 50.0, 70.0),
                RatingBand::new("Silver", 70.0, 85.0),
                RatingBand::new("Gold", 85.0, 100.0),
            ],
            SchemaVersion::V2 => vec![
                RatingBand::new(NOT_RATED, 0.0, 50.0),
                RatingBand::new("Bronze", 50.0, 70.0),
                RatingBand::new("Silver", 70.0, 80.0),
                RatingBand::new("Gold", 80.0, 90.0),
                RatingBand::new("Platinum", 90.0, 100.0),
            ],
        };
        Self { bands, floor: 0.0 }
    }

    pub fn bands(&self) -> &[RatingBand] {
        &self.bands
    }
}

impl Classifier for RatingBands {
    fn classify(&self, score: f64) -> Option<&str> {
        self.bands
            .iter()
            .find(|band| {
                band.contains(score)
                    || (score == self.floor && band.min_excluding == self.floor)
            })
            .map(|band| band.label.as_str())
    }
}
