use crate::error::{QualityError, Result};
use crate::types::taxonomy::Taxonomy;
use serde_json::Value;
use std::collections::HashMap;

pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct LevelWeights {
    pub level: String,
    pub attributes: Vec<(String, f64)>,
}

/// Weight table as loaded from `{ "<level>": { "<attribute>": weight } }`.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightTable {
    levels: Vec<LevelWeights>,
}

impl WeightTable {
    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| QualityError::Weights(format!("invalid weight table JSON: {e}")))?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let root = value.as_object().ok_or_else(|| {
            QualityError::Weights("weight table must be a JSON object of levels".to_string())
        })?;

        let mut levels = Vec::with_capacity(root.len());
        let mut seen = HashMap::<String, String>::new();
        for (level, entries) in root {
            let entries = entries.as_object().ok_or_else(|| {
                QualityError::Weights(format!("weights.{level} must be an object of attributes"))
            })?;
            let mut attributes = Vec::with_capacity(entries.len());
            for (attribute, weight) in entries {
                let weight = weight.as_f64().ok_or_else(|| {
                    QualityError::Weights(format!("weights.{level}.{attribute} must be a number"))
                })?;
                if !(0.0..=1.0).contains(&weight) {
                    return Err(QualityError::Weights(format!(
                        "weights.{level}.{attribute} must be between 0.0 and 1.0 (found {weight})"
                    )));
                }
                if let Some(existing) = seen.insert(attribute.clone(), level.clone()) {
                    return Err(QualityError::Weights(format!(
                        "attribute '{attribute}' is weighted under both '{existing}' and '{level}'"
                    )));
                }
                attributes.push((attribute.clone(), weight));
            }
            levels.push(LevelWeights {
                level: level.clone(),
                attributes,
            });
        }

        Ok(Self { levels })
    }

    fn level(&self, name: &str) -> Option<&LevelWeights> {
        self.levels.iter().find(|level| level.level == name)
    }

    /// Checks the table against the scored levels of `taxonomy` and returns
    /// the per-attribute weights for the pass.
    ///
    /// Every scored attribute needs a weight under its own level, no scored
    /// level may carry weights for attributes the taxonomy does not know, and
    /// the scoped weights must sum to 1.0.
    pub fn scope(&self, taxonomy: &Taxonomy) -> Result<AttributeWeights> {
        let mut weights = HashMap::with_capacity(taxonomy.attribute_count());
        for level in taxonomy.levels() {
            let table_level = self.level(level.name()).ok_or_else(|| {
                QualityError::Weights(format!(
                    "weight table has no entry for reporting level '{}'",
                    level.name()
                ))
            })?;

            for (attribute, _) in &table_level.attributes {
                if taxonomy.owner_of(attribute) != Some(level.name()) {
                    return Err(QualityError::Weights(format!(
                        "weights.{}.{} does not name an attribute of that level",
                        level.name(),
                        attribute
                    )));
                }
            }

            for attribute in level.attributes() {
                let weight = table_level
                    .attributes
                    .iter()
                    .find(|(name, _)| name == attribute)
                    .map(|(_, weight)| *weight)
                    .ok_or_else(|| {
                        QualityError::Weights(format!(
                            "missing weight for attribute '{attribute}' in level '{}'",
                            level.name()
                        ))
                    })?;
                weights.insert(attribute.clone(), weight);
            }
        }

        let total: f64 = taxonomy
            .attributes()
            .filter_map(|attribute| weights.get(attribute))
            .sum();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(QualityError::Weights(format!(
                "scored weights must sum to 1.0 (found {total:.9})"
            )));
        }

        Ok(AttributeWeights {
            by_attribute: weights,
            total,
        })
    }
}

/// Weights of the attributes scored in one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeWeights {
    by_attribute: HashMap<String, f64>,
    total: f64,
}

impl AttributeWeights {
    pub fn get(&self, level: &str, attribute: &str) -> Result<f64> {
        self.by_attribute.get(attribute).copied().ok_or_else(|| {
            QualityError::Weights(format!(
                "missing weight for attribute '{attribute}' in level '{level}'"
            ))
        })
    }

    pub fn total(&self) -> f64 {
        self.total
    }
}
