use crate::analyze::baseline;
use crate::error::Result;
use crate::schema::Schema;
use crate::types::rating::RatingBands;
use crate::types::rules::SpecialRules;
use crate::types::taxonomy::Taxonomy;
use crate::types::version::SchemaVersion;
use crate::types::weights::{AttributeWeights, WeightTable};
use serde_json::{Map, Value};

/// Immutable inputs of a scoring pass, validated once up front and shared
/// by every record.
#[derive(Debug, Clone)]
pub struct ScoringContext {
    pub version: SchemaVersion,
    pub taxonomy: Taxonomy,
    pub weights: AttributeWeights,
    pub schema: Schema,
    pub bands: RatingBands,
    pub rules: SpecialRules,
    pub baseline: Map<String, Value>,
}

impl ScoringContext {
    pub fn new(
        version: SchemaVersion,
        taxonomy: Taxonomy,
        weight_table: &WeightTable,
        schema: Schema,
        bands: RatingBands,
        rules: SpecialRules,
    ) -> Result<Self> {
        let weights = weight_table.scope(&taxonomy)?;
        let baseline = baseline::template(&taxonomy);
        Ok(Self {
            version,
            taxonomy,
            weights,
            schema,
            bands,
            rules,
            baseline,
        })
    }

    /// Taxonomy attributes whose top-level section the schema does not
    /// declare. Empty when the schema lists no properties at all.
    pub fn schema_drift(&self) -> Vec<String> {
        let declared = self.schema.property_names();
        if declared.is_empty() {
            return Vec::new();
        }
        self.taxonomy
            .attributes()
            .filter(|attribute| {
                let section = match self.version {
                    SchemaVersion::V1 => *attribute,
                    SchemaVersion::V2 => attribute.split('.').next().unwrap_or(*attribute),
                };
                !declared.contains(&section)
            })
            .map(str::to_string)
            .collect()
    }
}
