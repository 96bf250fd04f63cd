use crate::error::{QualityError, Result};
use crate::types::version::SchemaVersion;
use serde::Deserialize;
use std::collections::HashMap;

pub const ID_KEY: &str = "id";

const V1_LEVELS: &[(&str, &[&str])] = &[
    (
        "A: Summary",
        &[
            "identifier",
            "title",
            "abstract",
            "publisher",
            "contactPoint",
            "accessRights",
            "group",
        ],
    ),
    (
        "B: Business",
        &[
            "description",
            "releaseDate",
            "accessRequestCost",
            "accessRequestDuration",
            "dataController",
            "dataProcessor",
            "license",
            "usageRestriction",
            "derivedDatasets",
            "linkedDataset",
        ],
    ),
    (
        "C: Coverage & Detail",
        &[
            "geographicCoverage",
            "periodicity",
            "datasetEndDate",
            "datasetStartDate",
            "jurisdiction",
            "populationType",
            "statisticalPopulation",
            "ageBand",
            "physicalSampleAvailability",
            "keywords",
        ],
    ),
    (
        "D: Format & Structure",
        &[
            "conformsTo",
            "controlledVocabulary",
            "language",
            "format",
            "fileSize",
        ],
    ),
    ("E: Attribution", &["creator", "citations", "doi"]),
    (
        "F: Technical Metadata",
        &[
            "dataClassesCount",
            "tableName",
            "tableDescription",
            "columnName",
            "columnDescription",
            "dataType",
            "sensitive",
        ],
    ),
    (
        "G: Other Metadata",
        &[
            "purpose",
            "source",
            "setting",
            "accessEnvironment",
            "linkageOpportunity",
            "disambiguatingDescription",
        ],
    ),
];

const V2_LEVELS: &[(&str, &[&str])] = &[
    (
        "A: Summary",
        &[
            "identifier",
            "summary.title",
            "summary.abstract",
            "summary.publisher.name",
            "summary.publisher.memberOf",
            "summary.contactPoint",
            "summary.keywords",
            "summary.doiName",
        ],
    ),
    (
        "B: Business",
        &[
            "documentation.description",
            "documentation.associatedMedia",
            "documentation.isPartOf",
            "accessibility.usage.dataUseLimitation",
            "accessibility.usage.dataUseRequirements",
            "accessibility.usage.resourceCreator",
            "accessibility.usage.investigations",
            "accessibility.usage.isReferencedBy",
            "accessibility.access.accessRights",
            "accessibility.access.accessService",
            "accessibility.access.accessRequestCost",
            "accessibility.access.deliveryLeadTime",
            "accessibility.access.jurisdiction",
            "accessibility.access.dataController",
            "accessibility.access.dataProcessor",
        ],
    ),
    (
        "C: Coverage & Detail",
        &[
            "coverage.spatial",
            "coverage.typicalAgeRange",
            "coverage.physicalSampleAvailability",
            "coverage.followup",
            "coverage.pathway",
            "provenance.origin.purpose",
            "provenance.origin.source",
            "provenance.origin.collectionSituation",
            "provenance.temporal.accrualPeriodicity",
            "provenance.temporal.distributionReleaseDate",
            "provenance.temporal.startDate",
            "provenance.temporal.endDate",
            "provenance.temporal.timeLag",
        ],
    ),
    (
        "D: Format & Structure",
        &[
            "accessibility.formatAndStandards.vocabularyEncodingScheme",
            "accessibility.formatAndStandards.conformsTo",
            "accessibility.formatAndStandards.language",
            "accessibility.formatAndStandards.format",
        ],
    ),
    (
        "E: Attribution",
        &[
            "enrichmentAndLinkage.qualifiedRelation",
            "enrichmentAndLinkage.derivation",
            "enrichmentAndLinkage.tools",
        ],
    ),
    (
        "F: Technical Metadata",
        &[
            "structuralMetadata.dataClassesCount",
            "structuralMetadata.tableName",
            "structuralMetadata.tableDescription",
            "structuralMetadata.dataElementsCount",
            "structuralMetadata.columnName",
            "structuralMetadata.columnDescription",
            "structuralMetadata.dataType",
            "structuralMetadata.sensitive",
        ],
    ),
];

const DEFAULT_REPORTING_LEVELS: [&str; 6] = [
    "A: Summary",
    "B: Business",
    "C: Coverage & Detail",
    "D: Format & Structure",
    "E: Attribution",
    "F: Technical Metadata",
];

/// Level definition as written in `[[taxonomy.level]]` config tables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LevelSpec {
    pub name: String,
    pub attributes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportingLevel {
    name: String,
    attributes: Vec<String>,
}

impl ReportingLevel {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }
}

/// Reporting levels and the attributes each of them owns.
///
/// Construction rejects duplicate attributes across levels: per-level
/// accounting is only meaningful when every attribute has exactly one owner.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    levels: Vec<ReportingLevel>,
    owners: HashMap<String, usize>,
}

impl Taxonomy {
    pub fn new(specs: Vec<LevelSpec>) -> Result<Self> {
        if specs.is_empty() {
            return Err(QualityError::Taxonomy(
                "taxonomy must define at least one reporting level".to_string(),
            ));
        }

        let mut levels = Vec::with_capacity(specs.len());
        let mut owners = HashMap::<String, usize>::new();
        for (index, spec) in specs.into_iter().enumerate() {
            let name = spec.name.trim().to_string();
            if name.is_empty() {
                return Err(QualityError::Taxonomy(
                    "reporting level names must be non-empty".to_string(),
                ));
            }
            if levels
                .iter()
                .any(|level: &ReportingLevel| level.name == name)
            {
                return Err(QualityError::Taxonomy(format!(
                    "reporting level '{name}' is defined more than once"
                )));
            }
            if spec.attributes.is_empty() {
                return Err(QualityError::Taxonomy(format!(
                    "reporting level '{name}' has no attributes"
                )));
            }
            for attribute in &spec.attributes {
                if attribute.trim().is_empty() {
                    return Err(QualityError::Taxonomy(format!(
                        "reporting level '{name}' contains an empty attribute name"
                    )));
                }
                if attribute == ID_KEY {
                    return Err(QualityError::Taxonomy(format!(
                        "reporting level '{name}' cannot own the reserved '{ID_KEY}' key"
                    )));
                }
                if let Some(existing) = owners.get(attribute) {
                    let existing_name: &str = if *existing == index {
                        &name
                    } else {
                        &levels[*existing].name
                    };
                    return Err(QualityError::Taxonomy(format!(
                        "attribute '{attribute}' cannot appear in both '{existing_name}' and '{name}'"
                    )));
                }
                owners.insert(attribute.clone(), index);
            }
            levels.push(ReportingLevel {
                name,
                attributes: spec.attributes,
            });
        }

        Ok(Self { levels, owners })
    }

    pub fn builtin(version: SchemaVersion) -> Result<Self> {
        let table = match version {
            SchemaVersion::V1 => V1_LEVELS,
            SchemaVersion::V2 => V2_LEVELS,
        };
        Self::new(
            table
                .iter()
                .map(|(name, attributes)| LevelSpec {
                    name: (*name).to_string(),
                    attributes: attributes.iter().map(|a| (*a).to_string()).collect(),
                })
                .collect(),
        )
    }

    pub fn default_reporting_levels() -> Vec<String> {
        DEFAULT_REPORTING_LEVELS
            .iter()
            .map(|level| (*level).to_string())
            .collect()
    }

    /// Narrows the taxonomy to `levels`, in the order given.
    pub fn restrict(&self, levels: &[String]) -> Result<Self> {
        let mut specs = Vec::with_capacity(levels.len());
        for name in levels {
            let level = self.level(name).ok_or_else(|| {
                QualityError::Taxonomy(format!("unknown reporting level: {name}"))
            })?;
            specs.push(LevelSpec {
                name: level.name.clone(),
                attributes: level.attributes.clone(),
            });
        }
        Self::new(specs)
    }

    pub fn levels(&self) -> &[ReportingLevel] {
        &self.levels
    }

    pub fn level(&self, name: &str) -> Option<&ReportingLevel> {
        self.levels.iter().find(|level| level.name == name)
    }

    pub fn owner_of(&self, attribute: &str) -> Option<&str> {
        self.owners
            .get(attribute)
            .map(|index| self.levels[*index].name.as_str())
    }

    pub fn contains(&self, attribute: &str) -> bool {
        self.owners.contains_key(attribute)
    }

    /// Every attribute, in level order.
    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.levels
            .iter()
            .flat_map(|level| level.attributes.iter().map(String::as_str))
    }

    pub fn attribute_count(&self) -> usize {
        self.owners.len()
    }
}
