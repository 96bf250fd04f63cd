use crate::error::{QualityError, Result};
use crate::types::rating::{RatingBand, RatingBands};
use crate::types::rules::SpecialRules;
use crate::types::taxonomy::{LevelSpec, Taxonomy};
use crate::types::version::SchemaVersion;
use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Deserialize)]
pub struct QualityConfig {
    pub project: ProjectConfig,
    pub inputs: InputsConfig,
    pub scoring: Option<ScoringConfig>,
    pub rating: Option<RatingConfig>,
    pub taxonomy: Option<TaxonomyConfig>,
    pub rules: Option<RulesConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default)]
    pub schema_version: SchemaVersion,
}

/// Paths are relative to the project root.
#[derive(Debug, Clone, Deserialize)]
pub struct InputsConfig {
    pub corpus: String,
    pub schema: String,
    pub weights: String,
    pub medallions: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    pub reporting_levels: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RatingConfig {
    #[serde(default)]
    pub band: Vec<RatingBand>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaxonomyConfig {
    #[serde(default)]
    pub level: Vec<LevelSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RulesConfig {
    pub identifier: Option<String>,
    pub periodicity: Option<String>,
    pub end_date: Option<String>,
    pub release_date: Option<String>,
    pub always_exempt: Option<Vec<String>>,
}

impl QualityConfig {
    pub fn version(&self) -> SchemaVersion {
        self.project.schema_version
    }

    fn inline_bands(&self) -> Option<&[RatingBand]> {
        self.rating
            .as_ref()
            .map(|rating| rating.band.as_slice())
            .filter(|bands| !bands.is_empty())
    }

    fn taxonomy_override(&self) -> Option<&[LevelSpec]> {
        self.taxonomy
            .as_ref()
            .map(|taxonomy| taxonomy.level.as_slice())
            .filter(|levels| !levels.is_empty())
    }

    /// Levels scored in a pass: the configured subset, else every level of a
    /// taxonomy override, else the built-in default set.
    pub fn reporting_levels(&self) -> Vec<String> {
        if let Some(levels) = self
            .scoring
            .as_ref()
            .and_then(|scoring| scoring.reporting_levels.clone())
        {
            return levels;
        }
        match self.taxonomy_override() {
            Some(levels) => levels.iter().map(|level| level.name.clone()).collect(),
            None => Taxonomy::default_reporting_levels(),
        }
    }

    /// Taxonomy narrowed to the reporting levels.
    pub fn taxonomy(&self) -> Result<Taxonomy> {
        let full = match self.taxonomy_override() {
            Some(levels) => Taxonomy::new(levels.to_vec())?,
            None => Taxonomy::builtin(self.version())?,
        };
        full.restrict(&self.reporting_levels())
    }

    pub fn rules(&self) -> SpecialRules {
        let mut rules = SpecialRules::builtin(self.version());
        if let Some(overrides) = &self.rules {
            if let Some(identifier) = &overrides.identifier {
                rules.identifier = Some(identifier.clone());
            }
            if let Some(periodicity) = &overrides.periodicity {
                rules.periodicity = periodicity.clone();
            }
            if let Some(end_date) = &overrides.end_date {
                rules.end_date = end_date.clone();
            }
            if let Some(release_date) = &overrides.release_date {
                rules.release_date = release_date.clone();
            }
            if let Some(always_exempt) = &overrides.always_exempt {
                rules.always_exempt = always_exempt.clone();
            }
        }
        rules
    }

    /// Fixed bands from `[[rating.band]]`, when configured.
    pub fn fixed_bands(&self) -> Option<Result<RatingBands>> {
        self.inline_bands()
            .map(|bands| RatingBands::new(bands.to_vec()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.project.name.trim().is_empty() {
            return Err(QualityError::ConfigParse(
                "project.name must be non-empty".to_string(),
            ));
        }

        for (key, value) in [
            ("inputs.corpus", &self.inputs.corpus),
            ("inputs.schema", &self.inputs.schema),
            ("inputs.weights", &self.inputs.weights),
        ] {
            if value.trim().is_empty() {
                return Err(QualityError::ConfigParse(format!("{key} must be non-empty")));
            }
        }
        if let Some(medallions) = &self.inputs.medallions {
            if medallions.trim().is_empty() {
                return Err(QualityError::ConfigParse(
                    "inputs.medallions must be non-empty when set".to_string(),
                ));
            }
            if self.inline_bands().is_some() {
                return Err(QualityError::ConfigParse(
                    "inputs.medallions and [[rating.band]] cannot both be set".to_string(),
                ));
            }
        }

        let levels = self.reporting_levels();
        if levels.is_empty() {
            return Err(QualityError::ConfigParse(
                "scoring.reporting_levels cannot be empty".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        let duplicates = levels
            .iter()
            .filter(|level| !seen.insert(level.as_str()))
            .cloned()
            .collect::<Vec<_>>();
        if !duplicates.is_empty() {
            return Err(QualityError::ConfigParse(format!(
                "scoring.reporting_levels contains duplicate level(s): {}",
                duplicates.join(", ")
            )));
        }

        if let Some(rules) = &self.rules {
            let named = [
                ("rules.identifier", &rules.identifier),
                ("rules.periodicity", &rules.periodicity),
                ("rules.end_date", &rules.end_date),
                ("rules.release_date", &rules.release_date),
            ];
            for (key, value) in named {
                if value.as_ref().is_some_and(|value| value.trim().is_empty()) {
                    return Err(QualityError::ConfigParse(format!(
                        "{key} must be non-empty when set"
                    )));
                }
            }
            if rules
                .always_exempt
                .as_ref()
                .is_some_and(|exempt| exempt.iter().any(|name| name.trim().is_empty()))
            {
                return Err(QualityError::ConfigParse(
                    "rules.always_exempt cannot contain empty names".to_string(),
                ));
            }
        }

        self.taxonomy()?;
        if let Some(bands) = self.fixed_bands() {
            bands?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::rating::Classifier;

    const MINIMAL: &str = r#"
[project]
name = "catalogue"

[inputs]
corpus = "data/datasets.json"
schema = "schema/2.0.1.json"
weights = "config/weights/v2.json"
"#;

    fn parse(content: &str) -> QualityConfig {
        toml::from_str(content).expect("config should parse")
    }

    #[test]
    fn parse_minimal_config() {
        let cfg = parse(MINIMAL);
        assert_eq!(cfg.project.name, "catalogue");
        assert_eq!(cfg.version(), SchemaVersion::V2);
        assert!(cfg.inputs.medallions.is_none());
        assert_eq!(cfg.reporting_levels().len(), 6);
        cfg.validate().expect("minimal config should validate");
    }

    #[test]
    fn parse_full_config() {
        let cfg = parse(
            r#"
[project]
name = "legacy"
schema_version = "v1"

[inputs]
corpus = "datasets.json"
schema = "schema.json"
weights = "weights.json"

[scoring]
reporting_levels = ["A: Summary", "E: Attribution"]

[[rating.band]]
label = "Not Rated"
min_excluding = 0.0
max_including = 50.0

[[rating.band]]
label = "Good"
min_excluding = 50.0
max_including = 100.0

[rules]
periodicity = "periodicity"
always_exempt = ["citations"]
"#,
        );
        cfg.validate().expect("full config should validate");
        let taxonomy = cfg.taxonomy().expect("taxonomy");
        assert_eq!(taxonomy.levels().len(), 2);
        assert!(taxonomy.contains("doi"));
        let bands = cfg
            .fixed_bands()
            .expect("bands configured")
            .expect("bands valid");
        assert_eq!(bands.classify(75.0), Some("Good"));
        assert_eq!(cfg.rules().always_exempt, vec!["citations".to_string()]);
        assert_eq!(cfg.rules().end_date, "datasetEndDate");
    }

    #[test]
    fn taxonomy_override_defaults_reporting_levels_to_its_own_levels() {
        let cfg = parse(&format!(
            "{MINIMAL}\n[[taxonomy.level]]\nname = \"Core\"\nattributes = [\"summary.title\", \"summary.abstract\"]\n"
        ));
        assert_eq!(cfg.reporting_levels(), vec!["Core".to_string()]);
        let taxonomy = cfg.taxonomy().expect("taxonomy");
        assert_eq!(taxonomy.attribute_count(), 2);
    }

    #[test]
    fn validate_rejects_unknown_reporting_level() {
        let cfg = parse(&format!(
            "{MINIMAL}\n[scoring]\nreporting_levels = [\"G: Other Metadata\"]\n"
        ));
        let err = cfg.validate().expect_err("v2 has no level G");
        assert!(err.to_string().contains("G: Other Metadata"));
    }

    #[test]
    fn validate_rejects_duplicate_reporting_levels() {
        let cfg = parse(&format!(
            "{MINIMAL}\n[scoring]\nreporting_levels = [\"A: Summary\", \"A: Summary\"]\n"
        ));
        let err = cfg.validate().expect_err("duplicate level should fail");
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn validate_rejects_medallions_and_inline_bands_together() {
        let cfg = parse(
            r#"
[project]
name = "catalogue"

[inputs]
corpus = "c.json"
schema = "s.json"
weights = "w.json"
medallions = "m.json"

[[rating.band]]
label = "All"
min_excluding = 0.0
max_including = 100.0
"#,
        );
        let err = cfg.validate().expect_err("both band sources should fail");
        assert!(err.to_string().contains("cannot both be set"));
    }

    #[test]
    fn validate_rejects_gapped_inline_bands() {
        let cfg = parse(&format!(
            "{MINIMAL}\n[[rating.band]]\nlabel = \"Low\"\nmin_excluding = 0.0\nmax_including = 40.0\n\n[[rating.band]]\nlabel = \"High\"\nmin_excluding = 60.0\nmax_including = 100.0\n"
        ));
        let err = cfg.validate().expect_err("gap should fail");
        assert!(err.is_configuration());
        assert!(err.to_string().contains("gap"));
    }

    #[test]
    fn validate_rejects_empty_input_paths_and_rule_names() {
        let cfg = parse(
            r#"
[project]
name = "catalogue"

[inputs]
corpus = ""
schema = "s.json"
weights = "w.json"
"#,
        );
        assert!(cfg
            .validate()
            .expect_err("empty corpus path should fail")
            .to_string()
            .contains("inputs.corpus"));

        let cfg = parse(&format!("{MINIMAL}\n[rules]\nend_date = \" \"\n"));
        assert!(cfg
            .validate()
            .expect_err("blank rule should fail")
            .to_string()
            .contains("rules.end_date"));
    }

    #[test]
    fn unknown_schema_version_fails_to_parse() {
        let parsed: std::result::Result<QualityConfig, _> = toml::from_str(
            r#"
[project]
name = "x"
schema_version = "v3"

[inputs]
corpus = "c"
schema = "s"
weights = "w"
"#,
        );
        assert!(parsed.is_err());
    }
}
