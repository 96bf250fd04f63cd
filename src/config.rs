use crate::analyze::context::ScoringContext;
use crate::error::{QualityError, Result};
use crate::schema::Schema;
use crate::types::config::QualityConfig;
use crate::types::rating::RatingBands;
use crate::types::record::Corpus;
use crate::types::weights::WeightTable;
use std::path::{Path, PathBuf};
use toml::map::Map;
use toml::Value;
use tracing::{debug, info};

pub const DEFAULT_CONFIG_FILE: &str = "metaqual.toml";
pub const DEFAULT_LOCAL_FILE: &str = ".metaqual/local.toml";
pub const DEFAULT_GLOBAL_CONFIG_FILE: &str = ".config/metaqual/config.toml";

pub fn load_config(root: &Path) -> Result<Option<QualityConfig>> {
    let global = std::env::var_os("HOME")
        .map(PathBuf::from)
        .map(|home| home.join(DEFAULT_GLOBAL_CONFIG_FILE));
    load_config_with_global(root, global.as_deref())
}

pub(crate) fn load_config_with_global(
    root: &Path,
    global_path: Option<&Path>,
) -> Result<Option<QualityConfig>> {
    let repo_path = root.join(DEFAULT_CONFIG_FILE);
    if !repo_path.exists() {
        return Ok(None);
    }

    let mut merged = Value::Table(Map::new());
    if let Some(path) = global_path {
        merge_file_if_exists(&mut merged, path)?;
    }
    merge_file_if_exists(&mut merged, &repo_path)?;
    merge_file_if_exists(&mut merged, &root.join(DEFAULT_LOCAL_FILE))?;

    let cfg: QualityConfig = merged
        .try_into()
        .map_err(|e: toml::de::Error| QualityError::ConfigParse(e.to_string()))?;
    Ok(Some(cfg))
}

/// Loads and validates the merged configuration; a missing repo file is an
/// error here.
pub fn require_config(root: &Path) -> Result<QualityConfig> {
    if !root.exists() {
        return Err(QualityError::PathNotFound(root.display().to_string()));
    }
    let cfg = load_config(root)?.ok_or_else(|| {
        QualityError::ConfigNotFound(root.join(DEFAULT_CONFIG_FILE).display().to_string())
    })?;
    cfg.validate()?;
    Ok(cfg)
}

/// Reads the schema, weight table and rating bands named by `cfg` and
/// checks them against the taxonomy before any record is scored.
pub fn load_context(root: &Path, cfg: &QualityConfig) -> Result<ScoringContext> {
    let version = cfg.version();
    let taxonomy = cfg.taxonomy()?;

    let schema_path = resolve_input(root, &cfg.inputs.schema)?;
    let schema = Schema::from_json_str(&std::fs::read_to_string(&schema_path)?)
        .map_err(|e| with_path(e, &schema_path))?;

    let weights_path = resolve_input(root, &cfg.inputs.weights)?;
    let weights = WeightTable::from_json_str(&std::fs::read_to_string(&weights_path)?)
        .map_err(|e| with_path(e, &weights_path))?;

    let bands = match (&cfg.inputs.medallions, cfg.fixed_bands()) {
        (Some(medallions), _) => {
            let path = resolve_input(root, medallions)?;
            RatingBands::from_medallion_str(&std::fs::read_to_string(&path)?)
                .map_err(|e| with_path(e, &path))?
        }
        (None, Some(bands)) => bands?,
        (None, None) => RatingBands::builtin(version),
    };

    let ctx = ScoringContext::new(version, taxonomy, &weights, schema, bands, cfg.rules())?;
    info!(
        version = %version,
        levels = ctx.taxonomy.levels().len(),
        attributes = ctx.taxonomy.attribute_count(),
        bands = ctx.bands.bands().len(),
        "loaded scoring inputs"
    );
    Ok(ctx)
}

pub fn load_corpus(root: &Path, cfg: &QualityConfig) -> Result<Corpus> {
    let path = resolve_input(root, &cfg.inputs.corpus)?;
    let corpus = Corpus::from_json_str(&std::fs::read_to_string(&path)?)
        .map_err(|e| with_path(e, &path))?;
    debug!(
        path = %path.display(),
        records = corpus.data_models.len(),
        declared = ?corpus.count,
        "loaded corpus"
    );
    Ok(corpus)
}

fn resolve_input(root: &Path, relative: &str) -> Result<PathBuf> {
    let path = root.join(relative);
    if !path.exists() {
        return Err(QualityError::PathNotFound(path.display().to_string()));
    }
    Ok(path)
}

fn with_path(error: QualityError, path: &Path) -> QualityError {
    let at = |message: String| format!("{}: {message}", path.display());
    match error {
        QualityError::Schema(message) => QualityError::Schema(at(message)),
        QualityError::Weights(message) => QualityError::Weights(at(message)),
        QualityError::RatingBands(message) => QualityError::RatingBands(at(message)),
        QualityError::Corpus(message) => QualityError::Corpus(at(message)),
        other => other,
    }
}

fn merge_file_if_exists(merged: &mut Value, path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    let value = read_toml_value(path)?;
    merge_toml(merged, value);
    Ok(())
}

fn read_toml_value(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| QualityError::ConfigParse(format!("{}: {}", path.display(), e)))
}

fn merge_toml(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Table(base_table), Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => {
            *slot = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::rating::Classifier;
    use crate::types::version::SchemaVersion;
    use std::fs;
    use tempfile::TempDir;

    const REPO_CONFIG: &str = r#"
[project]
name = "catalogue"
schema_version = "v2"

[inputs]
corpus = "data/datasets.json"
schema = "schema.json"
weights = "weights.json"
"#;

    fn write_inputs(root: &Path) {
        fs::create_dir_all(root.join("data")).expect("data dir should create");
        fs::write(
            root.join("data/datasets.json"),
            r#"{ "count": 1, "dataModels": [ { "id": "r1", "summary": { "title": "T" } } ] }"#,
        )
        .expect("corpus should write");
        fs::write(
            root.join("schema.json"),
            r#"{ "type": "object", "properties": { "summary": { "type": "object" } } }"#,
        )
        .expect("schema should write");
        fs::write(
            root.join("weights.json"),
            r#"{ "Core": { "summary.title": 0.75, "summary.abstract": 0.25 } }"#,
        )
        .expect("weights should write");
    }

    fn custom_taxonomy() -> &'static str {
        "\n[[taxonomy.level]]\nname = \"Core\"\nattributes = [\"summary.title\", \"summary.abstract\"]\n"
    }

    #[test]
    fn load_config_returns_none_when_repo_file_missing() {
        let dir = TempDir::new().expect("temp dir should be created");
        let cfg = load_config_with_global(dir.path(), None).expect("load should not fail");
        assert!(cfg.is_none());
    }

    #[test]
    fn load_config_merges_global_repo_and_local_in_order() {
        let root = TempDir::new().expect("root temp dir should be created");
        let global_root = TempDir::new().expect("global temp dir should be created");
        let global_path = global_root.path().join("config.toml");

        fs::write(
            &global_path,
            r#"
[project]
name = "global"
schema_version = "v1"

[scoring]
reporting_levels = ["A: Summary"]
"#,
        )
        .expect("global config should write");

        fs::write(root.path().join(DEFAULT_CONFIG_FILE), REPO_CONFIG)
            .expect("repo config should write");

        fs::create_dir_all(root.path().join(".metaqual")).expect("local dir should create");
        fs::write(
            root.path().join(DEFAULT_LOCAL_FILE),
            r#"
[inputs]
weights = "weights.local.json"
"#,
        )
        .expect("local override should write");

        let cfg = load_config_with_global(root.path(), Some(&global_path))
            .expect("load should succeed")
            .expect("merged config should exist");

        assert_eq!(cfg.project.name, "catalogue");
        assert_eq!(cfg.version(), SchemaVersion::V2);
        assert_eq!(cfg.inputs.weights, "weights.local.json");
        assert_eq!(cfg.inputs.corpus, "data/datasets.json");
        assert_eq!(cfg.reporting_levels(), vec!["A: Summary".to_string()]);
    }

    #[test]
    fn malformed_toml_is_a_configuration_error() {
        let root = TempDir::new().expect("temp dir should be created");
        fs::write(root.path().join(DEFAULT_CONFIG_FILE), "[project\nname = 1")
            .expect("config should write");
        let err = load_config_with_global(root.path(), None).expect_err("parse should fail");
        assert!(err.is_configuration());
        assert!(err.to_string().contains(DEFAULT_CONFIG_FILE));
    }

    #[test]
    fn require_config_reports_missing_file() {
        let root = TempDir::new().expect("temp dir should be created");
        let err = require_config(root.path()).expect_err("missing config should fail");
        assert!(matches!(err, QualityError::ConfigNotFound(_)));
    }

    #[test]
    fn load_context_and_corpus_from_relative_paths() {
        let root = TempDir::new().expect("temp dir should be created");
        write_inputs(root.path());
        let cfg: QualityConfig =
            toml::from_str(&format!("{REPO_CONFIG}{}", custom_taxonomy())).expect("config");
        cfg.validate().expect("config should validate");

        let ctx = load_context(root.path(), &cfg).expect("context should load");
        assert_eq!(ctx.taxonomy.attribute_count(), 2);
        assert_eq!(ctx.bands.classify(95.0), Some("Platinum"));
        assert!(ctx.schema_drift().is_empty());

        let corpus = load_corpus(root.path(), &cfg).expect("corpus should load");
        assert_eq!(corpus.data_models.len(), 1);
    }

    #[test]
    fn medallion_file_overrides_builtin_bands() {
        let root = TempDir::new().expect("temp dir should be created");
        write_inputs(root.path());
        fs::write(
            root.path().join("medallions.json"),
            r#"{ "Pass": { "min excluding": 60, "max including": 100 }, "Fail": { "min excluding": 0, "max including": 60 } }"#,
        )
        .expect("medallions should write");
        let cfg: QualityConfig = toml::from_str(&format!(
            "{}medallions = \"medallions.json\"\n{}",
            REPO_CONFIG,
            custom_taxonomy()
        ))
        .expect("config");
        let ctx = load_context(root.path(), &cfg).expect("context should load");
        assert_eq!(ctx.bands.classify(60.0), Some("Fail"));
        assert_eq!(ctx.bands.classify(60.5), Some("Pass"));
    }

    #[test]
    fn weight_mismatch_names_file_and_attribute() {
        let root = TempDir::new().expect("temp dir should be created");
        write_inputs(root.path());
        fs::write(
            root.path().join("weights.json"),
            r#"{ "Core": { "summary.title": 1.0 } }"#,
        )
        .expect("weights should write");
        let cfg: QualityConfig =
            toml::from_str(&format!("{REPO_CONFIG}{}", custom_taxonomy())).expect("config");
        let err = load_context(root.path(), &cfg).expect_err("missing weight should fail");
        assert!(err.is_configuration());
        assert!(err.to_string().contains("summary.abstract"));
    }

    #[test]
    fn missing_input_file_is_reported_with_path() {
        let root = TempDir::new().expect("temp dir should be created");
        let cfg: QualityConfig = toml::from_str(REPO_CONFIG).expect("config");
        let err = load_context(root.path(), &cfg).expect_err("missing schema should fail");
        assert!(matches!(err, QualityError::PathNotFound(_)));
        assert!(err.to_string().contains("schema.json"));
    }
}
