pub mod baseline;
pub mod completeness;
pub mod context;
pub mod errors;
pub mod explain;
pub mod structure;
pub mod weighting;

use crate::error::Result;
use crate::schema::resolve::{AttributeResolver, PathThenMessageResolver};
use crate::types::rating::Classifier;
use crate::types::record::{Corpus, DatasetRecord, RecordIdentity};
use crate::types::result::{Assessment, Measure, QualitySummary, RecordScore, ScoreRun};
use context::ScoringContext;
use structure::StructuralSummary;
use tracing::{debug, info, warn};

/// Scores every record of the corpus. Records without an id are skipped
/// with a warning and counted in `skipped`.
pub fn score_corpus(corpus: &Corpus, ctx: &ScoringContext) -> Result<ScoreRun> {
    for attribute in ctx.schema_drift() {
        warn!(attribute = %attribute, "taxonomy attribute is not declared by the schema");
    }

    let resolver = PathThenMessageResolver::new(&ctx.taxonomy);
    let mut run = ScoreRun::default();
    for (index, record) in corpus.data_models.iter().enumerate() {
        match score_record_with(record, ctx, &resolver)? {
            Some(scored) => {
                run.unattributed_violations += scored.unattributed_violations;
                run.records.push(scored);
            }
            None => {
                warn!(index, "skipping dataset record without an id");
                run.skipped += 1;
            }
        }
    }

    info!(
        scored = run.records.len(),
        skipped = run.skipped,
        unattributed = run.unattributed_violations,
        "scoring pass complete"
    );
    Ok(run)
}

pub fn score_record(record: &DatasetRecord, ctx: &ScoringContext) -> Result<Option<RecordScore>> {
    let resolver = PathThenMessageResolver::new(&ctx.taxonomy);
    score_record_with(record, ctx, &resolver)
}

/// Scores one record with an explicit attribution strategy. Returns `None`
/// for records without an id.
pub fn score_record_with(
    record: &DatasetRecord,
    ctx: &ScoringContext,
    resolver: &dyn AttributeResolver,
) -> Result<Option<RecordScore>> {
    let Some(identity) = record.identity(ctx.version) else {
        return Ok(None);
    };

    let overlaid = baseline::overlay(&ctx.baseline, &record.flatten(ctx.version));
    let structure = StructuralSummary::from_record(record);
    let periodicity = ctx.rules.periodicity_of(&overlaid);

    let filled = completeness::assess(
        &overlaid,
        &structure,
        &ctx.taxonomy,
        &ctx.rules,
        ctx.version,
    );

    let violations = ctx.schema.validate(&record.scoped(ctx.version, &ctx.taxonomy));
    let exemptions = ctx.rules.exemptions(periodicity);
    let findings = errors::assess(
        &identity.id,
        &violations,
        resolver,
        &structure,
        &ctx.taxonomy,
        &exemptions,
        ctx.version,
    );

    let completeness = weighting::aggregate(
        Measure::Completeness,
        &identity.id,
        &filled,
        &ctx.taxonomy,
        &ctx.weights,
    )?;
    let errors = weighting::aggregate(
        Measure::Errors,
        &identity.id,
        &findings.indicators,
        &ctx.taxonomy,
        &ctx.weights,
    )?;

    let summary = summarize(ctx, &identity, &completeness, &errors);
    debug!(
        id = %identity.id,
        violations = violations.len(),
        unattributed = findings.unattributed,
        "validated record"
    );
    info!(
        id = %identity.id,
        score = summary.weighted_quality_score,
        rating = %summary.weighted_quality_rating,
        "scored record"
    );

    let explain = explain::rows(
        &overlaid,
        &completeness,
        &errors,
        &findings.messages,
        ctx.version,
    );
    Ok(Some(RecordScore {
        identity,
        summary,
        completeness,
        errors,
        messages: findings.messages,
        unattributed_violations: findings.unattributed,
        explain,
    }))
}

fn summarize(
    ctx: &ScoringContext,
    identity: &RecordIdentity,
    completeness: &Assessment,
    errors: &Assessment,
) -> QualitySummary {
    let completeness_percent = weighting::percent(completeness.count, completeness.total);
    let error_percent = weighting::percent(errors.count, errors.total);
    let weighted_completeness_percent = 100.0 * completeness.weighted;
    let weighted_error_percent = 100.0 * errors.weighted;

    let quality_score =
        weighting::round2(weighting::quality_score(completeness_percent, error_percent));
    let weighted_quality_score = weighting::round2(weighting::quality_score(
        weighted_completeness_percent,
        weighted_error_percent,
    ));

    QualitySummary {
        completeness_percent: weighting::round2(completeness_percent),
        weighted_completeness_percent: weighting::round2(weighted_completeness_percent),
        error_percent: weighting::round2(error_percent),
        weighted_error_percent: weighting::round2(weighted_error_percent),
        quality_score,
        quality_rating: ctx.bands.rating(quality_score),
        weighted_quality_score,
        weighted_quality_rating: ctx.bands.rating(weighted_quality_score),
        ..QualitySummary::blank(ctx.version, identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use crate::types::rating::RatingBands;
    use crate::types::rules::SpecialRules;
    use crate::types::taxonomy::{LevelSpec, Taxonomy};
    use crate::types::version::SchemaVersion;
    use crate::types::weights::WeightTable;
    use serde_json::{json, Value};

    fn context() -> ScoringContext {
        let taxonomy = Taxonomy::new(vec![
            LevelSpec {
                name: "A: Summary".to_string(),
                attributes: vec![
                    "identifier".to_string(),
                    "summary.title".to_string(),
                    "summary.abstract".to_string(),
                ],
            },
            LevelSpec {
                name: "C: Coverage & Detail".to_string(),
                attributes: vec![
                    "provenance.temporal.accrualPeriodicity".to_string(),
                    "provenance.temporal.endDate".to_string(),
                    "provenance.temporal.distributionReleaseDate".to_string(),
                ],
            },
            LevelSpec {
                name: "F: Technical Metadata".to_string(),
                attributes: vec![
                    "structuralMetadata.dataClassesCount".to_string(),
                    "structuralMetadata.tableName".to_string(),
                    "structuralMetadata.tableDescription".to_string(),
                ],
            },
        ])
        .expect("taxonomy");
        let weights = WeightTable::from_value(&json!({
            "A: Summary": { "identifier": 0.1, "summary.title": 0.2, "summary.abstract": 0.1 },
            "C: Coverage & Detail": {
                "provenance.temporal.accrualPeriodicity": 0.1,
                "provenance.temporal.endDate": 0.1,
                "provenance.temporal.distributionReleaseDate": 0.1
            },
            "F: Technical Metadata": {
                "structuralMetadata.dataClassesCount": 0.1,
                "structuralMetadata.tableName": 0.1,
                "structuralMetadata.tableDescription": 0.1
            }
        }))
        .expect("weights");
        let schema = Schema::compile(json!({
            "type": "object",
            "required": ["identifier", "summary"],
            "properties": {
                "identifier": { "type": "string" },
                "summary": {
                    "type": "object",
                    "required": ["title", "abstract"],
                    "properties": {
                        "title": { "type": "string", "minLength": 2 },
                        "abstract": { "type": "string" }
                    }
                },
                "provenance": {
                    "type": "object",
                    "properties": {
                        "temporal": {
                            "type": "object",
                            "required": ["accrualPeriodicity", "endDate", "distributionReleaseDate"],
                            "properties": {
                                "accrualPeriodicity": { "enum": ["STATIC", "CONTINUOUS", "IRREGULAR"] },
                                "endDate": { "type": "string", "format": "date" },
                                "distributionReleaseDate": { "type": "string", "format": "date" }
                            }
                        }
                    }
                },
                "structuralMetadata": { "type": ["object", "array"] }
            }
        }))
        .expect("schema");
        ScoringContext::new(
            SchemaVersion::V2,
            taxonomy,
            &weights,
            schema,
            RatingBands::builtin(SchemaVersion::V2),
            SpecialRules::builtin(SchemaVersion::V2),
        )
        .expect("context")
    }

    fn complete_record() -> Value {
        json!({
            "id": "rec-1",
            "pid": "pid-1",
            "identifier": "https://example.org/datasets/rec-1",
            "summary": {
                "title": "Hospital Episodes",
                "abstract": "Admitted patient care",
                "publisher": { "name": "NHS DIGITAL" }
            },
            "provenance": {
                "temporal": {
                    "accrualPeriodicity": "STATIC",
                    "endDate": "2020-12-31",
                    "distributionReleaseDate": "2021-01-31"
                }
            },
            "structuralMetadata": [
                {
                    "label": "episodes",
                    "description": "One row per episode",
                    "dataElements": [ { "label": "episode_id", "description": "Episode key", "dataType": "string" } ]
                }
            ]
        })
    }

    fn score(value: Value) -> RecordScore {
        score_record(&DatasetRecord::new(value), &context())
            .expect("scoring should succeed")
            .expect("record has an id")
    }

    #[test]
    fn fully_populated_valid_record_scores_one_hundred() {
        let scored = score(complete_record());
        let summary = &scored.summary;
        assert_eq!(summary.completeness_percent, 100.0);
        assert_eq!(summary.error_percent, 0.0);
        assert_eq!(summary.quality_score, 100.0);
        assert_eq!(summary.weighted_quality_score, 100.0);
        assert_eq!(summary.weighted_quality_rating, "Platinum");
        assert_eq!(summary.publisher, "NHS DIGITAL");
        assert_eq!(summary.schema_version, "2.0.1");
        assert_eq!(scored.unattributed_violations, 0);
    }

    #[test]
    fn record_with_only_an_id_scores_zero_completeness_except_identity() {
        let scored = score(json!({ "id": "bare" }));
        assert_eq!(scored.completeness.indicator("summary.title"), Some(0.0));
        assert_eq!(scored.completeness.count, 1);
        assert_eq!(scored.errors.indicator("summary.title"), Some(0.0));
        assert_eq!(scored.errors.indicator("structuralMetadata.dataClassesCount"), Some(1.0));
        assert!(scored.summary.quality_score <= 50.0);
    }

    #[test]
    fn zero_tables_flag_all_table_attributes() {
        let mut record = complete_record();
        record["structuralMetadata"] = json!({ "structuralMetadataCount": { "structuralMetadata.dataClassesCount": 0 } });
        let scored = score(record);
        for attribute in [
            "structuralMetadata.dataClassesCount",
            "structuralMetadata.tableName",
            "structuralMetadata.tableDescription",
        ] {
            assert_eq!(scored.errors.indicator(attribute), Some(1.0), "{attribute}");
            assert_eq!(scored.completeness.indicator(attribute), Some(0.0), "{attribute}");
        }
    }

    #[test]
    fn continuous_record_is_complete_and_exempt_for_dates() {
        let mut record = complete_record();
        record["provenance"] = json!({ "temporal": { "accrualPeriodicity": "CONTINUOUS" } });
        let scored = score(record);
        for attribute in [
            "provenance.temporal.endDate",
            "provenance.temporal.distributionReleaseDate",
        ] {
            assert_eq!(scored.completeness.indicator(attribute), Some(1.0), "{attribute}");
            assert_eq!(scored.errors.indicator(attribute), Some(0.0), "{attribute}");
        }
        assert_eq!(scored.summary.quality_score, 100.0);
    }

    #[test]
    fn schema_violation_lowers_error_score_and_is_explained() {
        let mut record = complete_record();
        record["summary"]["title"] = json!("H");
        let scored = score(record);
        assert_eq!(scored.errors.indicator("summary.title"), Some(1.0));
        assert!((scored.summary.weighted_error_percent - 20.0).abs() < 1e-9);
        assert_eq!(scored.summary.weighted_quality_score, 90.0);
        assert_eq!(scored.summary.weighted_quality_rating, "Gold");
        let row = scored
            .explain
            .iter()
            .find(|row| row.attribute == "summary.title")
            .expect("explain row");
        assert_eq!(row.message, "'H' is too short");
        assert_eq!(row.value, "H");
    }

    #[test]
    fn scoring_is_idempotent_and_key_order_independent() {
        let first = score(complete_record());
        let second = score(complete_record());
        assert_eq!(first, second);

        let reordered = json!({
            "structuralMetadata": complete_record()["structuralMetadata"].clone(),
            "provenance": complete_record()["provenance"].clone(),
            "summary": {
                "publisher": { "name": "NHS DIGITAL" },
                "abstract": "Admitted patient care",
                "title": "Hospital Episodes"
            },
            "identifier": "https://example.org/datasets/rec-1",
            "pid": "pid-1",
            "id": "rec-1"
        });
        let shuffled = score(reordered);
        assert_eq!(first.completeness, shuffled.completeness);
        assert_eq!(first.summary, shuffled.summary);
    }

    #[test]
    fn corpus_skips_records_without_id() {
        let corpus = Corpus::from_json_str(
            &json!({ "count": 2, "dataModels": [ complete_record(), { "summary": { "title": "orphan" } } ] })
                .to_string(),
        )
        .expect("corpus");
        let run = score_corpus(&corpus, &context()).expect("run");
        assert_eq!(run.records.len(), 1);
        assert_eq!(run.skipped, 1);
        assert!(run.find("rec-1").is_some());
    }

    #[test]
    fn scores_and_percentages_stay_in_range() {
        for record in [
            complete_record(),
            json!({ "id": "x" }),
            json!({ "id": "y", "summary": { "title": 5 }, "provenance": { "temporal": { "accrualPeriodicity": "WEEKLY" } } }),
        ] {
            let summary = score(record).summary;
            for value in [
                summary.completeness_percent,
                summary.weighted_completeness_percent,
                summary.error_percent,
                summary.weighted_error_percent,
                summary.quality_score,
                summary.weighted_quality_score,
            ] {
                assert!((0.0..=100.0).contains(&value), "{value} out of range");
            }
        }
    }

    fn v1_context() -> ScoringContext {
        let taxonomy = Taxonomy::builtin(SchemaVersion::V1)
            .and_then(|full| full.restrict(&Taxonomy::default_reporting_levels()))
            .expect("taxonomy");
        let weights = WeightTable::from_json_str(include_str!("../../config/weights/v1.1.7.json"))
            .expect("weights");
        ScoringContext::new(
            SchemaVersion::V1,
            taxonomy,
            &weights,
            Schema::compile(json!({ "type": "object" })).expect("schema"),
            RatingBands::builtin(SchemaVersion::V1),
            SpecialRules::builtin(SchemaVersion::V1),
        )
        .expect("context")
    }

    fn score_v1(value: Value) -> RecordScore {
        score_record(&DatasetRecord::new(value), &v1_context())
            .expect("scoring should succeed")
            .expect("record has an id")
    }

    #[test]
    fn v1_declared_table_count_counts_as_structure() {
        let scored = score_v1(json!({ "id": "y", "dataClassesCount": 5 }));
        assert_eq!(scored.completeness.indicator("dataClassesCount"), Some(1.0));
        assert_eq!(scored.errors.indicator("dataClassesCount"), Some(0.0));
    }

    #[test]
    fn v1_null_identifier_is_not_filled_by_catalogue_id() {
        let scored = score_v1(json!({ "id": "x", "identifier": null }));
        assert_eq!(scored.completeness.indicator("identifier"), Some(0.0));
        assert_eq!(scored.summary.completeness_percent, 0.0);
        assert_eq!(scored.summary.schema_version, "1.1.7");
    }
}
