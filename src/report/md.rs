use crate::types::result::{QualitySummary, RecordScore, ScoreRun};

pub fn summaries_to_markdown(run: &ScoreRun) -> String {
    let mut output = String::new();
    output.push_str("# Metadata Quality Report\n\n");
    output.push_str(&format!(
        "Scored: {} | Skipped: {} | Unattributed violations: {}\n\n",
        run.records.len(),
        run.skipped,
        run.unattributed_violations
    ));

    if run.records.is_empty() {
        output.push_str("- no records scored\n");
        return output;
    }

    output.push_str(
        "| id | title | completeness % | error % | score | rating | weighted score | weighted rating |\n",
    );
    output.push_str("|---|---|---|---|---|---|---|---|\n");
    for summary in run.summaries() {
        output.push_str(&summary_line(summary));
    }
    output
}

fn summary_line(summary: &QualitySummary) -> String {
    format!(
        "| {} | {} | {:.2} | {:.2} | {:.2} | {} | {:.2} | {} |\n",
        escape(&summary.id),
        escape(&summary.title),
        summary.completeness_percent,
        summary.error_percent,
        summary.quality_score,
        summary.quality_rating,
        summary.weighted_quality_score,
        summary.weighted_quality_rating
    )
}

pub fn explain_to_markdown(record: &RecordScore) -> String {
    let summary = &record.summary;
    let mut output = format!("# {} ({})\n\n", escape(&summary.title), summary.id);
    output.push_str(&format!(
        "Weighted score {:.2} ({}), completeness {:.2}%, errors {:.2}%\n\n",
        summary.weighted_quality_score,
        summary.weighted_quality_rating,
        summary.weighted_completeness_percent,
        summary.weighted_error_percent
    ));
    output.push_str("| attribute | weight | value | completeness | error | message |\n");
    output.push_str("|---|---|---|---|---|---|\n");
    for row in &record.explain {
        output.push_str(&format!(
            "| {} | {:.4} | {} | {:.4} | {:.4} | {} |\n",
            row.attribute,
            row.weight,
            escape(&row.value),
            row.completeness,
            row.error,
            escape(&row.message)
        ));
    }
    if record.unattributed_violations > 0 {
        output.push_str(&format!(
            "\n{} violation(s) could not be attributed to a scored attribute.\n",
            record.unattributed_violations
        ));
    }
    output
}

fn escape(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
