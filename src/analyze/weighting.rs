use crate::error::{QualityError, Result};
use crate::types::result::{Assessment, AttributeScore, LevelResult, Measure};
use crate::types::taxonomy::Taxonomy;
use crate::types::weights::AttributeWeights;
use std::collections::HashMap;

/// Rolls per-attribute indicators up into per-level and global tallies,
/// unweighted (counts) and weighted side by side.
///
/// Every indicator must belong to a scored attribute with a weight; a stray
/// attribute is a configuration error rather than a silent zero.
pub fn aggregate(
    measure: Measure,
    id: &str,
    indicators: &HashMap<String, f64>,
    taxonomy: &Taxonomy,
    weights: &AttributeWeights,
) -> Result<Assessment> {
    let mut stray: Vec<&str> = indicators
        .keys()
        .map(String::as_str)
        .filter(|attribute| !taxonomy.contains(attribute))
        .collect();
    if !stray.is_empty() {
        stray.sort_unstable();
        return Err(QualityError::Weights(format!(
            "missing weight for attribute(s) outside the scored levels: {}",
            stray.join(", ")
        )));
    }

    let mut levels = Vec::with_capacity(taxonomy.levels().len());
    let (mut count, mut total, mut weighted) = (0, 0, 0.0);
    for level in taxonomy.levels() {
        let mut attributes = Vec::with_capacity(level.attributes().len());
        let (mut level_count, mut level_weighted) = (0, 0.0);
        for attribute in level.attributes() {
            let weight = weights.get(level.name(), attribute)?;
            let indicator = indicators
                .get(attribute)
                .copied()
                .unwrap_or(0.0)
                .clamp(0.0, 1.0);
            if indicator > 0.0 {
                level_count += 1;
            }
            level_weighted += indicator * weight;
            attributes.push(AttributeScore {
                attribute: attribute.clone(),
                indicator,
                weight,
            });
        }
        count += level_count;
        total += attributes.len();
        weighted += level_weighted;
        levels.push(LevelResult {
            level: level.name().to_string(),
            total: attributes.len(),
            attributes,
            count: level_count,
            weighted: level_weighted,
        });
    }

    Ok(Assessment {
        measure,
        id: id.to_string(),
        levels,
        count,
        total,
        weighted,
    })
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `count / total` as a percentage; an empty tally is 0%.
pub fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * count as f64 / total as f64
    }
}

/// Mean of completeness and validity, both in percent.
pub fn quality_score(completeness_percent: f64, error_percent: f64) -> f64 {
    ((completeness_percent + (100.0 - error_percent)) / 2.0).clamp(0.0, 100.0)
}
