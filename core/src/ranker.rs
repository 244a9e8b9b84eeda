//! Risk driver ranking: which features most influenced one prediction.
//!
//! Primary source is the per-customer attribution map. When it is missing,
//! callers may fall back to the dataset-level importance ranking through
//! `select_drivers`; `rank_drivers` itself never does.

use crate::{
    attribution::{AttributionMap, FeatureImportance, FeatureRecord},
    types::{Effect, FeatureId},
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedDriver {
    pub feature: FeatureId,
    pub effect:  Effect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverSource {
    Attribution,
    Importance,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverRanking {
    pub source:  DriverSource,
    pub drivers: Vec<RankedDriver>,
}

/// Top `limit` attributions by absolute effect, restricted to features in
/// `record` when one is given. Ties keep map order.
pub fn rank_drivers(
    attributions: Option<&AttributionMap>,
    record: Option<&FeatureRecord>,
    limit: usize,
) -> Vec<RankedDriver> {
    let Some(attributions) = attributions.filter(|a| !a.is_empty()) else {
        return Vec::new();
    };

    let mut drivers = usable_entries(attributions, record);
    drivers.sort_by(|a, b| descending(a.effect.abs(), b.effect.abs()));
    drivers.truncate(limit);
    drivers
}

/// Dataset-level importance ranking, highest score first, restricted to
/// features in `record` when one is given.
pub fn rank_by_importance(
    importance: &FeatureImportance,
    record: Option<&FeatureRecord>,
    limit: usize,
) -> Vec<RankedDriver> {
    let mut drivers = usable_entries(importance, record);
    drivers.sort_by(|a, b| descending(a.effect, b.effect));
    drivers.truncate(limit);
    drivers
}

/// Attribution ranking, else importance ranking, else nothing.
pub fn select_drivers(
    attributions: Option<&AttributionMap>,
    importance: Option<&FeatureImportance>,
    record: Option<&FeatureRecord>,
    limit: usize,
) -> DriverRanking {
    let drivers = rank_drivers(attributions, record, limit);
    if !drivers.is_empty() {
        return DriverRanking { source: DriverSource::Attribution, drivers };
    }

    if let Some(importance) = importance {
        let drivers = rank_by_importance(importance, record, limit);
        if !drivers.is_empty() {
            log::debug!("ranker: no usable attributions, using dataset importance");
            return DriverRanking { source: DriverSource::Importance, drivers };
        }
    }

    DriverRanking { source: DriverSource::None, drivers: Vec::new() }
}

fn usable_entries(scores: &AttributionMap, record: Option<&FeatureRecord>) -> Vec<RankedDriver> {
    scores
        .iter()
        .filter(|(feature, _)| record.map_or(true, |r| r.contains(feature)))
        .filter(|(feature, score)| {
            if score.is_nan() {
                log::warn!("ranker: ignoring NaN score for '{feature}'");
                return false;
            }
            true
        })
        .map(|(feature, effect)| RankedDriver { feature: feature.to_string(), effect })
        .collect()
}

/// Stable-sort comparator for descending order. NaN is filtered upstream.
pub(crate) fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}
