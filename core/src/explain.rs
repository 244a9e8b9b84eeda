//! Per-prediction explanation views: factor rows and chart bars.

use crate::{
    attribution::{AttributionMap, FeatureRecord},
    formatter::format_value,
    labeler::label,
    ranker::rank_drivers,
    risk::round4,
    types::{Effect, FeatureId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Impact {
    Increases,
    Decreases,
}

impl Impact {
    pub fn of(effect: Effect) -> Self {
        if effect > 0.0 { Impact::Increases } else { Impact::Decreases }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Positive,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopFactor {
    pub feature:    FeatureId,
    pub label:      String,
    pub value:      String,
    pub shap_value: Effect,
    pub impact:     Impact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartBar {
    pub feature:   FeatureId,
    pub label:     String,
    pub magnitude: f64,
    pub direction: Direction,
}

/// The `n` strongest attributions with their display values. Unlike the
/// driver list, features absent from `record` are kept and shown with the
/// placeholder value.
pub fn top_factors(
    attributions: Option<&AttributionMap>,
    record: Option<&FeatureRecord>,
    n: usize,
) -> Vec<TopFactor> {
    rank_drivers(attributions, None, n)
        .into_iter()
        .map(|driver| TopFactor {
            label:      label(&driver.feature),
            value:      format_value(record.and_then(|r| r.get(&driver.feature))),
            shap_value: round4(driver.effect),
            impact:     Impact::of(driver.effect),
            feature:    driver.feature,
        })
        .collect()
}

pub fn importance_chart(attributions: Option<&AttributionMap>, n: usize) -> Vec<ChartBar> {
    rank_drivers(attributions, None, n)
        .into_iter()
        .map(|driver| ChartBar {
            label:     label(&driver.feature),
            magnitude: driver.effect.abs(),
            direction: if driver.effect > 0.0 { Direction::Positive } else { Direction::Negative },
            feature:   driver.feature,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::PLACEHOLDER;

    #[test]
    fn factors_carry_display_values() {
        let map = AttributionMap::from_pairs([("tenure", -0.31234), ("MonthlyCharges", 0.45678)]).unwrap();
        let record = FeatureRecord::new().with("MonthlyCharges", 104.2);

        let factors = top_factors(Some(&map), Some(&record), 5);

        assert_eq!(factors.len(), 2);
        assert_eq!(factors[0].feature, "MonthlyCharges");
        assert_eq!(factors[0].label, "Monthly Charges");
        assert_eq!(factors[0].value, "104.20");
        assert_eq!(factors[0].shap_value, 0.4568);
        assert_eq!(factors[0].impact, Impact::Increases);

        assert_eq!(factors[1].value, PLACEHOLDER);
        assert_eq!(factors[1].impact, Impact::Decreases);
    }

    #[test]
    fn zero_effect_counts_as_decreasing() {
        assert_eq!(Impact::of(0.0), Impact::Decreases);
    }

    #[test]
    fn chart_uses_magnitudes() {
        let map = AttributionMap::from_pairs([("a", -0.9), ("b", 0.2)]).unwrap();
        let chart = importance_chart(Some(&map), 10);
        assert_eq!(chart[0].magnitude, 0.9);
        assert_eq!(chart[0].direction, Direction::Negative);
        assert_eq!(chart[1].direction, Direction::Positive);
    }
}
