//! Risk level classification, confidence bands and plain-text guidance.

use crate::{
    attribution::{FeatureImportance, FeatureRecord},
    config::RiskThresholds,
    formatter::format_value,
    labeler::label,
    ranker::rank_by_importance,
    types::Probability,
};
use serde::{Deserialize, Serialize};

const Z_SCORE_95: f64 = 1.96;
/// Nominal sample size behind the standard error estimate.
const NOMINAL_SAMPLES: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Inclusive thresholds: `p >= high` is High, `p >= medium` is Medium.
    pub fn classify(p: Probability, thresholds: &RiskThresholds) -> Self {
        if p >= thresholds.high {
            RiskLevel::High
        } else if p >= thresholds.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    fn base_recommendation(&self) -> &'static str {
        match self {
            RiskLevel::High => "Immediate intervention required. Consider a personalized retention offer, direct outreach, or exclusive incentives.",
            RiskLevel::Medium => "Proactive engagement recommended. Schedule a check-in, offer loyalty rewards, or provide a service enhancement.",
            RiskLevel::Low => "Continue standard engagement. Monitor for changes and maintain regular communication.",
        }
    }

    /// Segment-level guidance shown next to customer lists.
    pub fn insight(&self) -> SegmentInsight {
        let (kind, title, description, recommendation) = match self {
            RiskLevel::High => (
                InsightKind::Critical,
                "High Churn Risk Detected",
                "These customers are very likely to leave. Immediate action needed.",
                "Contact personally or offer strong retention incentives.",
            ),
            RiskLevel::Medium => (
                InsightKind::Warning,
                "Monitor Closely",
                "These customers show signs of potential churn.",
                "Send engagement emails or satisfaction surveys.",
            ),
            RiskLevel::Low => (
                InsightKind::Success,
                "Healthy Segment",
                "These customers are stable.",
                "Look for upsell opportunities or ask for referrals.",
            ),
        };
        SegmentInsight {
            kind,
            title:          title.to_string(),
            description:    description.to_string(),
            recommendation: recommendation.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Critical,
    Warning,
    Success,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentInsight {
    pub kind:           InsightKind,
    pub title:          String,
    pub description:    String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower:            f64,
    pub upper:            f64,
    pub confidence_level: f64,
}

impl ConfidenceInterval {
    /// Normal-approximation 95% band around `p`, clamped to [0, 1].
    pub fn around(p: Probability) -> Self {
        let variance = (p * (1.0 - p) / NOMINAL_SAMPLES).max(0.0);
        let margin = Z_SCORE_95 * variance.sqrt();
        Self {
            lower:            round4((p - margin).max(0.0)),
            upper:            round4((p + margin).min(1.0)),
            confidence_level: 0.95,
        }
    }
}

pub(crate) fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

/// Level-based guidance, extended with the dataset's most important
/// feature when the customer's record carries it.
pub fn recommendation(
    level: RiskLevel,
    importance: Option<&FeatureImportance>,
    record: &FeatureRecord,
) -> String {
    let mut text = level.base_recommendation().to_string();

    let top = importance
        .and_then(|imp| rank_by_importance(imp, None, 1).into_iter().next())
        .filter(|driver| record.contains(&driver.feature));

    if let Some(driver) = top {
        let value = format_value(record.get(&driver.feature));
        text.push_str(&format!(
            " Focus on addressing '{}' (current value: {value}).",
            label(&driver.feature),
        ));
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_is_inclusive() {
        let t = RiskThresholds::default();
        assert_eq!(RiskLevel::classify(0.7, &t), RiskLevel::High);
        assert_eq!(RiskLevel::classify(0.69, &t), RiskLevel::Medium);
        assert_eq!(RiskLevel::classify(0.3, &t), RiskLevel::Medium);
        assert_eq!(RiskLevel::classify(0.29, &t), RiskLevel::Low);
    }

    #[test]
    fn interval_is_symmetric_and_clamped() {
        let ci = ConfidenceInterval::around(0.5);
        assert_eq!(ci.lower, 0.402);
        assert_eq!(ci.upper, 0.598);

        let edge = ConfidenceInterval::around(1.0);
        assert_eq!(edge.lower, 1.0);
        assert_eq!(edge.upper, 1.0);

        let low = ConfidenceInterval::around(0.01);
        assert_eq!(low.lower, 0.0);
    }

    #[test]
    fn recommendation_mentions_top_dataset_feature() {
        let importance =
            FeatureImportance::from_pairs([("tenure", 0.1), ("MonthlyCharges", 0.4)]).unwrap();
        let record = FeatureRecord::new().with("MonthlyCharges", 89.5);

        let text = recommendation(RiskLevel::High, Some(&importance), &record);
        assert!(text.starts_with("Immediate intervention required."));
        assert!(
            text.ends_with("Focus on addressing 'Monthly Charges' (current value: 89.50)."),
            "got {text}"
        );
    }

    #[test]
    fn recommendation_skips_feature_missing_from_record() {
        let importance = FeatureImportance::from_pairs([("Contract", 0.4)]).unwrap();
        let text = recommendation(RiskLevel::Low, Some(&importance), &FeatureRecord::new());
        assert_eq!(text, RiskLevel::Low.base_recommendation());
    }

    #[test]
    fn insights_match_levels() {
        assert_eq!(RiskLevel::High.insight().kind, InsightKind::Critical);
        assert_eq!(RiskLevel::Medium.insight().kind, InsightKind::Warning);
        assert_eq!(RiskLevel::Low.insight().kind, InsightKind::Success);
    }
}
