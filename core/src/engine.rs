//! The insight engine. Composes labeling, ranking, synthesis and risk
//! classification into one customer report.
//!
//! RULES:
//!   - The engine holds configuration only. Every report is a pure
//!     function of its inputs, so one engine can serve parallel callers.
//!   - Ranking and strategy synthesis read the same attributions
//!     independently; neither consumes the other's output.

use crate::{
    attribution::{AttributionMap, FeatureImportance, FeatureRecord},
    config::InsightConfig,
    explain::{importance_chart, top_factors, ChartBar, TopFactor},
    formatter::format_value,
    labeler::label,
    ranker::{select_drivers, DriverSource},
    risk::{recommendation, round4, ConfidenceInterval, RiskLevel, SegmentInsight},
    strategy::{synthesize, RetentionStrategy},
    types::{CustomerId, Effect, FeatureId, Probability},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything the external model and data layers hand over for one customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerInput {
    pub customer_id:       CustomerId,
    pub churn_probability: Probability,
    #[serde(default)]
    pub features:          FeatureRecord,
    #[serde(default)]
    pub attributions:      Option<AttributionMap>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayDriver {
    pub feature: FeatureId,
    pub label:   String,
    pub value:   String,
    pub effect:  Effect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerReport {
    pub customer_id:         CustomerId,
    pub churn_probability:   Probability,
    pub risk_level:          RiskLevel,
    pub confidence_interval: ConfidenceInterval,
    pub recommendation:      String,
    pub driver_source:       DriverSource,
    pub drivers:             Vec<DisplayDriver>,
    pub top_factors:         Vec<TopFactor>,
    pub chart:               Vec<ChartBar>,
    pub strategy:            RetentionStrategy,
}

/// One risk level's share of the portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentBreakdown {
    pub level:                 RiskLevel,
    pub customer_count:        usize,
    pub avg_churn_probability: f64,
    pub insight:               SegmentInsight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total:           usize,
    pub high_risk:       usize,
    pub medium_risk:     usize,
    pub low_risk:        usize,
    pub avg_probability: f64,
    /// Most frequent strategy headline; ties go to the alphabetically first.
    pub top_strategy:    Option<String>,
    /// High, medium, low; empty levels are listed with zero counts.
    pub segments:        Vec<SegmentBreakdown>,
}

#[derive(Debug, Clone, Default)]
pub struct InsightEngine {
    pub config: InsightConfig,
}

impl InsightEngine {
    pub fn new(config: InsightConfig) -> Self {
        Self { config }
    }

    pub fn report(
        &self,
        input: &CustomerInput,
        importance: Option<&FeatureImportance>,
    ) -> CustomerReport {
        let p = input.churn_probability;
        let attributions = input.attributions.as_ref();
        let record = &input.features;

        let risk_level = RiskLevel::classify(p, &self.config.risk_thresholds);

        let ranking = select_drivers(attributions, importance, Some(record), self.config.driver_limit);
        let drivers = ranking
            .drivers
            .into_iter()
            .map(|d| DisplayDriver {
                label:   label(&d.feature),
                value:   format_value(record.get(&d.feature)),
                effect:  d.effect,
                feature: d.feature,
            })
            .collect();

        let report = CustomerReport {
            customer_id:         input.customer_id.clone(),
            churn_probability:   round4(p),
            risk_level,
            confidence_interval: ConfidenceInterval::around(p),
            recommendation:      recommendation(risk_level, importance, record),
            driver_source:       ranking.source,
            drivers,
            top_factors:         top_factors(attributions, Some(record), self.config.top_factor_limit),
            chart:               importance_chart(attributions, self.config.chart_limit),
            strategy:            synthesize(attributions, p),
        };

        log::debug!(
            "engine: {} risk={} ({:.3}) strategy='{}' drivers={:?}",
            report.customer_id,
            report.risk_level.as_str(),
            p,
            report.strategy.title,
            report.driver_source,
        );

        report
    }

    /// Reports for every input, highest churn probability first. Equal
    /// probabilities keep input order.
    pub fn report_batch(
        &self,
        inputs: &[CustomerInput],
        importance: Option<&FeatureImportance>,
    ) -> Vec<CustomerReport> {
        let mut reports: Vec<CustomerReport> =
            inputs.iter().map(|input| self.report(input, importance)).collect();

        reports.sort_by(|a, b| {
            b.churn_probability
                .partial_cmp(&a.churn_probability)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        log::info!("engine: built {} reports", reports.len());
        reports
    }

    pub fn summarize(&self, reports: &[CustomerReport]) -> PortfolioSummary {
        let count = |level: RiskLevel| reports.iter().filter(|r| r.risk_level == level).count();

        let avg_probability = mean_probability(reports.iter());

        let mut titles: BTreeMap<&str, usize> = BTreeMap::new();
        for r in reports {
            *titles.entry(r.strategy.title.as_str()).or_insert(0) += 1;
        }
        // max_by_key keeps the last maximum; iterate in reverse so ties go
        // to the alphabetically first title.
        let top_strategy = titles
            .iter()
            .rev()
            .max_by_key(|(_, n)| **n)
            .map(|(title, _)| title.to_string());

        PortfolioSummary {
            total: reports.len(),
            high_risk: count(RiskLevel::High),
            medium_risk: count(RiskLevel::Medium),
            low_risk: count(RiskLevel::Low),
            avg_probability,
            top_strategy,
            segments: [RiskLevel::High, RiskLevel::Medium, RiskLevel::Low]
                .into_iter()
                .map(|level| segment(reports, level))
                .collect(),
        }
    }
}

fn segment(reports: &[CustomerReport], level: RiskLevel) -> SegmentBreakdown {
    let members: Vec<&CustomerReport> = reports.iter().filter(|r| r.risk_level == level).collect();
    SegmentBreakdown {
        level,
        customer_count: members.len(),
        avg_churn_probability: mean_probability(members.into_iter()),
        insight: level.insight(),
    }
}

fn mean_probability<'a>(reports: impl ExactSizeIterator<Item = &'a CustomerReport>) -> f64 {
    let n = reports.len();
    if n == 0 {
        return 0.0;
    }
    round4(reports.map(|r| r.churn_probability).sum::<f64>() / n as f64)
}
