use churn_insight_core::{
    config::InsightConfig,
    engine::{CustomerInput, InsightEngine},
    ranker::DriverSource,
    risk::{InsightKind, RiskLevel},
    strategy::{HIGH_RISK_DEFAULT, LOW_RISK_DEFAULT},
    AttributionMap, FeatureImportance, FeatureRecord,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn telco_record() -> FeatureRecord {
    FeatureRecord::new()
        .with("Contract", "Month-to-month")
        .with("tenure", 2)
        .with("MonthlyCharges", 89.1)
        .with("TotalCharges", 1780.5)
        .with("TechSupport", false)
        .with_null("Partner")
}

fn customer(id: &str, p: f64, attributions: Option<AttributionMap>) -> CustomerInput {
    CustomerInput {
        customer_id:       id.into(),
        churn_probability: p,
        features:          telco_record(),
        attributions,
    }
}

fn telco_attributions() -> AttributionMap {
    AttributionMap::from_pairs([
        ("Contract", 0.42),
        ("tenure", 0.31),
        ("MonthlyCharges", 0.12),
        ("TechSupport", -0.25),
        ("InternetService", 0.6),
    ])
    .unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// A full report combines display drivers, factors, risk band and strategy.
#[test]
fn report_for_high_risk_customer() {
    let _ = env_logger::builder().is_test(true).try_init();
    let engine = InsightEngine::default();

    let report = engine.report(&customer("7590-VHVEG", 0.81234, Some(telco_attributions())), None);

    assert_eq!(report.customer_id, "7590-VHVEG");
    assert_eq!(report.churn_probability, 0.8123);
    assert_eq!(report.risk_level, RiskLevel::High);
    assert_eq!(report.driver_source, DriverSource::Attribution);

    // InternetService is not in the record, so it is not a display driver.
    let drivers: Vec<&str> = report.drivers.iter().map(|d| d.feature.as_str()).collect();
    assert_eq!(drivers, vec!["Contract", "tenure", "TechSupport", "MonthlyCharges"]);
    assert_eq!(report.drivers[0].label, "Contract");
    assert_eq!(report.drivers[0].value, "Month-to-month");
    assert_eq!(report.drivers[2].value, "No");
    assert_eq!(report.drivers[3].label, "Monthly Charges");

    // Top factors are not filtered and show the placeholder instead.
    assert_eq!(report.top_factors[0].feature, "InternetService");
    assert_eq!(report.top_factors[0].value, "—");

    // Strategy ranks positive effects only: InternetService, Contract, tenure.
    assert_eq!(report.strategy.title, "Product Fit Review");
    assert_eq!(report.strategy.actions.len(), 3);

    assert!(report.confidence_interval.lower < 0.8123);
    assert!(report.confidence_interval.upper > 0.8123);
}

/// Without attributions the drivers come from dataset importance and the
/// strategy falls back to the probability bucket.
#[test]
fn report_falls_back_to_dataset_importance() {
    let engine = InsightEngine::default();
    let importance = FeatureImportance::from_pairs([
        ("gender", 0.01),
        ("TotalCharges", 0.18),
        ("Contract", 0.22),
    ])
    .unwrap();

    let report = engine.report(&customer("0002-ORFBO", 0.12, None), Some(&importance));

    assert_eq!(report.driver_source, DriverSource::Importance);
    let drivers: Vec<&str> = report.drivers.iter().map(|d| d.feature.as_str()).collect();
    assert_eq!(drivers, vec!["Contract", "TotalCharges"]);
    assert_eq!(report.drivers[1].value, "$1,781");

    assert_eq!(report.strategy, LOW_RISK_DEFAULT.to_strategy());
    assert!(report.top_factors.is_empty());
    assert!(report.chart.is_empty());
    assert!(report.recommendation.contains("Focus on addressing 'Contract'"));
}

/// No attributions and no importance: empty driver list, default strategy.
#[test]
fn report_without_any_explanation() {
    let engine = InsightEngine::default();

    let report = engine.report(&customer("0003-MKNFE", 0.95, None), None);

    assert_eq!(report.driver_source, DriverSource::None);
    assert!(report.drivers.is_empty());
    assert_eq!(report.strategy, HIGH_RISK_DEFAULT.to_strategy());
}

/// Configured limits bound every list in the report.
#[test]
fn config_limits_are_applied() {
    let config = InsightConfig {
        driver_limit: 2,
        top_factor_limit: 1,
        chart_limit: 3,
        ..InsightConfig::default()
    };
    let engine = InsightEngine::new(config);

    let report = engine.report(&customer("c", 0.5, Some(telco_attributions())), None);

    assert_eq!(report.drivers.len(), 2);
    assert_eq!(report.top_factors.len(), 1);
    assert_eq!(report.chart.len(), 3);
}

/// Batch reports come back highest risk first and summarize cleanly.
#[test]
fn batch_is_sorted_and_summarized() {
    let engine = InsightEngine::default();
    let inputs = vec![
        customer("low", 0.1, None),
        customer("high", 0.9, Some(telco_attributions())),
        customer("mid", 0.5, None),
        customer("high-2", 0.9, None),
    ];

    let reports = engine.report_batch(&inputs, None);
    let order: Vec<&str> = reports.iter().map(|r| r.customer_id.as_str()).collect();
    assert_eq!(order, vec!["high", "high-2", "mid", "low"]);

    let summary = engine.summarize(&reports);
    assert_eq!(summary.total, 4);
    assert_eq!(summary.high_risk, 2);
    assert_eq!(summary.medium_risk, 1);
    assert_eq!(summary.low_risk, 1);
    assert_eq!(summary.avg_probability, 0.6);
    assert!(summary.top_strategy.is_some());

    let levels: Vec<RiskLevel> = summary.segments.iter().map(|s| s.level).collect();
    assert_eq!(levels, vec![RiskLevel::High, RiskLevel::Medium, RiskLevel::Low]);
    let high = &summary.segments[0];
    assert_eq!(high.customer_count, 2);
    assert_eq!(high.avg_churn_probability, 0.9);
    assert_eq!(high.insight.kind, InsightKind::Critical);
    assert_eq!(summary.segments[1].customer_count, 1);
    assert_eq!(summary.segments[1].avg_churn_probability, 0.5);
    assert_eq!(summary.segments[1].insight.title, "Monitor Closely");
    assert_eq!(summary.segments[2].avg_churn_probability, 0.1);
    assert_eq!(summary.segments[2].insight.kind, InsightKind::Success);
}

/// Levels with no customers still appear, with zero count and average.
#[test]
fn summary_lists_empty_segments() {
    let engine = InsightEngine::default();
    let reports = engine.report_batch(&[customer("only", 0.8, None)], None);

    let summary = engine.summarize(&reports);

    assert_eq!(summary.segments.len(), 3);
    assert_eq!(summary.segments[0].customer_count, 1);
    assert_eq!(summary.segments[0].avg_churn_probability, 0.8);
    for empty in &summary.segments[1..] {
        assert_eq!(empty.customer_count, 0);
        assert_eq!(empty.avg_churn_probability, 0.0);
    }
}

#[test]
fn empty_batch_summary() {
    let engine = InsightEngine::default();
    let summary = engine.summarize(&[]);
    assert_eq!(summary.total, 0);
    assert_eq!(summary.avg_probability, 0.0);
    assert_eq!(summary.top_strategy, None);
    assert!(summary.segments.iter().all(|s| s.customer_count == 0));
}

/// CustomerInput reads straight from the JSON the model service emits;
/// attribution order follows the document.
#[test]
fn customer_input_from_json() {
    let json = r#"{
        "customer_id": "9237-HQITU",
        "churn_probability": 0.64,
        "features": { "Contract": "Month-to-month", "tenure": 2, "PaperlessBilling": true },
        "attributions": { "PaperlessBilling": 0.3, "Contract": 0.3, "tenure": -0.1 }
    }"#;

    let input: CustomerInput = serde_json::from_str(json).unwrap();
    let report = InsightEngine::default().report(&input, None);

    assert_eq!(report.risk_level, RiskLevel::Medium);
    // Equal effects keep document order, so billing outranks contract.
    assert_eq!(report.drivers[0].feature, "PaperlessBilling");
    assert_eq!(report.strategy.title, "Pricing Review");

    let out = serde_json::to_value(&report).unwrap();
    assert_eq!(out["risk_level"], "medium");
    assert_eq!(out["driver_source"], "attribution");
    assert_eq!(out["top_factors"][0]["impact"], "increases");
}

#[test]
fn customer_input_without_attributions_field() {
    let json = r#"{ "customer_id": "x", "churn_probability": 0.2 }"#;
    let input: CustomerInput = serde_json::from_str(json).unwrap();
    assert!(input.attributions.is_none());
    assert!(input.features.is_empty());
}
