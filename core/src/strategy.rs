//! Retention strategy synthesis, from top risk-increasing drivers to a
//! headline and an ordered action list.
//!
//! Selection:
//!   1. Keep attributions with effect > 0, highest first, at most 3.
//!   2. Each candidate takes the first rule in RULES whose keywords occur
//!      in its lower-cased feature id, or a generic action naming it.
//!   3. The first matched rule sets the title. Actions are deduplicated.
//!   4. Pad to MIN_ACTIONS with the monitoring action.
//!
//! Missing attributions or no positive effects fall back to a fixed
//! strategy chosen by churn probability.

use crate::{
    attribution::AttributionMap,
    labeler::label,
    ranker::descending,
    types::{Effect, Probability},
};
use serde::{Deserialize, Serialize};

/// Risk features considered for rule matching.
pub const MAX_RISK_FEATURES: usize = 3;
pub const MIN_ACTIONS: usize = 2;

pub const HIGH_THRESHOLD: Probability = 0.7;
pub const MEDIUM_THRESHOLD: Probability = 0.3;

pub const MONITORING_ACTION: &str =
    "Monitor account activity weekly and schedule a follow-up review";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionStrategy {
    pub title:   String,
    pub actions: Vec<String>,
}

// ── Rule table ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleCategory {
    Contract,
    Pricing,
    Tenure,
    Support,
    Product,
    Financial,
    Usage,
    Membership,
    Community,
}

#[derive(Debug)]
pub struct RetentionRule {
    pub category: RuleCategory,
    /// Lower-case substrings; any hit is a match.
    pub keywords: &'static [&'static str],
    pub title:    &'static str,
    pub action:   &'static str,
}

impl RetentionRule {
    pub fn matches(&self, feature_lower: &str) -> bool {
        self.keywords.iter().any(|k| feature_lower.contains(k))
    }
}

/// Evaluated in declaration order; first match wins per feature.
pub static RULES: &[RetentionRule] = &[
    RetentionRule {
        category: RuleCategory::Contract,
        keywords: &["contract", "commitment", "agreement"],
        title:    "Contract Conversion Plan",
        action:   "Offer a discounted upgrade from month-to-month to a one- or two-year contract",
    },
    RetentionRule {
        category: RuleCategory::Pricing,
        keywords: &["charge", "price", "pricing", "fee", "bill", "cost"],
        title:    "Pricing Review",
        action:   "Review the customer's pricing and propose a targeted discount or bundle",
    },
    RetentionRule {
        category: RuleCategory::Tenure,
        keywords: &["tenure", "loyal", "months_active", "account_age", "customer_since"],
        title:    "Early-Lifecycle Loyalty Program",
        action:   "Enroll the customer in a loyalty program with milestone rewards",
    },
    RetentionRule {
        category: RuleCategory::Support,
        keywords: &["support", "ticket", "complaint", "call", "issue"],
        title:    "Service Recovery Outreach",
        action:   "Have a senior support agent reach out to resolve open issues",
    },
    RetentionRule {
        category: RuleCategory::Product,
        keywords: &["product", "service", "feature", "addon", "add_on", "streaming", "security", "backup", "protection", "internet"],
        title:    "Product Fit Review",
        action:   "Recommend complementary products or services that match the customer's needs",
    },
    RetentionRule {
        category: RuleCategory::Financial,
        keywords: &["balance", "credit", "income", "salary", "payment", "debt", "loan"],
        title:    "Financial Flexibility Offer",
        action:   "Offer flexible payment options or a one-on-one financial review",
    },
    RetentionRule {
        category: RuleCategory::Usage,
        keywords: &["usage", "activity", "login", "session", "engagement", "visit", "inactive", "days_since"],
        title:    "Re-engagement Campaign",
        action:   "Launch a personalized re-engagement campaign highlighting unused benefits",
    },
    RetentionRule {
        category: RuleCategory::Membership,
        keywords: &["member", "tier", "premium", "subscription", "plan"],
        title:    "Membership Upgrade Offer",
        action:   "Offer a complimentary membership tier upgrade for the next billing cycle",
    },
    RetentionRule {
        category: RuleCategory::Community,
        keywords: &["referral", "refer", "community", "social", "friend", "partner", "dependent"],
        title:    "Community & Referral Program",
        action:   "Invite the customer to the referral program with a two-sided reward",
    },
];

/// First rule matching `feature_id`, case-insensitively.
pub fn match_rule(feature_id: &str) -> Option<&'static RetentionRule> {
    let lower = feature_id.to_lowercase();
    RULES.iter().find(|rule| rule.matches(&lower))
}

// ── Defaults ─────────────────────────────────────────────────────────────────

pub struct DefaultStrategy {
    pub title:   &'static str,
    pub actions: [&'static str; 3],
}

pub const HIGH_RISK_DEFAULT: DefaultStrategy = DefaultStrategy {
    title:   "Immediate Retention Intervention",
    actions: [
        "Make a personalized retention offer within 48 hours",
        "Arrange direct outreach from a dedicated account manager",
        "Provide an exclusive loyalty incentive",
    ],
};

pub const MEDIUM_RISK_DEFAULT: DefaultStrategy = DefaultStrategy {
    title:   "Proactive Engagement Plan",
    actions: [
        "Schedule a customer check-in call",
        "Offer loyalty rewards for continued service",
        "Provide a service enhancement or feature trial",
    ],
};

pub const LOW_RISK_DEFAULT: DefaultStrategy = DefaultStrategy {
    title:   "Standard Relationship Maintenance",
    actions: [
        "Continue standard engagement cadence",
        "Monitor for changes in usage or satisfaction",
        "Maintain regular communication",
    ],
};

impl DefaultStrategy {
    pub fn for_probability(p: Probability) -> &'static DefaultStrategy {
        if p > HIGH_THRESHOLD {
            &HIGH_RISK_DEFAULT
        } else if p > MEDIUM_THRESHOLD {
            &MEDIUM_RISK_DEFAULT
        } else {
            &LOW_RISK_DEFAULT
        }
    }

    pub fn to_strategy(&self) -> RetentionStrategy {
        RetentionStrategy {
            title:   self.title.to_string(),
            actions: self.actions.iter().map(|a| a.to_string()).collect(),
        }
    }
}

// ── Synthesis ────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Accumulator {
    title:   Option<&'static str>,
    actions: Vec<String>,
}

impl Accumulator {
    fn absorb(mut self, feature: &str) -> Self {
        match match_rule(feature) {
            Some(rule) => {
                log::debug!("strategy: '{feature}' matched {:?}", rule.category);
                self.title.get_or_insert(rule.title);
                self.push_unique(rule.action.to_string());
            }
            None => {
                log::debug!("strategy: '{feature}' matched no rule");
                self.push_unique(generic_action(feature));
            }
        }
        self
    }

    fn push_unique(&mut self, action: String) {
        if !self.actions.contains(&action) {
            self.actions.push(action);
        }
    }
}

fn generic_action(feature: &str) -> String {
    format!("Review {} with the customer and address related concerns", label(feature))
}

/// Positive-effect features, strongest first, capped at MAX_RISK_FEATURES.
pub fn risk_features(attributions: &AttributionMap) -> Vec<(&str, Effect)> {
    let mut positive: Vec<(&str, Effect)> = attributions
        .iter()
        .filter(|(_, effect)| *effect > 0.0)
        .collect();
    positive.sort_by(|a, b| descending(a.1, b.1));
    positive.truncate(MAX_RISK_FEATURES);
    positive
}

/// Build the retention strategy for one customer. Total: every input yields
/// a strategy with at least MIN_ACTIONS distinct actions.
pub fn synthesize(
    attributions: Option<&AttributionMap>,
    churn_probability: Probability,
) -> RetentionStrategy {
    let fallback = DefaultStrategy::for_probability(churn_probability);

    let Some(attributions) = attributions.filter(|a| !a.is_empty()) else {
        return fallback.to_strategy();
    };

    let acc = risk_features(attributions)
        .into_iter()
        .fold(Accumulator::default(), |acc, (feature, _)| acc.absorb(feature));

    if acc.actions.is_empty() {
        log::debug!("strategy: no positive drivers, using default '{}'", fallback.title);
        return fallback.to_strategy();
    }

    let mut actions = acc.actions;
    if actions.len() < MIN_ACTIONS && !actions.iter().any(|a| a == MONITORING_ACTION) {
        actions.push(MONITORING_ACTION.to_string());
    }

    RetentionStrategy {
        title: acc.title.unwrap_or(fallback.title).to_string(),
        actions,
    }
}
