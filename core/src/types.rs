//! Shared primitive types used across the insight engine.

/// A model feature identifier, e.g. `MonthlyCharges` or `monthly_charges`.
pub type FeatureId = String;

/// A stable customer identifier from the data-access layer.
pub type CustomerId = String;

/// A signed attribution value. Positive raises churn risk.
pub type Effect = f64;

/// A churn probability in [0, 1].
pub type Probability = f64;
