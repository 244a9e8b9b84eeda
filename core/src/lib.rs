//! Churn insight core: turns model attributions and churn probabilities
//! into ranked risk drivers, display values and retention strategies.
//!
//! Every operation here is pure and synchronous. Model training, the
//! explainer itself and persistence live outside this crate.

pub mod attribution;
pub mod config;
pub mod engine;
pub mod error;
pub mod explain;
pub mod formatter;
pub mod labeler;
pub mod ranker;
pub mod risk;
pub mod strategy;
pub mod types;

pub use attribution::{AttributionMap, FeatureImportance, FeatureRecord, FeatureValue};
pub use engine::{CustomerInput, CustomerReport, InsightEngine};
pub use error::{InsightError, InsightResult};
pub use formatter::format_value;
pub use labeler::label;
pub use ranker::{rank_drivers, RankedDriver};
pub use strategy::{synthesize, RetentionStrategy};
