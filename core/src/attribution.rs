//! Model-explanation inputs handed over by the explainability service and
//! the data-access layer.
//!
//! RULE: ScoreMap keeps insertion order. Ranking ties are broken by it,
//! so deserialization preserves JSON document order instead of sorting.

use crate::{
    error::{InsightError, InsightResult},
    types::FeatureId,
};
use serde::{
    de::{self, MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use std::collections::HashMap;
use std::fmt;

/// Ordered, duplicate-free mapping from feature id to a score.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreMap {
    entries: Vec<(FeatureId, f64)>,
    /// Feature id -> position in `entries`.
    index:   HashMap<FeatureId, usize>,
}

/// Per-customer signed attributions (SHAP-like values).
pub type AttributionMap = ScoreMap;

/// Dataset-level importance scores, used when attributions are missing.
pub type FeatureImportance = ScoreMap;

impl ScoreMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K>(pairs: I) -> InsightResult<Self>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<FeatureId>,
    {
        let mut map = Self::new();
        for (feature, score) in pairs {
            map.insert(feature, score)?;
        }
        Ok(map)
    }

    pub fn insert(&mut self, feature: impl Into<FeatureId>, score: f64) -> InsightResult<()> {
        let feature = feature.into();
        if self.index.contains_key(&feature) {
            return Err(InsightError::DuplicateFeature { feature });
        }
        self.index.insert(feature.clone(), self.entries.len());
        self.entries.push((feature, score));
        Ok(())
    }

    pub fn get(&self, feature: &str) -> Option<f64> {
        self.index.get(feature).map(|&i| self.entries[i].1)
    }

    pub fn contains(&self, feature: &str) -> bool {
        self.index.contains_key(feature)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries.iter().map(|(f, score)| (f.as_str(), *score))
    }
}

impl Serialize for ScoreMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (feature, score) in &self.entries {
            map.serialize_entry(feature, score)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ScoreMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScoreMapVisitor;

        impl<'de> Visitor<'de> for ScoreMapVisitor {
            type Value = ScoreMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of feature names to numbers")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ScoreMap, A::Error> {
                let capacity = access.size_hint().unwrap_or(0);
                let mut map = ScoreMap {
                    entries: Vec::with_capacity(capacity),
                    index:   HashMap::with_capacity(capacity),
                };
                while let Some((feature, score)) = access.next_entry::<FeatureId, f64>()? {
                    map.insert(feature, score).map_err(de::Error::custom)?;
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(ScoreMapVisitor)
    }
}

// ── Feature records ──────────────────────────────────────────────────────────

/// A raw feature value as stored for a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<bool> for FeatureValue {
    fn from(v: bool) -> Self {
        FeatureValue::Bool(v)
    }
}

impl From<f64> for FeatureValue {
    fn from(v: f64) -> Self {
        FeatureValue::Number(v)
    }
}

impl From<i64> for FeatureValue {
    fn from(v: i64) -> Self {
        FeatureValue::Number(v as f64)
    }
}

impl From<i32> for FeatureValue {
    fn from(v: i32) -> Self {
        FeatureValue::Number(f64::from(v))
    }
}

impl From<&str> for FeatureValue {
    fn from(v: &str) -> Self {
        FeatureValue::Text(v.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(v: String) -> Self {
        FeatureValue::Text(v)
    }
}

/// One customer's flat feature record. A key mapped to `None` is an
/// explicit null; a missing key is unknown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureRecord {
    values: HashMap<FeatureId, Option<FeatureValue>>,
}

impl FeatureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, feature: impl Into<FeatureId>, value: impl Into<FeatureValue>) -> Self {
        self.values.insert(feature.into(), Some(value.into()));
        self
    }

    pub fn with_null(mut self, feature: impl Into<FeatureId>) -> Self {
        self.values.insert(feature.into(), None);
        self
    }

    pub fn insert(&mut self, feature: impl Into<FeatureId>, value: Option<FeatureValue>) {
        self.values.insert(feature.into(), value);
    }

    /// The value for `feature`; `None` for both missing keys and nulls.
    pub fn get(&self, feature: &str) -> Option<&FeatureValue> {
        self.values.get(feature).and_then(Option::as_ref)
    }

    pub fn contains(&self, feature: &str) -> bool {
        self.values.contains_key(feature)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
