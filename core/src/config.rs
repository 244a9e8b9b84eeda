use crate::error::{InsightError, InsightResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub high:   f64,
    pub medium: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self { high: 0.7, medium: 0.3 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    pub risk_thresholds:  RiskThresholds,
    /// Drivers shown per customer report.
    pub driver_limit:     usize,
    pub top_factor_limit: usize,
    pub chart_limit:      usize,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            risk_thresholds:  RiskThresholds::default(),
            driver_limit:     5,
            top_factor_limit: 5,
            chart_limit:      10,
        }
    }
}

impl InsightConfig {
    /// Load from a JSON file. Missing fields keep their defaults.
    /// In tests, use InsightConfig::default().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config = Self::from_json(&content)?;
        log::debug!(
            "config: loaded {path} (high={}, medium={}, drivers={})",
            config.risk_thresholds.high,
            config.risk_thresholds.medium,
            config.driver_limit,
        );
        Ok(config)
    }

    pub fn from_json(content: &str) -> InsightResult<Self> {
        let config: InsightConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> InsightResult<()> {
        let t = &self.risk_thresholds;

        if !t.high.is_finite() || !t.medium.is_finite() {
            return Err(invalid("risk thresholds must be finite"));
        }
        if !(0.0..=1.0).contains(&t.medium) || !(0.0..=1.0).contains(&t.high) {
            return Err(invalid("risk thresholds must lie in [0, 1]"));
        }
        if t.medium > t.high {
            return Err(invalid(format!(
                "medium threshold {} exceeds high threshold {}",
                t.medium, t.high,
            )));
        }
        for (name, limit) in [
            ("driver_limit", self.driver_limit),
            ("top_factor_limit", self.top_factor_limit),
            ("chart_limit", self.chart_limit),
        ] {
            if limit == 0 {
                return Err(invalid(format!("{name} must be at least 1")));
            }
        }

        Ok(())
    }
}

fn invalid(reason: impl Into<String>) -> InsightError {
    InsightError::InvalidConfig { reason: reason.into() }
}
