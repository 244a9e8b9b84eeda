use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsightError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Duplicate feature '{feature}' in attribution map")]
    DuplicateFeature { feature: String },

    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type InsightResult<T> = Result<T, InsightError>;
