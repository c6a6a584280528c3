//! Shared utilities and types for the missile image classifier

// Re-export common dependencies
pub use serde;
pub use serde_json;
pub use thiserror;
pub use tracing;

pub mod observability;
pub mod types;

pub use types::{
    CommonError, DatasetInfo, DatasetSample, DatasetSplit, Metrics, PredictionResult, ThreatLevel,
};

pub type Result<T> = std::result::Result<T, CommonError>;
