//! Image classification backends

pub mod simulated;

pub use simulated::{
    reference_metrics, MissileClass, SimulatedClassifier, SimulatedClassifierConfig, CLASS_CATALOG,
};

use async_trait::async_trait;
use shared::PredictionResult;
use thiserror::Error;

use crate::models::ImageCandidate;
use crate::validation::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredictionError {
    /// The input failed the validation rules; the message is the rule's own
    #[error("{0}")]
    Rejected(#[from] ValidationError),

    #[error("Failed to analyze image: {0}")]
    Backend(String),
}

/// A single classification call. No retries: each call fully succeeds or fully fails.
#[async_trait]
pub trait Predictor: Send + Sync {
    async fn predict(&self, image: &ImageCandidate) -> Result<PredictionResult, PredictionError>;

    fn name(&self) -> &str {
        "predictor"
    }
}
