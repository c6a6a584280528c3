use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::{Metrics, PredictionResult, ThreatLevel};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{PredictionError, Predictor};
use crate::models::ImageCandidate;
use crate::validation::validate;

/// A class the classifier can report, paired with its fixed description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissileClass {
    pub label: &'static str,
    pub description: &'static str,
}

pub const CLASS_CATALOG: [MissileClass; 6] = [
    MissileClass {
        label: "Scud-B",
        description: "Short-range ballistic missile identified with typical shape features.",
    },
    MissileClass {
        label: "Patriot",
        description: "Surface-to-air missile system with characteristic launcher profile.",
    },
    MissileClass {
        label: "Tomahawk",
        description: "Cruise missile detected with distinctive wing configuration.",
    },
    MissileClass {
        label: "ICBM-R36",
        description: "Intercontinental ballistic missile with large diameter body.",
    },
    MissileClass {
        label: "Minuteman-III",
        description: "Long-range strategic missile with characteristic nose cone.",
    },
    MissileClass {
        label: "DF-21",
        description: "Medium-range ballistic missile with mobile launcher signature.",
    },
];

const CONFIDENCE_MIN: f64 = 0.85;
const CONFIDENCE_MAX: f64 = 0.99;
const INFERENCE_MS_MIN: u64 = 35;
const INFERENCE_MS_MAX: u64 = 65;

pub const DEFAULT_MODEL_ID: &str = "resnet50-finetuned";

/// Fixed evaluation metrics reported with every result
pub fn reference_metrics() -> Metrics {
    Metrics {
        accuracy: Some(0.923),
        precision: Some(0.901),
        recall: Some(0.887),
        f1_score: Some(0.894),
        support: Some(750),
    }
}

#[derive(Debug, Clone)]
pub struct SimulatedClassifierConfig {
    /// Artificial delay standing in for network and compute time
    pub latency: Duration,
    pub model_id: String,
    /// Fixed seed for reproducible output
    pub seed: Option<u64>,
}

impl Default for SimulatedClassifierConfig {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(1500),
            model_id: DEFAULT_MODEL_ID.to_string(),
            seed: None,
        }
    }
}

/// Classifier that returns randomized results after a fixed delay
pub struct SimulatedClassifier {
    config: SimulatedClassifierConfig,
    rng: Mutex<StdRng>,
}

impl SimulatedClassifier {
    pub fn new(config: SimulatedClassifierConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        info!(
            model = %config.model_id,
            latency_ms = config.latency.as_millis() as u64,
            seeded = config.seed.is_some(),
            "Initialized simulated classifier"
        );

        Self {
            config,
            rng: Mutex::new(rng),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(SimulatedClassifierConfig {
            seed: Some(seed),
            ..Default::default()
        })
    }

    pub fn config(&self) -> &SimulatedClassifierConfig {
        &self.config
    }

    async fn sample(&self) -> PredictionResult {
        let mut rng = self.rng.lock().await;

        let class = CLASS_CATALOG[rng.gen_range(0..CLASS_CATALOG.len())];
        let threat = ThreatLevel::ALL[rng.gen_range(0..ThreatLevel::ALL.len())];
        let confidence = round_to(rng.gen_range(CONFIDENCE_MIN..CONFIDENCE_MAX), 4);
        let inference_time_ms = rng.gen_range(INFERENCE_MS_MIN..=INFERENCE_MS_MAX);

        PredictionResult {
            label: class.label.to_string(),
            confidence,
            threat,
            description: class.description.to_string(),
            model: self.config.model_id.clone(),
            inference_time_ms,
            image: None,
            metrics: Some(reference_metrics()),
        }
    }
}

#[async_trait]
impl Predictor for SimulatedClassifier {
    async fn predict(&self, image: &ImageCandidate) -> Result<PredictionResult, PredictionError> {
        // Checked before the delay so bad input fails fast
        if let Err(e) = validate(image) {
            warn!(file = %image.name, media_type = %image.media_type, error = %e, "Rejected prediction input");
            return Err(PredictionError::Rejected(e));
        }

        debug!(file = %image.name, size = image.size(), "Running simulated inference");
        tokio::time::sleep(self.config.latency).await;

        let result = self.sample().await;
        info!(
            file = %image.name,
            label = %result.label,
            confidence = result.confidence,
            threat = %result.threat,
            "Prediction completed"
        );
        Ok(result)
    }

    fn name(&self) -> &str {
        "simulated-classifier"
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
