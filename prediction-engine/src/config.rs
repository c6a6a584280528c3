//! Configuration module for the prediction engine
//!
//! Values come from environment variables (a `.env` file is honored) with
//! defaults for everything, and are checked by `validate` before use.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use shared::observability::{LogConfig, LogFormat, LogLevel};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::predictor::simulated::DEFAULT_MODEL_ID;
use crate::predictor::SimulatedClassifierConfig;

/// Main configuration structure for the prediction engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub predictor: PredictorConfig,
    pub upload: UploadConfig,
    pub dataset: DatasetConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            predictor: PredictorConfig::from_env()?,
            upload: UploadConfig::from_env()?,
            dataset: DatasetConfig::from_env(),
            logging: LoggingConfig::from_env(),
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.predictor.validate()?;
        self.upload.validate()?;
        self.dataset.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Simulated classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictorConfig {
    pub latency_ms: u64,
    pub model_id: String,
    pub seed: Option<u64>,
}

impl PredictorConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            latency_ms: env::var("PREDICTOR_LATENCY_MS")
                .unwrap_or_else(|_| "1500".to_string())
                .parse()
                .context("Invalid PREDICTOR_LATENCY_MS")?,
            model_id: env::var("PREDICTOR_MODEL_ID").unwrap_or_else(|_| DEFAULT_MODEL_ID.to_string()),
            seed: env::var("PREDICTOR_SEED")
                .ok()
                .map(|s| s.parse::<u64>())
                .transpose()
                .context("Invalid PREDICTOR_SEED")?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.model_id.trim().is_empty() {
            bail!("Predictor model id cannot be empty");
        }
        if self.latency_ms > 60_000 {
            bail!("Predictor latency must not exceed 60000ms");
        }
        Ok(())
    }

    pub fn classifier_config(&self) -> SimulatedClassifierConfig {
        SimulatedClassifierConfig {
            latency: Duration::from_millis(self.latency_ms),
            model_id: self.model_id.clone(),
            seed: self.seed,
        }
    }
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            latency_ms: 1500,
            model_id: DEFAULT_MODEL_ID.to_string(),
            seed: None,
        }
    }
}

/// Upload handling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_live_previews: usize,
}

impl UploadConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            max_live_previews: env::var("UPLOAD_MAX_LIVE_PREVIEWS")
                .unwrap_or_else(|_| "64".to_string())
                .parse()
                .context("Invalid UPLOAD_MAX_LIVE_PREVIEWS")?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_live_previews == 0 {
            bail!("At least one live preview must be allowed");
        }
        Ok(())
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self { max_live_previews: 64 }
    }
}

/// Dataset document location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub path: PathBuf,
    pub export_path: Option<PathBuf>,
}

impl DatasetConfig {
    pub fn from_env() -> Self {
        Self {
            path: env::var("DATASET_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/dataset_sample.json")),
            export_path: env::var("DATASET_EXPORT_PATH").ok().map(PathBuf::from),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            bail!("Dataset path cannot be empty");
        }
        Ok(())
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/dataset_sample.json"),
            export_path: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.level.parse::<LogLevel>()?;
        self.format.parse::<LogFormat>()?;
        Ok(())
    }

    pub fn to_log_config(&self, service_name: &str) -> Result<LogConfig> {
        Ok(LogConfig {
            level: self.level.parse()?,
            format: self.format.parse()?,
            service_name: service_name.to_string(),
            ..Default::default()
        })
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
