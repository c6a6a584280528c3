//! Shared type definitions for the missile image classifier
//!
//! This module contains the data structures exchanged between the prediction
//! engine and whatever renders its output:
//!
//! - Prediction results and aggregate model metrics
//! - Threat levels
//! - Dataset metadata documents
//! - Error types and validation utilities

pub mod dataset;
pub mod error;
pub mod prediction;

// Re-export commonly used types for easier imports
pub use dataset::{DatasetInfo, DatasetSample, DatasetSplit, SPLIT_NAMES};
pub use error::CommonError;
pub use prediction::{Metrics, PredictionResult, ThreatLevel};
