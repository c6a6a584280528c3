//! Static dataset metadata document

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::error::CommonError;

/// Split names a sample may belong to
pub const SPLIT_NAMES: [&str; 3] = ["train", "val", "test"];

/// Train/validation/test split in whole percentages
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatasetSplit {
    pub train: u32,
    pub val: u32,
    pub test: u32,
}

impl DatasetSplit {
    pub fn total(&self) -> u32 {
        self.train + self.val + self.test
    }

    pub fn entries(&self) -> [(&'static str, u32); 3] {
        [("train", self.train), ("val", self.val), ("test", self.test)]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatasetSample {
    pub id: u64,
    pub filename: String,
    pub label: String,
    pub split: String,
}

/// Descriptive metadata of the training dataset. Read-only once loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatasetInfo {
    pub name: String,
    pub source: String,
    pub total_images: u64,
    pub classes: Vec<String>,
    pub resolution_distribution: BTreeMap<String, u64>,
    pub split: DatasetSplit,
    pub samples: Vec<DatasetSample>,
}

impl DatasetInfo {
    /// Check the document is internally consistent
    pub fn validate(&self) -> crate::Result<()> {
        if self.name.trim().is_empty() {
            return Err(CommonError::ValidationFailed("dataset name is empty".to_string()));
        }

        if self.split.total() != 100 {
            return Err(CommonError::ValidationFailed(format!(
                "split percentages sum to {}, expected 100",
                self.split.total()
            )));
        }

        let mut seen_ids = HashSet::new();
        for sample in &self.samples {
            if !seen_ids.insert(sample.id) {
                return Err(CommonError::ValidationFailed(format!(
                    "duplicate sample id {}",
                    sample.id
                )));
            }
            if !self.has_class(&sample.label) {
                return Err(CommonError::ValidationFailed(format!(
                    "sample {} has unknown label '{}'",
                    sample.id, sample.label
                )));
            }
            if !SPLIT_NAMES.contains(&sample.split.as_str()) {
                return Err(CommonError::ValidationFailed(format!(
                    "sample {} has unknown split '{}'",
                    sample.id, sample.split
                )));
            }
        }

        Ok(())
    }

    pub fn has_class(&self, label: &str) -> bool {
        self.classes.iter().any(|class| class == label)
    }

    /// Samples sharing `label`, at most `limit` of them, in document order
    pub fn samples_for_label<'a>(
        &'a self,
        label: &'a str,
        limit: usize,
    ) -> impl Iterator<Item = &'a DatasetSample> + 'a {
        self.samples
            .iter()
            .filter(move |sample| sample.label == label)
            .take(limit)
    }

    pub fn resolution_total(&self) -> u64 {
        self.resolution_distribution.values().sum()
    }
}
