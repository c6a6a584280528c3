// Dataset metadata loading and export

use anyhow::{Context, Result};
use shared::{CommonError, DatasetInfo};
use std::path::Path;
use tokio::fs;
use tracing::info;

/// File name used when exporting the dataset document
pub const EXPORT_FILE_NAME: &str = "dataset_sample.json";

/// Read and validate the static dataset document
pub async fn load_dataset(path: impl AsRef<Path>) -> Result<DatasetInfo> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .await
        .map_err(CommonError::from)
        .with_context(|| format!("Failed to read dataset document {}", path.display()))?;

    let dataset = parse_dataset(&raw)
        .with_context(|| format!("Invalid dataset document {}", path.display()))?;

    info!(
        name = %dataset.name,
        classes = dataset.classes.len(),
        samples = dataset.samples.len(),
        "Loaded dataset metadata"
    );
    Ok(dataset)
}

pub fn parse_dataset(raw: &str) -> shared::Result<DatasetInfo> {
    let dataset: DatasetInfo = serde_json::from_str(raw)?;
    dataset.validate()?;
    Ok(dataset)
}

/// Write the document pretty-printed. A directory target gets [`EXPORT_FILE_NAME`] appended.
pub async fn export_dataset(dataset: &DatasetInfo, target: impl AsRef<Path>) -> Result<std::path::PathBuf> {
    let target = target.as_ref();
    let path = if fs::metadata(target).await.map(|m| m.is_dir()).unwrap_or(false) {
        target.join(EXPORT_FILE_NAME)
    } else {
        target.to_path_buf()
    };

    let body = serde_json::to_string_pretty(dataset).context("Failed to encode dataset")?;
    fs::write(&path, body)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!(path = %path.display(), "Exported dataset document");
    Ok(path)
}
