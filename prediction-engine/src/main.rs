use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::{error, info, warn};

use prediction_engine::dataset::{export_dataset, load_dataset};
use prediction_engine::report::{render_dataset, render_notice, render_result};
use prediction_engine::{
    Config, ImageCandidate, MemorySessionStorage, ObjectUrlRegistry, ResultHandoffStore,
    SimulatedClassifier, UploadWorkflow,
};
use shared::observability::init_logging;

const SERVICE_NAME: &str = "prediction-engine";

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    init_logging(config.logging.to_log_config(SERVICE_NAME)?)?;
    info!("Starting missile image classifier");

    let dataset = match load_dataset(&config.dataset.path).await {
        Ok(dataset) => Some(dataset),
        Err(e) => {
            error!(error = %format!("{:#}", e), "Failed to load dataset");
            None
        }
    };

    // Session-scoped collaborators
    let session = Arc::new(MemorySessionStorage::new());
    let previews = Arc::new(ObjectUrlRegistry::new(config.upload.max_live_previews));
    let predictor = Arc::new(SimulatedClassifier::new(config.predictor.classifier_config()));
    let workflow = UploadWorkflow::new(predictor, previews, ResultHandoffStore::new(session.clone()));
    let mut notices = workflow.subscribe();

    for path in env::args().skip(1).map(PathBuf::from) {
        let content = match tokio::fs::read(&path).await {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable file");
                continue;
            }
        };

        let candidate = ImageCandidate::from_path_and_bytes(&path, content);
        if workflow.select(candidate).await.is_ok() {
            if let Err(e) = workflow.submit().await {
                warn!(path = %path.display(), error = %e, "Submission failed");
            }
        }

        loop {
            match notices.try_recv() {
                Ok(notice) => println!("{}", render_notice(&notice)),
                Err(TryRecvError::Lagged(skipped)) => warn!(skipped, "Missed notifications"),
                Err(_) => break,
            }
        }
    }

    // Results screen: a fresh view over the same session
    let results = ResultHandoffStore::new(session);
    let last = results.get().await;
    println!();
    print!("{}", render_result(last.as_ref(), dataset.as_ref()));
    println!();
    print!("{}", render_dataset(dataset.as_ref()));

    if let (Some(dataset), Some(target)) = (&dataset, &config.dataset.export_path) {
        let written = export_dataset(dataset, target)
            .await
            .context("Dataset export failed")?;
        println!("Dataset sample written to {}", written.display());
    }

    Ok(())
}
