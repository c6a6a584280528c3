use shared::PredictionResult;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{SessionStorage, StoreError};
use crate::preview::{PreviewAllocator, PreviewHandle};

/// Well-known key the last result is stored under
pub const RESULT_KEY: &str = "predictionResult";

/// Carries the last prediction from the submission screen to the results screen.
///
/// Holds at most one result. Every clone shares the same underlying storage,
/// so a fresh instance over the same storage sees what an earlier one wrote.
///
/// The stored result owns its preview handle. When the store is wired to a
/// [`PreviewAllocator`], replacing or clearing the result releases the handle
/// of the record it displaces.
#[derive(Clone)]
pub struct ResultHandoffStore {
    storage: Arc<dyn SessionStorage>,
    previews: Option<Arc<dyn PreviewAllocator>>,
}

impl ResultHandoffStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            storage,
            previews: None,
        }
    }

    /// Release displaced preview handles through `previews`
    pub fn with_previews(mut self, previews: Arc<dyn PreviewAllocator>) -> Self {
        self.previews = Some(previews);
        self
    }

    /// Replace whatever result is stored
    pub async fn put(&self, result: &PredictionResult) -> Result<(), StoreError> {
        if !result.has_valid_confidence() {
            return Err(StoreError::InvalidConfidence(result.confidence));
        }
        let encoded = serde_json::to_string(result).map_err(StoreError::Serialize)?;

        let displaced = self.stored_image().await;
        self.storage.set_item(RESULT_KEY, encoded).await;
        info!(label = %result.label, "Stored prediction result for handoff");

        if displaced.is_some() && displaced != result.image {
            self.release(displaced);
        }
        Ok(())
    }

    /// Last stored result, or `None` when absent or unreadable
    pub async fn get(&self) -> Option<PredictionResult> {
        match self.try_get().await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable prediction result");
                None
            }
        }
    }

    /// Like [`get`](Self::get) but reports a corrupt record
    pub async fn try_get(&self) -> Result<Option<PredictionResult>, StoreError> {
        let Some(raw) = self.storage.get_item(RESULT_KEY).await else {
            debug!("No prediction result stored");
            return Ok(None);
        };

        let result: PredictionResult = serde_json::from_str(&raw).map_err(StoreError::Corrupt)?;
        if !result.has_valid_confidence() {
            return Err(StoreError::InvalidConfidence(result.confidence));
        }
        Ok(Some(result))
    }

    pub async fn clear(&self) {
        let displaced = self.stored_image().await;
        self.storage.remove_item(RESULT_KEY).await;
        self.release(displaced);
        debug!("Cleared stored prediction result");
    }

    /// Preview handle of the stored record, read leniently so that even a
    /// record failing the confidence check gives its handle back
    async fn stored_image(&self) -> Option<String> {
        let raw = self.storage.get_item(RESULT_KEY).await?;
        serde_json::from_str::<PredictionResult>(&raw).ok()?.image
    }

    fn release(&self, image: Option<String>) {
        if let (Some(previews), Some(image)) = (&self.previews, image) {
            previews.release(&PreviewHandle::from(image));
        }
    }
}
