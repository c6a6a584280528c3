//! Tab-scoped key/value storage and the result handoff built on top of it

pub mod handoff;
pub mod session;

pub use handoff::{ResultHandoffStore, RESULT_KEY};
pub use session::MemorySessionStorage;

use async_trait::async_trait;
use thiserror::Error;

/// String key/value storage living as long as one session
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn get_item(&self, key: &str) -> Option<String>;
    async fn set_item(&self, key: &str, value: String);
    async fn remove_item(&self, key: &str);
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to serialize prediction result: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Stored prediction result is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("Prediction confidence {0} is outside [0, 1]")]
    InvalidConfidence(f64),
}
