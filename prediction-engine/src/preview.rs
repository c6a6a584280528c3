//! Session-local preview handles
//!
//! A preview handle lets the uploaded bytes be redisplayed without re-reading
//! the source file. Handles are a capped resource: every handle must be
//! released once the image it points at is discarded, unless ownership has
//! moved to the result handoff store.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::ImageCandidate;

const HANDLE_SCHEME: &str = "blob:session/";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreviewHandle(String);

impl PreviewHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for PreviewHandle {
    fn from(handle: String) -> Self {
        Self(handle)
    }
}

impl fmt::Display for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreviewError {
    #[error("Preview limit reached: {0} handles are still live")]
    Exhausted(usize),
}

/// Allocates and releases preview handles
pub trait PreviewAllocator: Send + Sync {
    fn allocate(&self, image: &ImageCandidate) -> Result<PreviewHandle, PreviewError>;

    /// Releasing an unknown or already released handle is a no-op
    fn release(&self, handle: &PreviewHandle);

    fn live_handles(&self) -> usize;
}

/// In-memory registry modelled on browser object URLs
pub struct ObjectUrlRegistry {
    max_live: usize,
    live: RwLock<HashMap<PreviewHandle, Bytes>>,
}

impl ObjectUrlRegistry {
    pub fn new(max_live: usize) -> Self {
        Self {
            max_live,
            live: RwLock::new(HashMap::new()),
        }
    }

    /// Bytes behind a live handle
    pub fn resolve(&self, handle: &PreviewHandle) -> Option<Bytes> {
        let live = self.live.read().unwrap_or_else(|e| e.into_inner());
        live.get(handle).cloned()
    }

    /// Same as [`resolve`](Self::resolve) for a handle carried as plain text
    pub fn resolve_str(&self, handle: &str) -> Option<Bytes> {
        self.resolve(&PreviewHandle::from(handle.to_string()))
    }
}

impl Default for ObjectUrlRegistry {
    fn default() -> Self {
        Self::new(64)
    }
}

impl PreviewAllocator for ObjectUrlRegistry {
    fn allocate(&self, image: &ImageCandidate) -> Result<PreviewHandle, PreviewError> {
        let mut live = self.live.write().unwrap_or_else(|e| e.into_inner());
        if live.len() >= self.max_live {
            warn!(live = live.len(), "Preview handle limit reached");
            return Err(PreviewError::Exhausted(live.len()));
        }

        let handle = PreviewHandle(format!("{}{}", HANDLE_SCHEME, Uuid::new_v4()));
        live.insert(handle.clone(), image.content.clone());
        debug!(handle = %handle, file = %image.name, "Allocated preview handle");
        Ok(handle)
    }

    fn release(&self, handle: &PreviewHandle) {
        let mut live = self.live.write().unwrap_or_else(|e| e.into_inner());
        if live.remove(handle).is_some() {
            debug!(handle = %handle, "Released preview handle");
        }
    }

    fn live_handles(&self) -> usize {
        self.live.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}
