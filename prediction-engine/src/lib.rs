//! Image upload workflow with a simulated missile classifier
//!
//! A submission moves `Idle -> Ready -> Submitting -> Succeeded | Failed`.
//! Files are gated by the validation rules, predictions come from a
//! [`Predictor`], and successful results are handed to the results view
//! through a [`ResultHandoffStore`].

pub mod config;
pub mod dataset;
pub mod models;
pub mod predictor;
pub mod preview;
pub mod report;
pub mod store;
pub mod validation;
pub mod workflow;

pub use config::Config;
pub use models::{ImageCandidate, SelectedImage};
pub use predictor::{PredictionError, Predictor, SimulatedClassifier, SimulatedClassifierConfig};
pub use preview::{ObjectUrlRegistry, PreviewAllocator, PreviewError, PreviewHandle};
pub use store::{MemorySessionStorage, ResultHandoffStore, SessionStorage, StoreError};
pub use validation::{validate, DeclaredFile, FileDescriptor, ValidationError, MAX_IMAGE_BYTES};
pub use workflow::{Phase, UploadWorkflow, WorkflowError, WorkflowEvent, WorkflowState};
