//! Upload workflow: drives one submission at a time through the state machine

pub mod events;
pub mod state;

pub use events::{Notice, WorkflowEvent};
pub use state::{Action, Effect, Phase, Rejected, Transition, WorkflowError, WorkflowState};

use shared::PredictionResult;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use crate::models::{ImageCandidate, SelectedImage};
use crate::predictor::Predictor;
use crate::preview::{PreviewAllocator, PreviewHandle};
use crate::store::ResultHandoffStore;
use crate::validation::validate;

const EVENT_BUFFER_SIZE: usize = 32;

/// What the driver learned while applying a transition's effects
#[derive(Debug, Default)]
struct Applied {
    predict: Option<ImageCandidate>,
    handed_off: Option<PredictionResult>,
}

/// Owns the lifecycle of image submissions.
///
/// Only one prediction may be in flight. While `Submitting`, `select`,
/// `clear` and `submit` are refused with [`WorkflowError::SubmissionInFlight`].
/// Cancellation is not supported: a started `submit` must be driven to
/// completion, so spawn it if the caller may go away.
pub struct UploadWorkflow {
    state: RwLock<WorkflowState>,
    predictor: Arc<dyn Predictor>,
    previews: Arc<dyn PreviewAllocator>,
    handoff: ResultHandoffStore,
    events: broadcast::Sender<Notice>,
}

impl UploadWorkflow {
    pub fn new(
        predictor: Arc<dyn Predictor>,
        previews: Arc<dyn PreviewAllocator>,
        handoff: ResultHandoffStore,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER_SIZE);
        info!(predictor = predictor.name(), "Upload workflow created");

        Self {
            state: RwLock::new(WorkflowState::Idle),
            predictor,
            handoff: handoff.with_previews(previews.clone()),
            previews,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.events.subscribe()
    }

    pub fn handoff(&self) -> &ResultHandoffStore {
        &self.handoff
    }

    pub async fn phase(&self) -> Phase {
        self.state.read().await.phase()
    }

    pub async fn snapshot(&self) -> WorkflowState {
        self.state.read().await.clone()
    }

    pub async fn preview(&self) -> Option<PreviewHandle> {
        self.state.read().await.image().map(|image| image.preview.clone())
    }

    /// Message of the last failed prediction while in `Failed`
    pub async fn last_error(&self) -> Option<String> {
        match &*self.state.read().await {
            WorkflowState::Failed { error, .. } => Some(error.to_string()),
            _ => None,
        }
    }

    /// Pick a file. Invalid files leave the state untouched.
    pub async fn select(&self, candidate: ImageCandidate) -> Result<(), WorkflowError> {
        if let Err(reason) = validate(&candidate) {
            warn!(file = %candidate.name, error = %reason, "Selection rejected");
            self.publish(WorkflowEvent::SelectionRejected {
                name: candidate.name,
                reason,
            });
            return Err(reason.into());
        }

        if self.phase().await == Phase::Submitting {
            return Err(WorkflowError::SubmissionInFlight);
        }

        let preview = self.previews.allocate(&candidate)?;
        self.dispatch(Action::Select(SelectedImage { candidate, preview }))
            .await
            .map(|_| ())
    }

    /// Drop the selected file. Refused while a prediction is in flight.
    pub async fn clear(&self) -> Result<(), WorkflowError> {
        self.dispatch(Action::Clear).await.map(|_| ())
    }

    /// Run the prediction for the selected file.
    ///
    /// Returns `Ok(None)` when there is nothing to submit, the handed-off
    /// result on success, and the prediction error after moving to `Failed`.
    pub async fn submit(&self) -> Result<Option<PredictionResult>, WorkflowError> {
        let Some(candidate) = self.dispatch(Action::Submit).await?.predict else {
            debug!("Submit ignored, no image selected");
            return Ok(None);
        };

        let outcome = self.predictor.predict(&candidate).await;
        let failure = outcome.as_ref().err().cloned();

        let applied = self.dispatch(Action::Resolve(outcome)).await?;
        match failure {
            Some(e) => {
                warn!(file = %candidate.name, error = %e, "Prediction failed");
                Err(e.into())
            }
            None => Ok(applied.handed_off),
        }
    }

    /// Apply one action and its effects while holding the state lock
    async fn dispatch(&self, action: Action) -> Result<Applied, WorkflowError> {
        let mut state = self.state.write().await;
        let current = std::mem::replace(&mut *state, WorkflowState::Idle);
        let from = current.phase();

        let Transition { next, effects } = match current.transition(action) {
            Ok(transition) => transition,
            Err(Rejected { state: kept, action, error }) => {
                *state = kept;
                debug!(phase = %from, error = %error, "Action rejected");
                if let Action::Select(image) = action {
                    self.previews.release(&image.preview);
                }
                return Err(error);
            }
        };

        let mut applied = Applied::default();
        for effect in effects {
            match effect {
                Effect::Release(handle) => self.previews.release(&handle),
                Effect::Predict(candidate) => applied.predict = Some(candidate),
                Effect::Handoff(result) => {
                    if let Err(e) = self.handoff.put(&result).await {
                        // The result is lost, so is the preview it carried
                        warn!(label = %result.label, error = %e, "Result handoff failed");
                        if let Some(image) = result.image {
                            self.previews.release(&PreviewHandle::from(image));
                        }
                        let error = WorkflowError::from(e);
                        self.publish(WorkflowEvent::AnalysisFailed {
                            message: error.to_string(),
                        });
                        info!(from = %from, to = %Phase::Idle, "Workflow transition");
                        return Err(error);
                    }
                    applied.handed_off = Some(result);
                }
                Effect::Notify(event) => self.publish(event),
            }
        }

        let to = next.phase();
        *state = next;
        if from != to {
            info!(from = %from, to = %to, "Workflow transition");
        }

        Ok(applied)
    }

    fn publish(&self, event: WorkflowEvent) {
        // No subscribers is fine
        let _ = self.events.send(Notice::new(event));
    }
}
