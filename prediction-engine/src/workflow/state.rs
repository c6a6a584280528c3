//! Submission lifecycle as an explicit state machine
//!
//! `WorkflowState::transition` is pure: it returns the next state plus the
//! side effects the driver must perform, so every rule here is testable
//! without a predictor, a preview allocator or a store.

use shared::PredictionResult;
use std::fmt;
use thiserror::Error;

use super::events::WorkflowEvent;
use crate::models::{ImageCandidate, SelectedImage};
use crate::predictor::PredictionError;
use crate::preview::{PreviewError, PreviewHandle};
use crate::store::StoreError;
use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Prediction(#[from] PredictionError),

    #[error(transparent)]
    Preview(#[from] PreviewError),

    #[error("Could not hand off result: {0}")]
    Handoff(#[from] StoreError),

    #[error("A submission is already in flight")]
    SubmissionInFlight,

    #[error("No submission is in flight")]
    NotSubmitting,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowState {
    /// No file selected
    Idle,
    /// File validated, preview available
    Ready { image: SelectedImage },
    /// Prediction in flight
    Submitting { image: SelectedImage },
    /// Result handed off to the store, which now owns the preview
    Succeeded { label: String, confidence: f64 },
    /// Prediction failed; the image is kept for a retry
    Failed {
        image: SelectedImage,
        error: PredictionError,
    },
}

/// Tag of a [`WorkflowState`] without its data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    Ready,
    Submitting,
    Succeeded,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Ready => "ready",
            Phase::Submitting => "submitting",
            Phase::Succeeded => "succeeded",
            Phase::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A validated image with a freshly allocated preview
    Select(SelectedImage),
    Clear,
    Submit,
    /// Outcome of the prediction started by `Submit`
    Resolve(Result<PredictionResult, PredictionError>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Release(PreviewHandle),
    Predict(ImageCandidate),
    Handoff(PredictionResult),
    Notify(WorkflowEvent),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub next: WorkflowState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(next: WorkflowState, effects: Vec<Effect>) -> Self {
        Self { next, effects }
    }

    fn unchanged(state: WorkflowState) -> Self {
        Self::to(state, Vec::new())
    }
}

/// A refused action. The state is returned untouched and the action handed back.
#[derive(Debug)]
pub struct Rejected {
    pub state: WorkflowState,
    pub action: Action,
    pub error: WorkflowError,
}

impl WorkflowState {
    pub fn phase(&self) -> Phase {
        match self {
            WorkflowState::Idle => Phase::Idle,
            WorkflowState::Ready { .. } => Phase::Ready,
            WorkflowState::Submitting { .. } => Phase::Submitting,
            WorkflowState::Succeeded { .. } => Phase::Succeeded,
            WorkflowState::Failed { .. } => Phase::Failed,
        }
    }

    /// Image currently owned by the workflow, if any
    pub fn image(&self) -> Option<&SelectedImage> {
        match self {
            WorkflowState::Ready { image }
            | WorkflowState::Submitting { image }
            | WorkflowState::Failed { image, .. } => Some(image),
            WorkflowState::Idle | WorkflowState::Succeeded { .. } => None,
        }
    }

    pub fn transition(self, action: Action) -> Result<Transition, Rejected> {
        use WorkflowState::*;

        match (self, action) {
            (state @ Submitting { .. }, action @ (Action::Select(_) | Action::Clear | Action::Submit)) => {
                Err(Rejected {
                    state,
                    action,
                    error: WorkflowError::SubmissionInFlight,
                })
            }

            (Idle | Succeeded { .. }, Action::Select(image)) => Ok(select(image, None)),
            (Ready { image: old } | Failed { image: old, .. }, Action::Select(image)) => {
                Ok(select(image, Some(old.preview)))
            }

            (Idle, Action::Clear) => Ok(Transition::unchanged(Idle)),
            (Ready { image } | Failed { image, .. }, Action::Clear) => Ok(Transition::to(
                Idle,
                vec![
                    Effect::Release(image.preview),
                    Effect::Notify(WorkflowEvent::Cleared),
                ],
            )),
            (Succeeded { .. }, Action::Clear) => {
                Ok(Transition::to(Idle, vec![Effect::Notify(WorkflowEvent::Cleared)]))
            }

            (state @ (Idle | Succeeded { .. }), Action::Submit) => Ok(Transition::unchanged(state)),
            (Ready { image } | Failed { image, .. }, Action::Submit) => {
                let effects = vec![
                    Effect::Predict(image.candidate.clone()),
                    Effect::Notify(WorkflowEvent::SubmissionStarted {
                        name: image.candidate.name.clone(),
                    }),
                ];
                Ok(Transition::to(Submitting { image }, effects))
            }

            (Submitting { image }, Action::Resolve(Ok(result))) => {
                let result = result.with_image(image.preview.into_string());
                let label = result.label.clone();
                let confidence = result.confidence;
                Ok(Transition::to(
                    Succeeded {
                        label: label.clone(),
                        confidence,
                    },
                    vec![
                        Effect::Handoff(result),
                        Effect::Notify(WorkflowEvent::AnalysisComplete { label, confidence }),
                    ],
                ))
            }
            (Submitting { image }, Action::Resolve(Err(error))) => {
                let message = error.to_string();
                Ok(Transition::to(
                    Failed { image, error },
                    vec![Effect::Notify(WorkflowEvent::AnalysisFailed { message })],
                ))
            }

            (state, action @ Action::Resolve(_)) => Err(Rejected {
                state,
                action,
                error: WorkflowError::NotSubmitting,
            }),
        }
    }
}

fn select(image: SelectedImage, replaced: Option<PreviewHandle>) -> Transition {
    let mut effects = Vec::with_capacity(2);
    if let Some(old) = replaced {
        effects.push(Effect::Release(old));
    }
    effects.push(Effect::Notify(WorkflowEvent::FileSelected {
        name: image.candidate.name.clone(),
        size: image.candidate.size(),
    }));
    Transition::to(WorkflowState::Ready { image }, effects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::{ObjectUrlRegistry, PreviewAllocator};
    use pretty_assertions::assert_eq;
    use shared::ThreatLevel;

    fn selected(registry: &ObjectUrlRegistry, name: &str) -> SelectedImage {
        let candidate = ImageCandidate::new(name, "image/png", vec![1u8; 32]);
        let preview = registry.allocate(&candidate).unwrap();
        SelectedImage { candidate, preview }
    }

    fn result() -> PredictionResult {
        PredictionResult {
            label: "ICBM-R36".to_string(),
            confidence: 0.95,
            threat: ThreatLevel::High,
            description: "Intercontinental ballistic missile with large diameter body.".to_string(),
            model: "resnet50-finetuned".to_string(),
            inference_time_ms: 40,
            image: None,
            metrics: None,
        }
    }

    fn backend_error() -> PredictionError {
        PredictionError::Backend("model offline".to_string())
    }

    #[test]
    fn test_idle_submit_and_clear_are_noops() {
        let t = WorkflowState::Idle.transition(Action::Submit).unwrap();
        assert_eq!(t.next, WorkflowState::Idle);
        assert!(t.effects.is_empty());

        let t = WorkflowState::Idle.transition(Action::Clear).unwrap();
        assert_eq!(t.next, WorkflowState::Idle);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_select_from_idle() {
        let registry = ObjectUrlRegistry::default();
        let image = selected(&registry, "scud.png");

        let t = WorkflowState::Idle.transition(Action::Select(image.clone())).unwrap();
        assert_eq!(t.next.phase(), Phase::Ready);
        assert_eq!(t.next.image(), Some(&image));
        assert_eq!(
            t.effects,
            vec![Effect::Notify(WorkflowEvent::FileSelected {
                name: "scud.png".to_string(),
                size: 32,
            })]
        );
    }

    #[test]
    fn test_reselect_releases_previous_preview() {
        let registry = ObjectUrlRegistry::default();
        let first = selected(&registry, "a.png");
        let second = selected(&registry, "b.png");

        let state = WorkflowState::Ready { image: first.clone() };
        let t = state.transition(Action::Select(second.clone())).unwrap();

        assert_eq!(t.next, WorkflowState::Ready { image: second });
        assert_eq!(t.effects[0], Effect::Release(first.preview));
    }

    #[test]
    fn test_clear_from_ready_releases_preview() {
        let registry = ObjectUrlRegistry::default();
        let image = selected(&registry, "a.png");

        let t = WorkflowState::Ready { image: image.clone() }
            .transition(Action::Clear)
            .unwrap();

        assert_eq!(t.next, WorkflowState::Idle);
        assert_eq!(
            t.effects,
            vec![
                Effect::Release(image.preview),
                Effect::Notify(WorkflowEvent::Cleared),
            ]
        );
    }

    #[test]
    fn test_submit_from_ready() {
        let registry = ObjectUrlRegistry::default();
        let image = selected(&registry, "a.png");

        let t = WorkflowState::Ready { image: image.clone() }
            .transition(Action::Submit)
            .unwrap();

        assert_eq!(t.next, WorkflowState::Submitting { image: image.clone() });
        assert_eq!(t.effects[0], Effect::Predict(image.candidate));
    }

    #[test]
    fn test_submitting_rejects_everything_but_resolve() {
        let registry = ObjectUrlRegistry::default();
        let image = selected(&registry, "a.png");
        let other = selected(&registry, "b.png");

        for action in [Action::Submit, Action::Clear, Action::Select(other)] {
            let state = WorkflowState::Submitting { image: image.clone() };
            let rejected = state.transition(action.clone()).unwrap_err();
            assert!(matches!(rejected.error, WorkflowError::SubmissionInFlight));
            assert_eq!(rejected.state, WorkflowState::Submitting { image: image.clone() });
            assert_eq!(rejected.action, action);
        }
    }

    #[test]
    fn test_success_moves_preview_into_result() {
        let registry = ObjectUrlRegistry::default();
        let image = selected(&registry, "a.png");
        let handle = image.preview.as_str().to_string();

        let t = WorkflowState::Submitting { image }
            .transition(Action::Resolve(Ok(result())))
            .unwrap();

        assert_eq!(
            t.next,
            WorkflowState::Succeeded {
                label: "ICBM-R36".to_string(),
                confidence: 0.95,
            }
        );
        assert_eq!(t.effects[0], Effect::Handoff(result().with_image(handle)));
        assert!(!t.effects.iter().any(|e| matches!(e, Effect::Release(_))));
    }

    #[test]
    fn test_succeeded_clear_does_not_release() {
        let state = WorkflowState::Succeeded {
            label: "DF-21".to_string(),
            confidence: 0.9,
        };

        let t = state.transition(Action::Clear).unwrap();
        assert_eq!(t.next, WorkflowState::Idle);
        assert_eq!(t.effects, vec![Effect::Notify(WorkflowEvent::Cleared)]);
    }

    #[test]
    fn test_succeeded_submit_is_noop() {
        let state = WorkflowState::Succeeded {
            label: "DF-21".to_string(),
            confidence: 0.9,
        };

        let t = state.clone().transition(Action::Submit).unwrap();
        assert_eq!(t.next, state);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_failure_keeps_image_and_allows_retry() {
        let registry = ObjectUrlRegistry::default();
        let image = selected(&registry, "a.png");

        let t = WorkflowState::Submitting { image: image.clone() }
            .transition(Action::Resolve(Err(backend_error())))
            .unwrap();
        assert_eq!(
            t.next,
            WorkflowState::Failed {
                image: image.clone(),
                error: backend_error(),
            }
        );
        assert_eq!(
            t.effects,
            vec![Effect::Notify(WorkflowEvent::AnalysisFailed {
                message: "Failed to analyze image: model offline".to_string(),
            })]
        );

        let retry = t.next.transition(Action::Submit).unwrap();
        assert_eq!(retry.next, WorkflowState::Submitting { image });
    }

    #[test]
    fn test_resolve_outside_submitting_rejected() {
        let rejected = WorkflowState::Idle
            .transition(Action::Resolve(Ok(result())))
            .unwrap_err();
        assert!(matches!(rejected.error, WorkflowError::NotSubmitting));
        assert_eq!(rejected.state, WorkflowState::Idle);
    }
}
