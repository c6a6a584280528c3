use chrono::{DateTime, Utc};

use crate::validation::ValidationError;

/// Notifications published as a submission moves through its lifecycle
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    FileSelected { name: String, size: u64 },
    SelectionRejected { name: String, reason: ValidationError },
    SubmissionStarted { name: String },
    AnalysisComplete { label: String, confidence: f64 },
    AnalysisFailed { message: String },
    Cleared,
}

impl WorkflowEvent {
    pub fn title(&self) -> &'static str {
        match self {
            WorkflowEvent::FileSelected { .. } => "Image selected",
            WorkflowEvent::SelectionRejected { reason, .. } => reason.title(),
            WorkflowEvent::SubmissionStarted { .. } => "Analyzing...",
            WorkflowEvent::AnalysisComplete { .. } => "Analysis complete",
            WorkflowEvent::AnalysisFailed { .. } => "Analysis failed",
            WorkflowEvent::Cleared => "Selection cleared",
        }
    }

    pub fn description(&self) -> String {
        match self {
            WorkflowEvent::FileSelected { name, size } => format!("{} ({} bytes)", name, size),
            WorkflowEvent::SelectionRejected { reason, .. } => reason.to_string(),
            WorkflowEvent::SubmissionStarted { name } => format!("Running classification on {}", name),
            WorkflowEvent::AnalysisComplete { label, confidence } => {
                format!("Detected: {} ({:.1}% confidence)", label, confidence * 100.0)
            }
            WorkflowEvent::AnalysisFailed { message } => message.clone(),
            WorkflowEvent::Cleared => "Ready for a new image".to_string(),
        }
    }

    /// Whether the event reports something going wrong
    pub fn is_destructive(&self) -> bool {
        matches!(
            self,
            WorkflowEvent::SelectionRejected { .. } | WorkflowEvent::AnalysisFailed { .. }
        )
    }
}

/// A published event with its timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub event: WorkflowEvent,
    pub at: DateTime<Utc>,
}

impl Notice {
    pub fn new(event: WorkflowEvent) -> Self {
        Self { event, at: Utc::now() }
    }
}
