use async_trait::async_trait;
use mockall::{mock, Sequence};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use prediction_engine::predictor::{reference_metrics, CLASS_CATALOG};
use prediction_engine::{
    ImageCandidate, MemorySessionStorage, ObjectUrlRegistry, Phase, PredictionError, Predictor,
    PreviewAllocator, ResultHandoffStore, SimulatedClassifier, StoreError, UploadWorkflow,
    ValidationError, WorkflowError,
};
use shared::{PredictionResult, ThreatLevel};

mock! {
    pub Classifier {}

    #[async_trait]
    impl Predictor for Classifier {
        async fn predict(&self, image: &ImageCandidate) -> Result<PredictionResult, PredictionError>;
    }
}

struct Session {
    storage: Arc<MemorySessionStorage>,
    previews: Arc<ObjectUrlRegistry>,
    workflow: UploadWorkflow,
}

fn session_with(predictor: Arc<dyn Predictor>) -> Session {
    let storage = Arc::new(MemorySessionStorage::new());
    let previews = Arc::new(ObjectUrlRegistry::new(8));
    let workflow = UploadWorkflow::new(
        predictor,
        previews.clone(),
        ResultHandoffStore::new(storage.clone()),
    );
    Session {
        storage,
        previews,
        workflow,
    }
}

fn image(name: &str, media_type: &str, size: usize) -> ImageCandidate {
    ImageCandidate::new(name, media_type, vec![0u8; size])
}

fn fixed_result() -> PredictionResult {
    PredictionResult {
        label: "Minuteman-III".to_string(),
        confidence: 0.9011,
        threat: ThreatLevel::Medium,
        description: "Long-range strategic missile with characteristic nose cone.".to_string(),
        model: "resnet50-finetuned".to_string(),
        inference_time_ms: 37,
        image: None,
        metrics: Some(reference_metrics()),
    }
}

#[tokio::test(start_paused = true)]
async fn test_scenario_a_png_submission_succeeds() {
    let s = session_with(Arc::new(SimulatedClassifier::with_seed(1)));

    s.workflow
        .select(image("scud.png", "image/png", 2 * 1024 * 1024))
        .await
        .unwrap();
    assert_eq!(s.workflow.phase().await, Phase::Ready);

    let start = Instant::now();
    let result = s.workflow.submit().await.unwrap().unwrap();
    assert!(start.elapsed() >= Duration::from_millis(1500));
    assert_eq!(s.workflow.phase().await, Phase::Succeeded);

    let class = CLASS_CATALOG
        .iter()
        .find(|c| c.label == result.label)
        .expect("label is one of the fixed classes");
    assert_eq!(result.description, class.description);
    assert!((0.85..=0.99).contains(&result.confidence));
    assert!((35..=65).contains(&result.inference_time_ms));
    assert!(result.image.is_some());
}

#[tokio::test]
async fn test_scenario_b_oversized_jpeg_rejected() {
    let s = session_with(Arc::new(SimulatedClassifier::with_seed(1)));

    let err = s
        .workflow
        .select(image("big.jpg", "image/jpeg", 7 * 1024 * 1024))
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::Validation(ValidationError::TooLarge)));
    assert_eq!(s.workflow.phase().await, Phase::Idle);
    assert_eq!(s.previews.live_handles(), 0);
}

#[tokio::test]
async fn test_scenario_c_text_file_rejected() {
    let s = session_with(Arc::new(SimulatedClassifier::with_seed(1)));

    let err = s
        .workflow
        .select(image("notes.txt", "text/plain", 64))
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::Validation(ValidationError::InvalidType)));
    assert_eq!(s.workflow.phase().await, Phase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_scenario_d_result_survives_reload() {
    let s = session_with(Arc::new(SimulatedClassifier::with_seed(8)));

    s.workflow
        .select(image("df21.jpg", "image/jpeg", 4096))
        .await
        .unwrap();
    let submitted = s.workflow.submit().await.unwrap().unwrap();

    // A new store over the same session storage models a page reload
    let reloaded = ResultHandoffStore::new(s.storage.clone());
    let first = reloaded.get().await;
    let second = reloaded.get().await;
    assert_eq!(first, Some(submitted));
    assert_eq!(first, second);

    // The handle carried in the result still resolves to the uploaded bytes
    let handle = first.and_then(|r| r.image).unwrap();
    assert_eq!(s.previews.resolve_str(&handle).map(|b| b.len()), Some(4096));
}

#[tokio::test]
async fn test_scenario_e_retry_after_failure() {
    let mut classifier = MockClassifier::new();
    let mut seq = Sequence::new();
    classifier
        .expect_predict()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Err(PredictionError::Backend("inference backend unavailable".to_string())));
    classifier
        .expect_predict()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(fixed_result()));

    let s = session_with(Arc::new(classifier));
    s.workflow
        .select(image("minuteman.png", "image/png", 1024))
        .await
        .unwrap();
    let preview = s.workflow.preview().await.unwrap();

    let err = s.workflow.submit().await.unwrap_err();
    assert!(matches!(err, WorkflowError::Prediction(PredictionError::Backend(_))));
    assert_eq!(s.workflow.phase().await, Phase::Failed);
    assert_eq!(
        s.workflow.last_error().await.as_deref(),
        Some("Failed to analyze image: inference backend unavailable")
    );
    // The image and preview survive the failure
    assert_eq!(s.workflow.preview().await, Some(preview.clone()));
    assert_eq!(s.workflow.handoff().get().await, None);

    let result = s.workflow.submit().await.unwrap().unwrap();
    assert_eq!(s.workflow.phase().await, Phase::Succeeded);
    assert_eq!(result, fixed_result().with_image(preview.as_str()));
    assert_eq!(s.workflow.handoff().get().await, Some(result));
}

#[tokio::test]
async fn test_clear_after_failure_releases_preview() {
    let mut classifier = MockClassifier::new();
    classifier
        .expect_predict()
        .returning(|_| Err(PredictionError::Backend("down".to_string())));

    let s = session_with(Arc::new(classifier));
    s.workflow
        .select(image("scud.png", "image/png", 16))
        .await
        .unwrap();
    assert!(s.workflow.submit().await.is_err());
    assert_eq!(s.previews.live_handles(), 1);

    s.workflow.clear().await.unwrap();
    assert_eq!(s.workflow.phase().await, Phase::Idle);
    assert_eq!(s.previews.live_handles(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_workflow_reuse_overwrites_handoff() {
    let s = session_with(Arc::new(SimulatedClassifier::with_seed(21)));
    let mut events = s.workflow.subscribe();

    s.workflow.select(image("a.png", "image/png", 10)).await.unwrap();
    let first = s.workflow.submit().await.unwrap().unwrap();

    // Selecting again after success starts a new cycle
    s.workflow.select(image("b.png", "image/png", 20)).await.unwrap();
    assert_eq!(s.workflow.phase().await, Phase::Ready);
    let second = s.workflow.submit().await.unwrap().unwrap();

    assert_ne!(first.image, second.image);
    assert_eq!(s.workflow.handoff().get().await, Some(second.clone()));
    // Replacing the stored result gave the first preview back
    assert_eq!(s.previews.live_handles(), 1);
    assert_eq!(s.previews.resolve_str(first.image.as_deref().unwrap()), None);

    let mut titles = Vec::new();
    while let Ok(notice) = events.try_recv() {
        titles.push(notice.event.title());
    }
    assert_eq!(
        titles,
        vec![
            "Image selected",
            "Analyzing...",
            "Analysis complete",
            "Image selected",
            "Analyzing...",
            "Analysis complete",
        ]
    );
}

#[tokio::test]
async fn test_rejected_handoff_discards_result_and_preview() {
    let mut classifier = MockClassifier::new();
    classifier.expect_predict().returning(|_| {
        let mut result = fixed_result();
        result.confidence = 1.5;
        Ok(result)
    });

    let s = session_with(Arc::new(classifier));
    let mut events = s.workflow.subscribe();
    s.workflow
        .select(image("patriot.png", "image/png", 256))
        .await
        .unwrap();

    let err = s.workflow.submit().await.unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::Handoff(StoreError::InvalidConfidence(_))
    ));
    assert_eq!(s.workflow.phase().await, Phase::Idle);
    assert_eq!(s.previews.live_handles(), 0);
    assert_eq!(s.workflow.handoff().get().await, None);

    let mut titles = Vec::new();
    while let Ok(notice) = events.try_recv() {
        titles.push(notice.event.title());
    }
    assert_eq!(titles, vec!["Image selected", "Analyzing...", "Analysis failed"]);

    // The workflow stays usable
    s.workflow
        .select(image("patriot.png", "image/png", 256))
        .await
        .unwrap();
    assert_eq!(s.workflow.phase().await, Phase::Ready);
}
