/*!
 * End-to-end tests for the prompt-to-action editing flow, with every
 * external collaborator mocked
 */

use std::sync::Arc;

use veditai::app_config::Config;
use veditai::app_controller::Controller;
use veditai::classifier::mock::MockClassifier;
use veditai::classifier::{ActionClassifier, FALLBACK_REPLY};
use veditai::errors::AppError;
use veditai::media::renderer::Renderer;
use veditai::media::silence::SilenceScanner;
use veditai::media::transcriber::Transcriber;
use veditai::overlay::OverlayKind;
use veditai::session::store::{InMemorySessionStore, SessionStore};

use crate::common::mock_media::{
    MockImageGenerator, MockRenderer, MockSilenceScanner, MockTranscriber,
};
use crate::common::{create_temp_dir, create_test_video, sample_transcript};

/// Build a controller whose collaborators are all mocks
fn controller_with_classifier(
    classifier: Arc<dyn ActionClassifier>,
    output_dir: &std::path::Path,
) -> (Controller, Arc<InMemorySessionStore>) {
    let mut config = Config::default();
    config.media.output_dir = output_dir.to_path_buf();

    let store = Arc::new(InMemorySessionStore::new());
    let transcriber: Arc<dyn Transcriber> =
        Arc::new(MockTranscriber::with_segments(sample_transcript()));
    let renderer: Arc<dyn Renderer> = Arc::new(MockRenderer::working());
    let detector: Arc<dyn SilenceScanner> = Arc::new(MockSilenceScanner::unavailable());

    let controller = Controller::with_collaborators(
        config,
        store.clone(),
        classifier,
        transcriber,
        renderer,
        detector,
    );

    (controller, store)
}

#[tokio::test]
async fn test_handlePrompt_styleRequest_shouldUpdateAndPersistStyle() {
    let dir = create_temp_dir().unwrap();
    let video = create_test_video(&dir.path().to_path_buf(), "talk.mp4").unwrap();
    let classifier = Arc::new(MockClassifier::scripted([
        r#"{"action":"style","new_style":{"font_color":"yellow","font_size":30}}"#,
    ]));
    let (controller, store) = controller_with_classifier(classifier, dir.path());

    let session = controller.open_session(&video).await.unwrap();
    let reply = controller
        .handle_prompt(&session.id, "make the subtitles yellow and bigger")
        .await
        .unwrap();

    assert!(reply.reply.contains("Updated style"));
    let stored = store.get(&session.id).unwrap().unwrap();
    assert_eq!(stored.style.font_color, "yellow");
    assert_eq!(stored.style.font_size, 30);
    // Untouched fields keep their defaults
    assert_eq!(stored.style.font_family, "Arial");
}

#[tokio::test]
async fn test_handlePrompt_chatReply_shouldNotMutateSession() {
    let dir = create_temp_dir().unwrap();
    let video = create_test_video(&dir.path().to_path_buf(), "talk.mp4").unwrap();
    let classifier = Arc::new(MockClassifier::scripted([
        r#"{"action":"chat","response":"Happy to help!"}"#,
    ]));
    let (controller, store) = controller_with_classifier(classifier, dir.path());

    let session = controller.open_session(&video).await.unwrap();
    let before = store.get(&session.id).unwrap().unwrap();

    let reply = controller
        .handle_prompt(&session.id, "what can you do?")
        .await
        .unwrap();

    assert_eq!(reply.reply, "Happy to help!");
    let after = store.get(&session.id).unwrap().unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_handlePrompt_visualRequest_shouldAnchorOverlayToPhrase() {
    let dir = create_temp_dir().unwrap();
    let video = create_test_video(&dir.path().to_path_buf(), "talk.mp4").unwrap();
    let classifier = Arc::new(MockClassifier::scripted([
        r#"{"action":"visual","trigger_phrase":"rust","keyword":"crab","img_style":"photo"}"#,
    ]));
    let (controller, store) = controller_with_classifier(classifier, dir.path());

    let session = controller.open_session(&video).await.unwrap();
    let reply = controller
        .handle_prompt(&session.id, "show a crab when I mention rust")
        .await
        .unwrap();

    assert!(reply.reply.contains("visual overlay #1"));
    let stored = store.get(&session.id).unwrap().unwrap();
    let visuals = stored.overlays.list(OverlayKind::Visual);
    assert_eq!(visuals.len(), 1);
    // "rust" lives in the second sample segment (4.0-8.0)
    assert!(visuals[0].start > 4.0 && visuals[0].start < 8.0);
    assert!((visuals[0].end - visuals[0].start - 5.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_handlePrompt_threeUnresolvedVisuals_shouldChain() {
    let dir = create_temp_dir().unwrap();
    let video = create_test_video(&dir.path().to_path_buf(), "talk.mp4").unwrap();
    let descriptor = r#"{"action":"visual","trigger_phrase":"qqqq zzzz","keyword":"cat"}"#;
    let classifier = Arc::new(MockClassifier::scripted([descriptor, descriptor, descriptor]));
    let (controller, store) = controller_with_classifier(classifier, dir.path());

    let session = controller.open_session(&video).await.unwrap();
    for _ in 0..3 {
        controller
            .handle_prompt(&session.id, "show a cat somewhere")
            .await
            .unwrap();
    }

    let stored = store.get(&session.id).unwrap().unwrap();
    let visuals = stored.overlays.list(OverlayKind::Visual);
    assert_eq!(visuals.len(), 3);
    assert_eq!(visuals[0].start, 0.0);
    assert_eq!(visuals[1].start, visuals[0].end);
    assert_eq!(visuals[2].start, visuals[1].end);
}

#[tokio::test]
async fn test_handlePrompt_malformedClassifierOutput_shouldFallBackToChat() {
    let dir = create_temp_dir().unwrap();
    let video = create_test_video(&dir.path().to_path_buf(), "talk.mp4").unwrap();
    let classifier = Arc::new(MockClassifier::malformed());
    let (controller, store) = controller_with_classifier(classifier, dir.path());

    let session = controller.open_session(&video).await.unwrap();
    let before = store.get(&session.id).unwrap().unwrap();

    let reply = controller
        .handle_prompt(&session.id, "do something weird")
        .await
        .unwrap();

    assert_eq!(reply.reply, FALLBACK_REPLY);
    assert_eq!(store.get(&session.id).unwrap().unwrap(), before);
}

#[tokio::test]
async fn test_handlePrompt_classifierFailure_shouldPropagateError() {
    let dir = create_temp_dir().unwrap();
    let video = create_test_video(&dir.path().to_path_buf(), "talk.mp4").unwrap();
    let classifier = Arc::new(MockClassifier::failing());
    let (controller, _store) = controller_with_classifier(classifier, dir.path());

    let session = controller.open_session(&video).await.unwrap();
    let result = controller.handle_prompt(&session.id, "anything").await;

    assert!(matches!(result, Err(AppError::Classifier(_))));
}

#[tokio::test]
async fn test_handlePrompt_unknownSession_shouldReturnNotFound() {
    let dir = create_temp_dir().unwrap();
    let classifier = Arc::new(MockClassifier::malformed());
    let (controller, _store) = controller_with_classifier(classifier, dir.path());

    let result = controller.handle_prompt("no-such-session", "hello").await;

    assert!(matches!(result, Err(AppError::Store(_))));
}

#[tokio::test]
async fn test_handlePrompt_visualWithImageGenerator_shouldFillAssetUrl() {
    let dir = create_temp_dir().unwrap();
    let video = create_test_video(&dir.path().to_path_buf(), "talk.mp4").unwrap();
    let classifier = Arc::new(MockClassifier::scripted([
        r#"{"action":"visual","trigger_phrase":"rust","keyword":"crab"}"#,
    ]));
    let (controller, store) = controller_with_classifier(classifier, dir.path());
    let controller = controller.with_image_generator(Arc::new(MockImageGenerator));

    let session = controller.open_session(&video).await.unwrap();
    controller
        .handle_prompt(&session.id, "show a crab when I mention rust")
        .await
        .unwrap();

    let stored = store.get(&session.id).unwrap().unwrap();
    let event = &stored.overlays.list(OverlayKind::Visual)[0];
    match &event.payload {
        veditai::overlay::OverlayPayload::Visual { asset_url, .. } => {
            assert_eq!(asset_url.as_deref(), Some("https://assets.test/crab.png"));
        }
        other => panic!("expected visual payload, got {:?}", other),
    }
}

#[tokio::test]
async fn test_burnSubtitles_unknownSession_shouldReturnNotFound() {
    let dir = create_temp_dir().unwrap();
    let classifier = Arc::new(MockClassifier::malformed());
    let (controller, _store) = controller_with_classifier(classifier, dir.path());

    let result = controller
        .burn_subtitles("no-such-session", &dir.path().join("out.mp4"))
        .await;

    assert!(matches!(result, Err(AppError::Store(_))));
}

#[tokio::test]
async fn test_burnSubtitles_existingSession_shouldDelegateToRenderer() {
    let dir = create_temp_dir().unwrap();
    let video = create_test_video(&dir.path().to_path_buf(), "talk.mp4").unwrap();
    let classifier = Arc::new(MockClassifier::malformed());
    let (controller, _store) = controller_with_classifier(classifier, dir.path());

    let session = controller.open_session(&video).await.unwrap();
    let result = controller
        .burn_subtitles(&session.id, &dir.path().join("out.mp4"))
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_openSession_shouldTranscribeAndPersist() {
    let dir = create_temp_dir().unwrap();
    let video = create_test_video(&dir.path().to_path_buf(), "talk.mp4").unwrap();
    let classifier = Arc::new(MockClassifier::malformed());
    let (controller, store) = controller_with_classifier(classifier, dir.path());

    let session = controller.open_session(&video).await.unwrap();

    assert_eq!(session.transcript, sample_transcript());
    assert!(session.video_hash.is_some());
    assert!(session.overlays.is_empty());
    assert_eq!(store.list_ids().unwrap(), vec![session.id.clone()]);
}
