/*!
 * End-to-end tests for the auto-cut pipeline: detect, merge, complement,
 * render, retranscribe, invalidate overlays
 */

use std::sync::Arc;

use veditai::app_config::Config;
use veditai::app_controller::{Controller, CutOutcome};
use veditai::classifier::mock::MockClassifier;
use veditai::classifier::ActionClassifier;
use veditai::errors::AppError;
use veditai::media::renderer::Renderer;
use veditai::media::silence::SilenceScanner;
use veditai::media::transcriber::Transcriber;
use veditai::overlay::{OverlayPayload, OverlayWindows};
use veditai::session::store::{InMemorySessionStore, SessionStore};
use veditai::timeline::intervals::{KeepSegment, RemovalInterval};
use veditai::transcript::TranscriptSegment;

use crate::common::mock_media::{MockRenderer, MockSilenceScanner, MockTranscriber};
use crate::common::{create_temp_dir, create_test_video};

/// Transcript the mock transcriber "produces" for the re-cut video
fn recut_transcript() -> Vec<TranscriptSegment> {
    vec![
        TranscriptSegment::new(0.0, 2.0, "hello world"),
        TranscriptSegment::new(2.0, 5.0, "talking about rust"),
        TranscriptSegment::new(5.0, 8.0, "thanks for watching"),
    ]
}

struct Fixture {
    controller: Controller,
    store: Arc<InMemorySessionStore>,
    renderer: Arc<MockRenderer>,
    _dir: tempfile::TempDir,
    video: std::path::PathBuf,
}

/// Build a controller with the given scanner and renderer behavior
fn fixture(detector: MockSilenceScanner, renderer: MockRenderer) -> Fixture {
    let dir = create_temp_dir().unwrap();
    let video = create_test_video(&dir.path().to_path_buf(), "talk.mp4").unwrap();

    let mut config = Config::default();
    config.media.output_dir = dir.path().join("processed");

    let store = Arc::new(InMemorySessionStore::new());
    let renderer = Arc::new(renderer);
    let classifier: Arc<dyn ActionClassifier> =
        Arc::new(MockClassifier::scripted([r#"{"action":"auto_cut"}"#]));
    let transcriber: Arc<dyn Transcriber> =
        Arc::new(MockTranscriber::with_segments(recut_transcript()));

    let controller = Controller::with_collaborators(
        config,
        store.clone(),
        classifier,
        transcriber,
        renderer.clone() as Arc<dyn Renderer>,
        Arc::new(detector) as Arc<dyn SilenceScanner>,
    );

    Fixture {
        controller,
        store,
        renderer,
        _dir: dir,
        video,
    }
}

/// Open a session and seed it with one overlay of each timed kind
async fn seeded_session(fx: &Fixture) -> String {
    let session = fx.controller.open_session(&fx.video).await.unwrap();

    let mut seeded = fx.store.get(&session.id).unwrap().unwrap();
    let transcript = seeded.transcript.clone();
    seeded.overlays.append(
        OverlayPayload::Hud {
            title: "Stats".to_string(),
            content: "42".to_string(),
        },
        "hello",
        &transcript,
        &OverlayWindows::default(),
    );
    fx.store.put(&seeded).unwrap();

    session.id
}

#[tokio::test]
async fn test_autoCut_overlappingSilence_shouldStitchComplement() {
    let fx = fixture(
        MockSilenceScanner::with_scan(
            vec![
                RemovalInterval::new(2.0, 5.0),
                RemovalInterval::new(4.0, 7.0),
                RemovalInterval::new(10.0, 12.0),
            ],
            15.0,
        ),
        MockRenderer::working(),
    );
    let session_id = seeded_session(&fx).await;

    let outcome = fx.controller.auto_cut(&session_id, Vec::new()).await.unwrap();

    match outcome {
        CutOutcome::Recut {
            removed_secs,
            kept_segments,
            ..
        } => {
            assert!((removed_secs - 7.0).abs() < 1e-9);
            assert_eq!(kept_segments, 3);
        }
        CutOutcome::NothingToCut => panic!("expected a recut"),
    }

    let plans = fx.renderer.stitched_plans();
    assert_eq!(plans.len(), 1);
    assert_eq!(
        plans[0],
        vec![
            KeepSegment::new(0.0, 2.0),
            KeepSegment::new(7.0, 10.0),
            KeepSegment::new(12.0, 15.0),
        ]
    );
}

#[tokio::test]
async fn test_autoCut_success_shouldSwapVideoAndInvalidateOverlays() {
    let fx = fixture(
        MockSilenceScanner::with_scan(vec![RemovalInterval::new(2.0, 5.0)], 15.0),
        MockRenderer::working(),
    );
    let session_id = seeded_session(&fx).await;
    assert!(!fx.store.get(&session_id).unwrap().unwrap().overlays.is_empty());

    let outcome = fx.controller.auto_cut(&session_id, Vec::new()).await.unwrap();

    let stored = fx.store.get(&session_id).unwrap().unwrap();
    assert!(stored.overlays.is_empty(), "overlays must be invalidated");
    assert_eq!(stored.transcript, recut_transcript());
    assert_eq!(stored.duration, Some(12.0));
    match outcome {
        CutOutcome::Recut { output, .. } => assert_eq!(stored.video_path, output),
        CutOutcome::NothingToCut => panic!("expected a recut"),
    }
}

#[tokio::test]
async fn test_autoCut_detectionUnavailable_shouldFailClosed() {
    let fx = fixture(MockSilenceScanner::unavailable(), MockRenderer::working());
    let session_id = seeded_session(&fx).await;
    let before = fx.store.get(&session_id).unwrap().unwrap();

    let outcome = fx.controller.auto_cut(&session_id, Vec::new()).await.unwrap();

    assert_eq!(outcome, CutOutcome::NothingToCut);
    assert_eq!(fx.store.get(&session_id).unwrap().unwrap(), before);
    assert!(fx.renderer.stitched_plans().is_empty());
}

#[tokio::test]
async fn test_autoCut_noIntervalsAnywhere_shouldReportNothingToCut() {
    let fx = fixture(
        MockSilenceScanner::with_scan(Vec::new(), 15.0),
        MockRenderer::working(),
    );
    let session_id = seeded_session(&fx).await;

    let outcome = fx.controller.auto_cut(&session_id, Vec::new()).await.unwrap();

    assert_eq!(outcome, CutOutcome::NothingToCut);
}

#[tokio::test]
async fn test_autoCut_fillersOnly_shouldStillCut() {
    let fx = fixture(
        MockSilenceScanner::with_scan(Vec::new(), 15.0),
        MockRenderer::working(),
    );
    let session_id = seeded_session(&fx).await;

    let fillers = vec![RemovalInterval::new(1.0, 2.0), RemovalInterval::new(6.0, 6.5)];
    let outcome = fx.controller.auto_cut(&session_id, fillers).await.unwrap();

    match outcome {
        CutOutcome::Recut { removed_secs, .. } => {
            assert!((removed_secs - 1.5).abs() < 1e-9);
        }
        CutOutcome::NothingToCut => panic!("filler spans alone should trigger a cut"),
    }
}

#[tokio::test]
async fn test_autoCut_wholeVideoSilent_shouldReportNothingToCut() {
    let fx = fixture(
        MockSilenceScanner::with_scan(vec![RemovalInterval::new(0.0, 15.0)], 15.0),
        MockRenderer::working(),
    );
    let session_id = seeded_session(&fx).await;

    let outcome = fx.controller.auto_cut(&session_id, Vec::new()).await.unwrap();

    assert_eq!(outcome, CutOutcome::NothingToCut);
    assert!(fx.renderer.stitched_plans().is_empty());
}

#[tokio::test]
async fn test_autoCut_renderFailure_shouldLeaveSessionUntouched() {
    let fx = fixture(
        MockSilenceScanner::with_scan(vec![RemovalInterval::new(2.0, 5.0)], 15.0),
        MockRenderer::failing(),
    );
    let session_id = seeded_session(&fx).await;
    let before = fx.store.get(&session_id).unwrap().unwrap();

    let result = fx.controller.auto_cut(&session_id, Vec::new()).await;

    assert!(matches!(result, Err(AppError::Render(_))));
    let after = fx.store.get(&session_id).unwrap().unwrap();
    assert_eq!(after, before, "failed render must not mutate the session");
    assert!(!after.overlays.is_empty(), "overlays must survive a failed cut");
}

#[tokio::test]
async fn test_handlePrompt_autoCutDescriptor_shouldRunPipeline() {
    let fx = fixture(
        MockSilenceScanner::with_scan(vec![RemovalInterval::new(0.0, 3.0)], 15.0),
        MockRenderer::working(),
    );
    let session_id = seeded_session(&fx).await;

    let reply = fx
        .controller
        .handle_prompt(&session_id, "cut out the silences please")
        .await
        .unwrap();

    assert!(reply.reply.contains("Removed 3.0s"));
    let stored = fx.store.get(&session_id).unwrap().unwrap();
    assert!(stored.overlays.is_empty());
    assert_eq!(stored.duration, Some(12.0));
}
