use anyhow::Context;
use log::{debug, info, warn};
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::{ClassifierProvider, Config, StorageBackend};
use crate::classifier::gemini::Gemini;
use crate::classifier::mock::MockClassifier;
use crate::classifier::{ActionClassifier, ActionDescriptor, ClassifyContext};
use crate::errors::AppError;
use crate::media::renderer::{FfmpegRenderer, Renderer};
use crate::media::silence::{SilenceDetector, SilenceScanner};
use crate::media::transcriber::{Transcriber, WhisperCommandTranscriber};
use crate::media::ImageGenerator;
use crate::overlay::OverlayPayload;
use crate::session::models::Session;
use crate::session::store::{
    InMemorySessionStore, SessionLanes, SessionStore, SqliteSessionStore,
};
use crate::timeline::intervals::{build_stitch_plan, RemovalInterval};

// @module: Application controller for editing sessions

/// Outcome of an auto-cut attempt
#[derive(Debug, Clone, PartialEq)]
pub enum CutOutcome {
    /// No removable time was found, or detection was unavailable; the
    /// session is unmodified
    NothingToCut,
    /// The video was re-cut and the session updated
    Recut {
        /// Total removed time in seconds
        removed_secs: f64,
        /// Number of kept segments stitched together
        kept_segments: usize,
        /// Path of the re-cut video
        output: PathBuf,
    },
}

/// Result of handling one editing prompt
#[derive(Debug, Clone)]
pub struct EditReply {
    /// Reply to show the user
    pub reply: String,
    /// Session state after the action was applied
    pub session: Session,
}

/// Main application controller.
///
/// Applies one resolved action at a time to one session, holding that
/// session's write lane for the whole read-modify-write cycle.
pub struct Controller {
    // @field: App configuration
    config: Config,
    store: Arc<dyn SessionStore>,
    classifier: Arc<dyn ActionClassifier>,
    transcriber: Arc<dyn Transcriber>,
    renderer: Arc<dyn Renderer>,
    detector: Arc<dyn SilenceScanner>,
    image_generator: Option<Arc<dyn ImageGenerator>>,
    lanes: SessionLanes,
}

impl Controller {
    // @method: Create a controller with real collaborators from config
    pub fn with_config(config: Config) -> anyhow::Result<Self> {
        let store: Arc<dyn SessionStore> = match config.storage.backend {
            StorageBackend::Memory => Arc::new(InMemorySessionStore::new()),
            StorageBackend::Sqlite => match &config.storage.db_path {
                Some(path) => Arc::new(SqliteSessionStore::new(path)?),
                None => Arc::new(SqliteSessionStore::new_default()?),
            },
        };

        let classifier: Arc<dyn ActionClassifier> = match config.classifier.provider {
            ClassifierProvider::Gemini => Arc::new(Gemini::new(
                config.classifier_api_key(),
                config.classifier.endpoint.clone(),
                config.classifier.model.clone(),
                config.classifier.timeout_secs,
            )),
            ClassifierProvider::Mock => Arc::new(MockClassifier::scripted::<[&str; 0], &str>([])),
        };

        let transcriber: Arc<dyn Transcriber> = Arc::new(WhisperCommandTranscriber::new(
            config.media.whisper_path.clone(),
            config.media.whisper_model.clone(),
            config.media.transcribe_timeout_secs,
        ));

        let renderer: Arc<dyn Renderer> = Arc::new(FfmpegRenderer::new(
            config.media.ffmpeg_path.clone(),
            config.media.render_timeout_secs,
        ));

        let detector: Arc<dyn SilenceScanner> = Arc::new(SilenceDetector::new(
            config.media.ffmpeg_path.clone(),
            config.media.silence_noise_db,
            config.media.min_silence_secs,
            config.media.detect_timeout_secs,
        ));

        Ok(Self {
            config,
            store,
            classifier,
            transcriber,
            renderer,
            detector,
            image_generator: None,
            lanes: SessionLanes::new(),
        })
    }

    /// Create a controller with explicit collaborators (tests, embedding)
    pub fn with_collaborators(
        config: Config,
        store: Arc<dyn SessionStore>,
        classifier: Arc<dyn ActionClassifier>,
        transcriber: Arc<dyn Transcriber>,
        renderer: Arc<dyn Renderer>,
        detector: Arc<dyn SilenceScanner>,
    ) -> Self {
        Self {
            config,
            store,
            classifier,
            transcriber,
            renderer,
            detector,
            image_generator: None,
            lanes: SessionLanes::new(),
        }
    }

    /// Attach an image generator for visual overlays
    pub fn with_image_generator(mut self, generator: Arc<dyn ImageGenerator>) -> Self {
        self.image_generator = Some(generator);
        self
    }

    /// The active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Open a new session for a video: transcribe it and persist the session
    pub async fn open_session(&self, video_path: &Path) -> Result<Session, AppError> {
        if !video_path.exists() {
            return Err(AppError::File(format!(
                "Video file does not exist: {:?}",
                video_path
            )));
        }

        let transcript = self.transcriber.transcribe(video_path).await?;
        info!(
            "Opened session for {:?} with {} transcript segment(s)",
            video_path,
            transcript.len()
        );

        let mut session = Session::new(
            uuid::Uuid::new_v4().to_string(),
            video_path.to_path_buf(),
            transcript,
        );
        session.style = self.config.default_style.clone();
        session.video_hash = hash_file(video_path).ok();

        self.store.put(&session)?;

        Ok(session)
    }

    /// Fetch a session by id
    pub fn get_session(&self, session_id: &str) -> Result<Session, AppError> {
        Ok(self
            .store
            .get(session_id)?
            .ok_or_else(|| crate::errors::StoreError::NotFound(session_id.to_string()))?)
    }

    /// List all stored session ids
    pub fn list_sessions(&self) -> Result<Vec<String>, AppError> {
        Ok(self.store.list_ids()?)
    }

    /// Remove a session
    pub fn remove_session(&self, session_id: &str) -> Result<bool, AppError> {
        let existed = self.store.remove(session_id)?;
        self.lanes.forget(session_id);
        Ok(existed)
    }

    /// Handle one free-form editing prompt against a session.
    ///
    /// Classifies the prompt, applies the resolved action, persists the
    /// session and returns the reply. Chat replies leave the session
    /// untouched.
    pub async fn handle_prompt(
        &self,
        session_id: &str,
        prompt: &str,
    ) -> Result<EditReply, AppError> {
        let lane = self.lanes.lane(session_id);
        let _guard = lane.lock().await;

        let mut session = self.get_session(session_id)?;

        let context = ClassifyContext::from_session(&session.style, &session.transcript);
        let descriptor = self.classifier.classify(prompt, &context).await?;
        debug!("Prompt {:?} classified as {:?}", prompt, descriptor);

        let (reply, mutated) = self.apply_action(&mut session, descriptor).await?;

        if mutated {
            session.touch();
            self.store.put(&session)?;
        }

        Ok(EditReply { reply, session })
    }

    /// Remove silence and caller-supplied filler spans from a session's video
    pub async fn auto_cut(
        &self,
        session_id: &str,
        fillers: Vec<RemovalInterval>,
    ) -> Result<CutOutcome, AppError> {
        let lane = self.lanes.lane(session_id);
        let _guard = lane.lock().await;

        let mut session = self.get_session(session_id)?;

        let outcome = self.run_auto_cut(&mut session, fillers).await?;

        if matches!(outcome, CutOutcome::Recut { .. }) {
            self.store.put(&session)?;
        }

        Ok(outcome)
    }

    /// Burn the session's subtitles into its video with the current style
    pub async fn burn_subtitles(
        &self,
        session_id: &str,
        output_path: &Path,
    ) -> Result<(), AppError> {
        let session = self.get_session(session_id)?;

        self.renderer
            .burn_subtitles(
                &session.video_path,
                &session.transcript,
                &session.style,
                output_path,
            )
            .await?;

        Ok(())
    }

    /// Apply one resolved action to the session.
    ///
    /// Returns the user-facing reply and whether the session was mutated.
    async fn apply_action(
        &self,
        session: &mut Session,
        descriptor: ActionDescriptor,
    ) -> Result<(String, bool), AppError> {
        match descriptor {
            ActionDescriptor::Style { new_style } => {
                session.style.apply(&new_style);
                let summary = serde_json::to_string(&new_style)
                    .unwrap_or_else(|_| "{}".to_string());
                Ok((format!("Updated style to: {}", summary), true))
            }

            ActionDescriptor::Visual {
                trigger_phrase,
                keyword,
                img_style,
                props,
            } => {
                let asset_url = match &self.image_generator {
                    Some(generator) => {
                        match generator.generate(&keyword, img_style.as_deref()).await {
                            Ok(url) => Some(url),
                            Err(e) => {
                                warn!("Image generation failed for {:?}: {}", keyword, e);
                                None
                            }
                        }
                    }
                    None => None,
                };

                let payload = OverlayPayload::Visual {
                    keyword: keyword.clone(),
                    img_style,
                    asset_url,
                    props,
                };
                let event = session.overlays.append(
                    payload,
                    &trigger_phrase,
                    &session.transcript,
                    &self.config.overlays,
                );
                Ok((
                    format!(
                        "Added visual overlay #{} for {:?} at {:.1}s-{:.1}s",
                        event.id, keyword, event.start, event.end
                    ),
                    true,
                ))
            }

            ActionDescriptor::Camera {
                trigger_phrase,
                move_type,
                intensity,
            } => {
                let payload = OverlayPayload::Camera {
                    move_type: move_type.clone(),
                    intensity,
                };
                let event = session.overlays.append(
                    payload,
                    &trigger_phrase,
                    &session.transcript,
                    &self.config.overlays,
                );
                Ok((
                    format!(
                        "Added {} camera move #{} at {:.1}s-{:.1}s",
                        move_type, event.id, event.start, event.end
                    ),
                    true,
                ))
            }

            ActionDescriptor::Hud {
                trigger_phrase,
                title,
                content,
            } => {
                let payload = OverlayPayload::Hud {
                    title: title.clone(),
                    content,
                };
                let event = session.overlays.append(
                    payload,
                    &trigger_phrase,
                    &session.transcript,
                    &self.config.overlays,
                );
                Ok((
                    format!(
                        "Added HUD card #{} ({:?}) at {:.1}s-{:.1}s",
                        event.id, title, event.start, event.end
                    ),
                    true,
                ))
            }

            ActionDescriptor::TextBehind {
                trigger_phrase,
                text_content,
                props,
            } => {
                let payload = OverlayPayload::Text {
                    text_content: text_content.clone(),
                    props,
                };
                let event = session.overlays.append(
                    payload,
                    &trigger_phrase,
                    &session.transcript,
                    &self.config.overlays,
                );
                Ok((
                    format!(
                        "Added text layer #{} at {:.1}s-{:.1}s",
                        event.id, event.start, event.end
                    ),
                    true,
                ))
            }

            ActionDescriptor::AutoCut => {
                let outcome = self.run_auto_cut(session, Vec::new()).await?;
                let reply = match &outcome {
                    CutOutcome::NothingToCut => "Nothing to cut.".to_string(),
                    CutOutcome::Recut {
                        removed_secs,
                        kept_segments,
                        ..
                    } => format!(
                        "Removed {:.1}s of silence, stitched {} segment(s).",
                        removed_secs, kept_segments
                    ),
                };
                Ok((reply, matches!(outcome, CutOutcome::Recut { .. })))
            }

            ActionDescriptor::Chat { response } => Ok((response, false)),
        }
    }

    /// The auto-cut pipeline: detect, merge, complement, render, retranscribe.
    ///
    /// Detection failures abort the cut and report "nothing to cut", leaving
    /// the session unmodified. Render and transcription failures propagate as
    /// errors; the session is only committed after both succeed, so a failed
    /// attempt never leaves partial state.
    async fn run_auto_cut(
        &self,
        session: &mut Session,
        fillers: Vec<RemovalInterval>,
    ) -> Result<CutOutcome, AppError> {
        let scan = match self.detector.scan(&session.video_path).await {
            Ok(scan) => scan,
            Err(e) => {
                warn!("Silence detection unavailable, abandoning cut: {}", e);
                return Ok(CutOutcome::NothingToCut);
            }
        };

        let mut intervals = scan.intervals;
        intervals.extend(fillers);

        if intervals.is_empty() {
            info!("No removable intervals found");
            return Ok(CutOutcome::NothingToCut);
        }

        let plan = build_stitch_plan(intervals, scan.duration);
        if plan.is_empty() {
            info!("Stitch plan is empty (whole video would be removed)");
            return Ok(CutOutcome::NothingToCut);
        }

        let output = self.cut_output_path(session)?;

        self.renderer
            .stitch(&session.video_path, &plan, &output)
            .await?;

        // Old timestamps are meaningless against the re-cut video; the
        // transcript must be regenerated before the session is committed
        let new_transcript = self.transcriber.transcribe(&output).await?;

        let kept_secs: f64 = plan.iter().map(|k| k.duration()).sum();
        let removed_secs = scan.duration - kept_secs;

        session.replace_video(output.clone(), new_transcript, Some(kept_secs));

        info!(
            "Re-cut {:?}: removed {:.2}s across {} kept segment(s)",
            output,
            removed_secs,
            plan.len()
        );

        Ok(CutOutcome::Recut {
            removed_secs,
            kept_segments: plan.len(),
            output,
        })
    }

    /// Output path for a re-cut video, unique per attempt
    fn cut_output_path(&self, session: &Session) -> Result<PathBuf, AppError> {
        let output_dir = &self.config.media.output_dir;
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create output directory {:?}", output_dir))
            .map_err(AppError::from)?;

        let stamp = chrono::Utc::now().format("%Y%m%d%H%M%S");
        Ok(output_dir.join(format!("{}_{}.mp4", &session.id[..8.min(session.id.len())], stamp)))
    }
}

/// SHA-256 of a file's content, streamed
fn hash_file(path: &Path) -> anyhow::Result<String> {
    let mut file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open file for hashing: {:?}", path))?;

    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
