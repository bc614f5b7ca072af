/*!
 * Mock media collaborators for testing.
 *
 * This module provides mocks for the external collaborators the controller
 * drives during editing:
 * - `MockSilenceScanner` - returns a fixed scan result or fails
 * - `MockTranscriber` - returns a fixed transcript
 * - `MockRenderer` - records stitch plans without touching ffmpeg
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use veditai::errors::{AppError, DetectionError, RenderError};
use veditai::media::renderer::Renderer;
use veditai::media::silence::{SilenceScan, SilenceScanner};
use veditai::media::transcriber::Transcriber;
use veditai::media::ImageGenerator;
use veditai::session::models::StyleConfig;
use veditai::timeline::intervals::{KeepSegment, RemovalInterval};
use veditai::transcript::TranscriptSegment;

/// Silence scanner returning a canned result
pub struct MockSilenceScanner {
    result: Option<SilenceScan>,
}

impl MockSilenceScanner {
    /// Always return the given intervals and duration
    pub fn with_scan(intervals: Vec<RemovalInterval>, duration: f64) -> Self {
        Self {
            result: Some(SilenceScan {
                intervals,
                duration,
            }),
        }
    }

    /// Always fail as if the duration marker was missing
    pub fn unavailable() -> Self {
        Self { result: None }
    }
}

#[async_trait]
impl SilenceScanner for MockSilenceScanner {
    async fn scan(&self, _video_path: &Path) -> Result<SilenceScan, DetectionError> {
        match &self.result {
            Some(scan) => Ok(scan.clone()),
            None => Err(DetectionError::DurationMissing),
        }
    }
}

/// Transcriber returning a canned transcript
pub struct MockTranscriber {
    segments: Vec<TranscriptSegment>,
}

impl MockTranscriber {
    /// Always return the given segments
    pub fn with_segments(segments: Vec<TranscriptSegment>) -> Self {
        Self { segments }
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, _video_path: &Path) -> Result<Vec<TranscriptSegment>, AppError> {
        Ok(self.segments.clone())
    }
}

/// Image generator producing deterministic asset urls
pub struct MockImageGenerator;

#[async_trait]
impl ImageGenerator for MockImageGenerator {
    async fn generate(&self, keyword: &str, _img_style: Option<&str>) -> Result<String, AppError> {
        Ok(format!("https://assets.test/{}.png", keyword))
    }
}

/// Renderer recording every stitch call instead of invoking ffmpeg
#[derive(Default)]
pub struct MockRenderer {
    failing: bool,
    stitched_plans: Arc<Mutex<Vec<Vec<KeepSegment>>>>,
    stitched_outputs: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockRenderer {
    /// A renderer that always succeeds
    pub fn working() -> Self {
        Self::default()
    }

    /// A renderer that always fails
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Plans passed to `stitch` so far
    pub fn stitched_plans(&self) -> Vec<Vec<KeepSegment>> {
        self.stitched_plans.lock().clone()
    }

    /// Output paths passed to `stitch` so far
    pub fn stitched_outputs(&self) -> Vec<PathBuf> {
        self.stitched_outputs.lock().clone()
    }
}

#[async_trait]
impl Renderer for MockRenderer {
    async fn stitch(
        &self,
        _video_path: &Path,
        plan: &[KeepSegment],
        output_path: &Path,
    ) -> Result<(), RenderError> {
        if self.failing {
            return Err(RenderError::ProcessFailed(
                "mock renderer configured to fail".to_string(),
            ));
        }
        self.stitched_plans.lock().push(plan.to_vec());
        self.stitched_outputs.lock().push(output_path.to_path_buf());
        Ok(())
    }

    async fn burn_subtitles(
        &self,
        _video_path: &Path,
        _segments: &[TranscriptSegment],
        _style: &StyleConfig,
        _output_path: &Path,
    ) -> Result<(), RenderError> {
        if self.failing {
            return Err(RenderError::ProcessFailed(
                "mock renderer configured to fail".to_string(),
            ));
        }
        Ok(())
    }
}
