use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use serde::Deserialize;
use tokio::process::Command;

use crate::errors::AppError;
use crate::transcript::TranscriptSegment;

// @module: Transcription through the whisper CLI

/// External transcription contract.
///
/// Produces the ordered, non-overlapping transcript segments the engine
/// treats as read-only input.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe a video file into timestamped segments
    async fn transcribe(&self, video_path: &Path) -> Result<Vec<TranscriptSegment>, AppError>;
}

/// Whisper JSON output shape (the subset we consume)
#[derive(Debug, Deserialize)]
struct WhisperOutput {
    #[serde(default)]
    segments: Vec<WhisperSegment>,
}

/// One segment of whisper output
#[derive(Debug, Deserialize)]
struct WhisperSegment {
    start: f64,
    end: f64,
    text: String,
}

/// Transcriber shelling out to the `whisper` command-line tool
#[derive(Debug, Clone)]
pub struct WhisperCommandTranscriber {
    /// whisper binary to invoke
    whisper_path: String,
    /// Model name (e.g. "base")
    model: String,
    /// Transcription timeout in seconds
    timeout_secs: u64,
}

impl WhisperCommandTranscriber {
    /// Create a transcriber
    pub fn new(
        whisper_path: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            whisper_path: whisper_path.into(),
            model: model.into(),
            timeout_secs,
        }
    }

    /// Parse whisper's JSON output into transcript segments.
    ///
    /// Segment text is trimmed; whisper pads it with a leading space.
    pub fn parse_whisper_json(json: &str) -> Result<Vec<TranscriptSegment>, AppError> {
        let output: WhisperOutput = serde_json::from_str(json)
            .map_err(|e| AppError::Transcription(format!("Invalid whisper output: {}", e)))?;

        Ok(output
            .segments
            .into_iter()
            .map(|seg| TranscriptSegment::new(seg.start, seg.end, seg.text.trim()))
            .collect())
    }
}

#[async_trait]
impl Transcriber for WhisperCommandTranscriber {
    async fn transcribe(&self, video_path: &Path) -> Result<Vec<TranscriptSegment>, AppError> {
        if !video_path.exists() {
            return Err(AppError::File(format!(
                "Video file does not exist: {:?}",
                video_path
            )));
        }

        info!("Transcribing {:?}", video_path);

        let scratch = tempfile::tempdir()?;

        let whisper_future = Command::new(&self.whisper_path)
            .args([
                video_path.to_str().unwrap_or_default(),
                "--model",
                &self.model,
                "--output_format",
                "json",
                "--output_dir",
                scratch.path().to_str().unwrap_or_default(),
            ])
            .output();

        let timeout_duration = Duration::from_secs(self.timeout_secs);
        let output = tokio::select! {
            result = whisper_future => {
                result.map_err(|e| AppError::Transcription(format!(
                    "Failed to execute whisper: {}", e
                )))?
            },
            _ = tokio::time::sleep(timeout_duration) => {
                return Err(AppError::Transcription(format!(
                    "whisper timed out after {} seconds", self.timeout_secs
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::Transcription(format!(
                "whisper exited with {}: {}",
                output.status,
                stderr.lines().last().unwrap_or("no output")
            )));
        }

        // whisper writes <stem>.json next to the requested output dir
        let stem = video_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .ok_or_else(|| AppError::Transcription("Video path has no file stem".to_string()))?;
        let json_path = scratch.path().join(format!("{}.json", stem));

        let json = std::fs::read_to_string(&json_path).map_err(|e| {
            AppError::Transcription(format!(
                "Failed to read whisper output {:?}: {}",
                json_path, e
            ))
        })?;

        let segments = Self::parse_whisper_json(&json)?;
        debug!("Transcribed {} segment(s)", segments.len());

        Ok(segments)
    }
}
