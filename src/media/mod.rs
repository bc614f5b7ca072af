/*!
 * External media collaborators.
 *
 * Everything in this module is an adapter around an out-of-core tool:
 * - `silence`: ffmpeg silencedetect scan and log parsing
 * - `renderer`: stitching and subtitle burn-in through ffmpeg
 * - `transcriber`: transcription through the whisper CLI
 *
 * The collaborators are invoked synchronously and treated as atomic: they
 * either fully succeed or fail, with no partial-result handling required of
 * the engine. Callers may impose timeouts; a timed-out silence scan is
 * indistinguishable from "no intervals found" for the cut-decision flow.
 */

use async_trait::async_trait;

use crate::errors::AppError;

pub mod renderer;
pub mod silence;
pub mod transcriber;

// Re-export main types
pub use renderer::{FfmpegRenderer, Renderer};
pub use silence::{parse_silence_log, SilenceDetector, SilenceScan, SilenceScanner};
pub use transcriber::{Transcriber, WhisperCommandTranscriber};

/// Image generation for visual overlays.
///
/// Generation itself is an external service; the engine only records the
/// returned asset reference on the overlay payload.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate an image for a keyword, returning a URL or path to the asset
    async fn generate(&self, keyword: &str, img_style: Option<&str>) -> Result<String, AppError>;
}
