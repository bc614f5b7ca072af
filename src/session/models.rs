/*!
 * Session state models.
 *
 * A session is the unit of editing state: one video, its transcript, the
 * subtitle style and the four overlay lists. Sessions are plain data;
 * persistence lives behind the `SessionStore` trait in `store`.
 */

use std::path::PathBuf;
use serde::{Deserialize, Serialize};

use crate::overlay::OverlayRegistry;
use crate::transcript::TranscriptSegment;

/// Subtitle styling configuration for burn-in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    /// Font size in points
    #[serde(default = "default_font_size")]
    pub font_size: u32,

    /// Font color name (standard CSS color names)
    #[serde(default = "default_font_color")]
    pub font_color: String,

    /// Font family name
    #[serde(default = "default_font_family")]
    pub font_family: String,

    /// Background color name, if any
    #[serde(default)]
    pub bg_color: Option<String>,

    /// Vertical position ("bottom" or "top")
    #[serde(default = "default_position")]
    pub position: String,
}

fn default_font_size() -> u32 {
    24
}

fn default_font_color() -> String {
    "white".to_string()
}

fn default_font_family() -> String {
    "Arial".to_string()
}

fn default_position() -> String {
    "bottom".to_string()
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            font_size: default_font_size(),
            font_color: default_font_color(),
            font_family: default_font_family(),
            bg_color: None,
            position: default_position(),
        }
    }
}

impl StyleConfig {
    /// Apply a partial update, field by field
    pub fn apply(&mut self, patch: &StylePatch) {
        if let Some(size) = patch.font_size {
            self.font_size = size;
        }
        if let Some(color) = &patch.font_color {
            self.font_color = color.clone();
        }
        if let Some(family) = &patch.font_family {
            self.font_family = family.clone();
        }
        if let Some(bg) = &patch.bg_color {
            self.bg_color = Some(bg.clone());
        }
        if let Some(position) = &patch.position {
            self.position = position.clone();
        }
    }
}

/// Partial style update produced by the classifier.
///
/// Only the fields the user asked to change are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StylePatch {
    /// New font size, if requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,

    /// New font color, if requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,

    /// New font family, if requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,

    /// New background color, if requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,

    /// New position, if requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

impl StylePatch {
    /// True if the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.font_size.is_none()
            && self.font_color.is_none()
            && self.font_family.is_none()
            && self.bg_color.is_none()
            && self.position.is_none()
    }
}

/// One editing conversation's state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque session identifier
    pub id: String,

    /// Path of the video currently being edited
    pub video_path: PathBuf,

    /// SHA-256 of the video content, used to detect a stale transcript
    #[serde(default)]
    pub video_hash: Option<String>,

    /// Total video duration in seconds, when known
    #[serde(default)]
    pub duration: Option<f64>,

    /// Current transcript, regenerated after every re-cut
    #[serde(default)]
    pub transcript: Vec<TranscriptSegment>,

    /// Subtitle style
    #[serde(default)]
    pub style: StyleConfig,

    /// The four overlay lists
    #[serde(default)]
    pub overlays: OverlayRegistry,

    /// Creation time (RFC 3339)
    pub created_at: String,

    /// Last update time (RFC 3339)
    pub updated_at: String,
}

impl Session {
    /// Create a new session for a video with its initial transcript
    pub fn new(
        id: impl Into<String>,
        video_path: PathBuf,
        transcript: Vec<TranscriptSegment>,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: id.into(),
            video_path,
            video_hash: None,
            duration: None,
            transcript,
            style: StyleConfig::default(),
            overlays: OverlayRegistry::new(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Refresh the update timestamp
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }

    /// Replace the video after a successful re-cut.
    ///
    /// Swaps in the new video reference and regenerated transcript and clears
    /// every overlay list; their timestamps were computed against the old
    /// transcript.
    pub fn replace_video(
        &mut self,
        video_path: PathBuf,
        transcript: Vec<TranscriptSegment>,
        duration: Option<f64>,
    ) {
        self.video_path = video_path;
        self.transcript = transcript;
        self.duration = duration;
        self.video_hash = None;
        self.overlays.clear_all();
        self.touch();
    }
}
