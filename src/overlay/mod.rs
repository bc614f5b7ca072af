/*!
 * Per-session overlay registries.
 *
 * An overlay is a time-bounded visual or informational element (image, HUD
 * card, camera move, floating text) anchored to the transcript. Each session
 * owns one ordered list per overlay kind; entries get monotonically
 * increasing 1-based string identifiers and are placed by resolving their
 * trigger phrase through the phrase locator, with a per-kind chaining
 * fallback when no match is found.
 *
 * All overlay timestamps are computed against the transcript that existed at
 * creation time; when the underlying video is re-cut all four lists are
 * cleared atomically because those timestamps become invalid.
 */

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::timeline::locate::{PhraseLocator, PhraseMatch};
use crate::transcript::TranscriptSegment;

/// The four overlay kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    /// Generated image anchored to a keyword
    Visual,
    /// Informational HUD card with title and content
    Hud,
    /// Camera move (zoom, pan) with an intensity
    Camera,
    /// Floating text layer
    Text,
}

impl OverlayKind {
    /// Lowercase identifier, as used in descriptors and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visual => "visual",
            Self::Hud => "hud",
            Self::Camera => "camera",
            Self::Text => "text",
        }
    }
}

impl std::fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-kind default window lengths and the HUD chaining gap, in seconds.
///
/// These are configuration constants of the registry, not a locator concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayWindows {
    /// Default visual overlay length
    #[serde(default = "default_visual_window")]
    pub visual_secs: f64,

    /// Default HUD card length
    #[serde(default = "default_hud_window")]
    pub hud_secs: f64,

    /// Default camera move length
    #[serde(default = "default_camera_window")]
    pub camera_secs: f64,

    /// Default text layer length
    #[serde(default = "default_text_window")]
    pub text_secs: f64,

    /// Gap inserted between chained HUD cards
    #[serde(default = "default_hud_chain_gap")]
    pub hud_chain_gap_secs: f64,
}

fn default_visual_window() -> f64 {
    5.0
}

fn default_hud_window() -> f64 {
    4.0
}

fn default_camera_window() -> f64 {
    3.0
}

fn default_text_window() -> f64 {
    5.0
}

fn default_hud_chain_gap() -> f64 {
    1.0
}

impl Default for OverlayWindows {
    fn default() -> Self {
        Self {
            visual_secs: default_visual_window(),
            hud_secs: default_hud_window(),
            camera_secs: default_camera_window(),
            text_secs: default_text_window(),
            hud_chain_gap_secs: default_hud_chain_gap(),
        }
    }
}

impl OverlayWindows {
    /// Default window length for a kind
    pub fn window_for(&self, kind: OverlayKind) -> f64 {
        match kind {
            OverlayKind::Visual => self.visual_secs,
            OverlayKind::Hud => self.hud_secs,
            OverlayKind::Camera => self.camera_secs,
            OverlayKind::Text => self.text_secs,
        }
    }
}

/// Kind-specific overlay content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OverlayPayload {
    /// Generated image overlay
    Visual {
        /// Keyword the image was generated from
        keyword: String,
        /// Requested image style, if any
        #[serde(skip_serializing_if = "Option::is_none")]
        img_style: Option<String>,
        /// URL or path of the generated asset, once available
        #[serde(skip_serializing_if = "Option::is_none")]
        asset_url: Option<String>,
        /// Free-form presentation properties
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        props: Map<String, Value>,
    },
    /// HUD card overlay
    Hud {
        /// Card title
        title: String,
        /// Card body content
        content: String,
    },
    /// Camera move overlay
    Camera {
        /// Move type (e.g. "zoom_in", "zoom_out", "pan")
        move_type: String,
        /// Move intensity, if specified
        #[serde(skip_serializing_if = "Option::is_none")]
        intensity: Option<f64>,
    },
    /// Floating text overlay
    Text {
        /// Text to display
        text_content: String,
        /// Free-form presentation properties
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        props: Map<String, Value>,
    },
}

impl OverlayPayload {
    /// The overlay kind this payload belongs to
    pub fn kind(&self) -> OverlayKind {
        match self {
            Self::Visual { .. } => OverlayKind::Visual,
            Self::Hud { .. } => OverlayKind::Hud,
            Self::Camera { .. } => OverlayKind::Camera,
            Self::Text { .. } => OverlayKind::Text,
        }
    }
}

/// A placed overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayEvent {
    /// Unique per-kind identifier, 1-based, monotonically increasing
    pub id: String,
    /// Overlay kind
    pub kind: OverlayKind,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Kind-specific content
    pub payload: OverlayPayload,
}

/// Per-session overlay lists, one per kind, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverlayRegistry {
    #[serde(default)]
    visual: Vec<OverlayEvent>,
    #[serde(default)]
    hud: Vec<OverlayEvent>,
    #[serde(default)]
    camera: Vec<OverlayEvent>,
    #[serde(default)]
    text: Vec<OverlayEvent>,
}

impl OverlayRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The ordered list for a kind
    pub fn list(&self, kind: OverlayKind) -> &[OverlayEvent] {
        match kind {
            OverlayKind::Visual => &self.visual,
            OverlayKind::Hud => &self.hud,
            OverlayKind::Camera => &self.camera,
            OverlayKind::Text => &self.text,
        }
    }

    fn list_mut(&mut self, kind: OverlayKind) -> &mut Vec<OverlayEvent> {
        match kind {
            OverlayKind::Visual => &mut self.visual,
            OverlayKind::Hud => &mut self.hud,
            OverlayKind::Camera => &mut self.camera,
            OverlayKind::Text => &mut self.text,
        }
    }

    /// Total number of overlays across all kinds
    pub fn total_len(&self) -> usize {
        self.visual.len() + self.hud.len() + self.camera.len() + self.text.len()
    }

    /// True if no overlays exist in any list
    pub fn is_empty(&self) -> bool {
        self.total_len() == 0
    }

    /// Resolve a trigger phrase and append a new overlay of the payload's kind.
    ///
    /// A resolved phrase anchors the overlay at the resolved timestamp with
    /// the kind's default window. When the locator reports no match, the
    /// overlay chains after the previous overlay of the same kind (HUD cards
    /// with a fixed gap) or falls back to time zero if the list is empty.
    pub fn append(
        &mut self,
        payload: OverlayPayload,
        trigger_phrase: &str,
        transcript: &[TranscriptSegment],
        windows: &OverlayWindows,
    ) -> &OverlayEvent {
        let kind = payload.kind();
        let window = windows.window_for(kind);

        let start = match PhraseLocator::default().locate(transcript, trigger_phrase) {
            PhraseMatch::Found { start, .. } => start,
            PhraseMatch::NotFound => match (kind, self.list(kind).last()) {
                (OverlayKind::Hud, Some(prev)) => prev.end + windows.hud_chain_gap_secs,
                (_, Some(prev)) => prev.end,
                (_, None) => 0.0,
            },
        };

        let list = self.list_mut(kind);
        let event = OverlayEvent {
            id: (list.len() + 1).to_string(),
            kind,
            start,
            end: start + window,
            payload,
        };
        list.push(event);

        list.last().expect("list cannot be empty after push")
    }

    /// Atomically clear all four lists.
    ///
    /// Called after a successful re-cut; every stored timestamp refers to the
    /// transcript that existed at creation time and is invalid afterwards.
    pub fn clear_all(&mut self) {
        self.visual.clear();
        self.hud.clear();
        self.camera.clear();
        self.text.clear();
    }
}
