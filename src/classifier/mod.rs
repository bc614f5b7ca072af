/*!
 * Intent classification for editing requests.
 *
 * The external language model turns a free-form user request plus transcript
 * context into a tagged action descriptor. This module owns:
 * - the closed `ActionDescriptor` type, one variant per action kind,
 *   exhaustively matched by the controller
 * - descriptor parsing from the model's JSON output, degrading to a canned
 *   chat reply on anything malformed (never a crash, never silent
 *   fall-through)
 * - the `ActionClassifier` trait and its provider implementations:
 *   - `gemini`: Google Gemini API client
 *   - `mock`: scripted classifier for testing
 */

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt::Debug;

use crate::errors::ClassifierError;
use crate::session::models::{StyleConfig, StylePatch};
use crate::transcript::{self, TranscriptSegment};

pub mod gemini;
pub mod mock;

/// Canned reply used whenever classifier output cannot be understood
pub const FALLBACK_REPLY: &str = "Sorry, I didn't catch that. Try 'Make the font red'.";

/// Number of transcript segments included in the classifier prompt
const TRANSCRIPT_SAMPLE_LEN: usize = 3;

/// A resolved editing action.
///
/// One variant per action kind the classifier can produce; anything the
/// parser cannot place lands in `Chat`.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionDescriptor {
    /// Change the subtitle style
    Style {
        /// Fields to change
        new_style: StylePatch,
    },
    /// Add a generated-image overlay
    Visual {
        /// Phrase anchoring the overlay in the transcript
        trigger_phrase: String,
        /// Keyword to generate the image from
        keyword: String,
        /// Requested image style, if any
        img_style: Option<String>,
        /// Free-form presentation properties
        props: Map<String, Value>,
    },
    /// Add a camera move
    Camera {
        /// Phrase anchoring the move in the transcript
        trigger_phrase: String,
        /// Move type (e.g. "zoom_in", "zoom_out", "pan")
        move_type: String,
        /// Move intensity, if specified
        intensity: Option<f64>,
    },
    /// Add a HUD card
    Hud {
        /// Phrase anchoring the card in the transcript
        trigger_phrase: String,
        /// Card title
        title: String,
        /// Card body content
        content: String,
    },
    /// Add a floating text layer
    TextBehind {
        /// Phrase anchoring the text in the transcript
        trigger_phrase: String,
        /// Text to display
        text_content: String,
        /// Free-form presentation properties
        props: Map<String, Value>,
    },
    /// Remove silence and filler words from the video
    AutoCut,
    /// Conversational reply with no session mutation
    Chat {
        /// Reply to show the user
        response: String,
    },
}

/// Raw descriptor shape as emitted by the model
#[derive(Debug, Deserialize)]
struct RawDescriptor {
    action: Option<String>,
    new_style: Option<StylePatch>,
    trigger_phrase: Option<String>,
    keyword: Option<String>,
    img_style: Option<String>,
    visual_props: Option<Map<String, Value>>,
    #[serde(rename = "type")]
    move_type: Option<String>,
    intensity: Option<f64>,
    title: Option<String>,
    content: Option<String>,
    text_content: Option<String>,
    text_props: Option<Map<String, Value>>,
    response: Option<String>,
}

/// Chat descriptor with the canned fallback reply
fn fallback_chat() -> ActionDescriptor {
    ActionDescriptor::Chat {
        response: FALLBACK_REPLY.to_string(),
    }
}

/// Parse the model's raw output into an action descriptor.
///
/// Markdown code fences are stripped before parsing. Unknown action names,
/// invalid JSON and descriptors missing their essential fields all degrade
/// to the canned chat reply.
pub fn parse_descriptor(raw: &str) -> ActionDescriptor {
    let cleaned = raw.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();

    let raw: RawDescriptor = match serde_json::from_str(cleaned) {
        Ok(parsed) => parsed,
        Err(_) => return fallback_chat(),
    };

    let action = match raw.action.as_deref() {
        Some(action) => action.to_lowercase(),
        None => return fallback_chat(),
    };

    match action.as_str() {
        "style" => match raw.new_style {
            Some(new_style) if !new_style.is_empty() => ActionDescriptor::Style { new_style },
            _ => fallback_chat(),
        },
        "visual" => match raw.keyword {
            Some(keyword) if !keyword.trim().is_empty() => ActionDescriptor::Visual {
                trigger_phrase: raw.trigger_phrase.unwrap_or_default(),
                keyword,
                img_style: raw.img_style,
                props: raw.visual_props.unwrap_or_default(),
            },
            _ => fallback_chat(),
        },
        "camera" => ActionDescriptor::Camera {
            trigger_phrase: raw.trigger_phrase.unwrap_or_default(),
            move_type: raw.move_type.unwrap_or_else(|| "zoom_in".to_string()),
            intensity: raw.intensity,
        },
        "hud" => match (raw.title, raw.content) {
            (Some(title), Some(content)) => ActionDescriptor::Hud {
                trigger_phrase: raw.trigger_phrase.unwrap_or_default(),
                title,
                content,
            },
            _ => fallback_chat(),
        },
        "text_behind" => match raw.text_content {
            Some(text_content) if !text_content.trim().is_empty() => ActionDescriptor::TextBehind {
                trigger_phrase: raw.trigger_phrase.unwrap_or_default(),
                text_content,
                props: raw.text_props.unwrap_or_default(),
            },
            _ => fallback_chat(),
        },
        "auto_cut" => ActionDescriptor::AutoCut,
        "chat" => ActionDescriptor::Chat {
            response: raw.response.unwrap_or_else(|| FALLBACK_REPLY.to_string()),
        },
        _ => fallback_chat(),
    }
}

/// Session context handed to the classifier with every request
#[derive(Debug, Clone)]
pub struct ClassifyContext {
    /// Current style as compact JSON
    pub style_json: String,
    /// First few transcript segments as compact JSON
    pub transcript_sample: String,
}

impl ClassifyContext {
    /// Build the context from session state
    pub fn from_session(style: &StyleConfig, segments: &[TranscriptSegment]) -> Self {
        Self {
            style_json: serde_json::to_string(style).unwrap_or_else(|_| "{}".to_string()),
            transcript_sample: transcript::sample_json(segments, TRANSCRIPT_SAMPLE_LEN),
        }
    }
}

/// Build the system prompt sent to the model
pub fn build_system_prompt(context: &ClassifyContext) -> String {
    format!(
        r#"You are an expert Video Editor AI. You manage subtitles, styling, overlays and cuts.

CURRENT STATE:
Style: {style}
Sample transcript: {sample}... (truncated)

INSTRUCTIONS:
Analyze the request and output valid JSON ONLY, matching one of these shapes:

1. Change visual style (color, size, font):
   {{ "action": "style", "new_style": {{ "font_color": "yellow", "font_size": 30 }} }}
   (Only include fields that changed. Use standard CSS color names.)

2. Show an image when something is said:
   {{ "action": "visual", "trigger_phrase": "<exact words from transcript>", "keyword": "<image subject>", "img_style": "photo", "visual_props": {{}} }}

3. Camera move when something is said:
   {{ "action": "camera", "trigger_phrase": "<exact words>", "type": "zoom_in", "intensity": 1.5 }}

4. Informational HUD card:
   {{ "action": "hud", "trigger_phrase": "<exact words>", "title": "<short title>", "content": "<card body>" }}

5. Floating text behind the speaker:
   {{ "action": "text_behind", "trigger_phrase": "<exact words>", "text_content": "<text>", "text_props": {{}} }}

6. Remove silences and filler words:
   {{ "action": "auto_cut" }}

7. General chat:
   {{ "action": "chat", "response": "Your reply here." }}"#,
        style = context.style_json,
        sample = context.transcript_sample,
    )
}

/// Common trait for all intent classifiers
///
/// This trait defines the interface every provider implementation must
/// follow, allowing them to be used interchangeably by the controller.
#[async_trait]
pub trait ActionClassifier: Send + Sync + Debug {
    /// Classify a user request into an action descriptor
    ///
    /// # Arguments
    /// * `prompt` - The user's free-form editing request
    /// * `context` - Session context (current style, transcript sample)
    ///
    /// # Returns
    /// * The resolved descriptor, or an error if the provider call failed.
    ///   Malformed provider output is not an error; it degrades to
    ///   [`ActionDescriptor::Chat`].
    async fn classify(
        &self,
        prompt: &str,
        context: &ClassifyContext,
    ) -> Result<ActionDescriptor, ClassifierError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ClassifierError>;
}
