/*!
 * # VEditAI - Video Editing with AI
 *
 * A Rust library that turns free-form editing requests into time-coded
 * overlays and edit decisions over a video's transcript.
 *
 * ## Features
 *
 * - Locate natural-language trigger phrases inside a timestamped transcript
 * - Merge silence/filler removal intervals into a minimal disjoint cover
 * - Compute the complementary keep-segment list for lossless re-stitching
 * - Maintain per-session overlay registries (visual, HUD, camera, text)
 * - Classify editing requests through pluggable LLM providers
 * - Drive ffmpeg for silence detection, stitching and subtitle burn-in
 * - Persist sessions to an in-memory or SQLite keyed store
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `timeline`: the alignment and edit-decision engine:
 *   - `timeline::locate`: fuzzy trigger-phrase location
 *   - `timeline::intervals`: interval merging, complement and stitch plans
 * - `overlay`: per-session overlay registries and payload types
 * - `transcript`: transcript segments and SRT serialization
 * - `classifier`: action descriptors and LLM classifier adapters
 * - `media`: external collaborators (silence detection, rendering,
 *   transcription) driven through ffmpeg and whisper
 * - `session`: session state and the keyed session store
 * - `app_config`: configuration management
 * - `app_controller`: main application controller
 * - `errors`: custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod classifier;
pub mod errors;
pub mod media;
pub mod overlay;
pub mod session;
pub mod timeline;
pub mod transcript;

// Re-export main types for easier usage
pub use app_config::Config;
pub use classifier::ActionDescriptor;
pub use errors::{AppError, ClassifierError, DetectionError, RenderError, StoreError};
pub use overlay::{OverlayEvent, OverlayKind, OverlayPayload, OverlayRegistry, OverlayWindows};
pub use session::{Session, SessionStore, StyleConfig};
pub use timeline::intervals::{build_stitch_plan, complement, merge_intervals};
pub use timeline::intervals::{KeepSegment, RemovalInterval};
pub use timeline::locate::{PhraseLocator, PhraseMatch};
pub use transcript::TranscriptSegment;
