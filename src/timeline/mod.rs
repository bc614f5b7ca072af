/*!
 * Timeline alignment and edit-decision engine.
 *
 * This module contains the algorithmic core of the application:
 * - `locate`: fuzzy mapping of a trigger phrase onto a precise timestamp
 *   within a transcript
 * - `intervals`: merging of removal intervals into a minimal disjoint cover
 *   and computation of the complementary keep-segment list handed to the
 *   renderer
 *
 * All operations here are pure and synchronous; they allocate no long-lived
 * resources and never block or suspend.
 */

pub mod intervals;
pub mod locate;

// Re-export main types
pub use intervals::{build_stitch_plan, complement, merge_intervals, KeepSegment, RemovalInterval};
pub use locate::{PhraseLocator, PhraseMatch};
