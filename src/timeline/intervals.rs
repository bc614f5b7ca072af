/*!
 * Removal-interval algebra and stitch-plan construction.
 *
 * Merges a bag of possibly-overlapping removal intervals (silence, filler
 * words) into a minimal sorted disjoint cover, and computes the complementary
 * ordered keep-segment list that tiles the full duration together with the
 * cover. The keep-segment list is the stitch plan handed to the renderer.
 */

use std::cmp::Ordering;
use serde::{Deserialize, Serialize};

/// A time span slated for deletion from the final video.
///
/// Created from detector output or caller-supplied filler spans; never
/// mutated after creation. No distinction is made between silence and filler
/// once both become removal intervals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RemovalInterval {
    /// Start of the span in seconds
    pub start: f64,
    /// End of the span in seconds
    pub end: f64,
}

impl RemovalInterval {
    /// Create a new removal interval
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Span length in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// A time span retained in the final video after removals are cut out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeepSegment {
    /// Start of the span in seconds
    pub start: f64,
    /// End of the span in seconds
    pub end: f64,
}

impl KeepSegment {
    /// Create a new keep segment
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Span length in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Merge possibly-overlapping intervals into a minimal sorted disjoint cover.
///
/// Intervals are sorted by start and swept left to right; an interval only
/// extends the current accumulator on strict overlap (`next.start < cur.end`),
/// so merely-touching intervals stay separate. Empty input yields empty
/// output. The operation is idempotent.
pub fn merge_intervals(mut intervals: Vec<RemovalInterval>) -> Vec<RemovalInterval> {
    if intervals.is_empty() {
        return Vec::new();
    }

    intervals.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap_or(Ordering::Equal));

    let mut merged: Vec<RemovalInterval> = Vec::with_capacity(intervals.len());
    let mut current = intervals[0];

    for next in intervals.into_iter().skip(1) {
        if next.start < current.end {
            current.end = current.end.max(next.end);
        } else {
            merged.push(current);
            current = next;
        }
    }
    merged.push(current);

    merged
}

/// Compute the ordered keep-segment list complementary to a disjoint cover.
///
/// Walks the merged intervals in order with a cursor starting at 0.0,
/// emitting a keep segment for every gap and a trailing segment up to
/// `duration`. The emitted keep segments plus the merged removal intervals
/// exactly tile `[0, duration)` with no gaps or overlaps, up to
/// floating-point rounding.
pub fn complement(merged: &[RemovalInterval], duration: f64) -> Vec<KeepSegment> {
    let mut keep = Vec::with_capacity(merged.len() + 1);
    let mut cursor = 0.0;

    for interval in merged {
        if interval.start > cursor {
            keep.push(KeepSegment::new(cursor, interval.start.min(duration)));
        }
        cursor = cursor.max(interval.end);
    }

    if cursor < duration {
        keep.push(KeepSegment::new(cursor, duration));
    }

    keep
}

/// Build the stitch plan for a set of removal intervals.
///
/// Composition of [`merge_intervals`] and [`complement`]. An empty plan means
/// the whole video would be removed; the caller reports that as "nothing to
/// cut" rather than rendering a degenerate zero-length output.
pub fn build_stitch_plan(intervals: Vec<RemovalInterval>, total_duration: f64) -> Vec<KeepSegment> {
    let merged = merge_intervals(intervals);
    complement(&merged, total_duration)
}
