/*!
 * Fuzzy location of trigger phrases inside a transcript.
 *
 * Maps a short natural-language phrase onto the most probable timestamp
 * within a list of transcript segments. Exact substring hits always win;
 * otherwise a Levenshtein-based similarity ratio decides, with a fixed
 * acceptance threshold.
 */

use log::debug;

use crate::transcript::TranscriptSegment;

/// Similarity acceptance threshold.
///
/// A candidate only counts if its score is strictly above this value.
/// Changing it changes which segment a trigger phrase resolves to, so it is
/// kept fixed for compatibility.
pub const MATCH_THRESHOLD: f64 = 0.6;

/// Result of locating a phrase in a transcript.
///
/// A genuine match at time zero is `Found { start: 0.0 }` and is distinct
/// from `NotFound`; callers apply their chaining fallback only on `NotFound`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhraseMatch {
    /// The phrase resolved to a timestamp within the transcript
    Found {
        /// Resolved start time in seconds
        start: f64,
        /// Match score in (MATCH_THRESHOLD, 1.0]; 1.0 for substring hits
        score: f64,
    },
    /// No segment scored above the threshold
    NotFound,
}

impl PhraseMatch {
    /// The resolved start time, if any
    pub fn start(&self) -> Option<f64> {
        match self {
            PhraseMatch::Found { start, .. } => Some(*start),
            PhraseMatch::NotFound => None,
        }
    }
}

/// Locates trigger phrases in transcripts
#[derive(Debug, Clone)]
pub struct PhraseLocator {
    /// Acceptance threshold (strictly exceeded to count)
    threshold: f64,
}

impl Default for PhraseLocator {
    fn default() -> Self {
        Self {
            threshold: MATCH_THRESHOLD,
        }
    }
}

impl PhraseLocator {
    /// Create a locator with a custom threshold
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    /// Locate `phrase` within `transcript`.
    ///
    /// For each segment, an exact (case-insensitive) substring hit scores 1.0
    /// with the substring's character offset as match position; otherwise a
    /// similarity ratio above the threshold counts as a whole-segment match
    /// at position 0. The strictly highest score wins; ties keep the first
    /// segment in transcript order. The winner's timestamp is interpolated
    /// into the segment proportionally to the match position.
    pub fn locate(&self, transcript: &[TranscriptSegment], phrase: &str) -> PhraseMatch {
        let phrase = phrase.trim().to_lowercase();
        if phrase.is_empty() || transcript.is_empty() {
            return PhraseMatch::NotFound;
        }

        // (segment index, char offset of match, score)
        let mut best: Option<(usize, usize, f64)> = None;

        for (idx, segment) in transcript.iter().enumerate() {
            let text = segment.text.to_lowercase();

            let candidate = if let Some(byte_idx) = text.find(&phrase) {
                let char_idx = text[..byte_idx].chars().count();
                Some((char_idx, 1.0))
            } else {
                let ratio = similarity(&phrase, &text);
                if ratio > self.threshold {
                    Some((0, ratio))
                } else {
                    None
                }
            };

            if let Some((match_idx, score)) = candidate {
                // Ties keep the first segment encountered in transcript order
                let better = match best {
                    Some((_, _, best_score)) => score > best_score,
                    None => true,
                };
                if better {
                    best = Some((idx, match_idx, score));
                }
            }
        }

        match best {
            Some((idx, match_idx, score)) if score > self.threshold => {
                let segment = &transcript[idx];
                let text_chars = segment.text.to_lowercase().chars().count();
                let progress = if text_chars == 0 {
                    0.0
                } else {
                    match_idx as f64 / text_chars as f64
                };
                let start = segment.start + (segment.end - segment.start) * progress;

                debug!(
                    "Phrase {:?} resolved to {:.2}s (segment {}, score {:.2})",
                    phrase, start, idx, score
                );

                PhraseMatch::Found { start, score }
            }
            _ => PhraseMatch::NotFound,
        }
    }
}

/// Calculate similarity between two strings (0.0-1.0)
///
/// Uses normalized Levenshtein distance over characters.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let distance = levenshtein_distance(a, b);
    let max_len = a.chars().count().max(b.chars().count());

    1.0 - (distance as f64 / max_len as f64)
}

/// Calculate Levenshtein distance between two strings
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    // Two-row optimization for space efficiency
    let mut prev_row: Vec<usize> = (0..=b_len).collect();
    let mut curr_row: Vec<usize> = vec![0; b_len + 1];

    for i in 1..=a_len {
        curr_row[0] = i;

        for j in 1..=b_len {
            let cost = if a_chars[i - 1] == b_chars[j - 1] { 0 } else { 1 };

            curr_row[j] = (prev_row[j] + 1)                  // deletion
                .min(curr_row[j - 1] + 1)                    // insertion
                .min(prev_row[j - 1] + cost);                // substitution
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b_len]
}
