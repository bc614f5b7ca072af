use std::fmt;
use std::fs;
use std::path::Path;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

// @module: Transcript segments and SRT serialization

/// A single timestamped transcript segment produced by transcription.
///
/// Segments are immutable once produced, ordered by `start` and assumed
/// non-overlapping; that invariant is enforced by the upstream transcriber
/// and not re-validated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    // @field: Segment start in seconds
    pub start: f64,

    // @field: Segment end in seconds
    pub end: f64,

    // @field: Spoken text
    pub text: String,
}

impl TranscriptSegment {
    /// Creates a new transcript segment - used by tests and external consumers
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        TranscriptSegment {
            start,
            end,
            text: text.into(),
        }
    }

    // @creates: Validated transcript segment
    // @validates: Time range and non-negative start
    pub fn new_validated(start: f64, end: f64, text: impl Into<String>) -> Result<Self> {
        if start < 0.0 {
            return Err(anyhow!("Invalid segment start: {}", start));
        }
        if end <= start {
            return Err(anyhow!(
                "Invalid time range: end {} <= start {}",
                end, start
            ));
        }

        Ok(TranscriptSegment {
            start,
            end,
            text: text.into(),
        })
    }

    /// Segment length in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        format_srt_timestamp(self.start)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        format_srt_timestamp(self.end)
    }
}

impl fmt::Display for TranscriptSegment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[{} --> {}] {}",
            self.format_start_time(),
            self.format_end_time(),
            self.text
        )
    }
}

/// Format a timestamp in seconds to SRT format (HH:MM:SS,mmm)
pub fn format_srt_timestamp(seconds: f64) -> String {
    let total_millis = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let secs = (total_millis % 60_000) / 1_000;
    let millis = total_millis % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

/// Render a transcript as SRT file content
///
/// Entries are numbered 1-based in segment order.
pub fn to_srt(segments: &[TranscriptSegment]) -> String {
    let mut out = String::new();
    for (i, seg) in segments.iter().enumerate() {
        out.push_str(&format!("{}\n", i + 1));
        out.push_str(&format!(
            "{} --> {}\n",
            seg.format_start_time(),
            seg.format_end_time()
        ));
        out.push_str(&seg.text);
        out.push_str("\n\n");
    }
    out
}

/// Write a transcript to an SRT file
pub fn write_srt<P: AsRef<Path>>(segments: &[TranscriptSegment], path: P) -> Result<()> {
    fs::write(path.as_ref(), to_srt(segments))
        .map_err(|e| anyhow!("Failed to write SRT file {:?}: {}", path.as_ref(), e))
}

/// Compact JSON sample of the first `count` segments, for classifier prompts
pub fn sample_json(segments: &[TranscriptSegment], count: usize) -> String {
    let sample: Vec<&TranscriptSegment> = segments.iter().take(count).collect();
    serde_json::to_string(&sample).unwrap_or_else(|_| "[]".to_string())
}
