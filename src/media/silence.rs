use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::process::Command;

use crate::errors::DetectionError;
use crate::timeline::intervals::RemovalInterval;

// @module: Silence detection via ffmpeg silencedetect

// @const: silence_start marker regex
static SILENCE_START_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"silence_start:\s*(-?\d+(?:\.\d+)?)").unwrap());

// @const: silence_end marker regex
static SILENCE_END_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"silence_end:\s*(-?\d+(?:\.\d+)?)").unwrap());

// @const: stream duration marker regex (HH:MM:SS.ff)
static DURATION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Duration:\s*(\d+):(\d{2}):(\d{2})\.(\d{2})").unwrap());

/// Result of a silence scan
#[derive(Debug, Clone, PartialEq)]
pub struct SilenceScan {
    /// Detected silence intervals, in emission order
    pub intervals: Vec<RemovalInterval>,
    /// Total stream duration in seconds
    pub duration: f64,
}

/// Parse a silencedetect log into intervals and the stream duration.
///
/// `silence_start:` and `silence_end:` markers are paired in emission order;
/// a trailing unmatched start (silence running to end of stream) is closed at
/// the stream duration. The duration marker is required; without it the whole
/// detection step fails.
pub fn parse_silence_log(log: &str) -> Result<SilenceScan, DetectionError> {
    let duration = parse_duration_marker(log).ok_or(DetectionError::DurationMissing)?;

    let mut intervals = Vec::new();
    let mut pending_start: Option<f64> = None;

    for line in log.lines() {
        if let Some(caps) = SILENCE_START_REGEX.captures(line) {
            let start: f64 = caps[1].parse().unwrap_or(0.0);
            if pending_start.is_some() {
                warn!("silence_start without matching silence_end, discarding previous marker");
            }
            pending_start = Some(start.max(0.0));
        } else if let Some(caps) = SILENCE_END_REGEX.captures(line) {
            let end: f64 = caps[1].parse().unwrap_or(0.0);
            match pending_start.take() {
                Some(start) if end > start => {
                    intervals.push(RemovalInterval::new(start, end));
                }
                Some(start) => {
                    warn!("Dropping empty silence interval at {}", start);
                }
                None => {
                    warn!("silence_end without matching silence_start, ignoring");
                }
            }
        }
    }

    // Silence running into the end of the stream has no end marker
    if let Some(start) = pending_start {
        if duration > start {
            intervals.push(RemovalInterval::new(start, duration));
        }
    }

    debug!(
        "Parsed {} silence interval(s) over {:.2}s of stream",
        intervals.len(),
        duration
    );

    Ok(SilenceScan {
        intervals,
        duration,
    })
}

/// Parse the `Duration: HH:MM:SS.ff` marker into seconds
fn parse_duration_marker(log: &str) -> Option<f64> {
    let caps = DURATION_REGEX.captures(log)?;

    let hours: f64 = caps[1].parse().ok()?;
    let minutes: f64 = caps[2].parse().ok()?;
    let seconds: f64 = caps[3].parse().ok()?;
    let centis: f64 = caps[4].parse().ok()?;

    Some(hours * 3600.0 + minutes * 60.0 + seconds + centis / 100.0)
}

/// External silence detection contract.
///
/// A scan either fully succeeds, producing the intervals and stream
/// duration, or fails; there is no partial result. For the cut-decision
/// flow a failed scan is indistinguishable from "no intervals found".
#[async_trait]
pub trait SilenceScanner: Send + Sync {
    /// Scan a video for silence intervals
    async fn scan(&self, video_path: &Path) -> Result<SilenceScan, DetectionError>;
}

/// Runs ffmpeg silencedetect scans
#[derive(Debug, Clone)]
pub struct SilenceDetector {
    /// ffmpeg binary to invoke
    ffmpeg_path: String,
    /// Noise floor in dB below which audio counts as silence
    noise_db: f64,
    /// Minimum silence length in seconds to report
    min_silence_secs: f64,
    /// Scan timeout in seconds
    timeout_secs: u64,
}

impl SilenceDetector {
    /// Create a detector
    pub fn new(
        ffmpeg_path: impl Into<String>,
        noise_db: f64,
        min_silence_secs: f64,
        timeout_secs: u64,
    ) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            noise_db,
            min_silence_secs,
            timeout_secs,
        }
    }
}

#[async_trait]
impl SilenceScanner for SilenceDetector {
    /// Runs ffmpeg with the silencedetect filter and a null muxer; the
    /// markers land on stderr.
    async fn scan(&self, video_path: &Path) -> Result<SilenceScan, DetectionError> {
        if !video_path.exists() {
            return Err(DetectionError::ProcessFailed(format!(
                "Video file does not exist: {:?}",
                video_path
            )));
        }

        let filter = format!(
            "silencedetect=noise={}dB:d={}",
            self.noise_db, self.min_silence_secs
        );

        let ffmpeg_future = Command::new(&self.ffmpeg_path)
            .args([
                "-hide_banner",
                "-nostats",
                "-i",
                video_path.to_str().unwrap_or_default(),
                "-af",
                &filter,
                "-f",
                "null",
                "-",
            ])
            .output();

        let timeout_duration = Duration::from_secs(self.timeout_secs);
        let output = tokio::select! {
            result = ffmpeg_future => {
                result.map_err(|e| DetectionError::ProcessFailed(format!(
                    "Failed to execute ffmpeg for silence detection: {}", e
                )))?
            },
            _ = tokio::time::sleep(timeout_duration) => {
                return Err(DetectionError::Timeout(self.timeout_secs));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DetectionError::ProcessFailed(format!(
                "ffmpeg silencedetect exited with {}: {}",
                output.status,
                stderr.lines().last().unwrap_or("no output")
            )));
        }

        // silencedetect reports on stderr together with the stream banner
        let log = String::from_utf8_lossy(&output.stderr);
        parse_silence_log(&log)
    }
}
