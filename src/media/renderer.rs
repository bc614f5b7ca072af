use std::io::Write;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info};
use tokio::process::Command;

use crate::errors::RenderError;
use crate::session::models::StyleConfig;
use crate::timeline::intervals::KeepSegment;
use crate::transcript::{self, TranscriptSegment};

// @module: Rendering and stitching through ffmpeg

/// External renderer contract.
///
/// Given an ordered keep-segment list, the renderer must trim and
/// concatenate both audio and video tracks per segment in list order,
/// resetting each segment's internal time base, and produce one continuous
/// output whose duration equals the sum of kept segment durations. The
/// transcript must subsequently be regenerated against the new output.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Execute a stitch plan, writing the re-cut video to `output_path`
    async fn stitch(
        &self,
        video_path: &Path,
        plan: &[KeepSegment],
        output_path: &Path,
    ) -> Result<(), RenderError>;

    /// Burn styled subtitles into the video, writing to `output_path`
    async fn burn_subtitles(
        &self,
        video_path: &Path,
        segments: &[TranscriptSegment],
        style: &StyleConfig,
        output_path: &Path,
    ) -> Result<(), RenderError>;
}

/// ffmpeg-based renderer
#[derive(Debug, Clone)]
pub struct FfmpegRenderer {
    /// ffmpeg binary to invoke
    ffmpeg_path: String,
    /// Per-invocation timeout in seconds
    timeout_secs: u64,
}

impl FfmpegRenderer {
    /// Create a renderer
    pub fn new(ffmpeg_path: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            timeout_secs,
        }
    }

    /// Run one ffmpeg invocation with a timeout
    async fn run_ffmpeg(&self, args: &[&str]) -> Result<(), RenderError> {
        debug!("Running {} {}", self.ffmpeg_path, args.join(" "));

        let ffmpeg_future = Command::new(&self.ffmpeg_path).args(args).output();

        let timeout_duration = Duration::from_secs(self.timeout_secs);
        let output = tokio::select! {
            result = ffmpeg_future => {
                result.map_err(|e| RenderError::ProcessFailed(format!(
                    "Failed to execute ffmpeg: {}", e
                )))?
            },
            _ = tokio::time::sleep(timeout_duration) => {
                return Err(RenderError::Timeout(self.timeout_secs));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let filtered = filter_ffmpeg_stderr(&stderr);
            error!("ffmpeg failed: {}", filtered);
            return Err(RenderError::ProcessFailed(filtered));
        }

        Ok(())
    }
}

#[async_trait]
impl Renderer for FfmpegRenderer {
    async fn stitch(
        &self,
        video_path: &Path,
        plan: &[KeepSegment],
        output_path: &Path,
    ) -> Result<(), RenderError> {
        if plan.is_empty() {
            return Err(RenderError::ProcessFailed(
                "Refusing to render an empty stitch plan".to_string(),
            ));
        }

        let scratch = tempfile::tempdir()?;
        let input = video_path.to_str().unwrap_or_default().to_string();

        // Trim each kept segment into its own part file, stream-copied,
        // with timestamps rebased to zero
        let mut part_paths = Vec::with_capacity(plan.len());
        for (i, segment) in plan.iter().enumerate() {
            let part = scratch.path().join(format!("part_{:04}.mp4", i));
            let start = format!("{:.3}", segment.start);
            let end = format!("{:.3}", segment.end);

            self.run_ffmpeg(&[
                "-y",
                "-ss",
                &start,
                "-to",
                &end,
                "-i",
                &input,
                "-c",
                "copy",
                "-avoid_negative_ts",
                "make_zero",
                part.to_str().unwrap_or_default(),
            ])
            .await?;

            part_paths.push(part);
        }

        // Concat demuxer list file
        let list_path = scratch.path().join("parts.txt");
        let mut list_file = std::fs::File::create(&list_path)?;
        for part in &part_paths {
            writeln!(list_file, "file '{}'", part.display())?;
        }
        list_file.flush()?;

        self.run_ffmpeg(&[
            "-y",
            "-f",
            "concat",
            "-safe",
            "0",
            "-i",
            list_path.to_str().unwrap_or_default(),
            "-c",
            "copy",
            output_path.to_str().unwrap_or_default(),
        ])
        .await?;

        info!(
            "Stitched {} segment(s) into {:?}",
            plan.len(),
            output_path
        );

        Ok(())
    }

    async fn burn_subtitles(
        &self,
        video_path: &Path,
        segments: &[TranscriptSegment],
        style: &StyleConfig,
        output_path: &Path,
    ) -> Result<(), RenderError> {
        let scratch = tempfile::tempdir()?;
        let srt_path = scratch.path().join("subtitles.srt");
        transcript::write_srt(segments, &srt_path)
            .map_err(|e| RenderError::ProcessFailed(e.to_string()))?;

        let filter = format!(
            "subtitles={}:force_style='{}'",
            srt_path.display(),
            force_style(style)
        );

        self.run_ffmpeg(&[
            "-y",
            "-i",
            video_path.to_str().unwrap_or_default(),
            "-vf",
            &filter,
            output_path.to_str().unwrap_or_default(),
        ])
        .await?;

        info!("Burned {} subtitle(s) into {:?}", segments.len(), output_path);

        Ok(())
    }
}

/// Map a CSS color name to an ASS `&HBBGGRR` primary colour.
///
/// Unknown colors fall back to white.
pub fn ass_primary_colour(color: &str) -> &'static str {
    match color.to_lowercase().as_str() {
        "white" => "&HFFFFFF",
        "yellow" => "&H00FFFF",
        "red" => "&H0000FF",
        "black" => "&H000000",
        _ => "&HFFFFFF",
    }
}

/// Build the ASS force_style string for a subtitle style
pub fn force_style(style: &StyleConfig) -> String {
    // Alignment 2 = bottom center, 8 = top center
    let alignment = if style.position.eq_ignore_ascii_case("top") {
        8
    } else {
        2
    };

    format!(
        "FontName={},FontSize={},PrimaryColour={},Alignment={},BorderStyle=1,Outline=1,Shadow=0",
        style.font_family,
        style.font_size,
        ass_primary_colour(&style.font_color),
        alignment
    )
}

/// Filter ffmpeg stderr to only show meaningful error lines, stripping the
/// version banner, build configuration, and stream metadata noise.
fn filter_ffmpeg_stderr(stderr: &str) -> String {
    let dominated_prefixes = [
        "ffmpeg version",
        "built with",
        "configuration:",
        "lib",
        "Input #",
        "Metadata:",
        "Duration:",
        "Stream #",
        "Output #",
        "Stream mapping:",
        "Press [q]",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return false;
            }
            !dominated_prefixes.iter().any(|p| trimmed.starts_with(p))
        })
        .collect();

    if meaningful.is_empty() {
        "unknown ffmpeg error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}
