use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::PathBuf;

use crate::overlay::OverlayWindows;
use crate::session::models::StyleConfig;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Intent classifier config
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// External media tools config
    #[serde(default)]
    pub media: MediaConfig,

    /// Per-kind overlay window defaults
    #[serde(default)]
    pub overlays: OverlayWindows,

    /// Session storage config
    #[serde(default)]
    pub storage: StorageConfig,

    /// Initial subtitle style for new sessions
    #[serde(default)]
    pub default_style: StyleConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Classifier provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierProvider {
    // @provider: Google Gemini
    #[default]
    Gemini,
    // @provider: Scripted mock (testing only)
    Mock,
}

impl ClassifierProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Gemini => "Gemini",
            Self::Mock => "Mock",
        }
    }
}

impl std::fmt::Display for ClassifierProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::Mock => write!(f, "mock"),
        }
    }
}

impl std::str::FromStr for ClassifierProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "mock" => Ok(Self::Mock),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Intent classifier configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClassifierConfig {
    /// Provider to use
    #[serde(default)]
    pub provider: ClassifierProvider,

    /// Model name
    #[serde(default = "default_classifier_model")]
    pub model: String,

    /// API key
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Service URL (empty = provider default)
    #[serde(default = "String::new")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_classifier_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            provider: ClassifierProvider::default(),
            model: default_classifier_model(),
            api_key: String::new(),
            endpoint: String::new(),
            timeout_secs: default_classifier_timeout_secs(),
        }
    }
}

/// External media tools configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MediaConfig {
    /// ffmpeg binary
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    /// whisper binary
    #[serde(default = "default_whisper_path")]
    pub whisper_path: String,

    /// whisper model name
    #[serde(default = "default_whisper_model")]
    pub whisper_model: String,

    /// Noise floor for silence detection, in dB
    #[serde(default = "default_silence_noise_db")]
    pub silence_noise_db: f64,

    /// Minimum silence length to cut, in seconds
    #[serde(default = "default_min_silence_secs")]
    pub min_silence_secs: f64,

    /// Timeout for silence scans, in seconds
    #[serde(default = "default_detect_timeout_secs")]
    pub detect_timeout_secs: u64,

    /// Timeout for render/stitch invocations, in seconds
    #[serde(default = "default_render_timeout_secs")]
    pub render_timeout_secs: u64,

    /// Timeout for transcription, in seconds
    #[serde(default = "default_transcribe_timeout_secs")]
    pub transcribe_timeout_secs: u64,

    /// Directory for re-cut output files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            whisper_path: default_whisper_path(),
            whisper_model: default_whisper_model(),
            silence_noise_db: default_silence_noise_db(),
            min_silence_secs: default_min_silence_secs(),
            detect_timeout_secs: default_detect_timeout_secs(),
            render_timeout_secs: default_render_timeout_secs(),
            transcribe_timeout_secs: default_transcribe_timeout_secs(),
            output_dir: default_output_dir(),
        }
    }
}

/// Session storage backend
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// SQLite database under the user data directory
    #[default]
    Sqlite,
    /// Ephemeral in-memory map
    Memory,
}

/// Session storage configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct StorageConfig {
    /// Backend to use
    #[serde(default)]
    pub backend: StorageBackend,

    /// Database path override (sqlite backend only)
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_classifier_model() -> String {
    "gemini-2.5-flash-lite".to_string()
}

fn default_classifier_timeout_secs() -> u64 {
    30
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_whisper_path() -> String {
    "whisper".to_string()
}

fn default_whisper_model() -> String {
    "base".to_string()
}

fn default_silence_noise_db() -> f64 {
    -30.0
}

fn default_min_silence_secs() -> f64 {
    0.5
}

fn default_detect_timeout_secs() -> u64 {
    120
}

fn default_render_timeout_secs() -> u64 {
    300
}

fn default_transcribe_timeout_secs() -> u64 {
    600
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("processed")
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate API key for remote providers
        if self.classifier.provider == ClassifierProvider::Gemini
            && self.classifier.api_key.is_empty()
            && std::env::var("GOOGLE_API_KEY").is_err()
        {
            return Err(anyhow!(
                "Classifier API key is required for the Gemini provider (set it in the config or GOOGLE_API_KEY)"
            ));
        }

        if self.media.min_silence_secs <= 0.0 {
            return Err(anyhow!(
                "min_silence_secs must be positive, got {}",
                self.media.min_silence_secs
            ));
        }

        if self.media.silence_noise_db >= 0.0 {
            return Err(anyhow!(
                "silence_noise_db must be negative, got {}",
                self.media.silence_noise_db
            ));
        }

        Ok(())
    }

    /// Resolve the classifier API key, preferring the config over the environment
    pub fn classifier_api_key(&self) -> String {
        if !self.classifier.api_key.is_empty() {
            return self.classifier.api_key.clone();
        }
        std::env::var("GOOGLE_API_KEY").unwrap_or_default()
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            classifier: ClassifierConfig::default(),
            media: MediaConfig::default(),
            overlays: OverlayWindows::default(),
            storage: StorageConfig::default(),
            default_style: StyleConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
