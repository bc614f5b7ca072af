// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::too_many_arguments)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use app_controller::{Controller, CutOutcome};
use timeline::intervals::RemovalInterval;

mod app_config;
mod app_controller;
mod classifier;
mod errors;
mod media;
mod overlay;
mod session;
mod timeline;
mod transcript;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open a new editing session for a video (transcribes it first)
    Open {
        /// Video file to edit
        #[arg(value_name = "VIDEO_PATH")]
        video_path: PathBuf,
    },

    /// Apply a free-form editing instruction to a session
    Edit {
        /// Session identifier
        #[arg(value_name = "SESSION_ID")]
        session_id: String,

        /// The editing instruction (e.g. "make the font yellow")
        #[arg(value_name = "INSTRUCTION")]
        instruction: String,
    },

    /// Remove silence (and optional filler spans) from a session's video
    Cut {
        /// Session identifier
        #[arg(value_name = "SESSION_ID")]
        session_id: String,

        /// JSON file with extra [start, end] filler spans to remove
        #[arg(short = 'F', long)]
        fillers: Option<PathBuf>,
    },

    /// Show a session's current state
    Show {
        /// Session identifier
        #[arg(value_name = "SESSION_ID")]
        session_id: String,
    },

    /// Burn the session's subtitles into its video
    Burn {
        /// Session identifier
        #[arg(value_name = "SESSION_ID")]
        session_id: String,

        /// Output video path
        #[arg(value_name = "OUTPUT_PATH")]
        output_path: PathBuf,
    },

    /// List stored sessions
    Sessions,

    /// Remove a stored session
    Remove {
        /// Session identifier
        #[arg(value_name = "SESSION_ID")]
        session_id: String,
    },

    /// Generate shell completions for veditai
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// VEditAI - Video Editing with AI
///
/// An AI-assisted video editing tool that turns free-form instructions into
/// time-coded overlays, subtitle styling and silence cuts.
#[derive(Parser, Debug)]
#[command(name = "veditai")]
#[command(version = "1.0.0")]
#[command(about = "AI-assisted video editing tool")]
#[command(long_about = "VEditAI transcribes a video, then applies free-form editing instructions:
subtitle styling, visual/HUD/camera/text overlays anchored to spoken phrases,
and automatic removal of silences and filler words.

EXAMPLES:
    veditai open talk.mp4                        # Transcribe and open a session
    veditai edit <id> \"make the font yellow\"     # Apply an instruction
    veditai edit <id> \"zoom in when I say wow\"   # Add a camera move
    veditai cut <id>                             # Remove silences
    veditai cut <id> -F fillers.json             # Also cut filler-word spans
    veditai burn <id> out.mp4                    # Burn styled subtitles
    veditai completions bash > veditai.bash      # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a
    different config file with --config. If the config file doesn't exist, a
    default one will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let color = Self::color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:5} {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "veditai", &mut std::io::stdout());
        return Ok(());
    }

    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &cli.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level_filter(&config_log_level));
    }

    let config = load_or_create_config(&cli.config_path, cli.log_level.as_ref())?;

    // If log level was not set via command line, update it from config now
    if cli.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    // The classifier is only exercised by `edit`; other commands run without
    // an API key
    if matches!(cli.command, Commands::Edit { .. }) {
        config
            .validate()
            .context("Configuration validation failed")?;
    }

    let controller = Controller::with_config(config)?;

    match cli.command {
        Commands::Open { video_path } => {
            let session = controller.open_session(&video_path).await?;
            println!("Session: {}", session.id);
            println!("Transcript segments: {}", session.transcript.len());
            for segment in session.transcript.iter().take(5) {
                println!("  {}", segment);
            }
            if session.transcript.len() > 5 {
                println!("  ... ({} more)", session.transcript.len() - 5);
            }
        }

        Commands::Edit {
            session_id,
            instruction,
        } => {
            let reply = controller.handle_prompt(&session_id, &instruction).await?;
            println!("{}", reply.reply);
        }

        Commands::Cut {
            session_id,
            fillers,
        } => {
            let filler_intervals = match fillers {
                Some(path) => load_filler_intervals(&path)?,
                None => Vec::new(),
            };

            match controller.auto_cut(&session_id, filler_intervals).await? {
                CutOutcome::NothingToCut => println!("Nothing to cut."),
                CutOutcome::Recut {
                    removed_secs,
                    kept_segments,
                    output,
                } => {
                    println!(
                        "Removed {:.1}s across {} kept segment(s)",
                        removed_secs, kept_segments
                    );
                    println!("Output: {:?}", output);
                }
            }
        }

        Commands::Show { session_id } => {
            let session = controller.get_session(&session_id)?;
            let json = serde_json::to_string_pretty(&session)
                .context("Failed to serialize session")?;
            println!("{}", json);
        }

        Commands::Burn {
            session_id,
            output_path,
        } => {
            controller.burn_subtitles(&session_id, &output_path).await?;
            info!("Burned subtitles into {:?}", output_path);
        }

        Commands::Sessions => {
            let ids = controller.list_sessions()?;
            if ids.is_empty() {
                println!("No sessions.");
            }
            for id in ids {
                println!("{}", id);
            }
        }

        Commands::Remove { session_id } => {
            if controller.remove_session(&session_id)? {
                println!("Removed session {}", session_id);
            } else {
                warn!("No session found with id {}", session_id);
            }
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Load the config file, creating a default one if it doesn't exist
fn load_or_create_config(
    config_path: &str,
    log_level: Option<&CliLogLevel>,
) -> Result<Config> {
    let config = if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        let mut config: Config = serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?;

        if let Some(level) = log_level {
            config.log_level = level.clone().into();
        }

        config
    } else {
        warn!(
            "Config file not found at '{}', creating default config.",
            config_path
        );

        let mut config = Config::default();

        if let Some(level) = log_level {
            config.log_level = level.clone().into();
        }

        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    Ok(config)
}

/// Parse a JSON file of [start, end] pairs into removal intervals
fn load_filler_intervals(path: &Path) -> Result<Vec<RemovalInterval>> {
    let content = std::fs::read_to_string(path)
        .context(format!("Failed to read filler file: {:?}", path))?;

    let pairs: Vec<(f64, f64)> = serde_json::from_str(&content)
        .context(format!("Failed to parse filler file: {:?}", path))?;

    pairs
        .into_iter()
        .map(|(start, end)| {
            if end <= start {
                Err(anyhow!("Invalid filler span: ({}, {})", start, end))
            } else {
                Ok(RemovalInterval::new(start, end))
            }
        })
        .collect()
}
