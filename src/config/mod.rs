//! Command-line parsing, validation, and the persisted JSON settings document.

mod defaults;
mod store;
mod validation;

use clap::Parser;
use std::path::PathBuf;

pub use defaults::{
    default_config_path, default_download_dir, CONFIG_DIR_NAME, CONFIG_FILE_NAME,
    DEFAULT_AUDIO_FORMAT, DEFAULT_AUDIO_QUALITY, SUPPORTED_AUDIO_FORMATS,
};
pub use store::{ConfigError, ConfigStore, UserConfig};

const AFTER_HELP: &str = "\
Supported URLs:
  https://open.spotify.com/track/...
  https://open.spotify.com/album/...
  https://open.spotify.com/playlist/...
  spotify:track:<id>

First run:
  You'll be prompted for your Spotify API credentials.
  Get them at: https://developer.spotify.com/dashboard";

/// CLI options for ssdl. Validated values keep the downloader subprocess safe.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "ssdl",
    about = "ssdl - Spotify Song Downloader",
    author,
    version,
    after_help = AFTER_HELP
)]
pub struct AppConfig {
    /// Spotify track/album/playlist URL to download directly (skips the menu)
    #[arg(value_name = "SPOTIFY_URL")]
    pub url: Option<String>,

    /// Settings file location
    #[arg(long = "config", env = "SSDL_CONFIG", value_name = "PATH")]
    pub config_path: Option<PathBuf>,

    /// Download directory for this run (overrides the saved setting)
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Path to the yt-dlp binary
    #[arg(long = "ytdlp-cmd", env = "SSDL_YTDLP_CMD", default_value = "yt-dlp")]
    pub ytdlp_cmd: String,

    /// Path to the ffmpeg binary (required by yt-dlp for transcoding)
    #[arg(long = "ffmpeg-cmd", env = "SSDL_FFMPEG_CMD", default_value = "ffmpeg")]
    pub ffmpeg_cmd: String,

    /// Disable ANSI colors (NO_COLOR is honoured as well)
    #[arg(long = "no-color", default_value_t = false)]
    pub no_color: bool,

    /// Print environment diagnostics and exit
    #[arg(long = "doctor", default_value_t = false)]
    pub doctor: bool,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "SSDL_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "SSDL_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Allow logging queries and track titles (debug log only)
    #[arg(long = "log-content", env = "SSDL_LOG_CONTENT", default_value_t = false)]
    pub log_content: bool,
}

impl AppConfig {
    pub fn logging_enabled(&self) -> bool {
        self.logs && !self.no_logs
    }

    /// Settings file path, honouring `--config` / `SSDL_CONFIG`.
    pub fn resolved_config_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.config_path {
            Some(path) => Ok(path.clone()),
            None => default_config_path(),
        }
    }

    pub fn color_enabled(&self) -> bool {
        !self.no_color && std::env::var_os("NO_COLOR").is_none()
    }
}
