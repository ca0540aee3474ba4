use super::ConfigError;
use std::path::PathBuf;

pub const CONFIG_DIR_NAME: &str = ".ssdl";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const DEFAULT_AUDIO_QUALITY: &str = "best";
pub const DEFAULT_AUDIO_FORMAT: &str = "mp3";
pub const SUPPORTED_AUDIO_FORMATS: &[&str] = &["mp3", "m4a", "opus", "flac", "wav", "aac"];

// Binary names are passed straight to Command::new; anything shell-flavoured is rejected.
pub(super) const FORBIDDEN_BINARY_CHARS: &[char] =
    &[';', '|', '&', '$', '`', '<', '>', '\\', '\'', '"', '\n', '\r'];

pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
        .ok_or(ConfigError::NoHomeDir)
}

pub fn default_download_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Music")
        .join("ssdl")
}
