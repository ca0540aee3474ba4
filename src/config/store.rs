use super::defaults::{
    default_download_dir, DEFAULT_AUDIO_FORMAT, DEFAULT_AUDIO_QUALITY, SUPPORTED_AUDIO_FORMATS,
};
use crate::log_debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Persisted settings; missing keys fall back to defaults and unknown keys survive a save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserConfig {
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub download_dir: PathBuf,
    pub audio_quality: String,
    pub audio_format: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            spotify_client_id: String::new(),
            spotify_client_secret: String::new(),
            download_dir: default_download_dir(),
            audio_quality: DEFAULT_AUDIO_QUALITY.to_string(),
            audio_format: DEFAULT_AUDIO_FORMAT.to_string(),
            extra: Map::new(),
        }
    }
}

impl UserConfig {
    pub fn has_credentials(&self) -> bool {
        !self.spotify_client_id.is_empty() && !self.spotify_client_secret.is_empty()
    }

    pub fn clear_credentials(&mut self) {
        self.spotify_client_id.clear();
        self.spotify_client_secret.clear();
    }
}

/// The format ends up in the output file name and the downloader's `--audio-format`.
fn checked_audio_format(raw: &str) -> String {
    let format = raw.trim().to_ascii_lowercase();
    if SUPPORTED_AUDIO_FORMATS.contains(&format.as_str()) {
        return format;
    }
    log_debug(&format!(
        "unsupported audioFormat {raw:?}, using {DEFAULT_AUDIO_FORMAT}"
    ));
    DEFAULT_AUDIO_FORMAT.to_string()
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the home directory")]
    NoHomeDir,
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Whole-document JSON store at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings, writing defaults on first run. Never fails: a broken file yields defaults.
    pub fn load(&self) -> UserConfig {
        match self.try_load() {
            Ok(config) => config,
            Err(err) => {
                log_debug(&format!("config load failed, using defaults: {err}"));
                UserConfig::default()
            }
        }
    }

    pub fn try_load(&self) -> Result<UserConfig, ConfigError> {
        if !self.path.exists() {
            let defaults = UserConfig::default();
            self.save(&defaults)?;
            return Ok(defaults);
        }
        let raw = fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;
        let mut config: UserConfig =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: self.path.clone(),
                source,
            })?;
        config.audio_format = checked_audio_format(&config.audio_format);
        Ok(config)
    }

    pub fn save(&self, config: &UserConfig) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let body = serde_json::to_string_pretty(config).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, body).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
