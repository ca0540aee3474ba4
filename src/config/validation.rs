use super::defaults::FORBIDDEN_BINARY_CHARS;
use super::AppConfig;
use anyhow::{anyhow, bail, Context, Result};
use std::{fs, path::Path};

impl AppConfig {
    /// Check CLI values and normalize binary paths.
    pub fn validate(&mut self) -> Result<()> {
        self.ytdlp_cmd = sanitize_binary(&self.ytdlp_cmd, "--ytdlp-cmd", &["yt-dlp"])?;
        self.ffmpeg_cmd = sanitize_binary(&self.ffmpeg_cmd, "--ffmpeg-cmd", &["ffmpeg"])?;

        if let Some(dir) = &self.output_dir {
            if dir.as_os_str().is_empty() {
                bail!("--output-dir cannot be empty");
            }
        }

        if let Some(url) = &self.url {
            if url.trim().is_empty() {
                bail!("SPOTIFY_URL cannot be blank");
            }
        }

        Ok(())
    }
}

/// Allow either a known binary name or an existing executable path.
pub(super) fn sanitize_binary(value: &str, flag: &str, allowlist: &[&str]) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("{flag} cannot be empty");
    }
    if trimmed.chars().any(|ch| FORBIDDEN_BINARY_CHARS.contains(&ch)) {
        bail!("{flag} must not contain shell metacharacters");
    }
    if let Some(allowed) = allowlist
        .iter()
        .find(|candidate| candidate.eq_ignore_ascii_case(trimmed))
    {
        return Ok((*allowed).to_string());
    }

    let path = Path::new(trimmed);
    if path.is_absolute() || trimmed.contains(std::path::MAIN_SEPARATOR) {
        let canonical = path
            .canonicalize()
            .with_context(|| format!("failed to canonicalize {flag} '{trimmed}'"))?;
        let metadata = fs::metadata(&canonical)
            .with_context(|| format!("failed to inspect {flag} '{}'", canonical.display()))?;
        if !metadata.is_file() {
            bail!("{flag} '{}' is not a file", canonical.display());
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = metadata.permissions().mode();
            if mode & 0o111 == 0 {
                bail!(
                    "{flag} '{}' exists but is not executable (mode {:o})",
                    canonical.display(),
                    mode
                );
            }
        }
        return canonical
            .to_str()
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow!("{flag} must be valid UTF-8"));
    }

    bail!("{flag} must be one of {allowlist:?} or an existing binary path");
}
