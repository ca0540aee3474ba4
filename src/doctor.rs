//! `--doctor` diagnostics and the startup check for required system binaries.

use crate::config::{AppConfig, ConfigStore};
use crate::render::Palette;
use crate::telemetry::tracing_log_path;
use crate::{crash_log_path, log_file_path};
use crossterm::terminal::size as terminal_size;
use std::env;
use std::fmt::{self, Display};
use std::path::{Path, PathBuf};

pub struct DoctorReport {
    lines: Vec<String>,
}

impl DoctorReport {
    pub fn new(title: &str) -> Self {
        Self {
            lines: vec![title.to_string()],
        }
    }

    pub fn section(&mut self, title: &str) {
        self.lines.push(String::new());
        self.lines.push(format!("{title}:"));
    }

    pub fn push_kv(&mut self, key: &str, value: impl Display) {
        self.lines.push(format!("  {key}: {value}"));
    }

    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

pub fn base_doctor_report(config: &AppConfig) -> DoctorReport {
    let mut report = DoctorReport::new("ssdl doctor");
    report.push_kv("version", env!("CARGO_PKG_VERSION"));
    report.push_kv("os", format!("{}/{}", env::consts::OS, env::consts::ARCH));

    let mut validated = config.clone();
    let validation_result = validated.validate();
    let resolved = validation_result
        .as_ref()
        .map(|_| &validated)
        .unwrap_or(config);

    report.section("Terminal");
    match terminal_size() {
        Ok((cols, rows)) => report.push_kv("size", format!("{cols}x{rows}")),
        Err(err) => report.push_kv("size", format!("error: {err}")),
    }
    if let Ok(term) = env::var("TERM") {
        report.push_kv("term", term);
    }
    report.push_kv("color", if resolved.color_enabled() { "enabled" } else { "disabled" });
    report.push_kv("color_mode", detect_color_mode());
    report.push_kv("unicode", detect_unicode_support());

    report.section("Config");
    match validation_result {
        Ok(()) => report.push_kv("validation", "ok"),
        Err(err) => report.push_kv("validation", format!("error: {err}")),
    }
    match resolved.resolved_config_path() {
        Ok(path) => {
            let exists = path.exists();
            report.push_kv(
                "config_file",
                format!("{}{}", path.display(), if exists { "" } else { " (not created yet)" }),
            );
            if exists {
                match ConfigStore::new(path).try_load() {
                    Ok(user) => {
                        let download_dir = resolved
                            .output_dir
                            .clone()
                            .unwrap_or_else(|| user.download_dir.clone());
                        report.push_kv("download_dir", download_dir.display());
                        report.push_kv("audio_format", &user.audio_format);
                        report.push_kv("audio_quality", &user.audio_quality);
                        report.push_kv(
                            "credentials",
                            if user.has_credentials() { "set" } else { "missing" },
                        );
                    }
                    Err(err) => report.push_kv("config_error", err),
                }
            }
        }
        Err(err) => report.push_kv("config_file", format!("error: {err}")),
    }
    report.push_kv("logs", if resolved.logging_enabled() { "enabled" } else { "disabled" });
    report.push_kv("log_content", if resolved.log_content { "enabled" } else { "disabled" });
    report.push_kv("log_file", log_file_path().display());
    report.push_kv("trace_log", tracing_log_path().display());
    report.push_kv("crash_log", crash_log_path().display());

    report.section("Dependencies");
    for (name, command) in [("yt-dlp", &resolved.ytdlp_cmd), ("ffmpeg", &resolved.ffmpeg_cmd)] {
        match find_in_path(command) {
            Some(path) => report.push_kv(name, path.display()),
            None => report.push_kv(name, format!("missing ({command})")),
        }
    }

    report
}

/// A required binary that could not be found, with install hints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingDependency {
    pub name: &'static str,
    pub command: String,
    pub hints: &'static [(&'static str, &'static str)],
}

impl Display for MissingDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.command == self.name {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} ({})", self.name, self.command)
        }
    }
}

const YTDLP_HINTS: &[(&str, &str)] = &[
    ("Install", "pip install yt-dlp"),
    ("Or", "brew install yt-dlp"),
    ("Docs", "https://github.com/yt-dlp/yt-dlp#installation"),
];

const FFMPEG_HINTS: &[(&str, &str)] = &[
    ("Install", "sudo apt install ffmpeg"),
    ("Or", "brew install ffmpeg"),
    ("Docs", "https://ffmpeg.org/download.html"),
];

/// Resolve `program` the way a shell would: paths are checked directly, bare names via `PATH`.
pub fn find_in_path(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 || candidate.is_absolute() {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }
    let path_var = env::var_os("PATH")?;
    env::split_paths(&path_var)
        .flat_map(|dir| {
            let plain = dir.join(program);
            let suffixed = dir.join(format!("{program}{}", env::consts::EXE_SUFFIX));
            [plain, suffixed]
        })
        .find(|path| is_executable(path))
}

fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = path.metadata() else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}

pub fn check_dependencies(ytdlp_cmd: &str, ffmpeg_cmd: &str) -> Vec<MissingDependency> {
    let required = [
        ("yt-dlp", ytdlp_cmd, YTDLP_HINTS),
        ("ffmpeg", ffmpeg_cmd, FFMPEG_HINTS),
    ];
    required
        .into_iter()
        .filter(|(_, command, _)| find_in_path(command).is_none())
        .map(|(name, command, hints)| MissingDependency {
            name,
            command: command.to_string(),
            hints,
        })
        .collect()
}

/// Install instructions printed before exiting when dependencies are missing.
pub fn render_missing(missing: &[MissingDependency], palette: &Palette) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str(&palette.paint(palette.error, "  ✗ Missing required dependencies:"));
    out.push_str("\n\n");
    for dep in missing {
        out.push_str(&palette.paint(palette.warning, &format!("    • {dep}")));
        out.push('\n');
        for (label, hint) in dep.hints {
            let line = format!("      {:<8} {hint}", format!("{label}:"));
            out.push_str(&palette.paint(palette.dim, &line));
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

fn detect_color_mode() -> String {
    if env::var_os("NO_COLOR").is_some() {
        return "none (NO_COLOR)".to_string();
    }
    if let Ok(colorterm) = env::var("COLORTERM") {
        let value = colorterm.to_lowercase();
        if value == "truecolor" || value == "24bit" {
            return format!("truecolor (COLORTERM={colorterm})");
        }
    }
    if let Ok(term) = env::var("TERM") {
        let value = term.to_lowercase();
        if value == "dumb" {
            return "none (TERM=dumb)".to_string();
        }
        if value.contains("256color") {
            return format!("256 (TERM={term})");
        }
    }
    "ansi (default)".to_string()
}

fn detect_unicode_support() -> String {
    for key in ["LC_ALL", "LC_CTYPE", "LANG"] {
        if let Ok(value) = env::var(key) {
            let upper = value.to_ascii_uppercase();
            if upper.contains("UTF-8") || upper.contains("UTF8") {
                return format!("likely ({key}={value})");
            }
            return format!("unknown ({key}={value})");
        }
    }
    "unknown (locale env not set)".to_string()
}
