use super::{error_frame, heading, hints, Ui};
use crate::modal::text_input;
use crate::render::Palette;
use crate::spotify::{parse_spotify_url, ResourceKind};
use anyhow::Result;

/// Live feedback for the URL being typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlValidation {
    Empty,
    Valid(ResourceKind),
    Invalid,
}

pub fn validate_url_text(text: &str) -> UrlValidation {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return UrlValidation::Empty;
    }
    match parse_spotify_url(trimmed) {
        Some(link) => UrlValidation::Valid(link.kind),
        None => UrlValidation::Invalid,
    }
}

const SUPPORTED_LINKS: [&str; 3] = [
    "open.spotify.com/track/...",
    "open.spotify.com/album/...",
    "open.spotify.com/playlist/...",
];

pub fn url_input_frame(palette: &Palette, text: &str) -> String {
    let cursor = palette.paint(palette.dim, "|");
    let mut lines = vec![String::new(), heading(palette, "Paste a Spotify URL"), String::new()];
    match validate_url_text(text) {
        UrlValidation::Empty => {
            lines.push(format!("  {}{cursor}", palette.paint(palette.dim, "> ")));
            lines.push(String::new());
            lines.push(format!("  {}", palette.paint(palette.dim, "Supported:")));
            for link in SUPPORTED_LINKS {
                lines.push(format!("    {}", palette.paint(palette.dim, link)));
            }
        }
        UrlValidation::Valid(kind) => {
            lines.push(format!("  {}{text}{cursor}", palette.paint(palette.success, "> ")));
            lines.push(String::new());
            let label = capitalize(kind.as_str());
            lines.push(format!(
                "  {}",
                palette.paint(palette.success, &format!("✓ Valid {label} URL detected"))
            ));
        }
        UrlValidation::Invalid => {
            lines.push(format!("  {}{text}{cursor}", palette.paint(palette.error, "> ")));
            lines.push(String::new());
            lines.push(format!(
                "  {}",
                palette.paint(palette.error, "✗ Not a valid Spotify URL")
            ));
        }
    }
    lines.push(String::new());
    lines.push(hints(palette, &[("Enter", "continue"), ("Esc", "back")]));
    lines.join("\n")
}

/// Shown when a pasted or command-line link cannot be parsed.
pub fn invalid_url_frame(palette: &Palette) -> String {
    let mut details = vec!["Supported formats:".to_string()];
    details.extend(SUPPORTED_LINKS.iter().map(|link| format!("  {link}")));
    let details: Vec<&str> = details.iter().map(String::as_str).collect();
    error_frame(palette, "Invalid Spotify URL", &details)
}

/// Trimmed URL, or `None` when cancelled or left blank.
pub fn show_url_input(ui: &mut Ui<'_>) -> Result<Option<String>> {
    let palette = ui.palette;
    let entered = text_input(ui.keys, ui.screen, "", |text| url_input_frame(&palette, text))?;
    Ok(entered
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty()))
}

pub(crate) fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
