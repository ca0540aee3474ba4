use super::{heading, hints, Ui};
use crate::modal::text_input;
use crate::render::Palette;
use anyhow::Result;

const DASHBOARD_URL: &str = "https://developer.spotify.com/dashboard";
const ID_PREVIEW_CHARS: usize = 8;

/// Spotify app credentials entered on first run, already trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

fn prompt_line(palette: &Palette, text: &str) -> String {
    format!("  > {text}{}", palette.paint(palette.dim, "█"))
}

pub fn client_id_frame(palette: &Palette, text: &str) -> String {
    [
        String::new(),
        heading(palette, "Welcome to ssdl! Spotify Setup"),
        String::new(),
        "  To get started, you need Spotify API credentials.".to_string(),
        String::new(),
        format!(
            "  {}{}",
            palette.paint(palette.dim, "1. Go to "),
            palette.paint(palette.accent, DASHBOARD_URL)
        ),
        format!("  {}", palette.paint(palette.dim, "2. Create a new app")),
        format!(
            "  {}",
            palette.paint(palette.dim, "3. Copy your Client ID and Client Secret")
        ),
        String::new(),
        "  Enter your Client ID:".to_string(),
        prompt_line(palette, text),
        String::new(),
        hints(palette, &[("Enter", "next"), ("Esc", "cancel")]),
    ]
    .join("\n")
}

pub fn client_secret_frame(palette: &Palette, client_id: &str, text: &str) -> String {
    let preview: String = client_id.chars().take(ID_PREVIEW_CHARS).collect();
    [
        String::new(),
        heading(palette, "Spotify Setup"),
        String::new(),
        format!(
            "  {}",
            palette.paint(palette.success, &format!("✓  Client ID: {preview}..."))
        ),
        String::new(),
        "  Enter your Client Secret:".to_string(),
        prompt_line(palette, text),
        String::new(),
        hints(palette, &[("Enter", "save"), ("Esc", "cancel")]),
    ]
    .join("\n")
}

/// Ask for Client ID then Client Secret. `None` if either is cancelled or left blank.
pub fn prompt_credentials(ui: &mut Ui<'_>) -> Result<Option<Credentials>> {
    let palette = ui.palette;
    let client_id = text_input(ui.keys, ui.screen, "", |text| client_id_frame(&palette, text))?
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());
    let Some(client_id) = client_id else {
        return Ok(None);
    };

    let client_secret = text_input(ui.keys, ui.screen, "", |text| {
        client_secret_frame(&palette, &client_id, text)
    })?
    .map(|secret| secret.trim().to_string())
    .filter(|secret| !secret.is_empty());
    Ok(client_secret.map(|client_secret| Credentials {
        client_id,
        client_secret,
    }))
}
