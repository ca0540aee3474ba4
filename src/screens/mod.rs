//! Every screen of the app: pure frame builders plus the functions that pair
//! them with a modal primitive.

mod complete;
mod downloading;
mod preview;
mod search;
mod settings;
mod setup;
mod track_list;
mod url_input;
mod welcome;

pub use complete::{complete_frame, show_complete, CompletionAction};
pub use downloading::{active_index, download_capacity, progress_frame, run_downloads};
pub use preview::{preview_frame, show_preview};
pub use search::{results_frame, search_query_frame, show_search};
pub use settings::{show_settings, SettingsItem};
pub use setup::{client_id_frame, client_secret_frame, prompt_credentials, Credentials};
pub use track_list::{list_capacity, show_track_list, track_list_frame, TrackCollection};
pub use url_input::{
    invalid_url_frame, show_url_input, url_input_frame, validate_url_text, UrlValidation,
};
pub use welcome::{show_welcome, welcome_frame, MainAction, MENU_ITEMS};

use crate::input::KeyDispatcher;
use crate::modal;
use crate::render::{rule, Palette, Screen};
use anyhow::Result;
use std::thread;
use std::time::Duration;

pub(crate) const RULE_WIDTH: usize = 53;
const NOTICE_DELAY: Duration = Duration::from_millis(1000);

/// Keyboard, screen and palette shared by every screen.
pub struct Ui<'a> {
    pub keys: &'a mut KeyDispatcher,
    pub screen: &'a mut dyn Screen,
    pub palette: Palette,
    /// How long a transient confirmation frame stays up.
    pub notice_delay: Duration,
}

impl<'a> Ui<'a> {
    pub fn new(keys: &'a mut KeyDispatcher, screen: &'a mut dyn Screen, palette: Palette) -> Self {
        Self {
            keys,
            screen,
            palette,
            notice_delay: NOTICE_DELAY,
        }
    }

    pub fn with_notice_delay(mut self, delay: Duration) -> Self {
        self.notice_delay = delay;
        self
    }

    pub fn show(&mut self, frame: &str) -> Result<()> {
        self.screen.draw(frame)?;
        Ok(())
    }

    /// Draw a confirmation frame and leave it up briefly. No key is needed.
    pub fn notice(&mut self, frame: &str) -> Result<()> {
        self.show(frame)?;
        if !self.notice_delay.is_zero() {
            thread::sleep(self.notice_delay);
        }
        Ok(())
    }

    /// Draw a message frame and wait for Enter or Esc.
    pub fn acknowledge(&mut self, frame: &str) -> Result<()> {
        modal::acknowledge(self.keys, self.screen, frame)
    }
}

/// One-line "working on it" frame, e.g. `Authenticating with Spotify...`.
pub fn status_frame(palette: &Palette, text: &str) -> String {
    format!("\n  {}", palette.paint(palette.accent, text))
}

/// Green check-mark confirmation.
pub fn success_frame(palette: &Palette, text: &str) -> String {
    format!("\n  {}", palette.paint(palette.success, &format!("✓  {text}")))
}

/// Red headline, dimmed detail lines, then the dismiss hint.
pub fn error_frame(palette: &Palette, headline: &str, details: &[&str]) -> String {
    let mut lines = vec![String::new(), format!("  {}", palette.paint(palette.error, headline))];
    lines.push(String::new());
    for detail in details {
        lines.push(format!("  {}", palette.paint(palette.dim, detail)));
    }
    if !details.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!("  {}", palette.paint(palette.dim, "Press Enter to go back")));
    lines.join("\n")
}

/// Left on screen when the stored credentials are rejected; the process exits next.
pub fn auth_failed_frame(palette: &Palette, error: &str) -> String {
    [
        String::new(),
        format!(
            "  {}",
            palette.paint(palette.error, &format!("✗ Authentication failed: {error}"))
        ),
        String::new(),
        format!("  {}", palette.paint(palette.dim, "Check your Client ID and Secret.")),
        format!(
            "  {}",
            palette.paint(palette.dim, "Run ssdl again to re-enter credentials.")
        ),
        String::new(),
    ]
    .join("\n")
}

pub(crate) fn heading(palette: &Palette, text: &str) -> String {
    format!("  {}", palette.paint(palette.accent, text))
}

pub(crate) fn divider(palette: &Palette) -> String {
    format!("  {}", rule(RULE_WIDTH, palette))
}

pub(crate) fn hints(palette: &Palette, pairs: &[(&str, &str)]) -> String {
    format!("  {}", crate::render::key_hints(pairs, palette))
}

#[cfg(test)]
mod tests;
