use super::{hints, Ui};
use crate::modal::{menu_select, MenuState};
use crate::render::{rule, Palette};
use anyhow::Result;

const BANNER: [&str; 6] = [
    "  ███████╗███████╗██████╗ ██╗     ",
    "  ██╔════╝██╔════╝██╔══██╗██║     ",
    "  ███████╗███████╗██║  ██║██║     ",
    "  ╚════██║╚════██║██║  ██║██║     ",
    "  ███████║███████║██████╔╝███████╗",
    "  ╚══════╝╚══════╝╚═════╝ ╚══════╝",
];

/// What the operator picked on the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainAction {
    Url,
    Search,
    Settings,
    Exit,
}

pub const MENU_ITEMS: [(&str, MainAction); 4] = [
    ("Paste a Spotify URL (track/playlist/album)", MainAction::Url),
    ("Search for a song", MainAction::Search),
    ("Settings", MainAction::Settings),
    ("Exit", MainAction::Exit),
];

pub fn welcome_frame(palette: &Palette, menu: &MenuState) -> String {
    let mut lines = vec![String::new()];
    lines.extend(BANNER.iter().map(|line| palette.paint(palette.brand, line)));
    lines.push(format!(
        "  {}{}",
        palette.paint(palette.dim, "Spotify Song Downloader"),
        palette.paint(palette.dim, &format!("{:>12}", format!("v{}", env!("CARGO_PKG_VERSION")))),
    ));
    lines.push(format!("  {}", rule(36, palette)));
    lines.push(String::new());
    for (index, (label, _)) in MENU_ITEMS.iter().enumerate() {
        if index == menu.cursor() {
            lines.push(format!(
                "  {} {}",
                palette.paint(palette.accent, ">"),
                palette.paint(palette.bold, label)
            ));
        } else {
            lines.push(format!("    {}", palette.paint(palette.dim, label)));
        }
    }
    lines.push(String::new());
    lines.push(hints(
        palette,
        &[("↑/↓", "navigate"), ("Enter", "select"), ("Ctrl+C", "quit")],
    ));
    lines.join("\n")
}

/// Main menu. Esc counts as Exit.
pub fn show_welcome(ui: &mut Ui<'_>) -> Result<MainAction> {
    let palette = ui.palette;
    let picked = menu_select(ui.keys, ui.screen, MENU_ITEMS.len(), |menu| {
        welcome_frame(&palette, menu)
    })?;
    Ok(picked
        .and_then(|index| MENU_ITEMS.get(index))
        .map(|(_, action)| *action)
        .unwrap_or(MainAction::Exit))
}
