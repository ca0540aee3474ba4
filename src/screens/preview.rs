use super::{divider, heading, hints, Ui};
use crate::input::LogicalKey;
use crate::modal::prompt_keys;
use crate::render::format::format_duration;
use crate::render::Palette;
use crate::spotify::Track;
use anyhow::Result;

pub fn preview_frame(palette: &Palette, track: &Track) -> String {
    let mut album = palette.paint(palette.dim, &track.album);
    if let Some(year) = track.year() {
        album.push_str(&palette.paint(palette.dim, &format!("  ({year})")));
    }
    [
        String::new(),
        heading(palette, "Track found"),
        divider(palette),
        String::new(),
        format!("  {}", palette.paint(palette.bold, &track.title)),
        format!("  {}", palette.paint(palette.accent, &track.artist)),
        format!("  {album}"),
        format!("  {}", palette.paint(palette.dim, &format_duration(track.duration_ms))),
        String::new(),
        divider(palette),
        String::new(),
        hints(palette, &[("Enter", "download"), ("Esc", "back")]),
    ]
    .join("\n")
}

/// `true` when the operator confirms the download.
pub fn show_preview(ui: &mut Ui<'_>, track: &Track) -> Result<bool> {
    let frame = preview_frame(&ui.palette, track);
    prompt_keys(
        ui.keys,
        ui.screen,
        &frame,
        &[(LogicalKey::Return, true), (LogicalKey::Escape, false)],
    )
}
