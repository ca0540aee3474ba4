use super::{divider, heading, hints, Ui};
use crate::modal::{checkbox_select, CheckboxState};
use crate::render::format::{format_duration, pad_to};
use crate::render::{range_indicator, visible_window, Palette};
use crate::spotify::{total_duration_ms, Album, Playlist, Track};
use anyhow::Result;

const MAX_VISIBLE_ROWS: usize = 15;
const LIST_CHROME_ROWS: usize = 12;
const TITLE_WIDTH: usize = 28;
const ARTIST_WIDTH: usize = 18;

/// A multi-track resource offered for selection.
#[derive(Debug, Clone, Copy)]
pub enum TrackCollection<'a> {
    Playlist(&'a Playlist),
    Album(&'a Album),
}

impl<'a> TrackCollection<'a> {
    pub fn tracks(&self) -> &'a [Track] {
        match self {
            TrackCollection::Playlist(playlist) => &playlist.tracks,
            TrackCollection::Album(album) => &album.tracks,
        }
    }

    fn header(&self, palette: &Palette) -> Vec<String> {
        let count = self.tracks().len();
        match self {
            TrackCollection::Playlist(playlist) => vec![
                heading(palette, &format!("Playlist: {}", playlist.name)),
                format!(
                    "  {}",
                    palette.paint(
                        palette.dim,
                        &format!(
                            "by {}  |  {count} tracks  |  {} total",
                            playlist.owner,
                            format_duration(total_duration_ms(&playlist.tracks))
                        )
                    )
                ),
            ],
            TrackCollection::Album(album) => {
                let mut meta = format!("by {}  |  {count} tracks", album.artist);
                if let Some(year) = album.year() {
                    meta.push_str(&format!("  |  {year}"));
                }
                vec![
                    heading(palette, &format!("Album: {}", album.name)),
                    format!("  {}", palette.paint(palette.dim, &meta)),
                ]
            }
        }
    }
}

/// Rows available to the checkbox table: at most 15, fewer on short terminals.
pub fn list_capacity(rows: usize) -> usize {
    MAX_VISIBLE_ROWS.min(rows.saturating_sub(LIST_CHROME_ROWS)).max(1)
}

pub fn track_list_frame(
    palette: &Palette,
    rows: usize,
    collection: &TrackCollection<'_>,
    state: &CheckboxState,
) -> String {
    let tracks = collection.tracks();
    let mut lines = vec![String::new()];
    lines.extend(collection.header(palette));
    lines.push(divider(palette));
    lines.push(String::new());
    lines.push(format!(
        "  {}",
        palette.paint(
            palette.dim,
            &format!(
                "      #  {}  {}  Time",
                pad_to("Title", TITLE_WIDTH),
                pad_to("Artist", ARTIST_WIDTH)
            )
        )
    ));

    let window = visible_window(tracks.len(), state.cursor(), list_capacity(rows));
    for index in window.clone() {
        let track = &tracks[index];
        let pointer = if index == state.cursor() {
            palette.paint(palette.accent, ">")
        } else {
            " ".to_string()
        };
        let mark = if state.is_checked(index) {
            palette.paint(palette.success, "x")
        } else {
            palette.paint(palette.dim, "-")
        };
        let number = palette.paint(palette.dim, &format!("{:>2}", index + 1));
        let title = pad_to(&track.title, TITLE_WIDTH);
        let title = if index == state.cursor() {
            palette.paint(palette.bold, &title)
        } else {
            title
        };
        lines.push(format!(
            "  {pointer} {mark}  {number}  {title}  {}  {}",
            pad_to(&track.artist, ARTIST_WIDTH),
            format_duration(track.duration_ms)
        ));
    }

    lines.push(String::new());
    let mut status = format!(
        "  {}/{} selected",
        palette.paint(palette.accent, &state.checked().len().to_string()),
        tracks.len()
    );
    if let Some(range) = range_indicator(&window, tracks.len()) {
        status.push_str(&palette.paint(palette.dim, &format!("  |  {range}")));
    }
    lines.push(status);
    lines.push(hints(
        palette,
        &[
            ("↑/↓", "navigate"),
            ("Space", "toggle"),
            ("A", "select all"),
            ("Enter", "download"),
            ("Esc", "back"),
        ],
    ));
    lines.join("\n")
}

/// Tracks the operator kept checked, in list order. `None` when cancelled.
pub fn show_track_list(
    ui: &mut Ui<'_>,
    collection: TrackCollection<'_>,
) -> Result<Option<Vec<Track>>> {
    let palette = ui.palette;
    let rows = ui.screen.rows();
    let tracks = collection.tracks();
    let checked = checkbox_select(ui.keys, ui.screen, tracks.len(), |state| {
        track_list_frame(&palette, rows, &collection, state)
    })?;
    Ok(checked.map(|set| set.into_iter().filter_map(|index| tracks.get(index).cloned()).collect()))
}
