use super::{divider, error_frame, heading, hints, status_frame, Ui};
use crate::log_debug_content;
use crate::modal::{menu_select, text_input, MenuState};
use crate::render::format::{format_duration, pad_to};
use crate::render::{visible_window, Palette};
use crate::spotify::{MusicCatalog, Track, SEARCH_LIMIT};
use anyhow::Result;

const TITLE_WIDTH: usize = 30;
const ARTIST_WIDTH: usize = 20;
// Heading, blank lines, detail panel and hints.
const RESULTS_CHROME_ROWS: usize = 10;

pub fn search_query_frame(palette: &Palette, text: &str) -> String {
    let prompt = if text.trim().is_empty() {
        "Type a song name, artist, or both".to_string()
    } else {
        format!("Press Enter to search for \"{text}\"")
    };
    [
        String::new(),
        heading(palette, "Search Spotify"),
        String::new(),
        format!("  > {text}{}", palette.paint(palette.dim, "|")),
        String::new(),
        format!("  {}", palette.paint(palette.dim, &prompt)),
        String::new(),
        hints(palette, &[("Enter", "search"), ("Esc", "back")]),
    ]
    .join("\n")
}

/// Results menu with a detail panel for the highlighted track.
pub fn results_frame(
    palette: &Palette,
    rows: usize,
    query: &str,
    results: &[Track],
    menu: &MenuState,
) -> String {
    let mut lines = vec![
        String::new(),
        format!(
            "{}{}",
            heading(palette, &format!("Results for \"{query}\"")),
            palette.paint(palette.dim, &format!("  ({} found)", results.len()))
        ),
        String::new(),
    ];
    let capacity = rows.saturating_sub(RESULTS_CHROME_ROWS).max(1);
    let window = visible_window(results.len(), menu.cursor(), capacity);
    for index in window {
        let track = &results[index];
        let number = palette.paint(palette.dim, &format!("{:>2}.", index + 1));
        let title = pad_to(&track.title, TITLE_WIDTH);
        let artist = pad_to(&track.artist, ARTIST_WIDTH);
        let duration = palette.paint(palette.dim, &format_duration(track.duration_ms));
        if index == menu.cursor() {
            lines.push(format!(
                "  {} {number} {}  {}  {duration}",
                palette.paint(palette.accent, ">"),
                palette.paint(palette.bold, &title),
                palette.paint(palette.accent, &artist),
            ));
        } else {
            lines.push(format!(
                "    {number} {title}  {}  {duration}",
                palette.paint(palette.dim, &artist)
            ));
        }
    }

    if let Some(selected) = results.get(menu.cursor()) {
        lines.push(String::new());
        lines.push(divider(palette));
        lines.push(format!("  {}", palette.paint(palette.bold, &selected.title)));
        lines.push(format!(
            "  {}  {}  {}",
            palette.paint(palette.accent, &selected.artist),
            palette.paint(palette.dim, "on"),
            palette.paint(palette.dim, &selected.album)
        ));
        lines.push(format!(
            "  {}",
            palette.paint(palette.dim, &format_duration(selected.duration_ms))
        ));
    }
    lines.push(String::new());
    lines.push(hints(
        palette,
        &[("↑/↓", "navigate"), ("Enter", "download"), ("Esc", "back")],
    ));
    lines.join("\n")
}

/// Query, search, pick. `None` when the operator backs out or nothing was found.
pub fn show_search(ui: &mut Ui<'_>, catalog: &mut dyn MusicCatalog) -> Result<Option<Track>> {
    let palette = ui.palette;
    let Some(query) = text_input(ui.keys, ui.screen, "", |text| search_query_frame(&palette, text))?
    else {
        return Ok(None);
    };
    let query = query.trim().to_string();
    if query.is_empty() {
        return Ok(None);
    }

    ui.show(&status_frame(&palette, "Searching Spotify..."))?;
    log_debug_content(&format!("search query: {query}"));
    let results = match catalog.search_tracks(&query, SEARCH_LIMIT) {
        Ok(results) => results,
        Err(err) => {
            ui.acknowledge(&error_frame(&palette, &format!("Search failed: {err}"), &[]))?;
            return Ok(None);
        }
    };
    if results.is_empty() {
        let headline = format!("No results for \"{query}\"");
        ui.acknowledge(&error_frame(&palette, &headline, &["Try a different search term"]))?;
        return Ok(None);
    }

    let rows = ui.screen.rows();
    let picked = menu_select(ui.keys, ui.screen, results.len(), |menu| {
        results_frame(&palette, rows, &query, &results, menu)
    })?;
    Ok(picked.and_then(|index| results.get(index).cloned()))
}
