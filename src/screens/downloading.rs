use super::{divider, Ui};
use crate::pipeline::{DownloadPipeline, DownloadResult, PipelineProgress, TrackState, TrackStatus};
use crate::render::format::{format_bytes, format_elapsed, truncate};
use crate::render::{progress_bar, range_indicator, visible_window, Palette};
use crate::spotify::Track;
use anyhow::Result;
use std::io;
use std::time::{Duration, Instant};

const MIN_VISIBLE_ROWS: usize = 8;
const PROGRESS_CHROME_ROWS: usize = 10;
const LABEL_WIDTH: usize = 36;
const BAR_WIDTH: usize = 12;

/// Rows of the progress list: `min(len, max(8, rows - 10))`.
pub fn download_capacity(len: usize, rows: usize) -> usize {
    len.min(MIN_VISIBLE_ROWS.max(rows.saturating_sub(PROGRESS_CHROME_ROWS)))
}

/// The track in flight, or the next one to start when none is.
pub fn active_index(statuses: &[TrackStatus]) -> usize {
    statuses
        .iter()
        .position(|status| {
            matches!(
                status.state(),
                TrackState::Searching | TrackState::Downloading | TrackState::Metadata
            )
        })
        .unwrap_or_else(|| {
            statuses
                .iter()
                .filter(|status| status.state().is_finished())
                .count()
        })
}

pub fn progress_frame(
    palette: &Palette,
    rows: usize,
    progress: &PipelineProgress<'_>,
    elapsed: Duration,
) -> String {
    let tracks = progress.tracks;
    let done = progress
        .statuses
        .iter()
        .filter(|status| status.state() == TrackState::Done)
        .count();
    let failed = progress.failed();

    let mut lines = vec![
        String::new(),
        format!(
            "  {}{}",
            palette.paint(palette.accent, "Downloading"),
            palette.paint(palette.dim, &format!(" {done}/{}", tracks.len()))
        ),
        divider(palette),
    ];

    let capacity = download_capacity(tracks.len(), rows);
    let window = visible_window(tracks.len(), active_index(progress.statuses), capacity);
    for index in window.clone() {
        let (Some(track), Some(status)) = (tracks.get(index), progress.statuses.get(index)) else {
            continue;
        };
        push_track_rows(&mut lines, palette, index, track, status);
    }

    if let Some(range) = range_indicator(&window, tracks.len()) {
        lines.push(String::new());
        lines.push(format!("  {}", palette.paint(palette.dim, &format!("... {range}"))));
    }

    lines.push(String::new());
    let mut footer = format!(
        "  {}",
        palette.paint(palette.dim, &format!("Elapsed: {}", format_elapsed(elapsed)))
    );
    if failed > 0 {
        footer.push_str(&palette.paint(palette.error, &format!("  |  {failed} failed")));
    }
    lines.push(footer);
    lines.join("\n")
}

fn push_track_rows(
    lines: &mut Vec<String>,
    palette: &Palette,
    index: usize,
    track: &Track,
    status: &TrackStatus,
) {
    let label = truncate(&format!("{} — {}", track.title, track.artist), LABEL_WIDTH);
    let number = palette.paint(palette.dim, &format!("{:>2}.", index + 1));
    match status.state() {
        TrackState::Queued => lines.push(format!(
            "  {} {number} {}",
            palette.paint(palette.dim, "·"),
            palette.paint(palette.dim, &label)
        )),
        TrackState::Searching => lines.push(format!(
            "  {} {number} {label}  {}",
            palette.paint(palette.accent, "~"),
            palette.paint(palette.accent, "finding match...")
        )),
        TrackState::Downloading => {
            lines.push(format!(
                "  {} {number} {label}",
                palette.paint(palette.warning, ">")
            ));
            lines.push(format!(
                "         {}  {}",
                progress_bar(status.percent(), BAR_WIDTH, palette),
                palette.paint(palette.dim, &status.message)
            ));
        }
        TrackState::Metadata => lines.push(format!(
            "  {} {number} {}  {}",
            palette.paint(palette.accent, ">"),
            palette.paint(palette.accent, &label),
            palette.paint(palette.accent, "tagging...")
        )),
        TrackState::Done => {
            let size = status
                .file_size
                .filter(|size| *size > 0)
                .map(|size| palette.paint(palette.dim, &format!(" {}", format_bytes(size))))
                .unwrap_or_default();
            lines.push(format!(
                "  {} {number} {}{size}",
                palette.paint(palette.success, "+"),
                palette.paint(palette.success, &label)
            ));
        }
        TrackState::Error => lines.push(format!(
            "  {} {number} {}  {}",
            palette.paint(palette.error, "x"),
            palette.paint(palette.error, &label),
            palette.paint(palette.dim, &status.message)
        )),
    }
}

/// Run the pipeline, redrawing the progress frame after every status change.
///
/// Keys pressed while downloading are dropped afterwards so they cannot
/// leak into the completion screen.
pub fn run_downloads(
    ui: &mut Ui<'_>,
    pipeline: &mut DownloadPipeline<'_>,
    tracks: &[Track],
) -> Result<Vec<DownloadResult>> {
    let palette = ui.palette;
    let rows = ui.screen.rows();
    let started = Instant::now();

    let queued = vec![TrackStatus::queued(); tracks.len()];
    let initial = PipelineProgress {
        tracks,
        statuses: &queued,
        active: 0,
    };
    ui.show(&progress_frame(&palette, rows, &initial, Duration::ZERO))?;

    let screen = &mut *ui.screen;
    let mut draw_error: Option<io::Error> = None;
    let results = pipeline.run(tracks, &mut |progress| {
        if draw_error.is_some() {
            return;
        }
        let frame = progress_frame(&palette, rows, &progress, started.elapsed());
        if let Err(err) = screen.draw(&frame) {
            draw_error = Some(err);
        }
    })?;
    if let Some(err) = draw_error {
        return Err(err.into());
    }
    ui.keys.discard_pending();
    Ok(results)
}
