use super::{divider, hints, Ui};
use crate::input::LogicalKey;
use crate::modal::prompt_keys;
use crate::pipeline::{DownloadResult, RunSummary};
use crate::render::format::{format_bytes, format_elapsed, truncate};
use crate::render::Palette;
use anyhow::Result;
use std::path::Path;
use std::time::Duration;

const NAME_WIDTH: usize = 42;

/// Where the completion screen sends the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionAction {
    Back,
    Quit,
}

pub fn complete_frame(
    palette: &Palette,
    results: &[DownloadResult],
    output_dir: &Path,
    elapsed: Duration,
) -> String {
    let summary = RunSummary::from_results(results);
    let mut lines = vec![String::new()];
    let headline = if summary.failed == 0 {
        palette.paint(palette.success, "All downloads complete!")
    } else if summary.succeeded > 0 {
        let plural = if summary.failed == 1 { "" } else { "s" };
        palette.paint(
            palette.warning,
            &format!("Downloads finished with {} error{plural}", summary.failed),
        )
    } else {
        palette.paint(palette.error, "All downloads failed")
    };
    lines.push(format!("  {headline}"));
    lines.push(divider(palette));
    lines.push(String::new());

    if summary.succeeded > 0 {
        lines.push(format!(
            "  {}{}",
            palette.paint(palette.dim, "Saved to: "),
            palette.paint(palette.accent, &format!("{}/", output_dir.display()))
        ));
        lines.push(String::new());
        for (position, result) in results.iter().filter(|result| result.success).enumerate() {
            let number = palette.paint(palette.dim, &format!("{:>2}.", position + 1));
            let name = truncate(
                &format!("{} — {}", result.track.title, result.track.artist),
                NAME_WIDTH,
            );
            let mut row = format!("  {} {number} {name}", palette.paint(palette.success, "+"));
            if let Some(size) = result.file_size.filter(|size| *size > 0) {
                row.push_str(&format!("  {}", palette.paint(palette.dim, &format_bytes(size))));
            }
            if result.is_low_confidence() {
                row.push_str(&format!(
                    "  {}",
                    palette.paint(palette.warning, "(low-confidence match)")
                ));
            }
            lines.push(row);
        }
    }

    if summary.failed > 0 {
        lines.push(String::new());
        lines.push(format!("  {}", palette.paint(palette.error, "Failed:")));
        for result in results.iter().filter(|result| !result.success) {
            let name = truncate(
                &format!("{} — {}", result.track.title, result.track.artist),
                NAME_WIDTH,
            );
            lines.push(format!("  {}    {name}", palette.paint(palette.error, "x")));
            let reason = result.error.as_deref().unwrap_or("Unknown error");
            lines.push(format!("         {}", palette.paint(palette.dim, reason)));
        }
    }

    lines.push(String::new());
    lines.push(divider(palette));
    let mut parts = vec![format!("{}/{} downloaded", summary.succeeded, summary.total)];
    if summary.total_bytes > 0 {
        parts.push(format_bytes(summary.total_bytes));
    }
    parts.push(format_elapsed(elapsed));
    lines.push(format!("  {}", palette.paint(palette.accent, &parts.join("  |  "))));
    lines.push(String::new());
    lines.push(hints(palette, &[("Enter", "go back"), ("Q", "quit")]));
    lines.join("\n")
}

/// Enter goes back to the menu, q/Q quits.
pub fn show_complete(
    ui: &mut Ui<'_>,
    results: &[DownloadResult],
    output_dir: &Path,
    elapsed: Duration,
) -> Result<CompletionAction> {
    let frame = complete_frame(&ui.palette, results, output_dir, elapsed);
    prompt_keys(
        ui.keys,
        ui.screen,
        &frame,
        &[
            (LogicalKey::Return, CompletionAction::Back),
            (LogicalKey::Letter('q'), CompletionAction::Quit),
            (LogicalKey::Letter('Q'), CompletionAction::Quit),
        ],
    )
}
