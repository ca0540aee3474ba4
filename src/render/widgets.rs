use super::style::Palette;

const BAR_FILLED: char = '█';
const BAR_EMPTY: char = '░';
const RULE: char = '─';

/// `██████░░░░  60%`
pub fn progress_bar(percent: f64, width: usize, palette: &Palette) -> String {
    let clamped = percent.clamp(0.0, 100.0);
    let filled = ((clamped / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    let bar: String = std::iter::repeat(BAR_FILLED)
        .take(filled)
        .chain(std::iter::repeat(BAR_EMPTY).take(width - filled))
        .collect();
    format!(
        "{}{bar}{} {:>3}%",
        palette.accent,
        palette.reset,
        clamped.floor() as u32
    )
}

pub fn rule(width: usize, palette: &Palette) -> String {
    let line: String = std::iter::repeat(RULE).take(width).collect();
    palette.paint(palette.dim, &line)
}

/// Footer line of key hints: `↑/↓ move · Enter select · Esc back`.
pub fn key_hints(hints: &[(&str, &str)], palette: &Palette) -> String {
    let joined = hints
        .iter()
        .map(|(key, action)| format!("{key} {action}"))
        .collect::<Vec<_>>()
        .join(" · ");
    palette.paint(palette.dim, &joined)
}

/// Two-column `label  value` row.
pub fn field(label: &str, value: &str, palette: &Palette) -> String {
    format!("  {}{label:<10}{} {value}", palette.dim, palette.reset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::style::PLAIN_PALETTE;

    #[test]
    fn progress_bar_fills_proportionally() {
        let bar = progress_bar(50.0, 10, &PLAIN_PALETTE);
        assert_eq!(bar, "█████░░░░░  50%");
    }

    #[test]
    fn progress_bar_clamps_out_of_range_values() {
        assert_eq!(progress_bar(250.0, 4, &PLAIN_PALETTE), "████ 100%");
        assert_eq!(progress_bar(-3.0, 4, &PLAIN_PALETTE), "░░░░   0%");
    }

    #[test]
    fn hints_are_joined() {
        let hints = key_hints(&[("Enter", "select"), ("Esc", "back")], &PLAIN_PALETTE);
        assert_eq!(hints, "Enter select · Esc back");
    }
}
