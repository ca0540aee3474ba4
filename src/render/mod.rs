//! Screen Renderer: stateless full-frame drawing plus the shared list windowing rule.

pub mod format;
mod screen;
mod style;
mod widgets;
mod window;

pub use screen::{MemoryScreen, Screen, TerminalScreen, FALLBACK_SIZE};
pub use style::{strip_styles, Palette, ANSI_PALETTE, PLAIN_PALETTE};
pub use widgets::{field, key_hints, progress_bar, rule};
pub use window::{range_indicator, visible_window};
