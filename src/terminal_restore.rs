//! Scoped ownership of the terminal's raw-mode state.
//!
//! The guard flips the terminal into key-by-key delivery and hides the cursor;
//! dropping it (or the panic hook, or the interrupt path) puts everything back.

use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, Clear, ClearType},
};
use std::{
    io::{self, Write},
    panic,
    sync::{
        atomic::{AtomicBool, Ordering},
        OnceLock,
    },
};

static RAW_MODE_ENABLED: AtomicBool = AtomicBool::new(false);
static CURSOR_HIDDEN: AtomicBool = AtomicBool::new(false);
static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

/// RAII guard that restores the terminal on drop (and on panic via a shared hook).
pub struct TerminalRestoreGuard;

impl TerminalRestoreGuard {
    pub fn new() -> Self {
        install_terminal_panic_hook();
        TerminalRestoreGuard
    }

    /// Acquire the terminal for interactive use: raw key delivery and a hidden cursor.
    pub fn acquire() -> io::Result<Self> {
        let guard = Self::new();
        guard.enable_raw_mode()?;
        guard.hide_cursor(&mut io::stdout())?;
        Ok(guard)
    }

    pub fn enable_raw_mode(&self) -> io::Result<()> {
        enable_raw_mode()?;
        RAW_MODE_ENABLED.store(true, Ordering::SeqCst);
        Ok(())
    }

    pub fn hide_cursor(&self, stdout: &mut impl Write) -> io::Result<()> {
        execute!(stdout, Hide)?;
        CURSOR_HIDDEN.store(true, Ordering::SeqCst);
        Ok(())
    }

    pub fn restore(&self) {
        restore_terminal();
    }
}

impl Default for TerminalRestoreGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TerminalRestoreGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

/// Return the terminal to cooked mode with a visible cursor. Safe to call repeatedly.
pub fn restore_terminal() {
    if RAW_MODE_ENABLED.swap(false, Ordering::SeqCst) {
        let _ = disable_raw_mode();
    }
    let mut stdout = io::stdout();
    if CURSOR_HIDDEN.swap(false, Ordering::SeqCst) {
        let _ = execute!(stdout, Show);
    }
    let _ = stdout.flush();
}

/// Clear the visible screen after the terminal has been released.
pub fn clear_screen() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, Clear(ClearType::All), crossterm::cursor::MoveTo(0, 0));
}

pub fn install_terminal_panic_hook() {
    PANIC_HOOK_INSTALLED.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            restore_terminal();
            crate::log_panic(info);
            let location = info
                .location()
                .map(|loc| format!("{}:{}", loc.file(), loc.line()))
                .unwrap_or_else(|| "unknown".to_string());
            crate::log_debug(&format!("panic at {location}"));
            crate::log_debug_content(&format!("panic: {info}"));
            previous(info);
        }));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restore_releases_held_state_and_is_repeatable() {
        RAW_MODE_ENABLED.store(true, Ordering::SeqCst);
        CURSOR_HIDDEN.store(true, Ordering::SeqCst);
        restore_terminal();
        assert!(!RAW_MODE_ENABLED.load(Ordering::SeqCst));
        assert!(!CURSOR_HIDDEN.load(Ordering::SeqCst));
        restore_terminal();
        assert!(!RAW_MODE_ENABLED.load(Ordering::SeqCst));
    }
}
