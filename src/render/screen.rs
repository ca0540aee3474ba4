use crossterm::{
    cursor::MoveTo,
    queue,
    terminal::{self, Clear, ClearType},
};
use std::io::{self, Write};

pub const FALLBACK_SIZE: (u16, u16) = (80, 24);

/// Full-frame output surface. Every draw replaces everything on screen.
pub trait Screen {
    fn draw(&mut self, frame: &str) -> io::Result<()>;

    /// (columns, rows)
    fn size(&self) -> (u16, u16);

    fn rows(&self) -> usize {
        usize::from(self.size().1)
    }

    fn cols(&self) -> usize {
        usize::from(self.size().0)
    }
}

/// Writes frames to stdout, clearing first.
pub struct TerminalScreen<W: Write = io::Stdout> {
    out: W,
}

impl TerminalScreen<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> TerminalScreen<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Screen for TerminalScreen<W> {
    fn draw(&mut self, frame: &str) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        // Raw mode disables output post-processing, so each line needs its own carriage return.
        let mut first = true;
        for line in frame.split('\n') {
            if !first {
                self.out.write_all(b"\r\n")?;
            }
            first = false;
            self.out.write_all(line.as_bytes())?;
        }
        self.out.flush()
    }

    fn size(&self) -> (u16, u16) {
        terminal::size().unwrap_or(FALLBACK_SIZE)
    }
}

/// Keeps every frame in memory. Used by interaction tests.
#[derive(Debug, Clone)]
pub struct MemoryScreen {
    frames: Vec<String>,
    size: (u16, u16),
}

impl MemoryScreen {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            frames: Vec::new(),
            size: (cols, rows),
        }
    }

    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&str> {
        self.frames.last().map(String::as_str)
    }

    /// Last frame with styling removed.
    pub fn last_plain(&self) -> String {
        self.last_frame()
            .map(super::style::strip_styles)
            .unwrap_or_default()
    }
}

impl Default for MemoryScreen {
    fn default() -> Self {
        Self::new(FALLBACK_SIZE.0, FALLBACK_SIZE.1)
    }
}

impl Screen for MemoryScreen {
    fn draw(&mut self, frame: &str) -> io::Result<()> {
        self.frames.push(frame.to_string());
        Ok(())
    }

    fn size(&self) -> (u16, u16) {
        self.size
    }
}
