/// ANSI codes used by every frame builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub bold: &'static str,
    pub dim: &'static str,
    /// Highlighted / selected rows
    pub accent: &'static str,
    pub success: &'static str,
    pub warning: &'static str,
    pub error: &'static str,
    pub info: &'static str,
    /// Brand color for the banner
    pub brand: &'static str,
    pub reset: &'static str,
}

pub const ANSI_PALETTE: Palette = Palette {
    bold: "\x1b[1m",
    dim: "\x1b[2m",
    accent: "\x1b[36m",
    success: "\x1b[32m",
    warning: "\x1b[33m",
    error: "\x1b[31m",
    info: "\x1b[34m",
    brand: "\x1b[92m",
    reset: "\x1b[0m",
};

pub const PLAIN_PALETTE: Palette = Palette {
    bold: "",
    dim: "",
    accent: "",
    success: "",
    warning: "",
    error: "",
    info: "",
    brand: "",
    reset: "",
};

impl Palette {
    pub fn new(color: bool) -> Self {
        if color {
            ANSI_PALETTE
        } else {
            PLAIN_PALETTE
        }
    }

    pub fn paint(&self, code: &str, text: &str) -> String {
        if code.is_empty() {
            text.to_string()
        } else {
            format!("{code}{text}{}", self.reset)
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        ANSI_PALETTE
    }
}

/// Remove ANSI escape sequences, leaving only the visible text.
pub fn strip_styles(text: &str) -> String {
    strip_ansi_escapes::strip_str(text)
}
