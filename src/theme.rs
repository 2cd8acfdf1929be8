use crossterm::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalBackground {
    Light,
    Dark,
}

impl TerminalBackground {
    pub fn from_env() -> Self {
        match std::env::var("MULTIPULL_THEME").ok().as_deref() {
            Some("dark") => TerminalBackground::Dark,
            Some("light") => TerminalBackground::Light,
            _ => detect_background(),
        }
    }
}

#[cfg(target_os = "macos")]
fn detect_background() -> TerminalBackground {
    // The global interface style key is only present when dark mode is on.
    match std::process::Command::new("defaults")
        .args(["read", "-g", "AppleInterfaceStyle"])
        .output()
    {
        Ok(output) if output.stdout.starts_with(b"Dark") => TerminalBackground::Dark,
        _ => TerminalBackground::Light,
    }
}

#[cfg(not(target_os = "macos"))]
fn detect_background() -> TerminalBackground {
    TerminalBackground::Light
}

/// Resolved color roles for the canvas. Tasks pick roles, never raw colors,
/// so a theme swap touches nothing but this table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// No-op outcomes ("no changes").
    pub info: Color,
    /// Transient or attention states: retries, dirty trees, change summaries.
    pub attention: Color,
    /// Terminal failures.
    pub error: Color,
    /// Row labels and branch brackets.
    pub neutral: Color,
}

impl Palette {
    pub fn for_background(background: TerminalBackground) -> Self {
        match background {
            TerminalBackground::Light => Self {
                info: Color::Blue,
                attention: Color::Magenta,
                error: Color::Red,
                neutral: Color::Black,
            },
            TerminalBackground::Dark => Self {
                info: Color::Cyan,
                attention: Color::Magenta,
                error: Color::Red,
                neutral: Color::White,
            },
        }
    }

    pub fn detect() -> Self {
        Self::for_background(TerminalBackground::from_env())
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::for_background(TerminalBackground::Light)
    }
}
