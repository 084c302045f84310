use crate::state::Mode;
use std::fmt;
use std::path::PathBuf;

/// User actions accepted by the session controller.
///
/// Sources:
/// - console input → every variant
/// - Ctrl-C        → `Quit`
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // ── Session ───────────────────────────────────────────────────────────────
    /// Start a fresh session in the given mode (clears the buffer).
    Select(Mode),
    /// Return to the mode menu (clears the buffer).
    Back,
    /// STOP: freeze ingestion and the render cycle.
    Stop,
    /// PLAY: resume after a stop, re-anchoring the session clock.
    Play,

    // ── Display ───────────────────────────────────────────────────────────────
    /// Toggle the regression metrics panel.
    Details,
    /// Print the status line (and metrics panel when visible).
    Status,
    /// Print the live feed of received samples.
    Feed,
    /// List serial ports visible on this machine.
    Ports,
    Help,

    // ── Export ────────────────────────────────────────────────────────────────
    /// Write `<base>.png` and `<base>.xlsx`; `None` picks a timestamped base.
    Save(Option<PathBuf>),

    // ── Internal ──────────────────────────────────────────────────────────────
    /// Graceful shutdown requested.
    Quit,
}

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A distinct, dismissible message for the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub body: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, title, body)
    }

    pub fn warning(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, title, body)
    }

    pub fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, title, body)
    }

    fn new(level: NoticeLevel, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            body: body.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            NoticeLevel::Info => "INFO",
            NoticeLevel::Warning => "WARNING",
            NoticeLevel::Error => "ERROR",
        };
        write!(f, "[{tag}] {}", self.title)?;
        if !self.body.is_empty() {
            write!(f, "\n{}", self.body)?;
        }
        Ok(())
    }
}
