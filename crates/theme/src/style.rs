use crate::colors::Color;

/// Dash pattern for fitted lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dash {
    /// `--`
    Dashed,
    /// `-.`
    DashDot,
}

impl Dash {
    /// Alternating on/off run lengths in pixels, starting with "on".
    pub fn pattern(self) -> &'static [u32] {
        match self {
            Dash::Dashed => &[12, 6],
            Dash::DashDot => &[12, 5, 3, 5],
        }
    }
}

/// How one plotted series is stroked.
#[derive(Debug, Clone, Copy)]
pub struct Stroke {
    pub color: Color,
    pub width: u32,
    pub dash:  Dash,
}
