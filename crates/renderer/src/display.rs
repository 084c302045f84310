use crate::frame::Frame;
use crate::text::{metrics_text, status_line, METRICS_PLACEHOLDER};

/// Derived view state, rebuilt from scratch on every tick.
#[derive(Debug, Default)]
pub struct DisplayState {
    frame:        Option<Frame>,
    status:       String,
    metrics:      String,
    show_metrics: bool,
}

impl DisplayState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the displayed frame.
    pub fn update(&mut self, frame: Frame) {
        self.status = status_line(frame.points(), frame.mode);
        self.metrics = metrics_text(&frame);
        self.frame = Some(frame);
    }

    /// Forget everything, including the metrics toggle.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Flip the metrics panel; returns the new visibility.
    pub fn toggle_metrics(&mut self) -> bool {
        self.show_metrics = !self.show_metrics;
        self.show_metrics
    }

    pub fn metrics_visible(&self) -> bool {
        self.show_metrics
    }

    /// Panel text, or `None` while the panel is hidden.
    pub fn metrics_panel(&self) -> Option<&str> {
        if !self.show_metrics {
            return None;
        }
        Some(if self.metrics.is_empty() {
            METRICS_PLACEHOLDER
        } else {
            &self.metrics
        })
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hygro_core::Mode;
    use hygro_series::Snapshot;

    fn frame() -> Frame {
        let snapshot = Snapshot {
            time:        vec![0.0, 0.5, 1.0],
            temperature: vec![21.0, 21.2, 21.1],
            humidity:    vec![55, 56, 58],
        };
        Frame::build(&snapshot, Mode::Humidity, 200).unwrap()
    }

    #[test]
    fn panel_is_hidden_until_toggled() {
        let mut display = DisplayState::new();
        display.update(frame());
        assert_eq!(display.status(), "Points: 3 | Mode: humidity");
        assert!(display.metrics_panel().is_none());

        assert!(display.toggle_metrics());
        assert!(display.metrics_panel().unwrap().starts_with("=== LINEAR ==="));
        assert!(!display.toggle_metrics());
    }

    #[test]
    fn placeholder_before_first_fit() {
        let mut display = DisplayState::new();
        display.toggle_metrics();
        assert_eq!(display.metrics_panel(), Some(METRICS_PLACEHOLDER));
    }

    #[test]
    fn reset_clears_frame_and_toggle() {
        let mut display = DisplayState::new();
        display.update(frame());
        display.toggle_metrics();
        display.reset();
        assert!(display.frame().is_none());
        assert!(!display.metrics_visible());
        assert!(display.status().is_empty());
    }
}
