pub mod colors;
pub mod style;

pub use colors::Color;
pub use style::{Dash, Stroke};

use hygro_config::ThemeConfig;
use hygro_core::{Channel, Mode};

/// Compiled plot theme derived from [`ThemeConfig`].
///
/// All colors are pre-parsed from hex strings into normalised `[0, 1]` RGBA.
/// Calling [`Theme::from_config`] is infallible; invalid color strings fall
/// back to safe defaults.
#[derive(Debug, Clone)]
pub struct Theme {
    pub background:  Color,
    pub foreground:  Color,
    pub grid:        Color,
    pub humidity:    Color,
    pub temperature: Color,
    /// Linear fit in single-channel mode.
    pub linear:      Color,
    /// Quadratic curve in single-channel mode.
    pub quadratic:   Color,
}

impl Theme {
    /// Build a [`Theme`] from the config file's `[theme]` section.
    pub fn from_config(cfg: &ThemeConfig) -> Self {
        Self {
            background:  Color::from_hex(&cfg.background).unwrap_or(Color::BLACK),
            foreground:  Color::from_hex(&cfg.foreground).unwrap_or(Color::WHITE),
            grid:        Color::from_hex(&cfg.grid).unwrap_or(Color::GREY),
            humidity:    Color::from_hex(&cfg.humidity).unwrap_or(Color::CYAN),
            temperature: Color::from_hex(&cfg.temperature).unwrap_or(Color::LIME),
            linear:      Color::from_hex(&cfg.linear).unwrap_or(Color::ORANGE),
            quadratic:   Color::from_hex(&cfg.quadratic).unwrap_or(Color::MAGENTA),
        }
    }

    /// Scatter colour for a channel.
    pub fn channel(&self, channel: Channel) -> Color {
        match channel {
            Channel::Humidity => self.humidity,
            Channel::Temperature => self.temperature,
        }
    }

    /// Stroke for a channel's linear fit.  Single-channel plots use the
    /// dedicated fit colour; dual plots reuse the channel colour, faded.
    pub fn linear_stroke(&self, mode: Mode, channel: Channel) -> Stroke {
        let color = match mode {
            Mode::Both => self.channel(channel).with_alpha(0.7).over(self.background),
            _ => self.linear,
        };
        Stroke { color, width: 2, dash: Dash::Dashed }
    }

    /// Stroke for a channel's quadratic curve.
    pub fn quadratic_stroke(&self, mode: Mode, channel: Channel) -> Stroke {
        let color = match mode {
            Mode::Both => self.channel(channel).with_alpha(0.5).over(self.background),
            _ => self.quadratic,
        };
        Stroke { color, width: 2, dash: Dash::DashDot }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config(&ThemeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_colors_fall_back() {
        let cfg = ThemeConfig {
            humidity: "not-a-color".to_string(),
            ..ThemeConfig::default()
        };
        let theme = Theme::from_config(&cfg);
        assert_eq!(theme.humidity, Color::CYAN);
    }

    #[test]
    fn dual_mode_fits_follow_channel_colour() {
        let theme = Theme::default();
        let single = theme.linear_stroke(Mode::Humidity, Channel::Humidity);
        let dual = theme.linear_stroke(Mode::Both, Channel::Humidity);
        assert_eq!(single.color, theme.linear);
        assert_ne!(dual.color, theme.linear);
        assert_eq!(dual.dash, Dash::Dashed);
    }
}
