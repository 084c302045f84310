use embedded_graphics::pixelcolor::Rgb888;

/// Normalised RGBA colour (each channel in `[0.0, 1.0]`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK:   Self = Self { r: 0.059, g: 0.059, b: 0.059, a: 1.0 }; // #0f0f0f
    pub const WHITE:   Self = Self { r: 1.0,   g: 1.0,   b: 1.0,   a: 1.0 }; // #ffffff
    pub const GREY:    Self = Self { r: 0.2,   g: 0.2,   b: 0.2,   a: 1.0 }; // #333333
    pub const CYAN:    Self = Self { r: 0.0,   g: 1.0,   b: 1.0,   a: 1.0 }; // #00ffff
    pub const LIME:    Self = Self { r: 0.0,   g: 1.0,   b: 0.0,   a: 1.0 }; // #00ff00
    pub const ORANGE:  Self = Self { r: 1.0,   g: 0.647, b: 0.0,   a: 1.0 }; // #ffa500
    pub const MAGENTA: Self = Self { r: 1.0,   g: 0.0,   b: 1.0,   a: 1.0 }; // #ff00ff

    /// Parse a CSS-style hex color string (`#RRGGBB` or `#RRGGBBAA`).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');

        let byte = |s: &str| -> Option<u8> { u8::from_str_radix(s, 16).ok() };

        match hex.len() {
            6 => Some(Self {
                r: byte(hex.get(0..2)?)? as f32 / 255.0,
                g: byte(hex.get(2..4)?)? as f32 / 255.0,
                b: byte(hex.get(4..6)?)? as f32 / 255.0,
                a: 1.0,
            }),
            8 => Some(Self {
                r: byte(hex.get(0..2)?)? as f32 / 255.0,
                g: byte(hex.get(2..4)?)? as f32 / 255.0,
                b: byte(hex.get(4..6)?)? as f32 / 255.0,
                a: byte(hex.get(6..8)?)? as f32 / 255.0,
            }),
            _ => None,
        }
    }

    /// Return a copy with the alpha channel set to `alpha`.
    #[inline]
    #[must_use]
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = alpha.clamp(0.0, 1.0);
        self
    }

    /// Composite `self` over an opaque `background`, dropping alpha.
    #[must_use]
    pub fn over(self, background: Color) -> Self {
        let mix = |fg: f32, bg: f32| fg * self.a + bg * (1.0 - self.a);
        Self {
            r: mix(self.r, background.r),
            g: mix(self.g, background.g),
            b: mix(self.b, background.b),
            a: 1.0,
        }
    }

    /// Convert to an opaque [`Rgb888`] for the raster plot.
    #[inline]
    pub fn to_rgb888(self) -> Rgb888 {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Rgb888::new(channel(self.r), channel(self.g), channel(self.b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::RgbColor;

    #[test]
    fn parses_six_and_eight_digit_hex() {
        let orange = Color::from_hex("#ffa500").unwrap().to_rgb888();
        assert_eq!((orange.r(), orange.g(), orange.b()), (255, 165, 0));

        let faded = Color::from_hex("00ff0080").unwrap();
        assert!((faded.a - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!(Color::from_hex("#12345").is_none());
        assert!(Color::from_hex("#gg0000").is_none());
        assert!(Color::from_hex("#é00000").is_none());
    }

    #[test]
    fn half_alpha_blends_toward_background() {
        let blended = Color::WHITE.with_alpha(0.5).over(Color { r: 0.0, g: 0.0, b: 0.0, a: 1.0 });
        assert!((blended.r - 0.5).abs() < 1e-6);
        assert_eq!(blended.a, 1.0);
    }
}
