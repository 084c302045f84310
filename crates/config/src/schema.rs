use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure parsed from `hygrograph.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Serial link to the sensor board.
    pub link: LinkConfig,
    /// Rolling buffer sizes.
    pub buffer: BufferConfig,
    /// Render/regression cycle timing.
    pub cycle: CycleConfig,
    /// Export artifact geometry.
    pub export: ExportConfig,
    /// Plot colours.
    pub theme: ThemeConfig,
}

impl MonitorConfig {
    /// Clamp values that would stall or break the pipeline.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.link.max_attempts = self.link.max_attempts.max(1);
        self.link.read_timeout_ms = self.link.read_timeout_ms.max(1);
        self.buffer.capacity = self.buffer.capacity.max(1);
        self.cycle.interval_ms = self.cycle.interval_ms.max(10);
        self.cycle.curve_points = self.cycle.curve_points.max(2);
        self.export.dpi = self.export.dpi.clamp(1, MAX_DPI);
        let fallback = ExportConfig::default();
        self.export.width_in = clamp_inches(self.export.width_in, fallback.width_in);
        self.export.height_in = clamp_inches(self.export.height_in, fallback.height_in);
        self
    }
}

/// Non-positive or NaN sizes fall back to `default`; infinity is capped.
fn clamp_inches(inches: f32, default: f32) -> f32 {
    if inches > 0.0 {
        inches.min(MAX_SIDE_IN)
    } else {
        default
    }
}

/// Serial link settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Port identifier, e.g. `"/dev/rfcomm0"` or `"COM7"`.
    pub port: String,
    pub baud_rate: u32,
    /// Bounded wait for a single read, so shutdown is noticed promptly.
    pub read_timeout_ms: u64,
    /// Connection attempts before the reader gives up.
    pub max_attempts: u32,
    /// Flat delay between connection attempts.
    pub retry_delay_ms: u64,
    /// Pause after a transient read error.
    pub error_backoff_ms: u64,
}

impl LinkConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_millis(self.error_backoff_ms)
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            port:             "/dev/rfcomm0".to_string(),
            baud_rate:        115_200,
            read_timeout_ms:  1_000,
            max_attempts:     3,
            retry_delay_ms:   2_000,
            error_backoff_ms: 100,
        }
    }
}

/// Rolling buffer sizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Maximum number of buffered samples; the oldest is evicted beyond this.
    pub capacity: usize,
    /// Entries kept in the human-readable live feed.
    pub feed_len: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            capacity: 300,
            feed_len: 50,
        }
    }
}

/// Render/regression cycle timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    /// Tick period while the cycle is active.
    pub interval_ms: u64,
    /// Grid size used to draw the quadratic curve.
    pub curve_points: usize,
    /// How long shutdown waits for the reader to notice the flag.
    pub shutdown_grace_ms: u64,
}

impl CycleConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            interval_ms:       250,
            curve_points:      200,
            shutdown_grace_ms: 500,
        }
    }
}

pub const MAX_DPI: u32 = 600;
pub const MAX_SIDE_IN: f32 = 40.0;
/// Upper bound on either side of the exported image.
pub const MAX_SIDE_PX: u32 = 4096;

/// Image artifact geometry; pixel size is `inches × dpi`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub dpi: u32,
    pub width_in: f32,
    pub height_in: f32,
}

impl ExportConfig {
    /// Image size in pixels, each side within `1..=MAX_SIDE_PX`.
    pub fn pixel_size(&self) -> (u32, u32) {
        let px = |inches: f32| ((inches * self.dpi as f32).round() as u32).clamp(1, MAX_SIDE_PX);
        (px(self.width_in), px(self.height_in))
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dpi:       150,
            width_in:  8.0,
            height_in: 4.0,
        }
    }
}

/// Plot colours as hex strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub background: String,
    pub foreground: String,
    pub grid: String,
    /// Scatter/fit colour for the humidity channel.
    pub humidity: String,
    /// Scatter/fit colour for the temperature channel.
    pub temperature: String,
    /// Linear fit colour in single-channel mode.
    pub linear: String,
    /// Quadratic curve colour in single-channel mode.
    pub quadratic: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            background:  "#0f0f0f".to_string(),
            foreground:  "#ffffff".to_string(),
            grid:        "#333333".to_string(),
            humidity:    "#00ffff".to_string(), // cyan
            temperature: "#00ff00".to_string(), // lime
            linear:      "#ffa500".to_string(), // orange
            quadratic:   "#ff00ff".to_string(), // magenta
        }
    }
}
