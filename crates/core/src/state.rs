use std::fmt;

/// Payload of one inbound frame, before it is placed on the session clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Temperature in °C.
    pub temperature: f64,
    /// Relative humidity in %.
    pub humidity: i32,
}

/// One buffered measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Seconds since the session clock origin.
    pub relative_time: f64,
    pub temperature: f64,
    pub humidity: i32,
}

impl Sample {
    /// Human-readable row used by the live feed, e.g. `T:  3.2s|T: 23.5°C|U: 65%`.
    pub fn feed_line(&self) -> String {
        format!(
            "T:{:5.1}s|T:{:5.1}°C|U:{:3}%",
            self.relative_time, self.temperature, self.humidity
        )
    }
}

/// A single measured quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Humidity,
    Temperature,
}

impl Channel {
    /// Sheet name used by the tabular export.
    pub fn sheet_name(self) -> &'static str {
        match self {
            Channel::Humidity => "Umidita",
            Channel::Temperature => "Temperatura",
        }
    }

    /// Value column header used by the tabular export.
    pub fn column_name(self) -> &'static str {
        match self {
            Channel::Humidity => "Umidita_%",
            Channel::Temperature => "Temperatura_C",
        }
    }

    /// Axis label with unit.
    pub fn axis_label(self) -> &'static str {
        match self {
            Channel::Humidity => "Humidity (%)",
            Channel::Temperature => "Temperature (°C)",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Channel::Humidity => "HUMIDITY",
            Channel::Temperature => "TEMPERATURE",
        }
    }
}

/// Which channel(s) the session plots, fits and exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Humidity,
    Temperature,
    Both,
}

impl Mode {
    /// Active channels, in sheet order.
    pub fn channels(self) -> &'static [Channel] {
        match self {
            Mode::Humidity => &[Channel::Humidity],
            Mode::Temperature => &[Channel::Temperature],
            Mode::Both => &[Channel::Humidity, Channel::Temperature],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Humidity => "humidity",
            Mode::Temperature => "temperature",
            Mode::Both => "both",
        }
    }

    /// Y-axis label for the plot.
    pub fn axis_label(self) -> &'static str {
        match self {
            Mode::Humidity => Channel::Humidity.axis_label(),
            Mode::Temperature => Channel::Temperature.axis_label(),
            Mode::Both => "Value",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
