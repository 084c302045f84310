use hygro_core::Reading;
use thiserror::Error;

/// Mandatory prefix of every telemetry line.
pub const FRAME_PREFIX: &str = "DATA;";

/// Why a line was not turned into a [`Reading`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Debug output or noise; not a telemetry frame at all.
    #[error("line does not start with \"DATA;\"")]
    NotData,

    #[error("frame has no {0} field")]
    MissingField(&'static str),

    #[error("field {key} has invalid value {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Parse a raw line into a [`Reading`].
///
/// Frames have the format `DATA;T=<float>;U=<int>`; fields are `KEY=VALUE`
/// pairs separated by `;`, in any order.  Unknown keys are ignored.
pub fn parse_frame(line: &str) -> Result<Reading, FrameError> {
    let body = line
        .trim()
        .strip_prefix(FRAME_PREFIX)
        .ok_or(FrameError::NotData)?;

    let mut temperature = None;
    let mut humidity = None;

    for field in body.split(';') {
        let Some((key, value)) = field.split_once('=') else {
            continue;
        };
        match key.trim() {
            "T" => temperature = Some(parse_temperature(value.trim())?),
            "U" => humidity = Some(parse_humidity(value.trim())?),
            _ => {}
        }
    }

    Ok(Reading {
        temperature: temperature.ok_or(FrameError::MissingField("T"))?,
        humidity:    humidity.ok_or(FrameError::MissingField("U"))?,
    })
}

fn parse_temperature(value: &str) -> Result<f64, FrameError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|t| t.is_finite())
        .ok_or_else(|| FrameError::InvalidValue {
            key:   "T",
            value: value.to_string(),
        })
}

fn parse_humidity(value: &str) -> Result<i32, FrameError> {
    value.parse::<i32>().map_err(|_| FrameError::InvalidValue {
        key:   "U",
        value: value.to_string(),
    })
}
