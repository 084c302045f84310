use hygro_core::{Channel, HygroError, Mode};
use hygro_regression::{fit, sample_curve, Degree, FitError, FitResult};
use hygro_series::Snapshot;
use thiserror::Error;
use tracing::debug;

/// Padding added past the newest sample on the time axis, in seconds.
pub const X_PADDING: f64 = 0.5;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("snapshot is empty")]
    Empty,

    #[error("snapshot columns have different lengths")]
    Misaligned,

    #[error("{channel:?} {degree} fit failed: {source}")]
    Fit {
        channel: Channel,
        degree:  Degree,
        #[source]
        source:  FitError,
    },
}

impl From<RenderError> for HygroError {
    fn from(e: RenderError) -> Self {
        HygroError::Render(e.to_string())
    }
}

/// A fitted polynomial plus the points used to draw it.
#[derive(Debug, Clone)]
pub struct Trace {
    pub fit: FitResult,
    pub xs:  Vec<f64>,
    pub ys:  Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct ChannelFrame {
    pub channel:   Channel,
    pub values:    Vec<f64>,
    /// Evaluated at every sample time.  `None` below two points.
    pub linear:    Option<Trace>,
    /// Evaluated on a dense uniform grid.  `None` below three points.
    pub quadratic: Option<Trace>,
}

/// Everything one render tick derives from a snapshot.
#[derive(Debug, Clone)]
pub struct Frame {
    pub mode:     Mode,
    pub time:     Vec<f64>,
    pub channels: Vec<ChannelFrame>,
    /// `[min(t), max(t) + 0.5]`.
    pub x_range:  (f64, f64),
    pub y_range:  (f64, f64),
}

impl Frame {
    /// Fit every channel of `mode` against the snapshot's time column.
    ///
    /// A single point yields a scatter-only frame.  A singular quadratic is
    /// dropped from the frame; a singular linear fit fails the whole frame.
    pub fn build(snapshot: &Snapshot, mode: Mode, curve_points: usize) -> Result<Self, RenderError> {
        debug_assert!(snapshot.is_aligned(), "snapshot columns out of alignment");
        if !snapshot.is_aligned() {
            return Err(RenderError::Misaligned);
        }
        let (t_min, t_max) = snapshot.time_range().ok_or(RenderError::Empty)?;

        let time = snapshot.time.clone();
        let mut channels = Vec::with_capacity(mode.channels().len());
        for &channel in mode.channels() {
            let values = snapshot.channel(channel);

            let linear = match fit(&time, &values, Degree::Linear) {
                Ok(fit) => Some(Trace {
                    ys: fit.predictions(&time),
                    xs: time.clone(),
                    fit,
                }),
                Err(FitError::InsufficientPoints { .. }) => None,
                Err(source) => {
                    return Err(RenderError::Fit {
                        channel,
                        degree: Degree::Linear,
                        source,
                    })
                }
            };

            let quadratic = match fit(&time, &values, Degree::Quadratic) {
                Ok(fit) => {
                    let (xs, ys) = sample_curve(&fit.coefficients, t_min, t_max, curve_points);
                    Some(Trace { fit, xs, ys })
                }
                Err(FitError::InsufficientPoints { .. }) => None,
                Err(e) => {
                    debug!("Skipping {channel:?} quadratic: {e}");
                    None
                }
            };

            channels.push(ChannelFrame {
                channel,
                values,
                linear,
                quadratic,
            });
        }

        let y_range = value_range(&channels);
        Ok(Self {
            mode,
            time,
            channels,
            x_range: (t_min, t_max + X_PADDING),
            y_range,
        })
    }

    pub fn points(&self) -> usize {
        self.time.len()
    }

    /// `true` once every channel carries at least a linear fit.
    pub fn has_fits(&self) -> bool {
        !self.channels.is_empty() && self.channels.iter().all(|c| c.linear.is_some())
    }

    pub fn channel(&self, channel: Channel) -> Option<&ChannelFrame> {
        self.channels.iter().find(|c| c.channel == channel)
    }
}

/// Padded span of everything drawn on the y axis.
fn value_range(channels: &[ChannelFrame]) -> (f64, f64) {
    let (lo, hi) = channels
        .iter()
        .flat_map(|c| {
            let traces = c.linear.iter().chain(&c.quadratic).flat_map(|t| t.ys.iter());
            c.values.iter().chain(traces)
        })
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    if lo > hi {
        return (0.0, 1.0);
    }
    let pad = if hi - lo > f64::EPSILON { (hi - lo) * 0.05 } else { 1.0 };
    (lo - pad, hi + pad)
}
