//! Polynomial least-squares fitting and goodness-of-fit metrics.
//!
//! Everything here is a pure function of its inputs; callers pass owned
//! snapshots and get fresh results every tick.

pub mod fit;
pub mod metrics;
pub mod poly;

pub use fit::{fit, Degree, FitError, FitResult};
pub use metrics::{metrics, Metrics};
pub use poly::{linspace, polyfit, polyval, sample_curve};
