use crate::metrics::{metrics, Metrics};
use crate::poly::{polyfit, polyval};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degree {
    Linear,
    Quadratic,
}

impl Degree {
    pub fn order(self) -> usize {
        match self {
            Self::Linear => 1,
            Self::Quadratic => 2,
        }
    }

    /// Fewest points that determine the fit.
    pub fn min_points(self) -> usize {
        self.order() + 1
    }
}

impl fmt::Display for Degree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Linear => "linear",
            Self::Quadratic => "quadratic",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FitError {
    /// Not enough samples yet; callers skip the fit.
    #[error("fit needs at least {need} points, got {got}")]
    InsufficientPoints { need: usize, got: usize },

    #[error("time values have no spread; normal equations are singular")]
    Degenerate,

    #[error("x has {x} values but y has {y}")]
    LengthMismatch { x: usize, y: usize },
}

/// One fitted polynomial and how well it explains its inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    pub degree:       Degree,
    /// Highest power first.
    pub coefficients: Vec<f64>,
    pub metrics:      Metrics,
}

impl FitResult {
    pub fn predict(&self, x: f64) -> f64 {
        polyval(&self.coefficients, x)
    }

    pub fn predictions(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.predict(x)).collect()
    }

    /// Coefficient of `x^power`, zero when the fit has no such term.
    pub fn coefficient(&self, power: usize) -> f64 {
        self.coefficients
            .len()
            .checked_sub(power + 1)
            .and_then(|i| self.coefficients.get(i))
            .copied()
            .unwrap_or(0.0)
    }
}

/// Fit `y` against `x` and score the fit on the same points.
pub fn fit(x: &[f64], y: &[f64], degree: Degree) -> Result<FitResult, FitError> {
    let coefficients = polyfit(x, y, degree.order())?;
    let predicted: Vec<f64> = x.iter().map(|&xi| polyval(&coefficients, xi)).collect();
    let metrics = metrics(y, &predicted);
    tracing::trace!(%degree, r_squared = metrics.r_squared, "fit computed");

    Ok(FitResult {
        degree,
        coefficients,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_line_scores_perfectly() {
        let x: Vec<f64> = (0..8).map(|i| i as f64 * 0.25).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 3.0).collect();

        let fit = fit(&x, &y, Degree::Linear).unwrap();
        assert!((fit.coefficient(1) - 2.0).abs() < 1e-9);
        assert!((fit.coefficient(0) - 3.0).abs() < 1e-9);
        assert!(fit.metrics.mse < 1e-18);
        assert!((fit.metrics.r_squared - 1.0).abs() < 1e-12);
    }

    #[test]
    fn constant_series_has_zero_r_squared() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [42.0; 4];
        for degree in [Degree::Linear, Degree::Quadratic] {
            let fit = fit(&x, &y, degree).unwrap();
            assert_eq!(fit.metrics.r_squared, 0.0);
            assert!(fit.metrics.mse < 1e-18);
        }
    }

    #[test]
    fn stable_sensor_reading_has_zero_r_squared() {
        let x: Vec<f64> = (0..7).map(f64::from).collect();
        for c in [23.3, 0.1, 19.9] {
            for degree in [Degree::Linear, Degree::Quadratic] {
                let fit = fit(&x, &[c; 7], degree).unwrap();
                assert_eq!(fit.metrics.r_squared, 0.0, "{degree} fit of {c}");
            }
        }

        let x: Vec<f64> = (0..300).map(|i| f64::from(i) * 0.25).collect();
        let y = vec![23.3; 300];
        for degree in [Degree::Linear, Degree::Quadratic] {
            assert_eq!(fit(&x, &y, degree).unwrap().metrics.r_squared, 0.0);
        }
    }

    #[test]
    fn quadratic_needs_three_points() {
        assert_eq!(
            fit(&[0.0, 1.0], &[0.0, 1.0], Degree::Quadratic),
            Err(FitError::InsufficientPoints { need: 3, got: 2 })
        );
        assert_eq!(Degree::Quadratic.min_points(), 3);
        assert!(fit(&[0.0, 1.0], &[0.0, 1.0], Degree::Linear).is_ok());
    }

    #[test]
    fn quadratic_beats_line_on_curved_data() {
        let x: Vec<f64> = (0..12).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|v| v * v).collect();

        let line = fit(&x, &y, Degree::Linear).unwrap();
        let parabola = fit(&x, &y, Degree::Quadratic).unwrap();
        assert!(parabola.metrics.mse < line.metrics.mse);
        assert!((parabola.coefficient(2) - 1.0).abs() < 1e-9);
        assert_eq!(line.coefficient(2), 0.0);
    }
}
