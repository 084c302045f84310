/// Fit quality of a prediction against the observed values.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Metrics {
    pub mse:       f64,
    pub rmse:      f64,
    /// Coefficient of determination; 0 when the observations have no variance.
    pub r_squared: f64,
}

/// Compare `real` observations with `pred` predictions of the same length.
///
/// Empty input yields all-zero metrics.
pub fn metrics(real: &[f64], pred: &[f64]) -> Metrics {
    debug_assert_eq!(real.len(), pred.len(), "metrics over misaligned series");

    let n = real.len().min(pred.len());
    if n == 0 {
        return Metrics::default();
    }

    let ss_res: f64 = real
        .iter()
        .zip(pred)
        .map(|(y, y_hat)| (y - y_hat).powi(2))
        .sum();
    let mse = ss_res / n as f64;

    // A rounded mean leaves a tiny nonzero ss_tot for constants like 23.3.
    let constant = real[..n].iter().all(|&y| y == real[0]);
    let r_squared = if constant {
        0.0
    } else {
        let mean = real[..n].iter().sum::<f64>() / n as f64;
        let ss_tot: f64 = real[..n].iter().map(|y| (y - mean).powi(2)).sum();
        if ss_tot == 0.0 { 0.0 } else { 1.0 - ss_res / ss_tot }
    };

    Metrics { mse, rmse: mse.sqrt(), r_squared }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_prediction() {
        let y = [1.0, 2.0, 4.0];
        let m = metrics(&y, &y);
        assert_eq!(m.mse, 0.0);
        assert_eq!(m.rmse, 0.0);
        assert_eq!(m.r_squared, 1.0);
    }

    #[test]
    fn constant_observations_have_zero_r_squared() {
        let m = metrics(&[5.0; 4], &[5.0, 5.0, 5.0, 6.0]);
        assert_eq!(m.r_squared, 0.0);
        assert_eq!(m.mse, 0.25);
        assert_eq!(m.rmse, 0.5);
    }

    #[test]
    fn inexact_constants_have_zero_r_squared() {
        for c in [23.3, 0.1, 19.9] {
            let pred = [c + 1e-12, c - 1e-12, c, c + 2e-12];
            assert_eq!(metrics(&[c; 4], &pred).r_squared, 0.0, "constant {c}");
        }
        assert_eq!(metrics(&[23.3; 300], &[23.3; 300]).r_squared, 0.0);
    }

    #[test]
    fn mean_prediction_scores_zero() {
        let m = metrics(&[1.0, 3.0], &[2.0, 2.0]);
        assert_eq!(m.mse, 1.0);
        assert_eq!(m.r_squared, 0.0);
    }

    #[test]
    fn empty_input_is_all_zero() {
        assert_eq!(metrics(&[], &[]), Metrics::default());
    }
}
