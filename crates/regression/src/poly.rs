use crate::fit::FitError;

/// Pivots smaller than this (on the unit-scaled abscissa) mean the normal
/// equations are singular.
const PIVOT_EPSILON: f64 = 1e-12;

/// Least-squares polynomial of the given order through `(x, y)`.
///
/// Returns `order + 1` coefficients, highest power first.  The system is
/// solved on `u = (x - mean) / spread` so large time values stay well
/// conditioned, then expanded back onto raw `x`.
pub fn polyfit(x: &[f64], y: &[f64], order: usize) -> Result<Vec<f64>, FitError> {
    if x.len() != y.len() {
        return Err(FitError::LengthMismatch { x: x.len(), y: y.len() });
    }
    let terms = order + 1;
    if x.len() < terms {
        return Err(FitError::InsufficientPoints { need: terms, got: x.len() });
    }

    let n = x.len() as f64;
    let mean = x.iter().sum::<f64>() / n;
    let spread = x.iter().map(|v| (v - mean).abs()).fold(0.0, f64::max);
    if !(spread.is_finite() && spread > 0.0) {
        return Err(FitError::Degenerate);
    }

    // Normal equations: A[j][k] = Σ u^(j+k), b[j] = Σ y·u^j.
    let mut power_sums = vec![0.0; 2 * order + 1];
    let mut rhs = vec![0.0; terms];
    for (&xi, &yi) in x.iter().zip(y) {
        let u = (xi - mean) / spread;
        let mut p = 1.0;
        for (k, sum) in power_sums.iter_mut().enumerate() {
            *sum += p;
            if k < terms {
                rhs[k] += yi * p;
            }
            p *= u;
        }
    }
    let matrix: Vec<Vec<f64>> = (0..terms)
        .map(|j| power_sums[j..j + terms].to_vec())
        .collect();

    let scaled = solve(matrix, rhs)?;
    let mut raw = expand(&scaled, mean, spread);
    raw.reverse();
    Ok(raw)
}

/// Evaluate a highest-power-first polynomial at `x` (Horner).
pub fn polyval(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().fold(0.0, |acc, c| acc * x + c)
}

/// `n` evenly spaced values from `lo` to `hi` inclusive.
pub fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { hi } else { lo + step * i as f64 })
                .collect()
        }
    }
}

/// Evaluate a polynomial on a uniform grid over `[lo, hi]`.
pub fn sample_curve(coefficients: &[f64], lo: f64, hi: f64, n: usize) -> (Vec<f64>, Vec<f64>) {
    let xs = linspace(lo, hi, n);
    let ys = xs.iter().map(|&x| polyval(coefficients, x)).collect();
    (xs, ys)
}

/// Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>, FitError> {
    let n = b.len();

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if a[pivot][col].abs() < PIVOT_EPSILON {
            return Err(FitError::Degenerate);
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Ok(x)
}

/// Rewrite `Σ c_k ((x - shift) / scale)^k` as ascending coefficients in `x`.
fn expand(scaled: &[f64], shift: f64, scale: f64) -> Vec<f64> {
    let mut raw = vec![0.0; scaled.len()];
    for (k, &c) in scaled.iter().enumerate() {
        let weight = c / scale.powi(k as i32);
        let mut binom = 1.0;
        for j in 0..=k {
            // Coefficient of x^j in (x - shift)^k is C(k, j)·(-shift)^(k-j).
            raw[j] += weight * binom * (-shift).powi((k - j) as i32);
            binom = binom * (k - j) as f64 / (j + 1) as f64;
        }
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn fits_a_line() {
        let x: Vec<f64> = (0..10).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 3.0).collect();
        let c = polyfit(&x, &y, 1).unwrap();
        assert_eq!(c.len(), 2);
        assert!(close(c[0], 2.0), "slope {}", c[0]);
        assert!(close(c[1], 3.0), "intercept {}", c[1]);
    }

    #[test]
    fn fits_a_parabola_far_from_the_origin() {
        let x: Vec<f64> = (0..30).map(|i| 250.0 + 0.25 * i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 0.5 * v * v - 2.0 * v + 1.0).collect();
        let c = polyfit(&x, &y, 2).unwrap();
        for (&xi, &yi) in x.iter().zip(&y) {
            assert!((polyval(&c, xi) - yi).abs() < 1e-5);
        }
        assert!((c[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn too_few_points() {
        assert_eq!(
            polyfit(&[1.0, 2.0], &[1.0, 2.0], 2),
            Err(FitError::InsufficientPoints { need: 3, got: 2 })
        );
    }

    #[test]
    fn identical_abscissae_are_degenerate() {
        assert_eq!(polyfit(&[4.0; 3], &[1.0, 2.0, 3.0], 1), Err(FitError::Degenerate));
    }

    #[test]
    fn two_distinct_times_cannot_carry_a_parabola() {
        let x = [0.0, 0.0, 1.0, 1.0];
        let y = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(polyfit(&x, &y, 2), Err(FitError::Degenerate));
        assert!(polyfit(&x, &y, 1).is_ok());
    }

    #[test]
    fn linspace_hits_both_ends() {
        let xs = linspace(1.0, 2.0, 5);
        assert_eq!(xs, vec![1.0, 1.25, 1.5, 1.75, 2.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(3.0, 9.0, 1), vec![3.0]);
    }

    #[test]
    fn horner_matches_expansion() {
        assert_eq!(polyval(&[1.0, -2.0, 3.0], 2.0), 3.0);
        assert_eq!(polyval(&[], 2.0), 0.0);
    }
}
