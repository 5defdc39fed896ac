//! Natural cubic spline interpolation.
//!
//! The coercivity inversion treats a sampled branch $B(H)$ as tabulated
//! data for the inverse map $H(B)$ and evaluates it at $B = 0$. A cubic
//! spline keeps first and second derivatives continuous between samples,
//! which matters near the zero crossing where the Chan branch is steepest.

use thiserror::Error;

/// Errors from spline construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplineError {
    #[error("Knot and value arrays differ in length ({knots} vs {values})")]
    LengthMismatch { knots: usize, values: usize },

    #[error("Need at least 2 knots, got {0}")]
    TooFewKnots(usize),

    /// Knots stop increasing at `index` and resume after `end`.
    #[error("Knots are not strictly increasing over indices {index}..={end}")]
    NotIncreasing { index: usize, end: usize },
}

/// A natural cubic spline interpolator for real-valued data.
///
/// Given $n$ knots $(x_i, y_i)$, constructs piecewise cubic polynomials
/// with continuous first and second derivatives and zero curvature at both
/// ends.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    /// Strictly increasing knot positions.
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Second derivatives at each knot.
    y2s: Vec<f64>,
}

impl CubicSpline {
    /// Build a natural cubic spline through `(xs[i], ys[i])`.
    ///
    /// # Errors
    /// Fails when the arrays differ in length, hold fewer than two knots, or
    /// when `xs` is not strictly increasing (including NaN knots). In the last
    /// case the error reports the first non-increasing run of indices.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Result<Self, SplineError> {
        if xs.len() != ys.len() {
            return Err(SplineError::LengthMismatch {
                knots: xs.len(),
                values: ys.len(),
            });
        }
        if xs.len() < 2 {
            return Err(SplineError::TooFewKnots(xs.len()));
        }
        if let Some((index, end)) = first_non_increasing_run(&xs) {
            return Err(SplineError::NotIncreasing { index, end });
        }

        let n = xs.len();
        let mut y2s = vec![0.0; n];
        let mut u = vec![0.0; n - 1];

        // Forward sweep of the tridiagonal system
        for i in 1..n - 1 {
            let sig = (xs[i] - xs[i - 1]) / (xs[i + 1] - xs[i - 1]);
            let p = sig * y2s[i - 1] + 2.0;
            y2s[i] = (sig - 1.0) / p;
            let slope_jump = (ys[i + 1] - ys[i]) / (xs[i + 1] - xs[i])
                - (ys[i] - ys[i - 1]) / (xs[i] - xs[i - 1]);
            u[i] = (6.0 * slope_jump / (xs[i + 1] - xs[i - 1]) - sig * u[i - 1]) / p;
        }

        for k in (0..n - 2).rev() {
            y2s[k + 1] = y2s[k + 1] * y2s[k + 2] + u[k + 1];
        }

        Ok(Self { xs, ys, y2s })
    }

    /// Knot range `(x_min, x_max)`.
    pub fn domain(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    /// Evaluate the spline at `x`.
    ///
    /// Outside the knot range the boundary cubic is extrapolated.
    pub fn evaluate(&self, x: f64) -> f64 {
        let hi = self
            .xs
            .partition_point(|&knot| knot <= x)
            .clamp(1, self.xs.len() - 1);
        let lo = hi - 1;

        let h = self.xs[hi] - self.xs[lo];
        let a = (self.xs[hi] - x) / h;
        let b = (x - self.xs[lo]) / h;

        a * self.ys[lo]
            + b * self.ys[hi]
            + ((a * a * a - a) * self.y2s[lo] + (b * b * b - b) * self.y2s[hi]) * h * h / 6.0
    }
}

/// First run `[start, end]` of indices where `values` fails to increase.
///
/// `start` is the last index before the violation, `end` the last index of
/// the run of non-increasing steps.
fn first_non_increasing_run(values: &[f64]) -> Option<(usize, usize)> {
    let increasing = |i: usize| values[i + 1] > values[i];
    let start = (0..values.len() - 1).find(|&i| !increasing(i))?;
    let mut end = start + 1;
    while end + 1 < values.len() && !increasing(end) {
        end += 1;
    }
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spline_passes_through_data_points() {
        let xs = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = vec![2.0, 3.0, 5.0, 4.0, 1.0];
        let spline = CubicSpline::new(xs.clone(), ys.clone()).unwrap();

        for (x, y) in xs.iter().zip(ys.iter()) {
            let result = spline.evaluate(*x);
            assert!(
                (result - y).abs() < 1e-10,
                "Spline({}) = {} but expected {}",
                x,
                result,
                y
            );
        }
    }

    #[test]
    fn test_spline_reproduces_straight_line() {
        let xs: Vec<f64> = (0..8).map(|i| -1.0 + 0.3 * i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 4.0 * x - 0.5).collect();
        let spline = CubicSpline::new(xs, ys).unwrap();
        for &x in &[-0.95, -0.1, 0.0, 0.77, 1.05] {
            assert!((spline.evaluate(x) - (4.0 * x - 0.5)).abs() < 1e-10);
        }
    }

    #[test]
    fn test_smooth_function_accuracy() {
        let xs: Vec<f64> = (0..=60).map(|i| i as f64 * 0.05).collect();
        let ys: Vec<f64> = xs.iter().map(|x| x.sin()).collect();
        let spline = CubicSpline::new(xs, ys).unwrap();
        assert!((spline.evaluate(1.234) - 1.234_f64.sin()).abs() < 1e-5);
        assert_eq!(spline.domain(), (0.0, 3.0));
    }

    #[test]
    fn test_rejects_bad_knots() {
        assert_eq!(
            CubicSpline::new(vec![0.0, 1.0], vec![0.0]).unwrap_err(),
            SplineError::LengthMismatch { knots: 2, values: 1 }
        );
        assert_eq!(
            CubicSpline::new(vec![0.0], vec![0.0]).unwrap_err(),
            SplineError::TooFewKnots(1)
        );
        assert_eq!(
            CubicSpline::new(vec![0.0, 1.0, 1.0, 0.5, 2.0], vec![0.0; 5]).unwrap_err(),
            SplineError::NotIncreasing { index: 1, end: 3 }
        );
        assert!(matches!(
            CubicSpline::new(vec![0.0, f64::NAN, 2.0], vec![0.0; 3]),
            Err(SplineError::NotIncreasing { .. })
        ));
    }
}
