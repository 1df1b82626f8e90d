//! Natural cubic spline used to resample scattered data onto a node grid.

use crate::error::{PeakInitError, Result};

/// A natural cubic spline interpolator for real-valued data.
///
/// Given n data points (x_i, y_i), constructs piecewise cubic polynomials
/// with continuous first and second derivatives and zero curvature at the ends.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    /// Sorted x values (knots).
    xs: Vec<f64>,
    /// Corresponding y values.
    ys: Vec<f64>,
    /// Second derivatives at each knot (computed during construction).
    y2s: Vec<f64>,
}

impl CubicSpline {
    /// Construct a natural cubic spline from data points.
    ///
    /// # Arguments
    ///
    /// * `xs` - Strictly increasing x values
    /// * `ys` - Corresponding y values (same length as `xs`)
    ///
    /// # Returns
    ///
    /// * The spline, or an error if the lengths differ, fewer than 2 points are
    ///   given, or `xs` is not strictly increasing
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Result<Self> {
        if xs.len() != ys.len() {
            return Err(PeakInitError::DimensionMismatch(format!(
                "Spline needs equal numbers of x and y values, got {} and {}",
                xs.len(),
                ys.len()
            )));
        }
        if xs.len() < 2 {
            return Err(PeakInitError::InvalidInput(
                "Spline needs at least 2 data points".to_string(),
            ));
        }
        if let Some(i) = xs.windows(2).position(|w| w[1] <= w[0]) {
            return Err(PeakInitError::InvalidInput(format!(
                "Spline x values must be strictly increasing at index {}",
                i + 1
            )));
        }

        let n = xs.len();
        let mut y2s = vec![0.0; n];
        let mut u = vec![0.0; n - 1];

        // Forward sweep of the tridiagonal system
        for i in 1..n - 1 {
            let sig = (xs[i] - xs[i - 1]) / (xs[i + 1] - xs[i - 1]);
            let p = sig * y2s[i - 1] + 2.0;
            y2s[i] = (sig - 1.0) / p;
            u[i] = (ys[i + 1] - ys[i]) / (xs[i + 1] - xs[i])
                - (ys[i] - ys[i - 1]) / (xs[i] - xs[i - 1]);
            u[i] = (6.0 * u[i] / (xs[i + 1] - xs[i - 1]) - sig * u[i - 1]) / p;
        }

        // Back substitution
        for k in (0..n - 2).rev() {
            y2s[k + 1] = y2s[k + 1] * y2s[k + 2] + u[k + 1];
        }

        Ok(Self { xs, ys, y2s })
    }

    /// Evaluate the spline at a given x value.
    ///
    /// Outside the data range the boundary cubic is extrapolated.
    pub fn evaluate(&self, x: f64) -> f64 {
        let n = self.xs.len();
        let hi = self.xs.partition_point(|&v| v <= x).clamp(1, n - 1);
        let lo = hi - 1;

        let h = self.xs[hi] - self.xs[lo];
        let a = (self.xs[hi] - x) / h;
        let b = (x - self.xs[lo]) / h;

        a * self.ys[lo]
            + b * self.ys[hi]
            + ((a * a * a - a) * self.y2s[lo] + (b * b * b - b) * self.y2s[hi]) * h * h / 6.0
    }
}
