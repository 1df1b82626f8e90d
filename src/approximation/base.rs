//! Chebyshev interpolation on a single interval.
//!
//! An [`ApproximationBase`] holds the Chebyshev points of the second kind
//! mapped onto `[start, end]`:
//!
//! x_j = (start + end)/2 - (end - start)/2 · cos(πj/n),  j = 0..=n
//!
//! so the points are increasing and include both ends. A function is
//! represented either by its values at these points or by the coefficients of
//! its expansion in Chebyshev polynomials; [`calc_a`](ApproximationBase::calc_a)
//! and [`calc_p`](ApproximationBase::calc_p) convert between the two.
//! Differentiation and integration are done on the coefficients.

use crate::approximation::spline::CubicSpline;
use crate::error::{PeakInitError, Result};
use std::f64::consts::PI;

/// Default relative accuracy of adaptive fits.
pub const DEFAULT_TOLERANCE: f64 = 1e-15;

/// Order of the first grid tried by [`ApproximationBase::best_fit`].
pub const INITIAL_ORDER: usize = 8;

/// Adaptive fits stop doubling the order once it reaches this value.
pub const MAX_SIZE: usize = 1026;

/// Node grids of lower order are used as interpolated, without smoothing.
const SMOOTH_MIN_ORDER: usize = 8;

/// Spectral noise is estimated as this multiple of the median tail coefficient.
const NOISE_FACTOR: f64 = 10.0;

/// The outcome of a successful adaptive fit.
#[derive(Debug, Clone)]
pub struct BestFit {
    /// The node grid the function was resolved on.
    pub base: ApproximationBase,
    /// Function values at the nodes.
    pub y: Vec<f64>,
    /// Chebyshev coefficients of the interpolant.
    pub a: Vec<f64>,
}

/// A Chebyshev node grid of a fixed order on an interval.
#[derive(Debug, Clone, PartialEq)]
pub struct ApproximationBase {
    start: f64,
    end: f64,
    x: Vec<f64>,
    tolerance: f64,
}

impl ApproximationBase {
    /// Create a node grid of the given order (order + 1 nodes) on `[start, end]`.
    ///
    /// # Arguments
    ///
    /// * `order` - Polynomial order, at least 1
    /// * `start` - Left end of the interval
    /// * `end` - Right end of the interval, greater than `start`
    pub fn new(order: usize, start: f64, end: f64) -> Result<Self> {
        if order == 0 {
            return Err(PeakInitError::InvalidInput(
                "Approximation order must be at least 1".to_string(),
            ));
        }
        if !(start.is_finite() && end.is_finite() && start < end) {
            return Err(PeakInitError::InvalidInterval { start, end });
        }

        let mid = 0.5 * (start + end);
        let half = 0.5 * (end - start);
        let n = order as f64;
        let mut x: Vec<f64> = (0..=order)
            .map(|j| mid - half * (PI * j as f64 / n).cos())
            .collect();
        x[0] = start;
        x[order] = end;
        if order % 2 == 0 {
            x[order / 2] = mid;
        }

        Ok(Self {
            start,
            end,
            x,
            tolerance: DEFAULT_TOLERANCE,
        })
    }

    /// Set the accuracy this grid is accepted at.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn order(&self) -> usize {
        self.x.len() - 1
    }

    pub fn size(&self) -> usize {
        self.x.len()
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    /// The accuracy this grid was accepted at.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// The interpolation nodes, increasing.
    pub fn x_points(&self) -> &[f64] {
        &self.x
    }

    /// Sample a function at the nodes.
    pub fn fit<F: FnMut(f64) -> f64>(&self, mut f: F) -> Vec<f64> {
        self.x.iter().map(|&x| f(x)).collect()
    }

    /// Resample data `(xs, ys)` onto the nodes and strip spectral noise.
    ///
    /// The data are interpolated with a natural cubic spline. The Chebyshev
    /// coefficients of the result are then truncated where they fall below
    /// the noise level, which is estimated from the upper half of the
    /// spectrum.
    ///
    /// # Returns
    ///
    /// * Smoothed values at the nodes
    pub fn smooth(&self, xs: &[f64], ys: &[f64]) -> Result<Vec<f64>> {
        let spline = CubicSpline::new(xs.to_vec(), ys.to_vec())?;
        let p: Vec<f64> = self.x.iter().map(|&x| spline.evaluate(x)).collect();

        let n = self.order();
        if n < SMOOTH_MIN_ORDER {
            return Ok(p);
        }

        let mut a = self.calc_a(&p);
        let max_a = max_abs(&a);

        let mut tail: Vec<f64> = a[n / 2..].iter().map(|v| v.abs()).collect();
        tail.sort_by(|l, r| l.total_cmp(r));
        let noise = tail[tail.len() / 2];
        let threshold = (NOISE_FACTOR * noise).max(max_a * DEFAULT_TOLERANCE);

        if let Some(cut) = (1..n).find(|&k| a[k].abs() < threshold && a[k + 1].abs() < threshold) {
            log::trace!("smoothing cuts {} of {} coefficients", n + 1 - cut, n + 1);
            a[cut..].iter_mut().for_each(|v| *v = 0.0);
        }

        Ok(self.calc_p(&a))
    }

    /// Evaluate the interpolant through node values `p` at `x`.
    ///
    /// Uses the barycentric formula. Returns 0.0 outside `[start, end]`.
    pub fn eval(&self, x: f64, p: &[f64]) -> f64 {
        if x < self.start || x > self.end {
            return 0.0;
        }

        let n = self.order();
        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for (j, (&xj, &pj)) in self.x.iter().zip(p).enumerate() {
            let diff = x - xj;
            if diff == 0.0 {
                return pj;
            }
            let mut w = if j % 2 == 0 { 1.0 } else { -1.0 };
            if j == 0 || j == n {
                w *= 0.5;
            }
            let t = w / diff;
            numerator += t * pj;
            denominator += t;
        }
        numerator / denominator
    }

    /// Evaluate the interpolant through node values `p` at each of `xs`.
    pub fn eval_vector(&self, xs: &[f64], p: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.eval(x, p)).collect()
    }

    /// cos(πm/n) for m in 0..2n
    fn cos_table(&self) -> Vec<f64> {
        let n = self.order();
        (0..2 * n)
            .map(|m| (PI * m as f64 / n as f64).cos())
            .collect()
    }

    /// Chebyshev coefficients of the interpolant through node values `p`.
    pub fn calc_a(&self, p: &[f64]) -> Vec<f64> {
        let n = self.order();
        let period = 2 * n;
        let table = self.cos_table();

        let mut a: Vec<f64> = (0..=n)
            .map(|k| {
                let sum: f64 = p
                    .iter()
                    .take(n + 1)
                    .enumerate()
                    .map(|(j, &pj)| {
                        let term = pj * table[(k * (n - j)) % period];
                        if j == 0 || j == n {
                            0.5 * term
                        } else {
                            term
                        }
                    })
                    .sum();
                2.0 / n as f64 * sum
            })
            .collect();
        a[0] *= 0.5;
        a[n] *= 0.5;
        a
    }

    /// Node values of the Chebyshev series with coefficients `a`.
    ///
    /// Coefficients beyond the order of this grid are ignored.
    pub fn calc_p(&self, a: &[f64]) -> Vec<f64> {
        let n = self.order();
        let period = 2 * n;
        let table = self.cos_table();

        (0..=n)
            .map(|j| {
                a.iter()
                    .take(n + 1)
                    .enumerate()
                    .map(|(k, &ak)| ak * table[(k * (n - j)) % period])
                    .sum()
            })
            .collect()
    }

    /// Coefficients of the derivative of the series `a`.
    ///
    /// The result has the same length as `a` (its last entry is zero), so it
    /// lives on the same node grid.
    pub fn derivative(&self, a: &[f64]) -> Vec<f64> {
        let mut d = vec![0.0; a.len()];
        if a.len() < 2 {
            return d;
        }

        let n = a.len() - 1;
        for k in (1..=n).rev() {
            let next = if k < n { d[k + 1] } else { 0.0 };
            d[k - 1] = next + 2.0 * k as f64 * a[k];
        }
        d[0] *= 0.5;

        let scale = 2.0 / self.width();
        d.iter_mut().for_each(|v| *v *= scale);
        d
    }

    /// Antiderivative of the series `a`, vanishing at `start`.
    ///
    /// # Returns
    ///
    /// * A grid one order higher than this one, and the antiderivative's
    ///   coefficients on it
    pub fn integral(&self, a: &[f64]) -> Result<(ApproximationBase, Vec<f64>)> {
        let n = self.order();
        let m = n + 1;
        let coef = |k: usize| a.get(k).filter(|_| k <= n).copied().unwrap_or(0.0);

        let mut b = vec![0.0; m + 1];
        b[1] = coef(0) - 0.5 * coef(2);
        for (k, bk) in b.iter_mut().enumerate().skip(2) {
            *bk = (coef(k - 1) - coef(k + 1)) / (2.0 * k as f64);
        }

        let scale = 0.5 * self.width();
        b.iter_mut().skip(1).for_each(|v| *v *= scale);

        // T_k(-1) = (-1)^k
        b[0] = -b
            .iter()
            .enumerate()
            .skip(1)
            .map(|(k, &bk)| if k % 2 == 0 { bk } else { -bk })
            .sum::<f64>();

        let base = Self::new(m, self.start, self.end)?.with_tolerance(self.tolerance);
        Ok((base, b))
    }

    /// Definite integral over `[start, end]` of the interpolant through `p`
    /// (Clenshaw-Curtis quadrature).
    pub fn integrate(&self, p: &[f64]) -> f64 {
        let a = self.calc_a(p);
        let sum: f64 = a
            .iter()
            .enumerate()
            .step_by(2)
            .map(|(k, &ak)| ak * 2.0 / (1.0 - (k * k) as f64))
            .sum();
        0.5 * self.width() * sum
    }

    /// Fit `f` on `[start, end]` to relative accuracy `accuracy`.
    ///
    /// The order starts at 8 (or `min_order` rounded up to even, if larger)
    /// and doubles, reusing the values already computed, until the tail of
    /// the Chebyshev coefficients has decayed below `accuracy · max|a|` or
    /// the order reaches [`MAX_SIZE`]. A converged series is truncated after
    /// its last significant coefficient, but not below `min_order`.
    ///
    /// A non-positive `accuracy` selects [`DEFAULT_TOLERANCE`].
    ///
    /// # Returns
    ///
    /// * `Ok(None)` if no order below the limit reached the accuracy
    pub fn best_fit<F: FnMut(f64) -> f64>(
        start: f64,
        end: f64,
        f: F,
        min_order: usize,
        accuracy: f64,
    ) -> Result<Option<BestFit>> {
        Self::best_fit_limited(start, end, f, min_order, accuracy, MAX_SIZE)
    }

    /// [`best_fit`](Self::best_fit) with orders restricted to below `max_size`.
    pub fn best_fit_limited<F: FnMut(f64) -> f64>(
        start: f64,
        end: f64,
        mut f: F,
        min_order: usize,
        accuracy: f64,
        max_size: usize,
    ) -> Result<Option<BestFit>> {
        if !(start.is_finite() && end.is_finite() && start < end) {
            return Err(PeakInitError::InvalidInterval { start, end });
        }

        let tolerance = if accuracy > 0.0 {
            accuracy
        } else {
            DEFAULT_TOLERANCE
        };

        let mut n = INITIAL_ORDER.max(min_order + min_order % 2);
        let mut previous: Option<Vec<f64>> = None;

        while n < max_size {
            let base = Self::new(n, start, end)?.with_tolerance(tolerance);
            // Even nodes of the doubled grid are the nodes of the previous one.
            let y: Vec<f64> = match previous.take() {
                Some(half) => base
                    .x
                    .iter()
                    .enumerate()
                    .map(|(j, &x)| if j % 2 == 0 { half[j / 2] } else { f(x) })
                    .collect(),
                None => base.fit(&mut f),
            };

            let a = base.calc_a(&y);
            let max_a = max_abs(&a);
            if has_converged(&a, max_a, tolerance, 0) {
                return Self::chop(base, y, a, max_a, min_order).map(Some);
            }

            previous = Some(y);
            n *= 2;
        }

        log::debug!(
            "no Chebyshev fit of accuracy {:e} on [{}, {}] below {} points",
            tolerance,
            start,
            end,
            max_size
        );
        Ok(None)
    }

    /// Truncate a converged series after its last significant coefficient.
    fn chop(
        base: ApproximationBase,
        y: Vec<f64>,
        a: Vec<f64>,
        max_a: f64,
        min_order: usize,
    ) -> Result<BestFit> {
        let threshold = base.tolerance * max_a;
        let last = a.iter().rposition(|v| v.abs() > threshold).unwrap_or(0);
        let order = last.max(min_order.max(1));
        if order >= base.order() {
            return Ok(BestFit { base, y, a });
        }

        let chopped = Self::new(order, base.start, base.end)?.with_tolerance(base.tolerance);
        let a = a[..=order].to_vec();
        let y = chopped.calc_p(&a);
        Ok(BestFit {
            base: chopped,
            y,
            a,
        })
    }
}

/// Largest absolute value, ignoring NaN.
fn max_abs(a: &[f64]) -> f64 {
    a.iter().fold(0.0_f64, |m, v| m.max(v.abs()))
}

/// Whether the coefficient tail of `a` has decayed below `tolerance · max_a`.
///
/// Trailing zeros are skipped; the last nonzero coefficient and its
/// predecessor are averaged. Indices at or below `shift` are not inspected.
pub fn has_converged(a: &[f64], max_a: f64, tolerance: f64, shift: usize) -> bool {
    if a.iter().any(|v| !v.is_finite()) {
        return false;
    }
    if a.len() < 3 || max_a == 0.0 {
        return true;
    }

    for i in (shift + 1..a.len()).rev() {
        if a[i] != 0.0 {
            return (a[i].abs() + a[i - 1].abs()) / (2.0 * max_a) < tolerance;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_nodes_are_increasing_and_include_ends() {
        let base = ApproximationBase::new(10, -2.0, 3.0).unwrap();
        let x = base.x_points();

        assert_eq!(base.size(), 11);
        assert_eq!(x[0], -2.0);
        assert_eq!(x[10], 3.0);
        assert_eq!(x[5], 0.5);
        assert!(x.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_invalid_grid() {
        assert!(ApproximationBase::new(0, 0.0, 1.0).is_err());
        assert!(ApproximationBase::new(4, 1.0, 1.0).is_err());
        assert!(ApproximationBase::new(4, 0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_coefficients_of_polynomial() {
        // 2x² - 1 = T_2(x), plus 3·T_1
        let base = ApproximationBase::new(6, -1.0, 1.0).unwrap();
        let p = base.fit(|x| 2.0 * x * x - 1.0 + 3.0 * x);
        let a = base.calc_a(&p);

        assert_abs_diff_eq!(a[0], 0.0, epsilon = 1e-14);
        assert_abs_diff_eq!(a[1], 3.0, epsilon = 1e-14);
        assert_abs_diff_eq!(a[2], 1.0, epsilon = 1e-14);
        for &ak in &a[3..] {
            assert_abs_diff_eq!(ak, 0.0, epsilon = 1e-14);
        }

        let back = base.calc_p(&a);
        for (u, v) in back.iter().zip(&p) {
            assert_abs_diff_eq!(u, v, epsilon = 1e-13);
        }
    }

    #[test]
    fn test_eval_between_nodes() {
        let base = ApproximationBase::new(20, 0.0, 2.0).unwrap();
        let p = base.fit(f64::exp);

        assert_relative_eq!(base.eval(0.123, &p), 0.123f64.exp(), max_relative = 1e-13);
        assert_eq!(base.eval(base.x_points()[3], &p), p[3]);
        assert_eq!(base.eval(2.5, &p), 0.0);
        assert_eq!(base.eval_vector(&[-1.0, 1.0], &p)[0], 0.0);
    }

    #[test]
    fn test_derivative_of_cubic() {
        let base = ApproximationBase::new(5, -1.0, 3.0).unwrap();
        let p = base.fit(|x| x * x * x - 2.0 * x);
        let d = base.derivative(&base.calc_a(&p));
        let dp = base.calc_p(&d);

        assert_eq!(d.len(), 6);
        assert_eq!(d[5], 0.0);
        for (&x, &v) in base.x_points().iter().zip(&dp) {
            assert_abs_diff_eq!(v, 3.0 * x * x - 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_integral_vanishes_at_start() {
        let base = ApproximationBase::new(12, 1.0, 2.0).unwrap();
        let p = base.fit(|x| x.cos());
        let (ibase, b) = base.integral(&base.calc_a(&p)).unwrap();
        let ip = ibase.calc_p(&b);

        assert_eq!(ibase.order(), 13);
        assert_abs_diff_eq!(ip[0], 0.0, epsilon = 1e-14);
        assert_abs_diff_eq!(
            ibase.eval(1.7, &ip),
            1.7f64.sin() - 1.0f64.sin(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_integrate() {
        let base = ApproximationBase::new(16, 0.0, 1.0).unwrap();
        let p = base.fit(|x| x.exp());
        assert_relative_eq!(base.integrate(&p), 1.0f64.exp() - 1.0, max_relative = 1e-14);
    }

    #[test]
    fn test_best_fit_quadratic_is_chopped() {
        let fit = ApproximationBase::best_fit(-1.0, 4.0, |x| (x - 1.0).powi(2) + 0.5, 0, 1e-12)
            .unwrap()
            .unwrap();

        assert_eq!(fit.base.size(), 3);
        assert_abs_diff_eq!(fit.base.eval(2.0, &fit.y), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_best_fit_respects_min_order() {
        let fit = ApproximationBase::best_fit(0.0, 1.0, |x| 2.0 * x, 5, 1e-12)
            .unwrap()
            .unwrap();
        assert_eq!(fit.base.order(), 5);
    }

    #[test]
    fn test_best_fit_fails_on_discontinuity() {
        let fit = ApproximationBase::best_fit_limited(
            -1.0,
            1.0,
            |x| if x < 0.1 { 0.0 } else { 1.0 },
            0,
            1e-10,
            100,
        )
        .unwrap();
        assert!(fit.is_none());
    }

    #[test]
    fn test_has_converged() {
        assert!(has_converged(&[1.0, 0.5, 1e-17, 1e-17], 1.0, 1e-15, 0));
        assert!(!has_converged(&[1.0, 0.5, 1e-3, 1e-4], 1.0, 1e-15, 0));
        assert!(has_converged(&[1.0, 0.5, 1e-17, 1e-17, 0.0, 0.0], 1.0, 1e-15, 0));
        assert!(has_converged(&[0.0, 0.0, 0.0], 0.0, 1e-15, 0));
        assert!(!has_converged(&[1.0, f64::NAN, 0.0], 1.0, 1e-15, 0));
    }

    #[test]
    fn test_smooth_removes_noise() {
        let n = 201;
        let xs: Vec<f64> = (0..n)
            .map(|i| -5.0 + 10.0 * i as f64 / (n - 1) as f64)
            .collect();
        let clean: Vec<f64> = xs.iter().map(|x| (-x * x / 2.0).exp()).collect();
        // deterministic high-frequency wobble
        let noisy: Vec<f64> = clean
            .iter()
            .enumerate()
            .map(|(i, y)| y + if i % 2 == 0 { 1e-3 } else { -1e-3 })
            .collect();

        let base = ApproximationBase::new(n - 1, xs[0], xs[n - 1]).unwrap();
        let smoothed = base.smooth(&xs, &noisy).unwrap();

        let centre = base.eval(0.0, &smoothed);
        assert_abs_diff_eq!(centre, 1.0, epsilon = 5e-3);
    }
}
