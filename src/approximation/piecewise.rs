//! Piecewise Chebyshev approximations of a function on an interval.

use crate::approximation::base::{ApproximationBase, BestFit, MAX_SIZE};
use crate::error::{PeakInitError, Result};
use std::cell::OnceCell;

/// Adaptive splitting gives up after this many bisections.
pub const MAX_SPLIT_DEPTH: usize = 10;

/// One polynomial piece: a node grid, the values on it, and (computed on
/// first use) its Chebyshev coefficients.
#[derive(Debug, Clone)]
pub struct Segment {
    base: ApproximationBase,
    y: Vec<f64>,
    a: OnceCell<Vec<f64>>,
}

impl Segment {
    fn new(base: ApproximationBase, y: Vec<f64>) -> Self {
        Self {
            base,
            y,
            a: OnceCell::new(),
        }
    }

    fn with_coefficients(base: ApproximationBase, y: Vec<f64>, a: Vec<f64>) -> Self {
        Self {
            base,
            y,
            a: OnceCell::from(a),
        }
    }

    pub fn base(&self) -> &ApproximationBase {
        &self.base
    }

    pub fn x_points(&self) -> &[f64] {
        self.base.x_points()
    }

    pub fn y_points(&self) -> &[f64] {
        &self.y
    }

    /// Chebyshev coefficients of this piece.
    pub fn coefficients(&self) -> &[f64] {
        self.a.get_or_init(|| self.base.calc_a(&self.y))
    }

    pub fn start(&self) -> f64 {
        self.base.start()
    }

    pub fn end(&self) -> f64 {
        self.base.end()
    }

    pub fn eval(&self, x: f64) -> f64 {
        self.base.eval(x, &self.y)
    }

    fn derivative(&self) -> Segment {
        let d = self.base.derivative(self.coefficients());
        let y = self.base.calc_p(&d);
        Segment::with_coefficients(self.base.clone(), y, d)
    }
}

impl From<BestFit> for Segment {
    fn from(fit: BestFit) -> Self {
        Segment::with_coefficients(fit.base, fit.y, fit.a)
    }
}

/// A function approximated by contiguous polynomial segments.
///
/// Approximations are immutable: [`derivative`](Self::derivative) and
/// [`integral`](Self::integral) return new ones.
#[derive(Debug, Clone)]
pub struct PiecewiseApproximation {
    segments: Vec<Segment>,
    good: bool,
}

impl PiecewiseApproximation {
    /// A single segment of the given order through samples of `f`.
    pub fn fixed<F: FnMut(f64) -> f64>(order: usize, start: f64, end: f64, f: F) -> Result<Self> {
        let base = ApproximationBase::new(order, start, end)?;
        let y = base.fit(f);
        Ok(Self {
            segments: vec![Segment::new(base, y)],
            good: true,
        })
    }

    /// A single segment fitted adaptively to `accuracy`.
    ///
    /// If no order reaches the accuracy, a segment of `fallback_order` is
    /// built instead and [`is_good`](Self::is_good) reports `false`.
    pub fn adaptive<F: FnMut(f64) -> f64>(
        start: f64,
        end: f64,
        mut f: F,
        accuracy: f64,
        fallback_order: usize,
    ) -> Result<Self> {
        match ApproximationBase::best_fit(start, end, &mut f, 0, accuracy)? {
            Some(fit) => Ok(Self {
                segments: vec![fit.into()],
                good: true,
            }),
            None => {
                log::debug!(
                    "falling back to order {} on [{}, {}]",
                    fallback_order,
                    start,
                    end
                );
                let mut approx = Self::fixed(fallback_order, start, end, &mut f)?;
                approx.good = false;
                Ok(approx)
            }
        }
    }

    /// A single smoothed segment through sampled data.
    ///
    /// The segment spans `xs[0]..=xs[last]` and has one node per data point.
    pub fn from_data(xs: &[f64], ys: &[f64]) -> Result<Self> {
        if xs.len() != ys.len() {
            return Err(PeakInitError::DimensionMismatch(format!(
                "Expected {} y values, got {}",
                xs.len(),
                ys.len()
            )));
        }
        if xs.len() < 2 {
            return Err(PeakInitError::InvalidInput(
                "Need at least 2 data points to approximate".to_string(),
            ));
        }

        let base = ApproximationBase::new(xs.len() - 1, xs[0], xs[xs.len() - 1])?;
        let y = base.smooth(xs, ys)?;
        Ok(Self {
            segments: vec![Segment::new(base, y)],
            good: true,
        })
    }

    /// A single segment from values already computed on `base`.
    pub fn from_node_values(base: ApproximationBase, y: Vec<f64>) -> Result<Self> {
        if y.len() != base.size() {
            return Err(PeakInitError::DimensionMismatch(format!(
                "Expected {} node values, got {}",
                base.size(),
                y.len()
            )));
        }
        Ok(Self {
            segments: vec![Segment::new(base, y)],
            good: true,
        })
    }

    /// Fit `f` to `accuracy`, bisecting the interval wherever a single
    /// polynomial does not converge.
    ///
    /// # Returns
    ///
    /// * `RecursionExhausted` if a piece still fails after
    ///   [`MAX_SPLIT_DEPTH`] bisections
    pub fn split<F: FnMut(f64) -> f64>(
        start: f64,
        end: f64,
        mut f: F,
        accuracy: f64,
    ) -> Result<Self> {
        let mut segments = Vec::new();
        Self::split_into(start, end, &mut f, accuracy, 0, &mut segments)?;
        Ok(Self {
            segments,
            good: true,
        })
    }

    fn split_into<F: FnMut(f64) -> f64>(
        start: f64,
        end: f64,
        f: &mut F,
        accuracy: f64,
        depth: usize,
        segments: &mut Vec<Segment>,
    ) -> Result<()> {
        if let Some(fit) = ApproximationBase::best_fit(start, end, &mut *f, 0, accuracy)? {
            segments.push(fit.into());
            return Ok(());
        }

        if depth >= MAX_SPLIT_DEPTH {
            log::warn!(
                "giving up splitting [{}, {}] after {} levels",
                start,
                end,
                depth
            );
            return Err(PeakInitError::RecursionExhausted { start, end, depth });
        }

        let mid = 0.5 * (start + end);
        Self::split_into(start, mid, f, accuracy, depth + 1, segments)?;
        Self::split_into(mid, end, f, accuracy, depth + 1, segments)
    }

    /// Fit `f` with at most `max_segments` segments of fewer than
    /// `max_nodes` nodes each.
    ///
    /// Where the budget runs out, a segment of `fallback_order` is used and
    /// [`is_good`](Self::is_good) reports `false`.
    pub fn bounded<F: FnMut(f64) -> f64>(
        start: f64,
        end: f64,
        mut f: F,
        accuracy: f64,
        max_segments: usize,
        max_nodes: usize,
        fallback_order: usize,
    ) -> Result<Self> {
        let mut approx = Self {
            segments: Vec::new(),
            good: true,
        };
        approx.bounded_into(
            start,
            end,
            &mut f,
            accuracy,
            max_segments.max(1),
            max_nodes.min(MAX_SIZE),
            fallback_order,
        )?;
        Ok(approx)
    }

    /// Returns the number of segments used.
    #[allow(clippy::too_many_arguments)]
    fn bounded_into<F: FnMut(f64) -> f64>(
        &mut self,
        start: f64,
        end: f64,
        f: &mut F,
        accuracy: f64,
        budget: usize,
        max_nodes: usize,
        fallback_order: usize,
    ) -> Result<usize> {
        if let Some(fit) =
            ApproximationBase::best_fit_limited(start, end, &mut *f, 0, accuracy, max_nodes)?
        {
            self.segments.push(fit.into());
            return Ok(1);
        }

        if budget <= 1 {
            let base = ApproximationBase::new(fallback_order, start, end)?;
            let y = base.fit(&mut *f);
            self.segments.push(Segment::new(base, y));
            self.good = false;
            return Ok(1);
        }

        let mid = 0.5 * (start + end);
        let left = self.bounded_into(
            start,
            mid,
            f,
            accuracy,
            budget - 1,
            max_nodes,
            fallback_order,
        )?;
        let right = self.bounded_into(
            mid,
            end,
            f,
            accuracy,
            budget.saturating_sub(left).max(1),
            max_nodes,
            fallback_order,
        )?;
        Ok(left + right)
    }

    /// Whether every segment reached the requested accuracy.
    pub fn is_good(&self) -> bool {
        self.good
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Left end of the first segment.
    pub fn start(&self) -> f64 {
        self.segments.first().map_or(0.0, |s| s.start())
    }

    /// Right end of the last segment.
    pub fn end(&self) -> f64 {
        self.segments.last().map_or(0.0, |s| s.end())
    }

    /// Total number of nodes over all segments.
    pub fn size(&self) -> usize {
        self.segments.iter().map(|s| s.base.size()).sum()
    }

    /// Highest segment order.
    pub fn order(&self) -> usize {
        self.segments
            .iter()
            .map(|s| s.base.order())
            .max()
            .unwrap_or(0)
    }

    /// Node positions of all segments in order.
    ///
    /// Interior breakpoints appear twice, once for each adjacent segment.
    pub fn x_points(&self) -> Vec<f64> {
        self.segments
            .iter()
            .flat_map(|s| s.x_points().iter().copied())
            .collect()
    }

    /// Node values of all segments in order.
    pub fn y_points(&self) -> Vec<f64> {
        self.segments
            .iter()
            .flat_map(|s| s.y.iter().copied())
            .collect()
    }

    /// Evaluate at `x` using the segment that contains it.
    ///
    /// Returns 0.0 if no segment contains `x`.
    pub fn eval(&self, x: f64) -> f64 {
        let i = self.segments.partition_point(|s| s.end() < x);
        match self.segments.get(i) {
            Some(segment) if segment.start() <= x => segment.eval(x),
            _ => 0.0,
        }
    }

    pub fn eval_vector(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.eval(x)).collect()
    }

    /// A new approximation on the same nodes with values `f(x, y)`.
    pub fn map_values<F: FnMut(f64, f64) -> f64>(&self, mut f: F) -> Self {
        let segments = self
            .segments
            .iter()
            .map(|s| {
                let y = s
                    .x_points()
                    .iter()
                    .zip(&s.y)
                    .map(|(&x, &y)| f(x, y))
                    .collect();
                Segment::new(s.base.clone(), y)
            })
            .collect();
        Self {
            segments,
            good: self.good,
        }
    }

    /// Derivative, segment by segment on the same breakpoints.
    pub fn derivative(&self) -> Self {
        Self {
            segments: self.segments.iter().map(Segment::derivative).collect(),
            good: self.good,
        }
    }

    /// Antiderivative vanishing at `start`.
    ///
    /// Only single-segment approximations support this.
    pub fn integral(&self) -> Result<Self> {
        match self.segments.as_slice() {
            [segment] => {
                let (base, b) = segment.base.integral(segment.coefficients())?;
                let y = base.calc_p(&b);
                Ok(Self {
                    segments: vec![Segment::with_coefficients(base, y, b)],
                    good: self.good,
                })
            }
            _ => Err(PeakInitError::Unsupported(format!(
                "antiderivative of an approximation with {} segments",
                self.segments.len()
            ))),
        }
    }

    /// Definite integral over `[start, end]`.
    pub fn integrate(&self) -> f64 {
        self.segments
            .iter()
            .map(|s| s.base.integrate(&s.y))
            .sum()
    }

    /// Approximate solutions of `f(x) = level`.
    ///
    /// Each sign change of `y - level` between adjacent nodes is located by
    /// linear interpolation; nodes exactly at `level` are roots themselves.
    pub fn rough_roots(&self, level: f64) -> Vec<f64> {
        let mut roots: Vec<f64> = Vec::new();
        for segment in &self.segments {
            let x = segment.x_points();
            let y = &segment.y;
            for j in 0..x.len() {
                let yj = y[j] - level;
                if yj == 0.0 {
                    if roots.last() != Some(&x[j]) {
                        roots.push(x[j]);
                    }
                    continue;
                }
                if let Some(&next) = y.get(j + 1) {
                    let yk = next - level;
                    if yj * yk < 0.0 {
                        roots.push(x[j] - yj * (x[j + 1] - x[j]) / (yk - yj));
                    }
                }
            }
        }
        roots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_eval_outside_is_zero() {
        let approx = PiecewiseApproximation::fixed(6, 0.0, 1.0, |x| x + 1.0).unwrap();
        assert_eq!(approx.eval(-0.5), 0.0);
        assert_eq!(approx.eval(1.5), 0.0);
        assert_abs_diff_eq!(approx.eval(0.3), 1.3, epsilon = 1e-14);
    }

    #[test]
    fn test_split_handles_kink() {
        let approx = PiecewiseApproximation::split(-1.0, 1.0, |x: f64| x.abs(), 1e-10).unwrap();

        assert_eq!(approx.segments().len(), 2);
        assert_eq!(approx.start(), -1.0);
        assert_eq!(approx.end(), 1.0);
        for pair in approx.segments().windows(2) {
            assert_eq!(pair[0].end(), pair[1].start());
        }
        assert_abs_diff_eq!(approx.eval(0.7), 0.7, epsilon = 1e-9);
        assert_abs_diff_eq!(approx.eval(-0.25), 0.25, epsilon = 1e-9);
    }

    #[test]
    fn test_split_gives_up_on_jump() {
        let result = PiecewiseApproximation::split(
            0.0,
            1.0,
            |x| if x < 1.0 / 3.0 { 0.0 } else { 1.0 },
            1e-12,
        );
        assert!(matches!(
            result,
            Err(PeakInitError::RecursionExhausted {
                depth: MAX_SPLIT_DEPTH,
                ..
            })
        ));
    }

    #[test]
    fn test_bounded_respects_budget() {
        let approx = PiecewiseApproximation::bounded(
            -1.0,
            1.0,
            |x| if x < 0.3 { 0.0 } else { 1.0 },
            1e-10,
            3,
            100,
            8,
        )
        .unwrap();

        assert!(!approx.is_good());
        assert!(approx.segments().len() <= 3);
        assert!(approx.segments().iter().all(|s| s.base().size() < 100));
    }

    #[test]
    fn test_bounded_quadratic() {
        let approx =
            PiecewiseApproximation::bounded(0.0, 2.0, |x| 3.0 * (x - 1.2).powi(2), 1e-10, 3, 100, 8)
                .unwrap();

        assert!(approx.is_good());
        assert_eq!(approx.segments().len(), 1);
        assert_eq!(approx.size(), 3);
    }

    #[test]
    fn test_integral_single_segment_only() {
        let approx = PiecewiseApproximation::adaptive(0.0, 1.0, |x| 2.0 * x, 1e-12, 8).unwrap();
        let integral = approx.integral().unwrap();
        assert_abs_diff_eq!(integral.eval(0.5), 0.25, epsilon = 1e-13);
        assert_abs_diff_eq!(approx.integrate(), 1.0, epsilon = 1e-13);

        let split = PiecewiseApproximation::split(-1.0, 1.0, |x: f64| x.abs(), 1e-10).unwrap();
        assert!(matches!(split.integral(), Err(PeakInitError::Unsupported(_))));
        assert_abs_diff_eq!(split.integrate(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rough_roots_at_node() {
        let approx = PiecewiseApproximation::fixed(2, -1.0, 1.0, |x| x).unwrap();
        assert_eq!(approx.rough_roots(0.0), vec![0.0]);
        assert_eq!(approx.rough_roots(5.0), Vec::<f64>::new());
    }

    #[test]
    fn test_from_data_rejects_mismatch() {
        assert!(PiecewiseApproximation::from_data(&[0.0, 1.0], &[1.0]).is_err());
        assert!(PiecewiseApproximation::from_data(&[0.0], &[1.0]).is_err());

        let base = ApproximationBase::new(3, 0.0, 1.0).unwrap();
        assert!(PiecewiseApproximation::from_node_values(base, vec![0.0; 3]).is_err());
    }
}
