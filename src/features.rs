//! Peak features read off a function approximation and its derivatives.
//!
//! All results are limited to the resolution of the approximation's node
//! grid: positions are node positions or linear interpolations between
//! neighbouring nodes.

use crate::approximation::PiecewiseApproximation;

/// Positions of the `n`-th sign change of `der2` to the left and right of `centre`.
///
/// Starting from the nodes on either side of `centre`, the node values of
/// `der2` are walked outwards and every change of sign is counted. With
/// `n = 1` and `der2` the second derivative of a peak, this gives the
/// inflection points; `n = 2` gives the outer extent of the peak.
///
/// # Returns
///
/// * `(left, right)` node positions; a side without `n` changes yields the
///   corresponding bound of `der2`
pub fn peak_left_right_width(centre: f64, der2: &PiecewiseApproximation, n: usize) -> (f64, f64) {
    let x = der2.x_points();
    let y = der2.y_points();
    let positive = der2.eval(centre) > 0.0;
    let split = x.partition_point(|&v| v <= centre);

    let nth_change = |indices: &mut dyn Iterator<Item = usize>| -> Option<f64> {
        let mut sign = positive;
        let mut changes = 0;
        for j in indices {
            let s = y[j] > 0.0;
            if s != sign {
                sign = s;
                changes += 1;
                if changes == n {
                    return Some(x[j]);
                }
            }
        }
        None
    };

    let left = nth_change(&mut (0..split).rev()).unwrap_or_else(|| der2.start());
    let right = nth_change(&mut (split..x.len())).unwrap_or_else(|| der2.end());
    (left, right)
}

/// Half the distance between the inflection points around `centre`.
pub fn peak_width(centre: f64, der2: &PiecewiseApproximation) -> f64 {
    let (left, right) = peak_left_right_width(centre, der2, 1);
    (right - left).abs() / 2.0
}

/// The stationary point of the function nearest `centre`.
///
/// `der1` is the first derivative; if it has no roots, `centre` is returned.
pub fn peak_centre(centre: f64, der1: &PiecewiseApproximation) -> f64 {
    der1.rough_roots(0.0)
        .into_iter()
        .min_by(|a, b| (a - centre).abs().total_cmp(&(b - centre).abs()))
        .unwrap_or(centre)
}

/// Half widths at half maximum of a peak of `height` at `centre`.
///
/// The crossings of `height / 2` nearest `centre` on either side are taken
/// from `fun`. If fewer than two crossings exist at all, or one side has
/// none, the bounds of `fun` stand in.
///
/// # Returns
///
/// * `(left, right)` displacements from `centre`, both non-negative for a
///   centre inside `fun`'s interval
pub fn peak_hwhm(centre: f64, height: f64, fun: &PiecewiseApproximation) -> (f64, f64) {
    let roots = fun.rough_roots(height / 2.0);
    if roots.len() < 2 {
        return (centre - fun.start(), fun.end() - centre);
    }

    let left = roots
        .iter()
        .copied()
        .filter(|&r| r < centre)
        .reduce(f64::max)
        .unwrap_or_else(|| fun.start());
    let right = roots
        .iter()
        .copied()
        .filter(|&r| r > centre)
        .reduce(f64::min)
        .unwrap_or_else(|| fun.end());

    (centre - left, right - centre)
}
