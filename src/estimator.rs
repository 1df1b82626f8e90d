//! Initial parameter values for peak models, estimated from data.
//!
//! The data are approximated by a smoothed Chebyshev interpolant. Its first
//! and second derivatives locate the peak centre and inflection points, which
//! are translated into the width parameters of each peak type the estimator
//! knows. Only peaks with a width or shape parameter the caller has not set
//! are touched, and values written keep the explicit flag of the value they
//! replace.

use crate::approximation::{ApproximationBase, PiecewiseApproximation};
use crate::domain::{FunctionDomain1D, FunctionValues};
use crate::error::{PeakInitError, Result};
use crate::features::{peak_centre, peak_hwhm, peak_left_right_width, peak_width};
use crate::model::{Model, ModelKind};
use ndarray::Array1;

/// Width or shape parameters that make a peak type eligible for estimation.
const PEAK_REGISTRY: &[(ModelKind, &[&str])] = &[
    (ModelKind::Gaussian, &["Sigma"]),
    (ModelKind::Lorentzian, &["FWHM"]),
    (ModelKind::BackToBackExponential, &["A", "B", "S"]),
];

fn required_parameters(kind: ModelKind) -> Option<&'static [&'static str]> {
    PEAK_REGISTRY
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, names)| *names)
}

/// Write an estimate, leaving the parameter alone if the value is not finite.
///
/// The parameter keeps its explicit flag: an estimate only counts as
/// explicit if the value it replaces was.
fn set_estimate(function: &mut dyn Model, name: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        let i = function.parameter_index(name)?;
        let explicit = function.is_explicitly_set(i)?;
        function.set_parameter(i, value, explicit)
    } else {
        log::debug!("discarding non-finite estimate {} for {}", value, name);
        Ok(())
    }
}

/// Shape of a peak model sampled on a fixed grid.
struct TrialPeak {
    centre: f64,
    height: f64,
    hwhm: (f64, f64),
}

impl TrialPeak {
    fn sample(function: &dyn Model, base: &ApproximationBase, near: f64) -> Result<Self> {
        let x = Array1::from_vec(base.x_points().to_vec());
        let y = function.eval(&x)?.to_vec();
        let trial = PiecewiseApproximation::from_node_values(base.clone(), y)?;

        let centre = peak_centre(near, &trial.derivative());
        let height = trial.eval(centre);
        let hwhm = peak_hwhm(centre, height, &trial);
        Ok(Self {
            centre,
            height,
            hwhm,
        })
    }
}

/// Estimates initial values of peak width and shape parameters.
///
/// ```rust
/// use peakinit_rs::domain::{FunctionDomain1D, FunctionValues};
/// use peakinit_rs::estimator::ParameterEstimator;
/// use peakinit_rs::model::Model;
/// use peakinit_rs::models::gaussian_peak;
///
/// let domain = FunctionDomain1D::linspace(-10.0, 10.0, 201).unwrap();
/// let values = FunctionValues::from_fn(&domain, |x| 3.0 * (-x * x / 2.0).exp());
///
/// let mut peak = gaussian_peak(3.0, 0.0).unwrap();
/// ParameterEstimator::estimate(&mut peak, &domain, &values).unwrap();
///
/// let sigma = peak.get_parameter_by_name("Sigma").unwrap();
/// assert!((sigma - 1.0).abs() < 0.2);
/// ```
pub struct ParameterEstimator;

impl ParameterEstimator {
    /// Fewer data points than this in range skip estimation.
    pub const MIN_DATA_POINTS: usize = 3;

    /// Width correction used when the trial peak has zero width.
    pub const FALLBACK_RATIO: f64 = 100.0;

    /// Trial windows extend at least this many widths `S` from the centre.
    pub const WINDOW_WIDTHS: f64 = 3.0;

    /// Trial windows extend at most this far right of the centre.
    pub const RIGHT_WINDOW_CAP: f64 = 10.0;

    /// Order of the grid trial peaks are sampled on.
    pub const TRIAL_ORDER: usize = 100;

    /// Whether any peak in `function` has an unset width or shape parameter.
    pub fn need_setting_initial_values(function: &dyn Model) -> bool {
        match function.kind() {
            ModelKind::Composite => function
                .components()
                .iter()
                .any(|child| Self::need_setting_initial_values(child.as_ref())),
            kind => required_parameters(kind).is_some_and(|names| {
                names.iter().any(|name| {
                    function
                        .parameter_index(name)
                        .and_then(|i| function.is_explicitly_set(i))
                        .map(|set| !set)
                        .unwrap_or(false)
                })
            }),
        }
    }

    /// The data points within `range`, by default the whole domain.
    ///
    /// # Returns
    ///
    /// * `(xs, ys)`, both empty if the range is degenerate or holds fewer than
    ///   [`MIN_DATA_POINTS`](Self::MIN_DATA_POINTS) points
    pub fn extract_values(
        domain: &FunctionDomain1D,
        values: &FunctionValues,
        range: Option<(f64, f64)>,
    ) -> Result<(Vec<f64>, Vec<f64>)> {
        if values.len() != domain.len() {
            return Err(PeakInitError::DimensionMismatch(format!(
                "Domain has {} points but {} values were given",
                domain.len(),
                values.len()
            )));
        }

        let (start, end) = match (range, domain.first(), domain.last()) {
            (Some(range), _, _) => range,
            (None, Some(first), Some(last)) => (first, last),
            _ => return Ok((Vec::new(), Vec::new())),
        };
        if !(start < end) {
            return Ok((Vec::new(), Vec::new()));
        }

        let x = domain.as_slice();
        let i0 = x.partition_point(|&v| v < start);
        let i1 = x.partition_point(|&v| v <= end);
        if i1 < i0 + Self::MIN_DATA_POINTS {
            return Ok((Vec::new(), Vec::new()));
        }

        Ok((x[i0..i1].to_vec(), values.data()[i0..i1].to_vec()))
    }

    /// Fill in unset width and shape parameters of the peaks in `function`.
    ///
    /// Does nothing if no peak needs values or there is too little data.
    pub fn estimate(
        function: &mut dyn Model,
        domain: &FunctionDomain1D,
        values: &FunctionValues,
    ) -> Result<()> {
        if !Self::need_setting_initial_values(function) {
            log::debug!("{}: all peak widths are set", function.name());
            return Ok(());
        }

        let (xs, ys) = Self::extract_values(domain, values, None)?;
        if xs.is_empty() {
            log::debug!("{}: not enough data to estimate from", function.name());
            return Ok(());
        }

        let fun = PiecewiseApproximation::from_data(&xs, &ys)?;
        let der1 = fun.derivative();
        let der2 = der1.derivative();
        Self::set_values(function, &fun, &der1, &der2)
    }

    fn set_values(
        function: &mut dyn Model,
        fun: &PiecewiseApproximation,
        der1: &PiecewiseApproximation,
        der2: &PiecewiseApproximation,
    ) -> Result<()> {
        if function.kind() == ModelKind::Composite {
            for child in function.components_mut() {
                Self::set_values(child.as_mut(), fun, der1, der2)?;
            }
            return Ok(());
        }

        if !Self::need_setting_initial_values(function) {
            return Ok(());
        }

        match function.kind() {
            ModelKind::Gaussian => {
                let centre = function.get_parameter_by_name("PeakCentre")?;
                let width = peak_width(centre, der2);
                if width > 0.0 {
                    set_estimate(function, "Sigma", width)?;
                }
            }
            ModelKind::Lorentzian => {
                // inflection points of a Lorentzian lie at ±FWHM / (2√3)
                let centre = function.get_parameter_by_name("PeakCentre")?;
                let width = peak_width(centre, der2);
                if width > 0.0 {
                    set_estimate(function, "FWHM", 2.0 * 3f64.sqrt() * width)?;
                }
            }
            ModelKind::BackToBackExponential => {
                Self::set_back_to_back(function, fun, der1, der2)?;
            }
            ModelKind::Composite | ModelKind::Other => {}
        }
        Ok(())
    }

    fn set_back_to_back(
        function: &mut dyn Model,
        fun: &PiecewiseApproximation,
        der1: &PiecewiseApproximation,
        der2: &PiecewiseApproximation,
    ) -> Result<()> {
        let centre = peak_centre(function.get_parameter_by_name("X0")?, der1);
        let s = peak_width(centre, der2);

        // Linear background through the outer extent of the peak
        let (xl, xr) = peak_left_right_width(centre, der2, 2);
        let (yl, yr) = (fun.eval(xl), fun.eval(xr));
        let background = |x: f64| {
            if xr > xl {
                yl + (yr - yl) * (x - xl) / (xr - xl)
            } else {
                yl.min(yr)
            }
        };
        let peak = fun.map_values(|x, y| y - background(x));
        let height = peak.eval(centre);
        let data_hwhm = peak_hwhm(centre, height, &peak);

        set_estimate(function, "S", s)?;
        set_estimate(function, "X0", centre)?;
        let intensity = function.get_parameter_by_name("I")?;
        if intensity == 0.0 {
            set_estimate(function, "I", 1.0)?;
        }

        let a = function.get_parameter_by_name("A")?;
        let b = function.get_parameter_by_name("B")?;
        let window = Self::WINDOW_WIDTHS * s;
        let start = centre - (1.0 / a).max(window);
        let end = centre + (1.0 / b).max(window).min(Self::RIGHT_WINDOW_CAP);
        if !(start.is_finite() && end.is_finite() && start < end) {
            log::debug!(
                "{}: no usable trial window [{}, {}]",
                function.name(),
                start,
                end
            );
            return Ok(());
        }
        let base = ApproximationBase::new(Self::TRIAL_ORDER, start, end)?;

        let trial = TrialPeak::sample(function, &base, centre)?;
        let ratio = |data: f64, trial: f64| {
            if trial == 0.0 {
                Self::FALLBACK_RATIO
            } else {
                data / trial
            }
        };

        if data_hwhm.0 == 0.0 {
            let i = function.parameter_index("A")?;
            function.fix(i)?;
        } else {
            set_estimate(function, "A", a / ratio(data_hwhm.0, trial.hwhm.0))?;
        }
        if data_hwhm.1 == 0.0 {
            let i = function.parameter_index("B")?;
            function.fix(i)?;
        } else {
            set_estimate(function, "B", b / ratio(data_hwhm.1, trial.hwhm.1))?;
        }

        // New decay rates move the maximum; measure it again before matching.
        let corrected = TrialPeak::sample(function, &base, trial.centre)?;
        let x0 = function.get_parameter_by_name("X0")?;
        set_estimate(function, "X0", x0 + centre - corrected.centre)?;
        if corrected.height != 0.0 {
            let intensity = function.get_parameter_by_name("I")?;
            set_estimate(function, "I", intensity * height / corrected.height)?;
        }

        log::debug!(
            "{}: centre {:.6}, height {:.6}, S {:.6}",
            function.name(),
            centre,
            height,
            s
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        gaussian_peak, BackToBackExponentialModel, CompositeModel, GaussianModel, LinearModel,
        LorentzianModel,
    };
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_need_setting_initial_values() {
        let mut gaussian = GaussianModel::new();
        assert!(ParameterEstimator::need_setting_initial_values(&gaussian));

        gaussian.set_parameter_by_name("Sigma", 1.0, true).unwrap();
        assert!(!ParameterEstimator::need_setting_initial_values(&gaussian));

        let line = LinearModel::new();
        assert!(!ParameterEstimator::need_setting_initial_values(&line));

        let composite = CompositeModel::new()
            .with(LinearModel::new())
            .with(CompositeModel::new().with(LorentzianModel::new()));
        assert!(ParameterEstimator::need_setting_initial_values(&composite));

        let mut b2b = BackToBackExponentialModel::new();
        for name in ["A", "B"] {
            b2b.set_parameter_by_name(name, 1.0, true).unwrap();
        }
        assert!(ParameterEstimator::need_setting_initial_values(&b2b));
        b2b.set_parameter_by_name("S", 1.0, true).unwrap();
        assert!(!ParameterEstimator::need_setting_initial_values(&b2b));
    }

    #[test]
    fn test_extract_values() {
        let domain = FunctionDomain1D::linspace(0.0, 9.0, 10).unwrap();
        let values = FunctionValues::from_fn(&domain, |x| 2.0 * x);

        let (xs, ys) = ParameterEstimator::extract_values(&domain, &values, None).unwrap();
        assert_eq!(xs.len(), 10);
        assert_eq!(ys[9], 18.0);

        let (xs, ys) =
            ParameterEstimator::extract_values(&domain, &values, Some((2.5, 6.0))).unwrap();
        assert_eq!(xs, vec![3.0, 4.0, 5.0, 6.0]);
        assert_eq!(ys, vec![6.0, 8.0, 10.0, 12.0]);

        let (xs, _) =
            ParameterEstimator::extract_values(&domain, &values, Some((2.5, 4.0))).unwrap();
        assert!(xs.is_empty());

        let (xs, _) =
            ParameterEstimator::extract_values(&domain, &values, Some((5.0, 5.0))).unwrap();
        assert!(xs.is_empty());

        let short = FunctionValues::new(vec![1.0; 3]);
        assert!(ParameterEstimator::extract_values(&domain, &short, None).is_err());
    }

    #[test]
    fn test_estimate_skips_without_data() {
        let domain = FunctionDomain1D::linspace(0.0, 1.0, 2).unwrap();
        let values = FunctionValues::new(vec![1.0, 2.0]);
        let mut model = GaussianModel::new();

        ParameterEstimator::estimate(&mut model, &domain, &values).unwrap();
        assert_eq!(model.get_parameter_by_name("Sigma").unwrap(), 1.0);
    }

    #[test]
    fn test_gaussian_sigma() {
        let domain = FunctionDomain1D::linspace(-10.0, 10.0, 201).unwrap();
        let values = FunctionValues::from_fn(&domain, |x| {
            let u = (x - 0.5) / 1.5;
            4.0 * (-0.5 * u * u).exp()
        });
        let mut model = gaussian_peak(4.0, 0.5).unwrap();

        ParameterEstimator::estimate(&mut model, &domain, &values).unwrap();

        let i = model.parameter_index("Sigma").unwrap();
        assert_abs_diff_eq!(model.get_parameter(i).unwrap(), 1.5, epsilon = 0.2);
        assert!(!model.is_explicitly_set(i).unwrap());
    }

    #[test]
    fn test_lorentzian_fwhm() {
        let domain = FunctionDomain1D::linspace(-10.0, 10.0, 401).unwrap();
        let values = FunctionValues::from_fn(&domain, |x| 1.0 / (1.0 + x * x));
        let mut model = LorentzianModel::new();

        ParameterEstimator::estimate(&mut model, &domain, &values).unwrap();

        assert_abs_diff_eq!(
            model.get_parameter_by_name("FWHM").unwrap(),
            2.0,
            epsilon = 0.3
        );
    }

    #[test]
    fn test_composite_leaves_background_alone() {
        let domain = FunctionDomain1D::linspace(-8.0, 8.0, 161).unwrap();
        let values =
            FunctionValues::from_fn(&domain, |x| 0.5 + 0.1 * x + 3.0 * (-x * x / 2.0).exp());

        let mut model = CompositeModel::new()
            .with(LinearModel::with_coefficients(0.5, 0.1).unwrap())
            .with(gaussian_peak(3.0, 0.0).unwrap());

        ParameterEstimator::estimate(&mut model, &domain, &values).unwrap();

        assert_eq!(model.get_parameter_by_name("f0.A0").unwrap(), 0.5);
        assert_eq!(model.get_parameter_by_name("f0.A1").unwrap(), 0.1);
        assert_abs_diff_eq!(
            model.get_parameter_by_name("f1.Sigma").unwrap(),
            1.0,
            epsilon = 0.2
        );
    }
}
