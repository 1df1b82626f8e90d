//! A local search minimizer driven by 1-D approximations of the cost.
//!
//! Each iteration brackets a minimum of the cost along every parameter axis
//! and approximates the cost over the bracket with a small piecewise
//! Chebyshev approximation. If every such slice is an exact parabola and the
//! cost function can supply a Hessian, a scaled Newton step is taken.
//! Otherwise the nodes of the slices span a grid whose best point becomes the
//! new parameter vector.

use crate::approximation::PiecewiseApproximation;
use crate::cost_function::CostFunction;
use crate::error::{PeakInitError, Result};
use crate::minimizer::config::LocalSearchConfig;
use crate::minimizer::Minimizer;
use crate::utils::matrix_convert::{
    nalgebra_vec_to_ndarray, ndarray_to_nalgebra, ndarray_vec_to_nalgebra,
};
use ndarray::{Array1, Array2};

/// Set parameter `k` and evaluate the cost.
fn probe(cost: &mut dyn CostFunction, k: usize, value: f64) -> Result<f64> {
    cost.set_parameter(k, value)?;
    cost.val()
}

/// Bracket of a minimum along one axis.
#[derive(Debug, Clone, Copy)]
struct Extent {
    start: f64,
    end: f64,
    /// Relative accuracy for approximating the cost over the bracket.
    accuracy: f64,
}

/// The local search minimizer.
///
/// ```rust
/// use peakinit_rs::cost_function::{CostFunction, LeastSquaresCost};
/// use peakinit_rs::domain::{FunctionDomain1D, FunctionValues};
/// use peakinit_rs::minimizer::{LocalSearchMinimizer, Minimizer};
/// use peakinit_rs::models::LinearModel;
///
/// let domain = FunctionDomain1D::linspace(0.0, 4.0, 9).unwrap();
/// let values = FunctionValues::from_fn(&domain, |x| 1.0 + 0.5 * x);
/// let mut model = LinearModel::new();
///
/// let mut cost = LeastSquaresCost::new(&mut model, &domain, &values).unwrap();
/// let start = cost.val().unwrap();
///
/// let mut minimizer = LocalSearchMinimizer::new();
/// minimizer.initialize(&mut cost);
/// minimizer.minimize(10).unwrap();
/// assert!(minimizer.cost_function_val().unwrap() < start);
/// ```
pub struct LocalSearchMinimizer<'a> {
    config: LocalSearchConfig,
    cost: Option<&'a mut dyn CostFunction>,
}

impl<'a> Default for LocalSearchMinimizer<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> LocalSearchMinimizer<'a> {
    /// Create a new minimizer with default configuration.
    pub fn new() -> Self {
        Self::with_config(LocalSearchConfig::default())
    }

    /// Create a new minimizer with the given configuration.
    pub fn with_config(config: LocalSearchConfig) -> Self {
        Self { config, cost: None }
    }

    pub fn config(&self) -> &LocalSearchConfig {
        &self.config
    }

    /// Find a bracket of the cost minimum along axis `k`, starting from `p0`.
    ///
    /// A step of `initial_step` relative to the parameter is tried first, and
    /// its sign flipped if the cost does not decrease. While the cost keeps
    /// decreasing the step is doubled. If it increases both ways the minimum
    /// lies within one step of `p0`.
    fn find_extent(
        config: &LocalSearchConfig,
        cost: &mut dyn CostFunction,
        p0: &Array1<f64>,
        f0: f64,
        k: usize,
    ) -> Result<Extent> {
        let x0 = p0[k];
        let scale = if x0 != 0.0 { x0.abs() } else { 1.0 };
        let mut step = config.initial_step * scale;

        let mut f1 = probe(cost, k, x0 + step)?;
        if !(f1 < f0) {
            step = -step;
            f1 = probe(cost, k, x0 + step)?;
        }
        let mut best_drop = (f0 - f1).max(0.0);

        let (start, end) = if f1 < f0 {
            let mut prev = x0;
            let mut cur = x0 + step;
            let mut f_cur = f1;
            let mut bracket = None;
            for _ in 0..config.max_probes {
                step *= 2.0;
                let next = cur + step;
                let f_next = probe(cost, k, next)?;
                if f_next < f_cur {
                    best_drop = best_drop.max(f0 - f_next);
                    prev = cur;
                    cur = next;
                    f_cur = f_next;
                } else {
                    bracket = Some((prev, next));
                    break;
                }
            }
            let (a, b) = bracket.unwrap_or((x0, cur));
            (a.min(b), a.max(b))
        } else {
            (x0 - step.abs(), x0 + step.abs())
        };

        let relative = if f0 != 0.0 {
            best_drop / f0.abs()
        } else {
            best_drop
        };
        let accuracy = (1e-3 * relative).clamp(1e-14, 1e-4);
        log::trace!(
            "axis {}: bracket [{}, {}], accuracy {:e}",
            k,
            start,
            end,
            accuracy
        );
        Ok(Extent {
            start,
            end,
            accuracy,
        })
    }

    /// Approximate the cost along axis `k` over `extent`.
    fn slice(
        config: &LocalSearchConfig,
        cost: &mut dyn CostFunction,
        k: usize,
        extent: Extent,
    ) -> Result<PiecewiseApproximation> {
        let mut failure = None;
        let slice = PiecewiseApproximation::bounded(
            extent.start,
            extent.end,
            |t| {
                if failure.is_some() {
                    return f64::NAN;
                }
                match probe(cost, k, t) {
                    Ok(v) => v,
                    Err(e) => {
                        failure = Some(e);
                        f64::NAN
                    }
                }
            },
            extent.accuracy,
            config.max_segments,
            config.max_nodes,
            config.fallback_order,
        );
        match failure {
            Some(e) => Err(e),
            None => slice,
        }
    }

    /// Evaluate the cost over the grid spanned by `nodes` and commit the best
    /// point, or `p0` if no grid point improves on `f0`.
    ///
    /// Grid points are visited with a mixed-radix counter whose first axis
    /// runs fastest. Only the axes whose digit changed are written to the
    /// cost function before each evaluation.
    fn grid_search(
        cost: &mut dyn CostFunction,
        p0: &Array1<f64>,
        f0: f64,
        nodes: &[Vec<f64>],
    ) -> Result<f64> {
        if nodes.is_empty() || nodes.iter().any(Vec::is_empty) {
            return Ok(f0);
        }

        let mut index = vec![0usize; nodes.len()];
        let mut best_cost = f0;
        let mut best_index: Option<Vec<usize>> = None;

        let mut enumerate = |cost: &mut dyn CostFunction| -> Result<()> {
            for (k, axis) in nodes.iter().enumerate() {
                cost.set_parameter(k, axis[0])?;
            }
            'grid: loop {
                let f = cost.val()?;
                if f < best_cost {
                    best_cost = f;
                    best_index = Some(index.clone());
                }

                let mut k = 0;
                loop {
                    if k == nodes.len() {
                        break 'grid;
                    }
                    index[k] += 1;
                    if index[k] < nodes[k].len() {
                        cost.set_parameter(k, nodes[k][index[k]])?;
                        break;
                    }
                    index[k] = 0;
                    cost.set_parameter(k, nodes[k][0])?;
                    k += 1;
                }
            }
            Ok(())
        };

        if let Err(e) = enumerate(cost) {
            cost.set_parameters(p0)?;
            return Err(e);
        }

        match best_index {
            Some(best) => {
                for (k, &j) in best.iter().enumerate() {
                    cost.set_parameter(k, nodes[k][j])?;
                }
            }
            None => cost.set_parameters(p0)?,
        }
        Ok(best_cost)
    }

    /// Take a Newton step scaled by the square roots of the Hessian diagonal.
    ///
    /// The step is undone if it does not lower the cost.
    ///
    /// # Returns
    ///
    /// * `SingularSystem` if a diagonal element is zero or the scaled system
    ///   cannot be solved
    fn newton_step(
        cost: &mut dyn CostFunction,
        gradient: &Array1<f64>,
        hessian: &Array2<f64>,
        p0: &Array1<f64>,
        f0: f64,
    ) -> Result<f64> {
        let n = p0.len();
        let d: Array1<f64> = hessian.diag().mapv(|v| v.abs().sqrt());
        if let Some(i) = d.iter().position(|&v| v == 0.0) {
            return Err(PeakInitError::SingularSystem(format!(
                "Hessian diagonal element {} is zero",
                i
            )));
        }

        let scaled_h = Array2::from_shape_fn((n, n), |(i, j)| hessian[[i, j]] / (d[i] * d[j]));
        let scaled_g = gradient / &d;

        let lu = ndarray_to_nalgebra(&scaled_h).lu();
        let rhs = -ndarray_vec_to_nalgebra(&scaled_g);
        let dx = lu.solve(&rhs).ok_or_else(|| {
            PeakInitError::SingularSystem("Scaled Hessian is not invertible".to_string())
        })?;
        let dp = nalgebra_vec_to_ndarray(&dx) / &d;

        cost.set_parameters(&(p0 + &dp))?;
        let f = cost.val()?;
        if f <= f0 {
            Ok(f)
        } else {
            log::debug!("Newton step raised the cost to {}, reverting", f);
            cost.set_parameters(p0)?;
            Ok(f0)
        }
    }
}

impl<'a> Minimizer<'a> for LocalSearchMinimizer<'a> {
    fn initialize(&mut self, cost_function: &'a mut dyn CostFunction) {
        self.cost = Some(cost_function);
    }

    fn iterate(&mut self, iteration: usize) -> Result<bool> {
        let config = &self.config;
        let cost: &mut dyn CostFunction = self
            .cost
            .as_deref_mut()
            .ok_or(PeakInitError::NotInitialized)?;

        let n = cost.nparams();
        if n == 0 {
            return Ok(false);
        }

        let p0 = cost.parameters()?;
        let f0 = cost.val()?;
        if !f0.is_finite() {
            return Err(PeakInitError::FunctionEvaluation(format!(
                "Cost is {} at the starting parameters",
                f0
            )));
        }

        let mut nodes = Vec::with_capacity(n);
        let mut all_quadratic = true;
        for k in 0..n {
            let extent = Self::find_extent(config, cost, &p0, f0, k);
            let slice = match extent {
                Ok(extent) => Self::slice(config, cost, k, extent),
                Err(e) => Err(e),
            };
            cost.set_parameter(k, p0[k])?;
            let slice = slice?;

            all_quadratic &= slice.segments().len() == 1 && slice.size() == 3;
            let mut x = slice.x_points();
            x.dedup();
            log::trace!("axis {}: {} grid nodes", k, x.len());
            nodes.push(x);
        }

        let derivatives = if iteration > config.newton_after && all_quadratic {
            match cost.as_fitting() {
                Some(fitting) => Some(fitting.gradient_and_hessian()?),
                None => None,
            }
        } else {
            None
        };

        let committed = match derivatives {
            Some((gradient, hessian)) => {
                log::debug!("iteration {}: Newton step", iteration);
                Self::newton_step(cost, &gradient, &hessian, &p0, f0)?
            }
            None => {
                log::debug!("iteration {}: grid search", iteration);
                Self::grid_search(cost, &p0, f0, &nodes)?
            }
        };

        log::debug!("iteration {}: cost {} -> {}", iteration, f0, committed);
        Ok(iteration + 1 < config.max_iterations)
    }

    fn cost_function_val(&self) -> Result<f64> {
        match self.cost.as_deref() {
            Some(cost) => cost.val(),
            None => Err(PeakInitError::NotInitialized),
        }
    }
}
