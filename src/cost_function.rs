//! Cost functions minimized by the local search.
//!
//! A [`CostFunction`] exposes a flat vector of parameters and a scalar value.
//! Cost functions that come from fitting a model to data can additionally
//! provide a gradient and Hessian through [`FittingCostFunction`]; the
//! minimizer probes for this with [`CostFunction::as_fitting`].

use crate::domain::{FunctionDomain1D, FunctionValues};
use crate::error::{PeakInitError, Result};
use crate::model::Model;
use crate::utils::finite_difference;
use ndarray::{Array1, Array2, Axis};

/// A scalar function of a parameter vector.
pub trait CostFunction {
    /// Number of parameters.
    fn nparams(&self) -> usize;

    /// Current value of parameter `i`.
    fn parameter(&self, i: usize) -> Result<f64>;

    /// Set parameter `i`.
    fn set_parameter(&mut self, i: usize, value: f64) -> Result<()>;

    /// The cost at the current parameters.
    fn val(&self) -> Result<f64>;

    /// This cost function as a fitting cost function, if it is one.
    fn as_fitting(&mut self) -> Option<&mut dyn FittingCostFunction> {
        None
    }

    /// All parameter values.
    fn parameters(&self) -> Result<Array1<f64>> {
        (0..self.nparams()).map(|i| self.parameter(i)).collect()
    }

    /// Set all parameter values.
    fn set_parameters(&mut self, values: &Array1<f64>) -> Result<()> {
        if values.len() != self.nparams() {
            return Err(PeakInitError::DimensionMismatch(format!(
                "Expected {} parameters, got {}",
                self.nparams(),
                values.len()
            )));
        }
        for (i, &v) in values.iter().enumerate() {
            self.set_parameter(i, v)?;
        }
        Ok(())
    }
}

/// A cost function with derivative information.
pub trait FittingCostFunction: CostFunction {
    /// Gradient and Hessian of the cost at the current parameters.
    fn gradient_and_hessian(&mut self) -> Result<(Array1<f64>, Array2<f64>)>;
}

/// Weighted least squares of a model against data.
///
/// The cost is `Σ wᵢ (f(xᵢ) − yᵢ)²` over the model's active parameters.
/// Parameters keep their explicitly-set state while being probed.
pub struct LeastSquaresCost<'a, M: Model + ?Sized> {
    model: &'a mut M,
    x: Array1<f64>,
    y: Array1<f64>,
    weights: Array1<f64>,
    active: Vec<usize>,
}

impl<'a, M: Model + ?Sized> LeastSquaresCost<'a, M> {
    /// Create a cost function for `model` fitted to `values` on `domain`.
    ///
    /// # Arguments
    ///
    /// * `model` - The model; its active parameters become the cost parameters
    /// * `domain` - The x values
    /// * `values` - Observed values and weights, one per domain point
    pub fn new(
        model: &'a mut M,
        domain: &FunctionDomain1D,
        values: &FunctionValues,
    ) -> Result<Self> {
        if domain.len() != values.len() {
            return Err(PeakInitError::DimensionMismatch(format!(
                "Domain has {} points but {} values were given",
                domain.len(),
                values.len()
            )));
        }

        let mut active = Vec::new();
        for i in 0..model.nparams() {
            if model.is_active(i)? {
                active.push(i);
            }
        }

        Ok(Self {
            model,
            x: domain.to_array(),
            y: Array1::from_vec(values.data().to_vec()),
            weights: Array1::from_vec(values.weights().to_vec()),
            active,
        })
    }

    /// Model parameter index of each cost parameter.
    pub fn active_indices(&self) -> &[usize] {
        &self.active
    }

    pub fn model(&self) -> &M {
        &*self.model
    }

    fn model_index(&self, i: usize) -> Result<usize> {
        self.active.get(i).copied().ok_or_else(|| {
            PeakInitError::InvalidInput(format!(
                "Parameter index {} out of range for {} active parameters",
                i,
                self.active.len()
            ))
        })
    }

    fn residuals(&self) -> Result<Array1<f64>> {
        Ok(self.model.eval(&self.x)? - &self.y)
    }
}

fn assign_keeping_state<M: Model + ?Sized>(model: &mut M, i: usize, value: f64) -> Result<()> {
    let explicit = model.is_explicitly_set(i)?;
    model.set_parameter(i, value, explicit)
}

impl<'a, M: Model + ?Sized> CostFunction for LeastSquaresCost<'a, M> {
    fn nparams(&self) -> usize {
        self.active.len()
    }

    fn parameter(&self, i: usize) -> Result<f64> {
        self.model.get_parameter(self.model_index(i)?)
    }

    fn set_parameter(&mut self, i: usize, value: f64) -> Result<()> {
        let index = self.model_index(i)?;
        assign_keeping_state(&mut *self.model, index, value)
    }

    fn val(&self) -> Result<f64> {
        let r = self.residuals()?;
        Ok((&self.weights * &r * &r).sum())
    }

    fn as_fitting(&mut self) -> Option<&mut dyn FittingCostFunction> {
        Some(self)
    }
}

impl<'a, M: Model + ?Sized> FittingCostFunction for LeastSquaresCost<'a, M> {
    fn gradient_and_hessian(&mut self) -> Result<(Array1<f64>, Array2<f64>)> {
        let p0 = self.parameters()?;
        let r = self.residuals()?;

        let Self {
            model, x, active, ..
        } = &mut *self;
        let model: &mut M = model;
        let jac = finite_difference::jacobian(
            |p| {
                for (&i, &v) in active.iter().zip(p.iter()) {
                    assign_keeping_state(model, i, v)?;
                }
                model.eval(x)
            },
            &p0,
            None,
        );
        let restored = self.set_parameters(&p0);
        let jac = jac?;
        restored?;

        let wr = &self.weights * &r;
        let wj = &jac * &self.weights.view().insert_axis(Axis(1));
        let gradient = jac.t().dot(&wr) * 2.0;
        let hessian = jac.t().dot(&wj) * 2.0;
        Ok((gradient, hessian))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LinearModel;
    use crate::utils::finite_difference::gradient;
    use approx::assert_relative_eq;

    fn line_data() -> (FunctionDomain1D, FunctionValues) {
        let domain = FunctionDomain1D::linspace(0.0, 4.0, 5).unwrap();
        let values = FunctionValues::from_fn(&domain, |x| 1.0 + 2.0 * x);
        (domain, values)
    }

    #[test]
    fn test_value_and_parameters() {
        let (domain, values) = line_data();
        let mut model = LinearModel::new();
        let mut cost = LeastSquaresCost::new(&mut model, &domain, &values).unwrap();

        assert_eq!(cost.nparams(), 2);
        cost.set_parameter(0, 1.0).unwrap();
        cost.set_parameter(1, 2.0).unwrap();
        assert_relative_eq!(cost.val().unwrap(), 0.0, epsilon = 1e-14);

        cost.set_parameter(0, 2.0).unwrap();
        assert_relative_eq!(cost.val().unwrap(), 5.0, epsilon = 1e-12);
        assert!(cost.parameter(2).is_err());
    }

    #[test]
    fn test_fixed_parameters_are_skipped() {
        let (domain, values) = line_data();
        let mut model = LinearModel::new();
        model.fix(0).unwrap();

        let cost = LeastSquaresCost::new(&mut model, &domain, &values).unwrap();
        assert_eq!(cost.nparams(), 1);
        assert_eq!(cost.active_indices(), &[1]);
    }

    #[test]
    fn test_gradient_matches_numerical() {
        let (domain, values) = line_data();
        let mut model = LinearModel::with_coefficients(0.5, 1.5).unwrap();
        let mut cost = LeastSquaresCost::new(&mut model, &domain, &values).unwrap();

        let p0 = cost.parameters().unwrap();
        let (g, h) = cost.as_fitting().unwrap().gradient_and_hessian().unwrap();
        assert_eq!(cost.parameters().unwrap(), p0);

        let numerical = gradient(
            |p| {
                cost.set_parameters(p)?;
                cost.val()
            },
            &p0,
            Some(1e-6),
        )
        .unwrap();
        cost.set_parameters(&p0).unwrap();

        assert_relative_eq!(g[0], numerical[0], epsilon = 1e-4);
        assert_relative_eq!(g[1], numerical[1], epsilon = 1e-4);

        // 2 Σ [1, x; x, x²] over x = 0..4
        assert_relative_eq!(h[[0, 0]], 10.0, epsilon = 1e-5);
        assert_relative_eq!(h[[0, 1]], 20.0, epsilon = 1e-5);
        assert_relative_eq!(h[[1, 1]], 60.0, epsilon = 1e-4);
    }

    #[test]
    fn test_probing_keeps_explicit_state() {
        let (domain, values) = line_data();
        let mut model = LinearModel::with_coefficients(0.5, 1.5).unwrap();
        {
            let mut cost = LeastSquaresCost::new(&mut model, &domain, &values).unwrap();
            cost.set_parameter(0, 0.75).unwrap();
            cost.as_fitting().unwrap().gradient_and_hessian().unwrap();
        }
        assert!(model.is_explicitly_set(0).unwrap());
        assert_eq!(model.get_parameter(0).unwrap(), 0.75);
    }
}
