//! Model trait and basic model implementations.
//!
//! This module defines the Model trait, the interface through which the
//! estimator and the cost functions read and write parameters of a fit
//! function, and evaluate it. Leaf models own a [`Parameters`] collection;
//! composite models expose the flattened parameters of their children through
//! the index-based accessors.

use crate::error::{PeakInitError, Result};
use crate::parameters::Parameters;
use ndarray::Array1;

/// The closed set of model families the initial-value estimator knows about.
///
/// A model reports its kind and the estimator pattern-matches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    /// A sum of child models.
    Composite,
    /// Gaussian peak (`Height`, `PeakCentre`, `Sigma`).
    Gaussian,
    /// Lorentzian peak (`Amplitude`, `PeakCentre`, `FWHM`).
    Lorentzian,
    /// Back-to-back exponential peak (`I`, `A`, `B`, `X0`, `S`).
    BackToBackExponential,
    /// Anything the estimator has no rules for.
    Other,
}

/// A trait representing a model that can be fit to data.
///
/// Parameters are addressed by a flat index `0..nparams()`. For leaf models this
/// is the order of their own [`Parameters`]; composite models override the
/// index-based methods to walk their children in order.
pub trait Model: Send + Sync {
    /// Short name of the model, e.g. `"Gaussian"`.
    fn name(&self) -> &str;

    /// The family this model belongs to.
    fn kind(&self) -> ModelKind {
        ModelKind::Other
    }

    /// Returns a reference to the model's own parameters.
    ///
    /// Composite models own no parameters and return an empty collection.
    fn parameters(&self) -> &Parameters;

    /// Returns a mutable reference to the model's own parameters.
    fn parameters_mut(&mut self) -> &mut Parameters;

    /// Evaluates the model at the given x values using the current parameter values.
    ///
    /// # Arguments
    ///
    /// * `x` - The independent variable values at which to evaluate the model
    ///
    /// # Returns
    ///
    /// * The model's predicted values at the given x values
    fn eval(&self, x: &Array1<f64>) -> Result<Array1<f64>>;

    /// Calculates the residuals (y_obs - y_pred) using the current parameter values.
    fn residuals(&self, x: &Array1<f64>, y: &Array1<f64>) -> Result<Array1<f64>> {
        let y_pred = self.eval(x)?;

        if y.len() != y_pred.len() {
            return Err(PeakInitError::DimensionMismatch(format!(
                "Expected {} observed values, got {}",
                y_pred.len(),
                y.len()
            )));
        }

        Ok(y - &y_pred)
    }

    /// Child models, in order. Empty for leaf models.
    fn components(&self) -> &[Box<dyn Model>] {
        &[]
    }

    /// Mutable access to the child models. Empty for leaf models.
    fn components_mut(&mut self) -> &mut [Box<dyn Model>] {
        &mut []
    }

    /// Total number of parameters, including those of any children.
    fn nparams(&self) -> usize {
        self.parameters().len()
    }

    /// Name of the parameter at flat index `i`.
    fn parameter_name(&self, i: usize) -> Result<String> {
        Ok(self.parameters().get_at(i)?.name().to_string())
    }

    /// Value of the parameter at flat index `i`.
    fn get_parameter(&self, i: usize) -> Result<f64> {
        Ok(self.parameters().get_at(i)?.value())
    }

    /// Set the parameter at flat index `i`.
    ///
    /// `explicitly_set` records whether the value came from the caller (true)
    /// or from an estimate (false).
    fn set_parameter(&mut self, i: usize, value: f64, explicitly_set: bool) -> Result<()> {
        self.parameters_mut()
            .get_at_mut(i)?
            .assign(value, explicitly_set)?;
        Ok(())
    }

    /// Whether the parameter at flat index `i` was explicitly set.
    fn is_explicitly_set(&self, i: usize) -> Result<bool> {
        Ok(self.parameters().get_at(i)?.is_explicitly_set())
    }

    /// Whether the parameter at flat index `i` is varied by minimizers.
    fn is_active(&self, i: usize) -> Result<bool> {
        Ok(self.parameters().get_at(i)?.vary())
    }

    /// Exclude the parameter at flat index `i` from minimization.
    fn fix(&mut self, i: usize) -> Result<()> {
        self.parameters_mut().get_at_mut(i)?.set_vary(false);
        Ok(())
    }

    /// Flat index of the named parameter.
    fn parameter_index(&self, name: &str) -> Result<usize> {
        self.parameters()
            .index_of(name)
            .ok_or_else(|| PeakInitError::ParameterNotFound(name.to_string()))
    }

    /// Value of the named parameter.
    fn get_parameter_by_name(&self, name: &str) -> Result<f64> {
        self.get_parameter(self.parameter_index(name)?)
    }

    /// Set the named parameter.
    fn set_parameter_by_name(
        &mut self,
        name: &str,
        value: f64,
        explicitly_set: bool,
    ) -> Result<()> {
        let i = self.parameter_index(name)?;
        self.set_parameter(i, value, explicitly_set)
    }
}

/// Look up a parameter value, mapping a missing name to `ParameterNotFound`.
pub(crate) fn param_value(params: &Parameters, name: &str) -> Result<f64> {
    params
        .get(name)
        .map(|p| p.value())
        .ok_or_else(|| PeakInitError::ParameterNotFound(name.to_string()))
}

/// Type of the evaluation closure held by [`BaseModel`].
type EvalFunc = Box<dyn Fn(&Parameters, &Array1<f64>) -> Result<Array1<f64>> + Send + Sync>;

/// A base implementation of the Model trait for ad-hoc functions.
///
/// The model is of kind [`ModelKind::Other`], so the estimator never touches it.
pub struct BaseModel {
    /// The name reported by the model
    name: String,
    /// The parameters for the model
    parameters: Parameters,
    /// The function to evaluate the model
    eval_func: EvalFunc,
}

impl BaseModel {
    /// Create a new BaseModel with the given parameters and evaluation function
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the model
    /// * `parameters` - The parameters for the model
    /// * `eval_func` - The function to evaluate the model
    ///
    /// # Returns
    ///
    /// * A new BaseModel
    pub fn new<F>(name: &str, parameters: Parameters, eval_func: F) -> Self
    where
        F: Fn(&Parameters, &Array1<f64>) -> Result<Array1<f64>> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            parameters,
            eval_func: Box::new(eval_func),
        }
    }
}

impl Model for BaseModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.parameters
    }

    fn eval(&self, x: &Array1<f64>) -> Result<Array1<f64>> {
        (self.eval_func)(&self.parameters, x)
    }
}
