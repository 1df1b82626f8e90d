//! Polynomial background models.

use crate::error::Result;
use crate::model::{param_value, Model};
use crate::parameters::{Parameter, Parameters};
use ndarray::Array1;

/// A linear background (degree 1 polynomial)
///
/// The linear function is defined as:
///
/// f(x) = A0 + A1 * x
///
/// Where:
/// - A0: the constant term
/// - A1: the slope
#[derive(Debug, Clone)]
pub struct LinearModel {
    params: Parameters,
}

impl LinearModel {
    /// Create a new linear background of zero.
    pub fn new() -> Self {
        let params = [("A0", 0.0), ("A1", 0.0)]
            .into_iter()
            .map(|(name, value)| Parameter::new(name, value))
            .collect();
        Self { params }
    }

    /// Create a linear background with the given (explicitly set) coefficients.
    pub fn with_coefficients(a0: f64, a1: f64) -> Result<Self> {
        let mut model = Self::new();
        model.set_parameter(0, a0, true)?;
        model.set_parameter(1, a1, true)?;
        Ok(model)
    }

    /// Get the slope parameter
    pub fn slope(&self) -> Option<f64> {
        self.params.get("A1").map(|p| p.value())
    }

    /// Get the intercept parameter
    pub fn intercept(&self) -> Option<f64> {
        self.params.get("A0").map(|p| p.value())
    }
}

impl Default for LinearModel {
    fn default() -> Self {
        Self::new()
    }
}

impl Model for LinearModel {
    fn name(&self) -> &str {
        "LinearBackground"
    }

    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    fn eval(&self, x: &Array1<f64>) -> Result<Array1<f64>> {
        let a0 = param_value(&self.params, "A0")?;
        let a1 = param_value(&self.params, "A1")?;
        Ok(x.mapv(|x_val| a0 + a1 * x_val))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_linear_model() {
        let model = LinearModel::with_coefficients(1.0, -0.5).unwrap();
        let y = model.eval(&array![0.0, 2.0, 4.0]).unwrap();

        assert_relative_eq!(y[0], 1.0);
        assert_relative_eq!(y[1], 0.0);
        assert_relative_eq!(y[2], -1.0);
        assert_eq!(model.slope(), Some(-0.5));
        assert_eq!(model.intercept(), Some(1.0));
    }
}
