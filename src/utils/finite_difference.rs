//! Finite difference methods for numerical differentiation.
//!
//! This module provides functions for computing Jacobians and gradients
//! using finite difference approximations.

use crate::error::{PeakInitError, Result};
use ndarray::{Array1, Array2};

/// Default step size for finite differences.
const DEFAULT_EPSILON: f64 = 1e-8;

/// Step for a parameter of the given value, relative unless the value is tiny.
fn step_for(value: f64, eps: f64) -> f64 {
    if value.abs() > eps {
        value.abs() * eps
    } else {
        eps
    }
}

/// Compute the Jacobian matrix of a vector function using forward finite differences.
///
/// J[i,j] = ∂f[i]/∂params[j].
///
/// # Arguments
///
/// * `f` - The vector function to differentiate
/// * `params` - The parameter values at which to evaluate the Jacobian
/// * `epsilon` - The step size for finite differences (optional)
///
/// # Returns
///
/// * `Result<Array2<f64>>` - The Jacobian matrix
pub fn jacobian<F>(mut f: F, params: &Array1<f64>, epsilon: Option<f64>) -> Result<Array2<f64>>
where
    F: FnMut(&Array1<f64>) -> Result<Array1<f64>>,
{
    let eps = epsilon.unwrap_or(DEFAULT_EPSILON);
    let f0 = f(params)?;
    let mut jac = Array2::zeros((f0.len(), params.len()));

    for j in 0..params.len() {
        let eps_j = step_for(params[j], eps);
        let mut perturbed = params.clone();
        perturbed[j] += eps_j;

        let f1 = f(&perturbed)?;
        if f1.len() != f0.len() {
            return Err(PeakInitError::DimensionMismatch(format!(
                "Expected {} function values, got {}",
                f0.len(),
                f1.len()
            )));
        }

        jac.column_mut(j).assign(&((&f1 - &f0) / eps_j));
    }

    Ok(jac)
}

/// Compute the gradient of a scalar function using central finite differences.
///
/// # Arguments
///
/// * `f` - The function to differentiate
/// * `params` - The parameter values at which to evaluate the gradient
/// * `epsilon` - The step size for finite differences (optional)
///
/// # Returns
///
/// * `Result<Array1<f64>>` - The gradient vector
pub fn gradient<F>(mut f: F, params: &Array1<f64>, epsilon: Option<f64>) -> Result<Array1<f64>>
where
    F: FnMut(&Array1<f64>) -> Result<f64>,
{
    let eps = epsilon.unwrap_or(DEFAULT_EPSILON);
    let mut grad = Array1::zeros(params.len());

    for j in 0..params.len() {
        let eps_j = step_for(params[j], eps);

        let mut forward = params.clone();
        forward[j] += eps_j;
        let mut backward = params.clone();
        backward[j] -= eps_j;

        grad[j] = (f(&forward)? - f(&backward)?) / (2.0 * eps_j);
    }

    Ok(grad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn test_function(params: &Array1<f64>) -> Result<f64> {
        let (x, y) = (params[0], params[1]);
        Ok(x.powi(2) + 2.0 * y.powi(2) + x * y)
    }

    #[test]
    fn test_gradient() {
        // ∂f/∂x = 2x + y, ∂f/∂y = 4y + x
        let grad = gradient(test_function, &array![2.0, 3.0], None).unwrap();

        assert_eq!(grad.len(), 2);
        assert_relative_eq!(grad[0], 7.0, epsilon = 1e-5);
        assert_relative_eq!(grad[1], 14.0, epsilon = 1e-5);
    }

    #[test]
    fn test_jacobian() {
        let f = |p: &Array1<f64>| -> Result<Array1<f64>> {
            Ok(array![p[0].powi(2), p[1].powi(2), p[0] * p[1]])
        };
        let jac = jacobian(f, &array![2.0, 3.0], None).unwrap();

        assert_eq!(jac.shape(), &[3, 2]);
        assert_relative_eq!(jac[[0, 0]], 4.0, epsilon = 1e-5);
        assert_relative_eq!(jac[[0, 1]], 0.0, epsilon = 1e-5);
        assert_relative_eq!(jac[[1, 1]], 6.0, epsilon = 1e-5);
        assert_relative_eq!(jac[[2, 0]], 3.0, epsilon = 1e-5);
        assert_relative_eq!(jac[[2, 1]], 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_jacobian_rejects_changing_length() {
        let mut calls = 0;
        let f = |_: &Array1<f64>| -> Result<Array1<f64>> {
            calls += 1;
            Ok(Array1::zeros(calls))
        };
        assert!(jacobian(f, &array![1.0], None).is_err());
    }
}
