//! Back-to-back exponential peak model.
//!
//! The shape is two exponentials (rise rate `A`, decay rate `B`) meeting at
//! `X0`, convolved with a Gaussian of width `S`:
//!
//! f(x) = I·A·B / (2(A+B)) · [ exp(A/2·(A·S² + 2(x−X0)))·erfc((A·S² + (x−X0)) / (S√2))
//!                           + exp(B/2·(B·S² − 2(x−X0)))·erfc((B·S² − (x−X0)) / (S√2)) ]
//!
//! `I` is the integrated intensity.

use crate::error::Result;
use crate::model::{param_value, Model, ModelKind};
use crate::parameters::{Parameter, Parameters};
use libm::erfc;
use ndarray::Array1;
use std::f64::consts::{PI, SQRT_2};

/// Argument above which `exp(e)·erfc(z)` switches to its asymptotic expansion.
const ASYMPTOTIC_Z: f64 = 6.0;

/// `exp(e) * erfc(z)` without overflowing `exp(e)` for large `z`.
fn exp_erfc(e: f64, z: f64) -> f64 {
    if z >= ASYMPTOTIC_Z {
        let z2 = z * z;
        (e - z2).exp() / (z * PI.sqrt()) * (1.0 - 0.5 / z2 + 0.75 / (z2 * z2))
    } else {
        e.exp() * erfc(z)
    }
}

/// An asymmetric peak with exponential rise and decay.
#[derive(Debug, Clone)]
pub struct BackToBackExponentialModel {
    params: Parameters,
}

impl BackToBackExponentialModel {
    /// Create a model with the conventional defaults: `I = 0`, `A = 1`,
    /// `B = 0.05`, `X0 = 0`, `S = 1`. No parameter is explicitly set.
    pub fn new() -> Self {
        let params = [
            ("I", 0.0),
            ("A", 1.0),
            ("B", 0.05),
            ("X0", 0.0),
            ("S", 1.0),
        ]
        .into_iter()
        .map(|(name, value)| Parameter::new(name, value))
        .collect();
        Self { params }
    }
}

impl Default for BackToBackExponentialModel {
    fn default() -> Self {
        Self::new()
    }
}

impl Model for BackToBackExponentialModel {
    fn name(&self) -> &str {
        "BackToBackExponential"
    }

    fn kind(&self) -> ModelKind {
        ModelKind::BackToBackExponential
    }

    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    fn eval(&self, x: &Array1<f64>) -> Result<Array1<f64>> {
        let i = param_value(&self.params, "I")?;
        let a = param_value(&self.params, "A")?;
        let b = param_value(&self.params, "B")?;
        let x0 = param_value(&self.params, "X0")?;
        let s = param_value(&self.params, "S")?;

        let s2 = s * s;
        let norm = i * a * b / (2.0 * (a + b));
        let denom = s * SQRT_2;

        Ok(x.mapv(|x_val| {
            let dx = x_val - x0;
            let rise = exp_erfc(a / 2.0 * (a * s2 + 2.0 * dx), (a * s2 + dx) / denom);
            let decay = exp_erfc(b / 2.0 * (b * s2 - 2.0 * dx), (b * s2 - dx) / denom);
            norm * (rise + decay)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_exp_erfc_is_continuous_at_switch() {
        let e: f64 = 3.0;
        let below = e.exp() * erfc(ASYMPTOTIC_Z - 1e-9);
        let above = exp_erfc(e, ASYMPTOTIC_Z);
        assert_relative_eq!(below, above, max_relative = 1e-4);
    }

    #[test]
    fn test_integrated_intensity() {
        let mut model = BackToBackExponentialModel::new();
        for (name, value) in [("I", 10.0), ("A", 2.0), ("B", 0.5), ("X0", 0.0), ("S", 0.3)] {
            model.set_parameter_by_name(name, value, true).unwrap();
        }

        let n = 20001;
        let (lo, hi) = (-20.0, 60.0);
        let h = (hi - lo) / (n - 1) as f64;
        let x = Array1::from_iter((0..n).map(|k| lo + h * k as f64));
        let y = model.eval(&x).unwrap();

        let area = y.sum() * h;
        assert_relative_eq!(area, 10.0, max_relative = 1e-3);
        assert!(y.iter().all(|v| v.is_finite() && *v >= 0.0));
    }

    #[test]
    fn test_asymmetry() {
        let mut model = BackToBackExponentialModel::new();
        for (name, value) in [("I", 1.0), ("A", 3.0), ("B", 0.5), ("X0", 0.0), ("S", 0.2)] {
            model.set_parameter_by_name(name, value, true).unwrap();
        }

        let y = model.eval(&Array1::from_vec(vec![-1.0, 1.0])).unwrap();
        // slow decay on the right
        assert!(y[1] > y[0]);
    }
}
