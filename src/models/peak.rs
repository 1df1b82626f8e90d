//! Peak models for fitting data.
//!
//! This module provides the symmetric peak shapes, Gaussian and Lorentzian,
//! which are widely used in spectroscopy, diffraction, and other scientific fields.

use crate::error::Result;
use crate::model::{param_value, Model, ModelKind};
use crate::parameters::{Parameter, Parameters};
use ndarray::Array1;
use std::f64::consts::PI;

/// A Gaussian peak model.
///
/// The Gaussian function is defined as:
/// f(x) = Height * exp(-(x - PeakCentre)² / (2 * Sigma²))
///
/// The Full Width at Half Maximum (FWHM) is related to sigma by:
/// FWHM = 2 * sqrt(2 * ln(2)) * Sigma ≈ 2.3548 * Sigma
#[derive(Debug, Clone)]
pub struct GaussianModel {
    params: Parameters,
}

impl GaussianModel {
    /// Create a new Gaussian model with unit height and width at the origin.
    ///
    /// None of the parameters are marked as explicitly set.
    pub fn new() -> Self {
        let params = [("Height", 1.0), ("PeakCentre", 0.0), ("Sigma", 1.0)]
            .into_iter()
            .map(|(name, value)| Parameter::new(name, value))
            .collect();
        Self { params }
    }
}

impl Default for GaussianModel {
    fn default() -> Self {
        Self::new()
    }
}

impl Model for GaussianModel {
    fn name(&self) -> &str {
        "Gaussian"
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Gaussian
    }

    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    fn eval(&self, x: &Array1<f64>) -> Result<Array1<f64>> {
        let height = param_value(&self.params, "Height")?;
        let centre = param_value(&self.params, "PeakCentre")?;
        let sigma = param_value(&self.params, "Sigma")?;

        Ok(x.mapv(|x_val| {
            let arg = (x_val - centre) / sigma;
            height * (-0.5 * arg * arg).exp()
        }))
    }
}

/// A Lorentzian peak model.
///
/// The Lorentzian function is defined as:
/// f(x) = Amplitude / π * Γ / ((x - PeakCentre)² + Γ²), with Γ = FWHM / 2
///
/// `Amplitude` is the integrated intensity; the peak height is
/// `2 * Amplitude / (π * FWHM)`.
#[derive(Debug, Clone)]
pub struct LorentzianModel {
    params: Parameters,
}

impl LorentzianModel {
    /// Create a new Lorentzian model with unit amplitude and width at the origin.
    pub fn new() -> Self {
        let params = [("Amplitude", 1.0), ("PeakCentre", 0.0), ("FWHM", 1.0)]
            .into_iter()
            .map(|(name, value)| Parameter::new(name, value))
            .collect();
        Self { params }
    }
}

impl Default for LorentzianModel {
    fn default() -> Self {
        Self::new()
    }
}

impl Model for LorentzianModel {
    fn name(&self) -> &str {
        "Lorentzian"
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Lorentzian
    }

    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    fn eval(&self, x: &Array1<f64>) -> Result<Array1<f64>> {
        let amplitude = param_value(&self.params, "Amplitude")?;
        let centre = param_value(&self.params, "PeakCentre")?;
        let gamma = param_value(&self.params, "FWHM")? / 2.0;

        Ok(x.mapv(|x_val| {
            let diff = x_val - centre;
            amplitude / PI * gamma / (diff * diff + gamma * gamma)
        }))
    }
}
