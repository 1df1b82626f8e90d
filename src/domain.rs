//! Sampled data for estimation: the x positions and the observed y values.

use crate::error::{PeakInitError, Result};
use ndarray::Array1;
use std::ops::Index;

/// An ascending sequence of x values at which data has been observed.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDomain1D {
    x: Vec<f64>,
}

impl FunctionDomain1D {
    /// Create a domain from x values.
    ///
    /// # Arguments
    ///
    /// * `x` - The x values, which must be finite and strictly increasing
    ///
    /// # Returns
    ///
    /// * The domain, or `InvalidInput` if the values are not strictly increasing
    pub fn new(x: Vec<f64>) -> Result<Self> {
        if let Some(bad) = x.iter().position(|v| !v.is_finite()) {
            return Err(PeakInitError::InvalidInput(format!(
                "Domain value at index {} is not finite",
                bad
            )));
        }
        if let Some(i) = x.windows(2).position(|w| w[1] <= w[0]) {
            return Err(PeakInitError::InvalidInput(format!(
                "Domain values must be strictly increasing, got {} followed by {} at index {}",
                x[i],
                x[i + 1],
                i + 1
            )));
        }
        Ok(Self { x })
    }

    /// Create a domain of `n` evenly spaced points on `[start, end]`.
    pub fn linspace(start: f64, end: f64, n: usize) -> Result<Self> {
        if n == 1 {
            return Self::new(vec![start]);
        }
        let step = (end - start) / (n.saturating_sub(1)) as f64;
        Self::new((0..n).map(|i| start + step * i as f64).collect())
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<f64> {
        self.x.get(i).copied()
    }

    pub fn first(&self) -> Option<f64> {
        self.x.first().copied()
    }

    pub fn last(&self) -> Option<f64> {
        self.x.last().copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.x
    }

    pub fn to_array(&self) -> Array1<f64> {
        Array1::from_vec(self.x.clone())
    }
}

impl Index<usize> for FunctionDomain1D {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.x[i]
    }
}

/// Observed values and their fitting weights, indexed like the domain.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionValues {
    y: Vec<f64>,
    weights: Vec<f64>,
}

impl FunctionValues {
    /// Observed values with unit weights.
    pub fn new(y: Vec<f64>) -> Self {
        let weights = vec![1.0; y.len()];
        Self { y, weights }
    }

    /// Observed values with explicit weights.
    pub fn with_weights(y: Vec<f64>, weights: Vec<f64>) -> Result<Self> {
        if y.len() != weights.len() {
            return Err(PeakInitError::DimensionMismatch(format!(
                "Expected {} weights, got {}",
                y.len(),
                weights.len()
            )));
        }
        Ok(Self { y, weights })
    }

    /// Evaluate a function over a domain to produce synthetic observations.
    pub fn from_fn<F: FnMut(f64) -> f64>(domain: &FunctionDomain1D, f: F) -> Self {
        Self::new(domain.as_slice().iter().copied().map(f).collect())
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Observed value at domain index `i`.
    pub fn fit_data(&self, i: usize) -> Option<f64> {
        self.y.get(i).copied()
    }

    /// Fitting weight at domain index `i`.
    pub fn fit_weight(&self, i: usize) -> Option<f64> {
        self.weights.get(i).copied()
    }

    pub fn data(&self) -> &[f64] {
        &self.y
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}
