//! # peakinit-rs
//!
//! `peakinit-rs` estimates initial parameter values for peak-shape models from
//! sampled data, and refines parameters with a curvature-aware local search.
//!
//! The library provides:
//! - Adaptive Chebyshev approximation of functions and data, with spectral
//!   differentiation, integration and root isolation
//! - Peak feature extraction (centre, width, extent, half widths at half maximum)
//! - Initial-value estimation for Gaussian, Lorentzian and back-to-back
//!   exponential peaks inside composite models
//! - A local search minimizer alternating grid search and Newton steps
//!
//! ## Basic Usage
//!
//! ```
//! use peakinit_rs::{FunctionDomain1D, FunctionValues, Model, ParameterEstimator};
//! use peakinit_rs::models::{CompositeModel, LinearModel, LorentzianModel};
//!
//! let domain = FunctionDomain1D::linspace(-10.0, 10.0, 401).unwrap();
//! let values = FunctionValues::from_fn(&domain, |x| 0.2 + 1.0 / (1.0 + x * x));
//!
//! let mut model = CompositeModel::new()
//!     .with(LinearModel::with_coefficients(0.2, 0.0).unwrap())
//!     .with(LorentzianModel::new());
//! ParameterEstimator::estimate(&mut model, &domain, &values).unwrap();
//!
//! let fwhm = model.get_parameter_by_name("f1.FWHM").unwrap();
//! assert!((fwhm - 2.0).abs() < 0.3);
//! ```

pub mod approximation;
pub mod cost_function;
pub mod domain;
pub mod error;
pub mod estimator;
pub mod features;
pub mod minimizer;
pub mod model;
pub mod models;
pub mod parameters;
pub mod utils;

// Re-exports for convenience
pub use approximation::{ApproximationBase, PiecewiseApproximation};
pub use cost_function::{CostFunction, FittingCostFunction, LeastSquaresCost};
pub use domain::{FunctionDomain1D, FunctionValues};
pub use error::{PeakInitError, Result};
pub use estimator::ParameterEstimator;
pub use minimizer::{LocalSearchConfig, LocalSearchMinimizer, Minimizer};
pub use model::{Model, ModelKind};
pub use parameters::{Parameter, Parameters};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
