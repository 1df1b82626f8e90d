//! Built-in model implementations.
//!
//! This module provides the peak shapes the initial-value estimator knows how
//! to handle (Gaussian, Lorentzian, back-to-back exponential), a linear
//! background, and the composite model that sums them.

mod back_to_back;
mod composite;
mod peak;
mod polynomial;

// Re-export the models
pub use back_to_back::BackToBackExponentialModel;
pub use composite::CompositeModel;
pub use peak::{GaussianModel, LorentzianModel};
pub use polynomial::LinearModel;

/// Create a Gaussian peak with the given height and centre.
///
/// Height and centre are marked as explicitly set; `Sigma` keeps its default
/// so that the estimator will fill it in.
pub fn gaussian_peak(height: f64, centre: f64) -> crate::error::Result<GaussianModel> {
    use crate::model::Model;

    let mut model = GaussianModel::new();
    model.set_parameter_by_name("Height", height, true)?;
    model.set_parameter_by_name("PeakCentre", centre, true)?;
    Ok(model)
}
